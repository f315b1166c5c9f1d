//! Method routing and handlers for the exported LED object.

use crate::config::BusConfig;
use crate::led::LedState;

pub const INTROSPECTABLE_INTERFACE: &str = "org.freedesktop.DBus.Introspectable";
pub const UNKNOWN_METHOD: &str = "org.freedesktop.DBus.Error.UnknownMethod";
pub const INVALID_ARGS: &str = "org.freedesktop.DBus.Error.InvalidArgs";

/// Where a method call header sends us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `set(s) -> b` on our interface
    Set,
    /// `get() -> s` on our interface
    Get,
    /// `Introspect() -> s` on our object
    Introspect,
    /// Our object and interface, but no such method
    UnknownMethod(String),
    /// Not addressed to us
    Ignore,
}

/// A decoded call on the LED interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Set(String),
    Get,
}

/// Reply body for a [`RemoteCall`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Accepted(bool),
    Action(&'static str),
}

/// Classify a method call by its header fields.
///
/// A call without an interface field is matched on the member name alone,
/// as the D-Bus specification allows.
pub fn route(
    config: &BusConfig,
    path: Option<&str>,
    interface: Option<&str>,
    member: Option<&str>,
) -> Route {
    if path != Some(config.object_path.as_str()) {
        return Route::Ignore;
    }
    let Some(member) = member else {
        return Route::Ignore;
    };

    match interface {
        Some(iface) if iface == INTROSPECTABLE_INTERFACE => {
            if member == "Introspect" {
                Route::Introspect
            } else {
                Route::UnknownMethod(member.to_string())
            }
        }
        Some(iface) if iface != config.interface_name => Route::Ignore,
        _ => match member {
            "set" => Route::Set,
            "get" => Route::Get,
            other => Route::UnknownMethod(other.to_string()),
        },
    }
}

/// Run one call against the LED state. Never blocks.
pub fn handle(state: &mut LedState, call: RemoteCall) -> Reply {
    match call {
        RemoteCall::Set(action) => Reply::Accepted(state.set(&action)),
        RemoteCall::Get => Reply::Action(state.get()),
    }
}

/// Introspection document for the exported object.
pub fn introspect_xml(config: &BusConfig) -> String {
    format!(
        r#"<!DOCTYPE node PUBLIC "-//freedesktop//DTD D-BUS Object Introspection 1.0//EN"
 "http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd">
<node>
  <interface name="{INTROSPECTABLE_INTERFACE}">
    <method name="Introspect">
      <arg name="xml_data" type="s" direction="out"/>
    </method>
  </interface>
  <interface name="{}">
    <method name="set">
      <arg name="action" type="s" direction="in"/>
      <arg type="b" direction="out"/>
    </method>
    <method name="get">
      <arg type="s" direction="out"/>
    </method>
  </interface>
</node>
"#,
        config.interface_name
    )
}
