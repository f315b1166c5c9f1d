//! D-Bus system bus policy for the daemon.

use super::PROGNAME;
use crate::config::BusConfig;

/// Policy letting root own the service name and anyone call into it.
pub fn policy_file(bus: &BusConfig) -> String {
    format!(
        r#"<!DOCTYPE busconfig PUBLIC
 "-//freedesktop//DTD D-Bus Bus Configuration 1.0//EN"
 "http://www.freedesktop.org/standards/dbus/1.0/busconfig.dtd">
<!-- save this as /etc/dbus-1/system.d/{prog}.conf -->
<busconfig>
  <policy user="root">
    <allow own="{service}"/>
  </policy>
  <policy context="default">
    <allow send_destination="{service}"/>
    <allow send_interface="{interface}"/>
  </policy>
</busconfig>"#,
        prog = PROGNAME,
        service = bus.service_name,
        interface = bus.interface_name,
    )
}
