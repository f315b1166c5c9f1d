//! systemd unit for running the daemon at boot.

use super::PROGNAME;
use crate::config::{
    Config, DEFAULT_CHIPNAME, DEFAULT_INTERFACE_NAME, DEFAULT_LINE, DEFAULT_OBJECT_PATH,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_SERVICE_NAME,
};
use crate::led::DEFAULT_BLINK_HALF_PERIOD_MS;
use std::path::Path;

/// Options placed before the `service` subcommand (config file, bus names).
fn global_options(config: &Config, config_file: Option<&Path>) -> String {
    let mut opts = String::new();
    if let Some(path) = config_file {
        opts.push_str(&format!(" --config={}", path.display()));
    }
    if config.bus.service_name != DEFAULT_SERVICE_NAME {
        opts.push_str(&format!(" --service-name={}", config.bus.service_name));
    }
    if config.bus.object_path != DEFAULT_OBJECT_PATH {
        opts.push_str(&format!(" --object-path={}", config.bus.object_path));
    }
    if config.bus.interface_name != DEFAULT_INTERFACE_NAME {
        opts.push_str(&format!(" --interface-name={}", config.bus.interface_name));
    }
    opts
}

/// Options placed after the `service` subcommand (GPIO line, timing).
fn service_options(config: &Config) -> String {
    let mut opts = String::new();
    if config.led.chipname != DEFAULT_CHIPNAME {
        opts.push_str(&format!(" --chipname={}", config.led.chipname));
    }
    if config.led.line != DEFAULT_LINE {
        opts.push_str(&format!(" --line={}", config.led.line));
    }
    if config.led.blink_half_period_ms != DEFAULT_BLINK_HALF_PERIOD_MS {
        opts.push_str(&format!(
            " --blink-half-period-ms={}",
            config.led.blink_half_period_ms
        ));
    }
    if config.led.poll_interval_ms != DEFAULT_POLL_INTERVAL_MS {
        opts.push_str(&format!(
            " --poll-interval-ms={}",
            config.led.poll_interval_ms
        ));
    }
    opts
}

/// Generate the systemd service unit. Only non-default options are passed
/// on the `ExecStart` line. `config_file` is passed along so settings that
/// only exist in the file, such as `crash_log`, still reach the daemon.
pub fn unit_file(executable: &Path, config: &Config, config_file: Option<&Path>) -> String {
    format!(
        r#"# Save this as /etc/systemd/system/{prog}.service
[Unit]
Description=LED Indicator Service
DefaultDependencies=no
Before=network-pre.target

[Service]
Type=dbus
BusName={service}
ExecStart={exe}{global} service{local}

[Install]
WantedBy=sysinit.target"#,
        prog = PROGNAME,
        service = config.bus.service_name,
        exe = executable.display(),
        global = global_options(config, config_file),
        local = service_options(config),
    )
}
