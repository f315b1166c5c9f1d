//! Custom panic handler for daemon crash diagnostics.
//!
//! Prints a crash report to stderr (picked up by the journal when running
//! under systemd) and optionally appends it to a log file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::panic::{self, PanicHookInfo};
use std::path::{Path, PathBuf};

/// Install the custom panic handler.
///
/// This should be called early in `service`, before the bus or the GPIO
/// line are touched.
pub fn install(crash_log: Option<PathBuf>) {
    panic::set_hook(Box::new(move |info| {
        handle_panic(info, crash_log.as_deref());
    }));
}

/// Handle a panic by logging it to stderr and, if configured, a file.
fn handle_panic(info: &PanicHookInfo, crash_log: Option<&Path>) {
    let crash_report = format_crash_report(info);

    eprintln!("{}", crash_report);

    if let Some(path) = crash_log {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        // Append mode to preserve history
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = file.write_all(b"\n\n========================================\n\n");
            let _ = file.write_all(crash_report.as_bytes());
            let _ = file.flush();
            eprintln!("\nCrash report appended to: {}", path.display());
        }
    }
}

/// Extract the panic message from a payload.
fn payload_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

/// Format the crash report with all available diagnostic information.
fn format_crash_report(info: &PanicHookInfo) -> String {
    let location = info
        .location()
        .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
        .unwrap_or_else(|| "unknown".to_string());

    render_report(
        &location,
        &payload_message(info.payload()),
        &std::backtrace::Backtrace::force_capture().to_string(),
    )
}

fn render_report(location: &str, message: &str, backtrace: &str) -> String {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    let thread = std::thread::current();
    let thread_name = thread.name().unwrap_or("<unnamed>");

    format!(
        r"
================================================================================
LED-INDICATOR CRASH REPORT
================================================================================
Time:     {}
Version:  {}
Thread:   {} ({:?})
Location: {}
Message:  {}

Backtrace:
{}
================================================================================

The LED line is released by the kernel when the process exits; its level
is whatever was last written.
",
        timestamp,
        env!("CARGO_PKG_VERSION"),
        thread_name,
        thread.id(),
        location,
        message,
        backtrace,
    )
}
