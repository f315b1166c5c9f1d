//! Deployment artifacts: the D-Bus policy and the systemd unit.
//!
//! Both are printed to stdout for the administrator to save; nothing is
//! installed from here.

use std::path::PathBuf;
use thiserror::Error;

mod policy;
mod systemd;

pub use policy::policy_file;
pub use systemd::unit_file;

/// Name used for the installed unit and policy file.
pub const PROGNAME: &str = "led-indicator";

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Could not find executable path: {0}")]
    ExecutableNotFound(#[source] std::io::Error),
}

/// Get the canonical path to the current executable
pub fn get_executable_path() -> Result<PathBuf, ServiceError> {
    let exe = std::env::current_exe().map_err(ServiceError::ExecutableNotFound)?;
    exe.canonicalize().map_err(ServiceError::ExecutableNotFound)
}
