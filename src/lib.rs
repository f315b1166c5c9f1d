//! LED indicator library exports for the binary, integration tests and fuzzing.
//!
//! The daemon side lives in [`daemon`]; the one-shot client in [`client`].

pub mod client;
pub mod config;
pub mod daemon;
pub mod dbus;
pub mod gpio;
pub mod led;
pub mod panic_handler;
pub mod service;
pub mod signals;

// Re-export commonly used types for convenience
pub use config::Config;
pub use daemon::EventLoop;
pub use led::{evaluate, LedAction, LedState};
