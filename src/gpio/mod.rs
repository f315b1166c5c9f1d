//! GPIO output line driving the LED.
//!
//! The event loop only sees the [`LedLine`] capability, so it can be run
//! against a recording fake in tests.

use thiserror::Error;

mod cdev;

pub use cdev::CdevLine;

#[derive(Error, Debug)]
pub enum GpioError {
    #[error("Failed to request line {line} on {chip}: {reason}")]
    Request {
        chip: String,
        line: u32,
        reason: String,
    },

    #[error("Failed to drive line {line}: {reason}")]
    Write { line: u32, reason: String },

    #[error("Failed to read line {line}: {reason}")]
    Read { line: u32, reason: String },
}

/// Exclusive handle on one output line.
pub trait LedLine {
    /// Last level driven onto the line.
    fn level(&mut self) -> Result<bool, GpioError>;

    /// Drive the line high (`true`) or low (`false`).
    fn set_level(&mut self, high: bool) -> Result<(), GpioError>;

    /// Give the line back to the kernel.
    fn release(self) -> Result<(), GpioError>;
}
