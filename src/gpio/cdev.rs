//! Linux GPIO character device backend.

use super::{GpioError, LedLine};
use embedded_hal::digital::{OutputPin, PinState, StatefulOutputPin};
use std::path::PathBuf;
use tracing::debug;

/// Output line requested through `/dev/gpiochipN`.
pub struct CdevLine {
    pin: gpiocdev_embedded_hal::OutputPin,
    line: u32,
}

/// Resolve a chip name such as `gpiochip0` to its device node.
/// Anything containing a `/` is taken as a path already.
pub fn chip_path(chipname: &str) -> PathBuf {
    if chipname.contains('/') {
        PathBuf::from(chipname)
    } else {
        PathBuf::from("/dev").join(chipname)
    }
}

impl CdevLine {
    /// Request `line` on `chipname` as an output, initially low.
    pub fn request(chipname: &str, line: u32) -> Result<Self, GpioError> {
        let chip = chip_path(chipname);
        let pin = gpiocdev_embedded_hal::OutputPin::new(&chip, line, PinState::Low).map_err(
            |e| GpioError::Request {
                chip: chip.display().to_string(),
                line,
                reason: e.to_string(),
            },
        )?;
        debug!("Requested line {} on {} as output", line, chip.display());
        Ok(Self { pin, line })
    }
}

impl LedLine for CdevLine {
    fn level(&mut self) -> Result<bool, GpioError> {
        self.pin.is_set_high().map_err(|e| GpioError::Read {
            line: self.line,
            reason: e.to_string(),
        })
    }

    fn set_level(&mut self, high: bool) -> Result<(), GpioError> {
        let result = if high {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|e| GpioError::Write {
            line: self.line,
            reason: e.to_string(),
        })
    }

    fn release(self) -> Result<(), GpioError> {
        // Dropping the request hands the line back to the kernel.
        drop(self.pin);
        debug!("Released line {}", self.line);
        Ok(())
    }
}
