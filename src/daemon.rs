//! LED daemon.
//!
//! The daemon:
//! 1. Claims its well-known name on the system bus
//! 2. Requests the GPIO line as an output, driven low
//! 3. Runs a single-threaded event loop that answers bus calls, watches for
//!    SIGINT/SIGTERM and keeps the pin at the level the current action implies
//! 4. On termination drives the pin low and releases the line and the name
//!
//! Each loop iteration waits at most `poll_interval` (100ms by default) for
//! the bus or a signal, so blink edges and shutdown are never late by more
//! than that.

use crate::config::{Config, LedConfig};
use crate::dbus::{Bus, BusError, DbusService};
use crate::gpio::{CdevLine, GpioError, LedLine};
use crate::led::{evaluate, Clock, LedAction, LedState, SystemClock};
use crate::signals::{ShutdownSource, TerminationSignals};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum DaemonError {
    #[error("GPIO error: {0}")]
    Gpio(#[from] GpioError),

    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    #[error("Failed to set up signal handling: {0}")]
    Signal(#[source] std::io::Error),
}

/// The daemon's event loop and the resources it owns.
pub struct EventLoop<L, B, S, C = SystemClock> {
    line: L,
    bus: B,
    shutdown: S,
    clock: C,
    state: LedState,
    /// Level last written to the line
    level: bool,
    half_period_ms: u64,
    poll_interval: Duration,
}

impl<L, B, S, C> EventLoop<L, B, S, C>
where
    L: LedLine,
    B: Bus,
    S: ShutdownSource,
    C: Clock,
{
    /// Take ownership of already-acquired resources. The action starts as `Off`.
    pub fn new(
        mut line: L,
        bus: B,
        shutdown: S,
        clock: C,
        led: &LedConfig,
    ) -> Result<Self, DaemonError> {
        let level = line.level()?;
        Ok(Self {
            line,
            bus,
            shutdown,
            clock,
            state: LedState::new(),
            level,
            half_period_ms: led.blink_half_period_ms,
            poll_interval: led.poll_interval(),
        })
    }

    pub fn action(&self) -> LedAction {
        self.state.action()
    }

    /// Level last written to the line.
    pub fn level(&self) -> bool {
        self.level
    }

    /// Bring the pin to the level the current action implies right now.
    ///
    /// Writes only when the level changes. Returns whether a write happened.
    pub fn refresh_output(&mut self) -> Result<bool, GpioError> {
        let expected = evaluate(
            self.state.action(),
            self.clock.now_ms(),
            self.half_period_ms,
        );
        if expected == self.level {
            return Ok(false);
        }
        self.line.set_level(expected)?;
        self.level = expected;
        debug!("LED level: {}", if expected { "high" } else { "low" });
        Ok(true)
    }

    /// Run one iteration: wait, handle bus calls, update the pin.
    ///
    /// Returns `true` when a shutdown was requested during this iteration.
    /// The rest of the iteration still runs in that case.
    pub async fn iterate(&mut self) -> Result<bool, DaemonError> {
        let mut exit_requested = false;

        tokio::select! {
            _ = self.shutdown.recv() => {
                info!("Termination requested");
                exit_requested = true;
            }
            ready = self.bus.wait_readable() => ready?,
            _ = tokio::time::sleep(self.poll_interval) => {}
        }

        let answered = self.bus.process_pending(&mut self.state).await?;
        if answered > 0 {
            debug!("Answered {} bus call(s)", answered);
        }

        self.refresh_output()?;
        Ok(exit_requested)
    }

    /// Loop until a shutdown is requested or the loop fails, then run the
    /// shutdown sequence once.
    pub async fn run(mut self) -> Result<(), DaemonError> {
        info!(
            "Event loop running (poll interval {:?}, blink half-period {}ms)",
            self.poll_interval, self.half_period_ms
        );

        let result = loop {
            match self.iterate().await {
                Ok(true) => break Ok(()),
                Ok(false) => {}
                Err(e) => {
                    error!("Event loop failed: {}", e);
                    break Err(e);
                }
            }
        };

        self.shut_down().await;
        result
    }

    /// Stop polling, drive the pin low, release the line, release the name.
    /// Failures are logged and otherwise ignored.
    async fn shut_down(self) {
        let Self {
            mut line,
            mut bus,
            mut shutdown,
            ..
        } = self;

        shutdown.close();

        if let Err(e) = line.set_level(false) {
            warn!("Failed to turn LED off: {}", e);
        }
        if let Err(e) = line.release() {
            warn!("Failed to release GPIO line: {}", e);
        }
        if let Err(e) = bus.release_name().await {
            warn!("Failed to release bus name: {}", e);
        }

        info!("Exit.");
    }
}

/// Start the daemon with real hardware and the system bus, and run it
/// until SIGINT/SIGTERM.
pub async fn run(config: &Config) -> Result<(), DaemonError> {
    let bus = DbusService::start(&config.bus).await?;

    let line = CdevLine::request(&config.led.chipname, config.led.line)?;
    info!(
        "Driving GPIO line {} on {}",
        config.led.line, config.led.chipname
    );

    let signals = TerminationSignals::new().map_err(DaemonError::Signal)?;

    let event_loop = EventLoop::new(line, bus, signals, SystemClock, &config.led)?;
    event_loop.run().await
}
