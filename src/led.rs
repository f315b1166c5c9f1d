//! LED actions, the state behind the remote `set`/`get` methods, and the
//! blink waveform.
//!
//! The waveform is derived from absolute wall-clock time, so two daemons
//! blinking the same LED pattern stay in phase, and the phase after a
//! `set("blink")` depends only on when the pin is sampled.

use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{info, warn};

/// Default blink half-period: the pin holds each level for 500ms.
pub const DEFAULT_BLINK_HALF_PERIOD_MS: u64 = 500;

/// The commanded LED mode (not the instantaneous pin level).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LedAction {
    On,
    #[default]
    Off,
    Blink,
}

impl LedAction {
    /// Wire representation used by the `set`/`get` methods.
    pub fn as_str(self) -> &'static str {
        match self {
            LedAction::On => "on",
            LedAction::Off => "off",
            LedAction::Blink => "blink",
        }
    }
}

impl fmt::Display for LedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown LED action: {0:?} (expected on, off or blink)")]
pub struct UnknownAction(pub String);

impl FromStr for LedAction {
    type Err = UnknownAction;

    /// Exact, case-sensitive match. No trimming.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(LedAction::On),
            "off" => Ok(LedAction::Off),
            "blink" => Ok(LedAction::Blink),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

/// Pin level implied by `action` at wall-clock time `now_ms`.
///
/// `Blink` is high during even half-periods: `floor(now_ms / half_period_ms)`
/// even means high, so an exact multiple of the half-period starts a high
/// phase when that multiple is even.
pub fn evaluate(action: LedAction, now_ms: u64, half_period_ms: u64) -> bool {
    match action {
        LedAction::On => true,
        LedAction::Off => false,
        LedAction::Blink => (now_ms / half_period_ms.max(1)) % 2 == 0,
    }
}

/// Source of wall-clock milliseconds for the waveform.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// State mutated by the remote `set` method and read by `get` and the loop.
///
/// Owned by the event loop; handlers borrow it for the duration of one call.
#[derive(Debug, Default)]
pub struct LedState {
    action: LedAction,
}

impl LedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action(&self) -> LedAction {
        self.action
    }

    /// Handle `set(action) -> bool`. Unknown actions leave the state untouched.
    pub fn set(&mut self, requested: &str) -> bool {
        match requested.parse::<LedAction>() {
            Ok(action) => {
                if action != self.action {
                    info!("LED action: {} -> {}", self.action, action);
                }
                self.action = action;
                true
            }
            Err(e) => {
                warn!("Rejected set request: {}", e);
                false
            }
        }
    }

    /// Handle `get() -> string`.
    pub fn get(&self) -> &'static str {
        self.action.as_str()
    }
}
