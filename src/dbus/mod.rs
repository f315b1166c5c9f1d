//! D-Bus integration for the LED indicator.
//!
//! The daemon exports one object with two methods, `set(s) -> b` and
//! `get() -> s`, under names taken from [`BusConfig`](crate::config::BusConfig)
//! so they can be changed at runtime.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐        system bus        ┌──────────────────┐
//! │  led-indicator  │<─────────────────────────│ led-indicator    │
//! │  service        │  com.walbrix.LedIndicator│ set / get        │
//! │  (DbusService)  │─────────────────────────>│ (DbusClient)     │
//! └─────────────────┘                          └──────────────────┘
//! ```
//!
//! Incoming calls are not served by a background object server. They queue
//! on the connection until the event loop calls [`Bus::process_pending`],
//! which runs the handlers on the loop's own thread against its
//! [`LedState`](crate::led::LedState).

mod interface;
mod service;

pub use interface::{handle, introspect_xml, route, RemoteCall, Reply, Route};
pub use service::{Bus, BusError, DbusClient, DbusService};
