//! Termination requests as an awaitable event source.
//!
//! SIGINT and SIGTERM are routed into tokio's signal driver, so the event
//! loop can wait on them alongside the bus and its timer tick.

use async_trait::async_trait;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::debug;

/// Something the event loop can wait on for a shutdown request.
#[async_trait(?Send)]
pub trait ShutdownSource {
    /// Resolve once a shutdown has been requested.
    ///
    /// Must be cancel-safe: the loop drops this future whenever another
    /// source becomes ready first.
    async fn recv(&mut self);

    /// Stop watching for further requests.
    fn close(&mut self);
}

/// SIGINT/SIGTERM listener.
pub struct TerminationSignals {
    streams: Option<(Signal, Signal)>,
}

impl TerminationSignals {
    /// Register for SIGINT and SIGTERM.
    pub fn new() -> std::io::Result<Self> {
        let interrupt = signal(SignalKind::interrupt())?;
        let terminate = signal(SignalKind::terminate())?;
        Ok(Self {
            streams: Some((interrupt, terminate)),
        })
    }
}

#[async_trait(?Send)]
impl ShutdownSource for TerminationSignals {
    async fn recv(&mut self) {
        match self.streams.as_mut() {
            Some((interrupt, terminate)) => {
                tokio::select! {
                    _ = interrupt.recv() => debug!("SIGINT received"),
                    _ = terminate.recv() => debug!("SIGTERM received"),
                }
            }
            None => std::future::pending().await,
        }
    }

    fn close(&mut self) {
        self.streams = None;
    }
}
