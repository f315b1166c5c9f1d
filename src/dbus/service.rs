//! D-Bus service setup and client for the LED indicator.

use async_trait::async_trait;
use futures_util::{FutureExt, StreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};
use zbus::message::Type as MessageType;
use zbus::{Connection, Message, MessageStream};

use super::interface::{
    handle, introspect_xml, route, RemoteCall, Reply, Route, INVALID_ARGS, UNKNOWN_METHOD,
};
use crate::config::BusConfig;
use crate::led::LedState;

#[derive(Error, Debug)]
pub enum BusError {
    #[error("D-Bus error: {0}")]
    Dbus(#[from] zbus::Error),

    #[error("D-Bus connection closed")]
    Disconnected,
}

/// Bus connection as seen by the event loop.
#[async_trait(?Send)]
pub trait Bus {
    /// Resolve once at least one message is waiting. Cancel-safe.
    async fn wait_readable(&mut self) -> Result<(), BusError>;

    /// Handle every message already queued, without waiting for more.
    /// Returns the number of method calls answered.
    async fn process_pending(&mut self, state: &mut LedState) -> Result<usize, BusError>;

    /// Give up the well-known name.
    async fn release_name(&mut self) -> Result<(), BusError>;
}

/// D-Bus service handle.
///
/// Holds the system bus connection, the claimed well-known name and the
/// stream incoming calls are read from.
pub struct DbusService {
    connection: Connection,
    stream: MessageStream,
    peeked: Option<Message>,
    config: BusConfig,
}

impl DbusService {
    /// Connect to the system bus, attach the method dispatcher and claim
    /// the well-known name.
    ///
    /// The dispatcher's stream exists before the name is owned, so no call
    /// sent right after the claim can be missed.
    pub async fn start(config: &BusConfig) -> Result<Self, BusError> {
        info!(
            "Registering D-Bus service: {} at {} with interface: {}",
            config.service_name, config.object_path, config.interface_name
        );

        let connection = Connection::system().await?;
        let stream = MessageStream::from(&connection);
        connection
            .request_name(config.service_name.as_str())
            .await?;

        info!("Service registered");

        Ok(Self {
            connection,
            stream,
            peeked: None,
            config: config.clone(),
        })
    }

    /// Next queued message, if any, without suspending.
    fn try_next(&mut self) -> Result<Option<Message>, BusError> {
        if let Some(msg) = self.peeked.take() {
            return Ok(Some(msg));
        }
        match self.stream.next().now_or_never() {
            Some(Some(msg)) => Ok(Some(msg?)),
            Some(None) => Err(BusError::Disconnected),
            None => Ok(None),
        }
    }

    /// Answer one message. Returns whether it was a call for us.
    async fn dispatch(&self, msg: &Message, state: &mut LedState) -> Result<bool, BusError> {
        if msg.message_type() != MessageType::MethodCall {
            return Ok(false);
        }

        let header = msg.header();
        let path = header.path().map(|p| p.as_str());
        let interface = header.interface().map(|i| i.as_str());
        let member = header.member().map(|m| m.as_str());

        match route(&self.config, path, interface, member) {
            Route::Ignore => return Ok(false),
            Route::Set => match msg.body().deserialize::<String>() {
                Ok(action) => {
                    debug!("set({:?})", action);
                    if let Reply::Accepted(accepted) = handle(state, RemoteCall::Set(action)) {
                        self.connection.reply(&header, &accepted).await?;
                    }
                }
                Err(e) => {
                    warn!("Malformed set call: {}", e);
                    self.connection
                        .reply_error(&header, INVALID_ARGS, &e.to_string())
                        .await?;
                }
            },
            Route::Get => {
                if let Reply::Action(action) = handle(state, RemoteCall::Get) {
                    debug!("get() -> {}", action);
                    self.connection.reply(&header, &action).await?;
                }
            }
            Route::Introspect => {
                self.connection
                    .reply(&header, &introspect_xml(&self.config))
                    .await?;
            }
            Route::UnknownMethod(name) => {
                debug!("Unknown method called: {}", name);
                self.connection
                    .reply_error(
                        &header,
                        UNKNOWN_METHOD,
                        &format!("No such method: {}", name),
                    )
                    .await?;
            }
        }

        Ok(true)
    }
}

#[async_trait(?Send)]
impl Bus for DbusService {
    async fn wait_readable(&mut self) -> Result<(), BusError> {
        if self.peeked.is_none() {
            match self.stream.next().await {
                Some(msg) => self.peeked = Some(msg?),
                None => return Err(BusError::Disconnected),
            }
        }
        Ok(())
    }

    async fn process_pending(&mut self, state: &mut LedState) -> Result<usize, BusError> {
        let mut answered = 0;
        while let Some(msg) = self.try_next()? {
            if self.dispatch(&msg, state).await? {
                answered += 1;
            }
        }
        Ok(answered)
    }

    async fn release_name(&mut self) -> Result<(), BusError> {
        let released = self
            .connection
            .release_name(self.config.service_name.as_str())
            .await?;
        if !released {
            warn!("Bus name {} was not owned", self.config.service_name);
        }
        Ok(())
    }
}

/// D-Bus client for controlling the daemon.
///
/// Used by the CLI to send one call to a running daemon.
pub struct DbusClient {
    proxy: zbus::Proxy<'static>,
}

impl DbusClient {
    /// Connect to the daemon's interface on the system bus.
    pub async fn connect(config: &BusConfig) -> zbus::Result<Self> {
        let connection = Connection::system().await?;
        let proxy = zbus::Proxy::new_owned(
            connection,
            config.service_name.clone(),
            config.object_path.clone(),
            config.interface_name.clone(),
        )
        .await?;
        Ok(Self { proxy })
    }

    /// Call `set(action)`; `false` means the daemon rejected the action.
    pub async fn set(&self, action: &str) -> zbus::Result<bool> {
        let reply = self.proxy.call_method("set", &(action,)).await?;
        let accepted: bool = reply.body().deserialize()?;
        Ok(accepted)
    }

    /// Call `get()`.
    pub async fn get(&self) -> zbus::Result<String> {
        let reply = self.proxy.call_method("get", &()).await?;
        let action: String = reply.body().deserialize()?;
        Ok(action)
    }
}
