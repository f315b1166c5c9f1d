//! One-shot client operations against a running daemon.

use crate::config::BusConfig;
use crate::dbus::DbusClient;
use std::process::ExitCode;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Cannot reach LED indicator service {service}: {source}")]
    Unreachable {
        service: String,
        #[source]
        source: zbus::Error,
    },
}

/// Line printed by `set`: `success` or `error`.
pub fn set_result_line(accepted: bool) -> &'static str {
    if accepted {
        "success"
    } else {
        "error"
    }
}

/// Exit status for `set`: 0 only when the daemon accepted the action.
pub fn set_exit_code(accepted: bool) -> ExitCode {
    if accepted {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn unreachable_service(config: &BusConfig) -> impl FnOnce(zbus::Error) -> ClientError + '_ {
    move |source| ClientError::Unreachable {
        service: config.service_name.clone(),
        source,
    }
}

/// Ask the daemon to change the LED action. Returns whether it was accepted.
pub async fn set(config: &BusConfig, action: &str) -> Result<bool, ClientError> {
    let client = DbusClient::connect(config)
        .await
        .map_err(unreachable_service(config))?;
    let accepted = client.set(action).await.map_err(unreachable_service(config))?;
    debug!("set({:?}) -> {}", action, accepted);
    Ok(accepted)
}

/// Query the commanded LED action.
pub async fn get(config: &BusConfig) -> Result<String, ClientError> {
    let client = DbusClient::connect(config)
        .await
        .map_err(unreachable_service(config))?;
    let action = client.get().await.map_err(unreachable_service(config))?;
    debug!("get() -> {}", action);
    Ok(action)
}
