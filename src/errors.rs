use thiserror::Error;

use crate::types::ChargeResponse;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Invalid charge request: {0}")]
    InvalidRequest(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gateway rejection: {0}: {1}")]
    GatewayRejection(u16, String),

    #[error("Charge declined: {}", decline_reason(.0))]
    Declined(ChargeResponse),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn decline_reason(response: &ChargeResponse) -> &str {
    response.message.as_deref().unwrap_or("no reason given")
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;
