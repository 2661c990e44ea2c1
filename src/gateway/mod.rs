mod http;

pub use http::ChargeClient;
pub use http::ChargeClientBuilder;
pub use http::RequestHook;

// Optional helper for a default HTTP client wrapped in Arc<dyn ChargeGateway>

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::GatewayResult;
use crate::types::{ChargeRequest, ChargeResponse};

/// The gateway operation behind a trait, so embedding applications can
/// swap the HTTP client for a test double.
#[async_trait]
pub trait ChargeGateway: Send + Sync {
    async fn charge(&self, request: &ChargeRequest) -> GatewayResult<ChargeResponse>;
}

pub fn default_charge_gateway(
    public_id: impl Into<String>,
    api_secret: impl Into<String>,
) -> GatewayResult<Arc<dyn ChargeGateway>> {
    Ok(Arc::new(ChargeClient::new(public_id, api_secret)?))
}
