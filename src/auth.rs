use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::HeaderMap;
use http::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};

use crate::errors::{GatewayError, GatewayResult};

/// API credentials for the payment gateway. Immutable for the lifetime of
/// the client that holds them.
#[derive(Debug, Clone)]
pub struct Credentials {
    public_id: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(
        public_id: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> GatewayResult<Self> {
        let public_id = public_id.into();
        let api_secret = api_secret.into();

        if public_id.is_empty() {
            return Err(GatewayError::ConfigError(
                "public_id must not be empty".to_string(),
            ));
        }
        if api_secret.is_empty() {
            return Err(GatewayError::ConfigError(
                "api_secret must not be empty".to_string(),
            ));
        }

        Ok(Credentials {
            public_id,
            api_secret,
        })
    }

    pub fn public_id(&self) -> &str {
        &self.public_id
    }

    /// Token for the Basic scheme: base64 of `public_id:api_secret`.
    pub fn basic_token(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.public_id, self.api_secret))
    }

    /// Headers shared by every request: auth and content type. Callers
    /// clone this map per call; it is never mutated after construction.
    pub fn base_headers(&self) -> GatewayResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let auth = format!("Basic {}", self.basic_token());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth).map_err(|e| {
                GatewayError::ConfigError(format!("invalid Authorization header: {e}"))
            })?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}
