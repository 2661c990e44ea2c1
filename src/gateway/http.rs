use crate::auth::Credentials;
use crate::errors::{GatewayError, GatewayResult};
use crate::gateway::ChargeGateway;
use crate::types::{ChargeRequest, ChargeResponse};
use chrono::Utc;
use http::HeaderMap;
use http::header::HeaderValue;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

const DEFAULT_BASE_URL: &str = "https://api.cloudpayments.ru/";
const DEFAULT_CHARGE_PATH: &str = "/payments/charge";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 30;

pub struct ChargeClient {
    pub base_url: String,
    charge_path: String,
    credentials: Credentials,
    client: reqwest::Client,
    base_headers: HeaderMap,
    request_hook: Option<Arc<dyn RequestHook>>,
}

/// Builder for ChargeClient
pub struct ChargeClientBuilder {
    base_url: String,
    charge_path: Option<String>,
    credentials: Credentials,
    client: Option<reqwest::Client>,
    request_hook: Option<Arc<dyn RequestHook>>,
}

#[async_trait::async_trait]
pub trait RequestHook: Send + Sync {
    async fn on_request(
        &self,
        method: http::Method,
        url: &reqwest::Url,
        builder: reqwest::RequestBuilder,
    ) -> reqwest::RequestBuilder;
}

impl ChargeClientBuilder {
    /// Override the gateway base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the charge endpoint path (e.g. "/payments/charge").
    pub fn with_charge_path(mut self, path: impl Into<String>) -> Self {
        self.charge_path = Some(path.into());
        self
    }

    /// Override the underlying reqwest client (optional).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn with_request_hook(mut self, request_hook: Arc<dyn RequestHook>) -> Self {
        self.request_hook = Some(request_hook);
        self
    }

    pub fn build(self) -> GatewayResult<ChargeClient> {
        let base_headers = self.credentials.base_headers()?;
        let client = match self.client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .pool_max_idle_per_host(DEFAULT_POOL_MAX_IDLE_PER_HOST)
                .build()
                .map_err(|e| {
                    GatewayError::ConfigError(format!("failed to build HTTP client: {e}"))
                })?,
        };

        Ok(ChargeClient {
            base_url: self.base_url,
            charge_path: self
                .charge_path
                .unwrap_or_else(|| DEFAULT_CHARGE_PATH.to_string()),
            credentials: self.credentials,
            client,
            base_headers,
            request_hook: self.request_hook,
        })
    }
}

impl ChargeClient {
    pub fn builder(credentials: Credentials) -> ChargeClientBuilder {
        ChargeClientBuilder {
            base_url: DEFAULT_BASE_URL.to_string(),
            charge_path: Some(DEFAULT_CHARGE_PATH.to_string()),
            credentials,
            client: None,
            request_hook: None,
        }
    }

    /// Client against the production gateway with default settings. No
    /// network activity happens until the first charge.
    pub fn new(
        public_id: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> GatewayResult<Self> {
        Self::builder(Credentials::new(public_id, api_secret)?).build()
    }

    fn join_url(base: &str, path: &str) -> String {
        let base = base.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    fn charge_url(&self) -> String {
        Self::join_url(&self.base_url, &self.charge_path)
    }

    /// Correlation id: unix-seconds prefix, random token, payer IP suffix.
    /// The token is 32 fixed hex chars, so ids for distinct IPs can never
    /// collide, and same-IP calls within one tick stay distinct.
    fn make_request_id(ip_address: &str) -> String {
        format!(
            "{}.{}{}",
            Utc::now().timestamp(),
            Uuid::new_v4().simple(),
            ip_address
        )
    }

    /// Fresh per-call headers: a clone of the immutable base plus the
    /// correlation id. Concurrent charges never share header state.
    fn request_headers(&self, ip_address: &str) -> GatewayResult<HeaderMap> {
        let mut headers = self.base_headers.clone();
        let request_id = Self::make_request_id(ip_address);
        headers.insert(
            "X-Request-ID",
            HeaderValue::from_str(&request_id).map_err(|e| {
                GatewayError::InvalidRequest(format!("ip_address yields invalid X-Request-ID: {e}"))
            })?,
        );
        Ok(headers)
    }

    /// Run a single charge against the gateway's charge endpoint.
    ///
    /// Returns the full decoded response body on `Success: true`. A
    /// response reporting `Success: false` becomes
    /// [`GatewayError::Declined`] carrying the gateway's message and body;
    /// a non-2xx status becomes [`GatewayError::GatewayRejection`] with
    /// the status and response text; network-level failures surface as
    /// [`GatewayError::Transport`]. No retries.
    pub async fn charge(&self, request: &ChargeRequest) -> GatewayResult<ChargeResponse> {
        let full_url = reqwest::Url::parse(&self.charge_url())
            .map_err(|e| GatewayError::ConfigError(format!("Invalid gateway URL: {e}")))?;
        let headers = self.request_headers(&request.ip_address)?;
        let payload = request.payload(self.credentials.public_id());

        debug!(url = %full_url, ip_address = %request.ip_address, "issuing charge");

        let mut builder = self
            .client
            .post(full_url.clone())
            .headers(headers)
            .json(&payload);

        if let Some(hook) = &self.request_hook {
            builder = hook
                .on_request(http::Method::POST, &full_url, builder)
                .await;
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let err_text = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Unknown Error: {}", e));
            warn!(status = status.as_u16(), "gateway rejected charge");
            return Err(GatewayError::GatewayRejection(status.as_u16(), err_text));
        }

        let decoded = response.json::<ChargeResponse>().await?;
        if !decoded.success {
            warn!(
                message = decoded.message.as_deref().unwrap_or(""),
                "charge declined"
            );
            return Err(GatewayError::Declined(decoded));
        }

        Ok(decoded)
    }
}

#[async_trait::async_trait]
impl ChargeGateway for ChargeClient {
    async fn charge(&self, request: &ChargeRequest) -> GatewayResult<ChargeResponse> {
        ChargeClient::charge(self, request).await
    }
}
