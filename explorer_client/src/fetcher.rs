use async_trait::async_trait;
use config_manager::ExplorerConfig;
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use trace_core::Pacer;
use tracing::{debug, error};

use crate::error::{ExplorerError, Result};

/// Client identity sent with every explorer request
pub const USER_AGENT: &str = concat!("fund-tracer/", env!("CARGO_PKG_VERSION"));

/// Longest error body kept in an `ExplorerError::Api`
const MAX_ERROR_BODY: usize = 500;

/// How a provider expects its credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    None,
    /// Custom header, e.g. Solscan's `token`
    Header { name: &'static str, value: String },
    Bearer(String),
    /// Query-string key, e.g. Blockscout's `apikey` or Blockchair's `key`
    Query { name: &'static str, value: String },
}

impl Auth {
    /// Build the auth for an explorer from its configured key.
    ///
    /// A missing key is an error only when the explorer requires one;
    /// otherwise the request goes out unauthenticated.
    pub fn from_config(
        config: &ExplorerConfig,
        provider: &str,
        with_key: impl FnOnce(String) -> Auth,
    ) -> Result<Auth> {
        match config.credential() {
            Some(key) => Ok(with_key(key.to_string())),
            None if config.require_api_key => Err(ExplorerError::MissingApiKey {
                provider: provider.to_string(),
            }),
            None => Ok(Auth::None),
        }
    }
}

/// Shared HTTP plumbing for all explorer adapters: fixed timeout, client
/// identity header, auth injection and uniform error mapping.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ExplorerError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    pub fn from_config(config: &ExplorerConfig) -> Result<Self> {
        Self::new(Duration::from_secs(config.request_timeout_seconds))
    }

    /// GET `url` and decode the body as JSON.
    pub async fn get_json(&self, url: &str, query: &[(&str, String)], auth: &Auth) -> Result<Value> {
        let mut request = self.client.get(url).query(query);
        request = match auth {
            Auth::None => request,
            Auth::Header { name, value } => request.header(*name, value.as_str()),
            Auth::Bearer(token) => request.bearer_auth(token),
            Auth::Query { name, value } => request.query(&[(*name, value.as_str())]),
        };

        // Query strings may carry keys, only the path is logged
        debug!("GET {}", url);
        let start_time = Instant::now();
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message: String = text.chars().take(MAX_ERROR_BODY).collect();
            error!("Explorer API error - Status: {}, Body: {}", status, message);
            return Err(ExplorerError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        debug!(
            "Received {} bytes from {} in {}ms",
            body.len(),
            url,
            start_time.elapsed().as_millis()
        );

        serde_json::from_str(&body).map_err(|e| {
            error!(
                "Failed to parse response from {}: {} (snippet: {})",
                url,
                e,
                body.chars().take(200).collect::<String>()
            );
            ExplorerError::Json(e)
        })
    }
}

/// Sleeps a fixed delay after each hop to respect shared explorer rate limits
#[derive(Debug, Clone, Copy)]
pub struct FixedDelayPacer {
    delay: Duration,
}

impl FixedDelayPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }
}

#[async_trait]
impl Pacer for FixedDelayPacer {
    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
