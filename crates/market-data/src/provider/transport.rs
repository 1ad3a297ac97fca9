//! reqwest-backed [`HttpTransport`].

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;

use super::traits::{HttpResponse, HttpTransport};
use crate::errors::MarketDataError;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP transport over a shared reqwest client.
pub struct ReqwestTransport {
    client: Client,
    provider: &'static str,
}

impl ReqwestTransport {
    /// Create a transport for `provider` with the given request timeout.
    pub fn new(provider: &'static str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, provider }
    }

    fn map_error(&self, err: reqwest::Error) -> MarketDataError {
        if err.is_timeout() {
            MarketDataError::Timeout {
                provider: self.provider.to_string(),
            }
        } else {
            MarketDataError::Network(err.without_url().to_string())
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, MarketDataError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| self.map_error(e))?;
        debug!("{} responded {} ({} bytes)", self.provider, status, text.len());

        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
        Ok(HttpResponse { status, body })
    }
}
