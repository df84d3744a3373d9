use crate::types::{QuoteError, Result};
use anyhow::{bail, Context};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Longest upstream error body echoed back in an error message
const MAX_ERROR_BODY: usize = 512;

/// Outbound HTTP capability the adapters are built on.
///
/// Implementations perform exactly one GET per call and decode the body as
/// JSON. Dropping the returned future aborts the in-flight request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get_json(&self, url: &Url, headers: &HashMap<String, String>) -> anyhow::Result<Value>;
}

/// Default transport backed by a pooled reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| QuoteError::ConfigError(format!("Failed to build http client: {}", e)))?;

        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_json(&self, url: &Url, headers: &HashMap<String, String>) -> anyhow::Result<Value> {
        let mut request = self.client.get(url.clone());
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("GET {} failed", url.path()))?;

        let status = response.status();
        debug!("GET {} -> {}", url.path(), status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("status {}: {}", status, truncate(&body));
        }

        response
            .json::<Value>()
            .await
            .context("failed to decode response body")
    }
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short"), "short");
        let long = "x".repeat(MAX_ERROR_BODY + 10);
        assert_eq!(truncate(&long).len(), MAX_ERROR_BODY);
    }

    #[test]
    fn test_build_transport() {
        assert!(ReqwestTransport::new(Duration::from_secs(5)).is_ok());
    }
}
