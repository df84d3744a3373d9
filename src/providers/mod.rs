//! Provider contract shared by every aggregator adapter.

pub mod oneinch;
pub mod zerox;

use crate::config::Config;
use crate::transport::HttpTransport;
use crate::types::{QuoteError, QuoteRequest, QuoteResult, Result, Token};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

pub use oneinch::{OneInchProvider, OneInchSwapResponse};
pub use zerox::{ZeroXProvider, ZeroXSwapResponse};

/// Uniform surface over quote providers.
///
/// Every method issues at most one upstream request. Operations a provider
/// has no endpoint for fail with [`QuoteError::UnsupportedOperation`] without
/// touching the network.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Short provider name used in errors and logs
    fn name(&self) -> &'static str;

    /// Token registry for a chain
    async fn fetch_supported_tokens(&self, chain_id: u64) -> Result<Vec<Token>>;

    /// Price a swap with a fixed input amount
    async fn fetch_exact_in_quote(&self, req: &QuoteRequest) -> Result<QuoteResult>;

    /// Price a swap with a fixed output amount. `to_amount` is the input needed.
    async fn fetch_exact_out_quote(&self, req: &QuoteRequest) -> Result<QuoteResult>;

    /// Executable transaction for a fixed input amount
    async fn fetch_exact_in_swap_call_data(&self, req: &QuoteRequest) -> Result<SwapCallData>;

    /// Executable transaction for a fixed output amount
    async fn fetch_exact_out_swap_call_data(&self, req: &QuoteRequest) -> Result<SwapCallData>;
}

/// Provider specific executable payload.
///
/// Left un-normalized: execution logic downstream is provider specific.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum SwapCallData {
    ZeroX(ZeroXSwapResponse),
    OneInch(OneInchSwapResponse),
}

impl SwapCallData {
    /// Contract the transaction is sent to
    pub fn to(&self) -> &str {
        match self {
            SwapCallData::ZeroX(res) => &res.to,
            SwapCallData::OneInch(res) => &res.tx.to,
        }
    }

    /// Hex encoded call data
    pub fn data(&self) -> &str {
        match self {
            SwapCallData::ZeroX(res) => &res.data,
            SwapCallData::OneInch(res) => &res.tx.data,
        }
    }

    /// Native currency value attached to the transaction
    pub fn value(&self) -> &str {
        match self {
            SwapCallData::ZeroX(res) => &res.value,
            SwapCallData::OneInch(res) => &res.tx.value,
        }
    }

    pub fn as_zerox(&self) -> Option<&ZeroXSwapResponse> {
        match self {
            SwapCallData::ZeroX(res) => Some(res),
            _ => None,
        }
    }

    pub fn as_oneinch(&self) -> Option<&OneInchSwapResponse> {
        match self {
            SwapCallData::OneInch(res) => Some(res),
            _ => None,
        }
    }
}

/// Known provider implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    ZeroX,
    OneInch,
}

impl ProviderKind {
    pub fn all() -> Vec<ProviderKind> {
        vec![ProviderKind::ZeroX, ProviderKind::OneInch]
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::ZeroX => write!(f, "0x"),
            ProviderKind::OneInch => write!(f, "1inch"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "0x" | "zerox" => Ok(ProviderKind::ZeroX),
            "1inch" | "oneinch" => Ok(ProviderKind::OneInch),
            other => Err(QuoteError::ConfigError(format!("Unknown provider {}", other))),
        }
    }
}

/// Build a provider from configuration over a shared transport
pub fn build_provider(
    kind: ProviderKind,
    config: &Config,
    transport: Arc<dyn HttpTransport>,
) -> Arc<dyn QuoteProvider> {
    match kind {
        ProviderKind::ZeroX => Arc::new(ZeroXProvider::from_config(config, transport)),
        ProviderKind::OneInch => Arc::new(OneInchProvider::from_config(config, transport)),
    }
}

pub(crate) fn unsupported(provider: &'static str, operation: &'static str) -> QuoteError {
    QuoteError::UnsupportedOperation { provider, operation }
}

/// Issue one GET and decode the body into the provider's wire type
pub(crate) async fn fetch<T: DeserializeOwned>(
    transport: &dyn HttpTransport,
    provider: &'static str,
    url: &Url,
    headers: &HashMap<String, String>,
) -> Result<T> {
    debug!("{} GET {}", provider, url);

    let body = transport
        .get_json(url, headers)
        .await
        .map_err(|e| QuoteError::UpstreamRequestFailed {
            provider,
            message: format!("{:#}", e),
        })?;

    serde_json::from_value(body).map_err(|e| QuoteError::UpstreamRequestFailed {
        provider,
        message: format!("unexpected response shape: {}", e),
    })
}
