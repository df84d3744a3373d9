use crate::types::{QuoteError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::env;
use std::time::Duration;

/// 0x deployments per chain id
static DEFAULT_ZEROX_CHAIN_URLS: Lazy<HashMap<u64, String>> = Lazy::new(|| {
    [
        (1, "https://api.0x.org"),
        (10, "https://optimism.api.0x.org"),
        (56, "https://bsc.api.0x.org"),
        (137, "https://polygon.api.0x.org"),
        (8453, "https://base.api.0x.org"),
        (42161, "https://arbitrum.api.0x.org"),
        (43114, "https://avalanche.api.0x.org"),
    ]
    .into_iter()
    .map(|(chain_id, url)| (chain_id, url.to_string()))
    .collect()
});

pub const DEFAULT_ONEINCH_BASE_URL: &str = "https://api.1inch.dev/swap/v5.2";

/// Provider credentials, forwarded upstream unvalidated
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub zerox: String,
    pub oneinch: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_keys: ApiKeys,

    pub zerox_chain_urls: HashMap<u64, String>,

    pub oneinch_base_url: String,

    pub rpc_url: String,

    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let api_keys = ApiKeys {
            zerox: env::var("ZEROX_API_KEY").unwrap_or_default(),
            oneinch: env::var("ONEINCH_API_KEY").unwrap_or_default(),
        };

        let zerox_chain_urls = match env::var("ZEROX_CHAIN_URLS") {
            Ok(raw) => Self::parse_chain_urls(&raw)?,
            Err(_) => DEFAULT_ZEROX_CHAIN_URLS.clone(),
        };

        let oneinch_base_url =
            env::var("ONEINCH_BASE_URL").unwrap_or_else(|_| DEFAULT_ONEINCH_BASE_URL.to_string());

        let rpc_url = env::var("RPC_URL").unwrap_or_else(|_| "https://polygon-rpc.com".to_string());

        let http_timeout = env::var("HTTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| QuoteError::ConfigError("Invalid HTTP_TIMEOUT_SECS".to_string()))?;

        Ok(Self {
            api_keys,
            zerox_chain_urls,
            oneinch_base_url,
            rpc_url,
            http_timeout,
        })
    }

    /// Parse `"137=https://polygon.api.0x.org,1=https://api.0x.org"`
    pub fn parse_chain_urls(raw: &str) -> Result<HashMap<u64, String>> {
        raw.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| -> Result<(u64, String)> {
                let (chain, url) = entry.split_once('=').ok_or_else(|| {
                    QuoteError::ConfigError(format!("Expected chain=url, got {:?}", entry))
                })?;
                let chain_id = chain
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| QuoteError::ConfigError(format!("Invalid chain id {:?}", chain)))?;
                Ok((chain_id, url.trim().trim_end_matches('/').to_string()))
            })
            .collect()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_keys: ApiKeys::default(),
            zerox_chain_urls: DEFAULT_ZEROX_CHAIN_URLS.clone(),
            oneinch_base_url: DEFAULT_ONEINCH_BASE_URL.to_string(),
            rpc_url: "https://polygon-rpc.com".to_string(),
            http_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(
            config.zerox_chain_urls.get(&137).map(String::as_str),
            Some("https://polygon.api.0x.org")
        );
        assert_eq!(config.oneinch_base_url, DEFAULT_ONEINCH_BASE_URL);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert!(config.api_keys.zerox.is_empty());
    }

    #[test]
    fn test_parse_chain_urls() {
        let urls = Config::parse_chain_urls("137=https://polygon.api.0x.org/, 1 = https://api.0x.org").unwrap();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[&137], "https://polygon.api.0x.org");
        assert_eq!(urls[&1], "https://api.0x.org");

        assert!(Config::parse_chain_urls("polygon=https://x").is_err());
        assert!(Config::parse_chain_urls("137").is_err());
        assert!(Config::parse_chain_urls("").unwrap().is_empty());
    }
}
