// Swap Quote Adapters
//
// Uniform quote and swap call-data access over EVM DEX aggregators,
// plus gas estimation helpers.

pub mod amount;
pub mod config;
pub mod gas;
pub mod providers;
pub mod query;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use config::{ApiKeys, Config};
pub use providers::{
    build_provider, OneInchProvider, OneInchSwapResponse, ProviderKind, QuoteProvider,
    SwapCallData, ZeroXProvider, ZeroXSwapResponse,
};
pub use transport::{HttpTransport, ReqwestTransport};
pub use types::{QuoteError, QuoteRequest, QuoteResult, Result, Token};

use std::sync::Arc;

/// Build every known provider over one shared reqwest transport
pub fn providers_from_config(config: &Config) -> Result<Vec<Arc<dyn QuoteProvider>>> {
    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(config.http_timeout)?);

    Ok(ProviderKind::all()
        .into_iter()
        .map(|kind| build_provider(kind, config, transport.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_providers_from_config() {
        let providers = providers_from_config(&Config::default()).unwrap();
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["0x", "1inch"]);
    }
}
