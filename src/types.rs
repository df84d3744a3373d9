use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Custom error types for the quote adapters
#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Unsupported chain id {0}")]
    UnsupportedChain(u64),

    #[error("Operation {operation} is not supported by {provider}")]
    UnsupportedOperation {
        provider: &'static str,
        operation: &'static str,
    },

    #[error("Request to {provider} failed: {message}")]
    UpstreamRequestFailed {
        provider: &'static str,
        message: String,
    },

    #[error("Malformed {field} from {provider}: {value:?}")]
    MalformedResponse {
        provider: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid call data: {0}")]
    InvalidCallData(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl QuoteError {
    /// True when the provider has no upstream equivalent for the operation
    pub fn is_unsupported(&self) -> bool {
        matches!(self, QuoteError::UnsupportedOperation { .. })
    }

    /// True when the failure happened before any request could be built
    pub fn is_unsupported_chain(&self) -> bool {
        matches!(self, QuoteError::UnsupportedChain(_))
    }
}

/// Result type alias for quote operations
pub type Result<T> = std::result::Result<T, QuoteError>;

/// A caller's intent to price or execute a swap
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteRequest {
    /// Target network
    pub chain_id: u64,

    /// Token being sold (lowercase hex address)
    pub src: String,

    /// Token being bought (lowercase hex address)
    pub dst: String,

    /// Amount in base units. Input side for exact-in, output side for exact-out.
    pub amount: BigUint,

    /// Address initiating the swap, empty when only pricing
    pub from: String,

    /// Slippage tolerance in the provider's native units
    pub slippage_percentage: u8,

    /// Disable upstream balance/allowance simulation
    pub skip_validation: bool,

    /// Forwarded upstream when non-empty
    pub referrer: String,
}

impl QuoteRequest {
    pub fn new(chain_id: u64, src: impl Into<String>, dst: impl Into<String>, amount: BigUint) -> Self {
        Self {
            chain_id,
            src: src.into(),
            dst: dst.into(),
            amount,
            ..Default::default()
        }
    }

    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    pub fn with_slippage(mut self, slippage_percentage: u8) -> Self {
        self.slippage_percentage = slippage_percentage;
        self
    }

    pub fn with_skip_validation(mut self, skip_validation: bool) -> Self {
        self.skip_validation = skip_validation;
        self
    }

    pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = referrer.into();
        self
    }
}

/// Normalized pricing outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResult {
    pub chain_id: u64,
    pub src: String,
    pub dst: String,

    /// The request's amount, passed through unchanged
    pub from_amount: BigUint,

    /// Quoted output amount for exact-in, required input amount for exact-out
    pub to_amount: BigUint,

    /// Gas estimate, when the provider reports one
    pub gas: Option<BigUint>,

    /// Gas price, when the provider reports one
    pub gas_price: Option<BigUint>,
}

impl QuoteResult {
    /// Build a result echoing the request's identity fields
    pub fn for_request(req: &QuoteRequest, to_amount: BigUint) -> Self {
        Self {
            chain_id: req.chain_id,
            src: req.src.clone(),
            dst: req.dst.clone(),
            from_amount: req.amount.clone(),
            to_amount,
            gas: None,
            gas_price: None,
        }
    }
}

/// Token metadata from a provider registry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub address: String,
    pub symbol: String,
    #[serde(default)]
    pub decimals: u8,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "logoURI", default)]
    pub logo_uri: String,
    #[serde(default)]
    pub eip2612: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.symbol, self.name)
    }
}
