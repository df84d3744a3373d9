//! 0x style adapter: indicative `price` endpoint for quotes, firm `quote`
//! endpoint for call data, one base url per chain.

use super::{fetch, unsupported, QuoteProvider, SwapCallData};
use crate::amount::{parse_optional, parse_required};
use crate::config::Config;
use crate::query::QueryParams;
use crate::transport::HttpTransport;
use crate::types::{QuoteError, QuoteRequest, QuoteResult, Result, Token};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub const PROVIDER: &str = "0x";

const PRICE_PATH: &str = "/swap/v1/price";
const QUOTE_PATH: &str = "/swap/v1/quote";
const API_KEY_HEADER: &str = "0x-api-key";
const SLIPPAGE: &str = "0.01";

/// Which amount the request fixes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// `sellAmount`, exact input
    Sell,
    /// `buyAmount`, exact output
    Buy,
}

impl Side {
    fn amount_param(self) -> &'static str {
        match self {
            Side::Sell => "sellAmount",
            Side::Buy => "buyAmount",
        }
    }
}

pub struct ZeroXProvider {
    transport: Arc<dyn HttpTransport>,
    chain_urls: HashMap<u64, String>,
    api_key: String,
}

impl ZeroXProvider {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        chain_urls: HashMap<u64, String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            chain_urls,
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(
            transport,
            config.zerox_chain_urls.clone(),
            config.api_keys.zerox.clone(),
        )
    }

    pub fn supports_chain(&self, chain_id: u64) -> bool {
        self.chain_urls.contains_key(&chain_id)
    }

    fn endpoint(&self, chain_id: u64, path: &str) -> Result<String> {
        let base = self
            .chain_urls
            .get(&chain_id)
            .ok_or(QuoteError::UnsupportedChain(chain_id))?;
        Ok(format!("{}{}", base, path))
    }

    fn headers(&self) -> HashMap<String, String> {
        HashMap::from([(API_KEY_HEADER.to_string(), self.api_key.clone())])
    }

    fn base_params(req: &QuoteRequest, side: Side) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .add("buyToken", req.dst.as_str())
            .add("sellToken", req.src.as_str())
            .add(side.amount_param(), req.amount.to_string())
            .add("slippagePercentage", SLIPPAGE);

        if !req.from.is_empty() {
            params.add("takerAddress", req.from.as_str());
        }
        params
    }

    /// Price endpoint params. `skipValidation=false` is always sent and
    /// `skipValidation=true` is appended when skipping.
    pub fn price_params(req: &QuoteRequest, side: Side) -> QueryParams {
        let mut params = Self::base_params(req, side);
        params.add("skipValidation", "false");
        if req.skip_validation {
            params.add("skipValidation", "true");
        }
        params
    }

    /// Firm quote params carry exactly one `skipValidation` value
    pub fn quote_params(req: &QuoteRequest, side: Side) -> QueryParams {
        let mut params = Self::base_params(req, side);
        params.add("skipValidation", req.skip_validation.to_string());
        params
    }

    async fn price(&self, req: &QuoteRequest, side: Side) -> Result<ZeroXPriceResponse> {
        let endpoint = self.endpoint(req.chain_id, PRICE_PATH)?;
        let url = Self::price_params(req, side).to_url(&endpoint)?;
        fetch(self.transport.as_ref(), PROVIDER, &url, &self.headers()).await
    }

    async fn quote(&self, req: &QuoteRequest, side: Side) -> Result<ZeroXSwapResponse> {
        let endpoint = self.endpoint(req.chain_id, QUOTE_PATH)?;
        let url = Self::quote_params(req, side).to_url(&endpoint)?;
        fetch(self.transport.as_ref(), PROVIDER, &url, &self.headers()).await
    }

    /// Firm quote with call data for a fixed input amount
    pub async fn fetch_exact_in_swap(&self, req: &QuoteRequest) -> Result<ZeroXSwapResponse> {
        self.quote(req, Side::Sell).await
    }

    /// Firm quote with call data for a fixed output amount
    pub async fn fetch_exact_out_swap(&self, req: &QuoteRequest) -> Result<ZeroXSwapResponse> {
        self.quote(req, Side::Buy).await
    }
}

#[async_trait]
impl QuoteProvider for ZeroXProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_supported_tokens(&self, _chain_id: u64) -> Result<Vec<Token>> {
        Err(unsupported(PROVIDER, "supported tokens"))
    }

    async fn fetch_exact_in_quote(&self, req: &QuoteRequest) -> Result<QuoteResult> {
        let res = self.price(req, Side::Sell).await?;
        parse_price_response(req, &res, Side::Sell)
    }

    async fn fetch_exact_out_quote(&self, req: &QuoteRequest) -> Result<QuoteResult> {
        let res = self.price(req, Side::Buy).await?;
        parse_price_response(req, &res, Side::Buy)
    }

    async fn fetch_exact_in_swap_call_data(&self, req: &QuoteRequest) -> Result<SwapCallData> {
        self.fetch_exact_in_swap(req).await.map(SwapCallData::ZeroX)
    }

    async fn fetch_exact_out_swap_call_data(&self, req: &QuoteRequest) -> Result<SwapCallData> {
        self.fetch_exact_out_swap(req).await.map(SwapCallData::ZeroX)
    }
}

/// Normalize a price response.
///
/// Exact-in reads the buy side; exact-out reads the sell side, answering how
/// much input the requested output costs.
pub fn parse_price_response(
    req: &QuoteRequest,
    res: &ZeroXPriceResponse,
    side: Side,
) -> Result<QuoteResult> {
    let to_amount = match side {
        Side::Sell => parse_required(PROVIDER, "buyAmount", &res.buy_amount)?,
        Side::Buy => parse_required(PROVIDER, "sellAmount", &res.sell_amount)?,
    };

    let mut result = QuoteResult::for_request(req, to_amount);
    result.gas = parse_optional(PROVIDER, "gas", &res.gas)?;
    result.gas_price = parse_optional(PROVIDER, "gasPrice", &res.gas_price)?;
    Ok(result)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZeroXFee {
    pub billing_type: String,
    pub fee_amount: String,
    pub fee_token: String,
    pub fee_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZeroXFees {
    pub zero_ex_fee: Option<ZeroXFee>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZeroXSource {
    pub name: String,
    pub proportion: String,
}

/// Indicative price, `/swap/v1/price`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZeroXPriceResponse {
    pub allowance_target: String,
    pub buy_amount: String,
    pub buy_token_address: String,
    pub buy_token_to_eth_rate: String,
    pub chain_id: u64,
    pub estimated_gas: String,
    pub estimated_price_impact: Option<String>,
    pub fees: ZeroXFees,
    pub gas: String,
    pub gas_price: String,
    pub gross_buy_amount: String,
    pub gross_price: String,
    pub gross_sell_amount: String,
    pub minimum_protocol_fee: String,
    pub price: String,
    pub protocol_fee: String,
    pub sell_amount: String,
    pub sell_token_address: String,
    pub sell_token_to_eth_rate: String,
    pub sources: Vec<ZeroXSource>,
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZeroXFill {
    pub adjusted_output: String,
    pub gas: u64,
    pub input: String,
    pub output: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZeroXFillData {
    pub router: String,
    pub token_address_path: Vec<String>,
}

/// One fill of the routed order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZeroXOrder {
    pub fill: ZeroXFill,
    pub fill_data: Option<ZeroXFillData>,
    pub maker_amount: String,
    pub maker_token: String,
    pub source: String,
    pub taker_amount: String,
    pub taker_token: String,
    #[serde(rename = "type")]
    pub order_type: i64,
}

/// Firm quote with call data, `/swap/v1/quote`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZeroXSwapResponse {
    pub allowance_target: String,
    pub buy_amount: String,
    pub buy_token_address: String,
    pub buy_token_to_eth_rate: String,
    pub chain_id: u64,
    pub data: String,
    pub decoded_unique_id: String,
    pub estimated_gas: String,
    pub estimated_price_impact: Option<String>,
    pub fees: ZeroXFees,
    pub gas: String,
    pub gas_price: String,
    pub gross_buy_amount: String,
    pub gross_price: String,
    pub gross_sell_amount: String,
    pub guaranteed_price: String,
    pub minimum_protocol_fee: String,
    pub orders: Vec<ZeroXOrder>,
    pub price: String,
    pub protocol_fee: String,
    pub sell_amount: String,
    pub sell_token_address: String,
    pub sell_token_to_eth_rate: String,
    pub sources: Vec<ZeroXSource>,
    pub to: String,
    pub value: String,
}
