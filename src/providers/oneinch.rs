//! 1inch style adapter: one fixed host with the chain id as a path segment,
//! a single quote endpoint and a separate swap endpoint. Exact-out has no
//! upstream equivalent.

use super::{fetch, unsupported, QuoteProvider, SwapCallData};
use crate::amount::parse_required;
use crate::config::Config;
use crate::query::QueryParams;
use crate::transport::HttpTransport;
use crate::types::{QuoteRequest, QuoteResult, Result, Token};
use async_trait::async_trait;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub const PROVIDER: &str = "1inch";

pub struct OneInchProvider {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    api_key: String,
}

impl OneInchProvider {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(
            transport,
            config.oneinch_base_url.clone(),
            config.api_keys.oneinch.clone(),
        )
    }

    fn endpoint(&self, chain_id: u64, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, chain_id, path)
    }

    fn headers(&self) -> HashMap<String, String> {
        HashMap::from([(
            "Authorization".to_string(),
            format!("Bearer {}", self.api_key),
        )])
    }

    pub fn quote_params(req: &QuoteRequest) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .add("src", req.src.as_str())
            .add("dst", req.dst.as_str())
            .add("amount", req.amount.to_string())
            .add("includeTokensInfo", "true")
            .add("includeGas", "true");
        params
    }

    /// Swap endpoint params. `disableEstimate=false` is always sent and
    /// `disableEstimate=true` is appended when skipping validation.
    pub fn swap_params(req: &QuoteRequest) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .add("src", req.src.as_str())
            .add("dst", req.dst.as_str())
            .add("amount", req.amount.to_string())
            .add("from", req.from.as_str())
            .add("origin", req.from.as_str())
            .add("slippage", req.slippage_percentage.to_string())
            .add("includeTokensInfo", "true")
            .add("includeGas", "true")
            .add("disableEstimate", "false");

        if req.skip_validation {
            params.add("disableEstimate", "true");
        }
        if !req.referrer.is_empty() {
            params.add("referrer", req.referrer.as_str());
        }
        params
    }

    /// Swap transaction for a fixed input amount
    pub async fn fetch_exact_in_swap(&self, req: &QuoteRequest) -> Result<OneInchSwapResponse> {
        let url = Self::swap_params(req).to_url(&self.endpoint(req.chain_id, "swap"))?;
        fetch(self.transport.as_ref(), PROVIDER, &url, &self.headers()).await
    }
}

#[async_trait]
impl QuoteProvider for OneInchProvider {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_supported_tokens(&self, chain_id: u64) -> Result<Vec<Token>> {
        let url = QueryParams::new().to_url(&self.endpoint(chain_id, "tokens"))?;
        let res: OneInchTokensResponse =
            fetch(self.transport.as_ref(), PROVIDER, &url, &self.headers()).await?;
        Ok(res.tokens.into_values().collect())
    }

    async fn fetch_exact_in_quote(&self, req: &QuoteRequest) -> Result<QuoteResult> {
        let url = Self::quote_params(req).to_url(&self.endpoint(req.chain_id, "quote"))?;
        let res: OneInchQuoteResponse =
            fetch(self.transport.as_ref(), PROVIDER, &url, &self.headers()).await?;
        parse_quote_response(req, &res)
    }

    async fn fetch_exact_out_quote(&self, _req: &QuoteRequest) -> Result<QuoteResult> {
        Err(unsupported(PROVIDER, "exact-out quote"))
    }

    async fn fetch_exact_in_swap_call_data(&self, req: &QuoteRequest) -> Result<SwapCallData> {
        self.fetch_exact_in_swap(req).await.map(SwapCallData::OneInch)
    }

    async fn fetch_exact_out_swap_call_data(&self, _req: &QuoteRequest) -> Result<SwapCallData> {
        Err(unsupported(PROVIDER, "exact-out swap call data"))
    }
}

/// Normalize a quote response. Gas is reported as a plain integer, gas price
/// never.
pub fn parse_quote_response(req: &QuoteRequest, res: &OneInchQuoteResponse) -> Result<QuoteResult> {
    let to_amount = parse_required(PROVIDER, "toAmount", &res.to_amount)?;

    let mut result = QuoteResult::for_request(req, to_amount);
    result.gas = Some(BigUint::from(res.gas));
    Ok(result)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneInchTokensResponse {
    pub tokens: HashMap<String, Token>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OneInchQuoteResponse {
    pub from_token: Option<Token>,
    pub to_token: Option<Token>,
    pub to_amount: String,
    pub gas: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OneInchTx {
    pub from: String,
    pub to: String,
    pub data: String,
    pub value: String,
    pub gas: u64,
    pub gas_price: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OneInchSwapResponse {
    pub from_token: Option<Token>,
    pub to_token: Option<Token>,
    pub to_amount: String,
    pub tx: OneInchTx,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockHttpTransport;
    use crate::types::QuoteError;
    use serde_json::json;

    const USDC: &str = "0x2791bca1f2de4661ed88a30c99a7a9449aa84174";
    const NATIVE: &str = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";
    const WALLET: &str = "0x15ba05723b04785c3e21157171810892a4fb795c";

    fn provider(mock: MockHttpTransport) -> OneInchProvider {
        OneInchProvider::new(Arc::new(mock), "https://api.1inch.dev/swap/v5.2/", "secret")
    }

    fn request() -> QuoteRequest {
        QuoteRequest::new(137, USDC, NATIVE, BigUint::from(1_000_000u32))
    }

    #[test]
    fn test_swap_params_validation_flags() {
        let req = request().with_from(WALLET).with_slippage(1);
        let params = OneInchProvider::swap_params(&req);
        assert_eq!(params.get_all("disableEstimate"), vec!["false"]);
        assert_eq!(params.get_all("slippage"), vec!["1"]);
        assert_eq!(params.get_all("origin"), vec![WALLET]);
        assert!(!params.contains("referrer"));

        let params = OneInchProvider::swap_params(&req.with_skip_validation(true).with_referrer(WALLET));
        assert_eq!(params.get_all("disableEstimate"), vec!["false", "true"]);
        assert_eq!(params.get_all("referrer"), vec![WALLET]);
    }

    #[test]
    fn test_quote_params() {
        let params = OneInchProvider::quote_params(&request());
        assert_eq!(params.get_all("amount"), vec!["1000000"]);
        assert_eq!(params.get_all("includeGas"), vec!["true"]);
        assert_eq!(params.get_all("includeTokensInfo"), vec!["true"]);
    }

    #[test]
    fn test_parse_quote_response() {
        let res: OneInchQuoteResponse = serde_json::from_value(json!({
            "toAmount": "1310785114034929852",
            "gas": 215000,
            "fromToken": { "address": USDC, "symbol": "USDC", "decimals": 6, "name": "USD Coin" }
        }))
        .unwrap();

        let quote = parse_quote_response(&request(), &res).unwrap();
        assert_eq!(quote.to_amount, BigUint::from(1_310_785_114_034_929_852u64));
        assert_eq!(quote.gas, Some(BigUint::from(215_000u32)));
        assert!(quote.gas_price.is_none());
        assert_eq!(quote.from_amount, BigUint::from(1_000_000u32));
    }

    #[test]
    fn test_parse_rejects_non_numeric_amount() {
        let res = OneInchQuoteResponse {
            to_amount: "lots".to_string(),
            ..Default::default()
        };
        let err = parse_quote_response(&request(), &res).unwrap_err();
        assert!(matches!(
            err,
            QuoteError::MalformedResponse { provider: "1inch", field: "toAmount", .. }
        ));
    }

    #[tokio::test]
    async fn test_exact_out_never_calls_upstream() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get_json().never();
        let provider = provider(mock);

        let req = request().with_from(WALLET);
        assert!(provider.fetch_exact_out_quote(&req).await.unwrap_err().is_unsupported());
        assert!(provider
            .fetch_exact_out_swap_call_data(&req)
            .await
            .unwrap_err()
            .is_unsupported());
    }

    #[tokio::test]
    async fn test_supported_tokens_flattened() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get_json()
            .withf(|url, headers| {
                url.as_str() == "https://api.1inch.dev/swap/v5.2/137/tokens"
                    && headers.get("Authorization").map(String::as_str) == Some("Bearer secret")
            })
            .times(1)
            .returning(|_, _| {
                Ok(json!({
                    "tokens": {
                        "0x2791bca1f2de4661ed88a30c99a7a9449aa84174": { "address": USDC, "symbol": "USDC", "decimals": 6, "name": "USD Coin" },
                        "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee": { "address": NATIVE, "symbol": "MATIC", "decimals": 18, "name": "MATIC", "tags": ["native"] }
                    }
                }))
            });

        let mut tokens = provider(mock).fetch_supported_tokens(137).await.unwrap();
        tokens.sort_by(|a, b| a.symbol.cmp(&b.symbol));

        assert_eq!(tokens.len(), 2);
        assert!(tokens.iter().all(|t| !t.address.is_empty() && !t.symbol.is_empty()));
        assert_eq!(tokens[0].symbol, "MATIC");
        assert_eq!(tokens[0].tags, vec!["native".to_string()]);
    }

    #[tokio::test]
    async fn test_exact_in_quote_path() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get_json()
            .withf(|url, _| url.path() == "/swap/v5.2/137/quote")
            .times(1)
            .returning(|_, _| Ok(json!({ "toAmount": "42", "gas": 100 })));

        let quote = provider(mock).fetch_exact_in_quote(&request()).await.unwrap();
        assert_eq!(quote.to_amount, BigUint::from(42u32));
    }

    #[tokio::test]
    async fn test_swap_call_data() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get_json()
            .withf(|url, _| {
                url.path() == "/swap/v5.2/137/swap"
                    && url.query().map_or(false, |q| q.contains("disableEstimate=true"))
            })
            .times(1)
            .returning(|_, _| {
                Ok(json!({
                    "fromToken": { "address": USDC, "symbol": "USDC", "decimals": 6 },
                    "toAmount": "1310785114034929852",
                    "tx": {
                        "from": WALLET,
                        "to": "0x1111111254eeb25477b68fb85ed929f73a960582",
                        "data": "0x0502b1c5",
                        "value": "0",
                        "gas": 0,
                        "gasPrice": "90000000000"
                    }
                }))
            });

        let req = request().with_from(WALLET).with_slippage(1).with_skip_validation(true);
        let call = provider(mock).fetch_exact_in_swap_call_data(&req).await.unwrap();

        let res = call.as_oneinch().unwrap();
        assert_eq!(res.from_token.as_ref().map(|t| t.address.as_str()), Some(USDC));
        assert_eq!(call.to(), "0x1111111254eeb25477b68fb85ed929f73a960582");
        assert!(!call.data().is_empty());
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_upstream_error() {
        let mut mock = MockHttpTransport::new();
        mock.expect_get_json()
            .times(1)
            .returning(|_, _| Ok(json!({ "toAmount": 12 })));

        let err = provider(mock).fetch_exact_in_quote(&request()).await.unwrap_err();
        assert!(matches!(err, QuoteError::UpstreamRequestFailed { .. }));
    }
}
