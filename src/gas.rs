//! Gas limit and fee estimation over a JSON-RPC middleware.

use crate::amount::{biguint_to_u256, u256_to_biguint};
use crate::types::{QuoteError, Result};
use ethers::providers::Middleware;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address, Bytes, TransactionRequest, U256};
use num_bigint::BigUint;
use std::str::FromStr;
use tracing::debug;

/// Normalize call data into bytes.
///
/// Accepts `0x`-prefixed hex, bare hex, or arbitrary text which is encoded
/// byte for byte. Empty input means no call data.
pub fn decode_call_data(data: &str) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let body = data.strip_prefix("0x").unwrap_or(data);
    let looks_hex = !body.is_empty() && body.chars().all(|c| c.is_ascii_hexdigit());

    if !looks_hex {
        return Ok(data.as_bytes().to_vec());
    }

    hex::decode(body).map_err(|e| QuoteError::InvalidCallData(format!("{}: {}", data, e)))
}

fn parse_address(addr: &str) -> Result<Address> {
    Address::from_str(addr).map_err(|_| QuoteError::InvalidCallData(format!("Invalid address {}", addr)))
}

/// Estimate the gas a transaction would consume
pub async fn estimate_gas_limit<M: Middleware>(
    client: &M,
    from: &str,
    to: &str,
    data: &str,
    value: &BigUint,
) -> Result<u64> {
    let input = decode_call_data(data)?;

    let mut tx = TransactionRequest::new()
        .from(parse_address(from)?)
        .to(parse_address(to)?)
        .value(biguint_to_u256(value)?);
    if !input.is_empty() {
        tx = tx.data(Bytes::from(input));
    }

    let typed: TypedTransaction = tx.into();
    let gas = client
        .estimate_gas(&typed, None)
        .await
        .map_err(|e| QuoteError::RpcError(format!("Failed to estimate gas: {}", e)))?;

    debug!("Estimated gas {} for call to {}", gas, to);

    if gas > U256::from(u64::MAX) {
        return Err(QuoteError::RpcError(format!("Gas estimate {} exceeds u64", gas)));
    }
    Ok(gas.as_u64())
}

/// Legacy gas price for the connected chain
pub async fn estimate_gas_price<M: Middleware>(client: &M) -> Result<BigUint> {
    let chain_id = client
        .get_chainid()
        .await
        .map_err(|e| QuoteError::RpcError(format!("Failed to get chain ID: {}", e)))?;

    let gas_price = client
        .get_gas_price()
        .await
        .map_err(|e| QuoteError::RpcError(format!("Failed to get gas price: {}", e)))?;

    debug!("Chain {} gas price {}", chain_id, gas_price);
    Ok(u256_to_biguint(gas_price))
}

/// Base gas price and priority fee for EIP-1559 transactions
pub async fn estimate_eip1559_fees<M: Middleware>(client: &M) -> Result<(BigUint, BigUint)> {
    let chain_id = client
        .get_chainid()
        .await
        .map_err(|e| QuoteError::RpcError(format!("Failed to get chain ID: {}", e)))?;

    let base_fee = client
        .get_gas_price()
        .await
        .map_err(|e| QuoteError::RpcError(format!("Failed to get gas price: {}", e)))?;

    let priority_fee: U256 = client
        .provider()
        .request("eth_maxPriorityFeePerGas", ())
        .await
        .map_err(|e| QuoteError::RpcError(format!("Failed to get priority fee: {}", e)))?;

    debug!("Chain {} base fee {} priority fee {}", chain_id, base_fee, priority_fee);
    Ok((u256_to_biguint(base_fee), u256_to_biguint(priority_fee)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::providers::Provider;

    const FROM: &str = "0x15ba05723b04785c3e21157171810892a4fb795c";
    const TO: &str = "0x1111111254eeb25477b68fb85ed929f73a960582";

    #[test]
    fn test_decode_call_data() {
        assert_eq!(decode_call_data("").unwrap(), Vec::<u8>::new());
        assert_eq!(decode_call_data("0xa9059cbb").unwrap(), vec![0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(decode_call_data("a9059cbb").unwrap(), vec![0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(decode_call_data("hello").unwrap(), b"hello".to_vec());
        assert_eq!(decode_call_data("0x").unwrap(), b"0x".to_vec());
    }

    #[test]
    fn test_decode_odd_length_hex_fails() {
        let err = decode_call_data("0xabc").unwrap_err();
        assert!(matches!(err, QuoteError::InvalidCallData(_)));
    }

    #[tokio::test]
    async fn test_estimate_gas_limit() {
        let (provider, mock) = Provider::mocked();
        mock.push(U256::from(21_000u64)).unwrap();

        let gas = estimate_gas_limit(&provider, FROM, TO, "0xa9059cbb", &BigUint::from(0u32))
            .await
            .unwrap();
        assert_eq!(gas, 21_000);
    }

    #[tokio::test]
    async fn test_estimate_gas_limit_rejects_bad_address() {
        let (provider, _mock) = Provider::mocked();
        let err = estimate_gas_limit(&provider, "nope", TO, "", &BigUint::from(0u32))
            .await
            .unwrap_err();
        assert!(matches!(err, QuoteError::InvalidCallData(_)));
    }

    #[tokio::test]
    async fn test_estimate_gas_price() {
        let (provider, mock) = Provider::mocked();
        let value = U256::from(30_000_000_000u64);
        mock.push(value).unwrap();
        mock.push(value).unwrap();

        let price = estimate_gas_price(&provider).await.unwrap();
        assert_eq!(price, BigUint::from(30_000_000_000u64));
    }

    #[tokio::test]
    async fn test_estimate_gas_price_rpc_failure() {
        let (provider, _mock) = Provider::mocked();
        let err = estimate_gas_price(&provider).await.unwrap_err();
        assert!(matches!(err, QuoteError::RpcError(msg) if msg.contains("chain ID")));
    }

    #[tokio::test]
    async fn test_estimate_eip1559_fees() {
        let (provider, mock) = Provider::mocked();
        let value = U256::from(2_000_000_000u64);
        for _ in 0..3 {
            mock.push(value).unwrap();
        }

        let (base, tip) = estimate_eip1559_fees(&provider).await.unwrap();
        assert_eq!(base, BigUint::from(2_000_000_000u64));
        assert_eq!(tip, base);
    }
}
