use crate::types::{QuoteError, Result};
use ethers::types::U256;
use num_bigint::BigUint;

/// Parse an unsigned integer string, auto-detecting the base from its prefix.
///
/// `0x`/`0X` selects hex, `0b`/`0B` binary, `0o`/`0O` octal; anything else is
/// decimal, including strings with leading zeros. A single leading `+` is
/// accepted. Negative values, separators and empty digit runs are rejected.
pub fn parse_amount(value: &str) -> Option<BigUint> {
    let unsigned = value.strip_prefix('+').unwrap_or(value);
    let (digits, radix) = split_radix(unsigned);

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    BigUint::parse_bytes(digits.as_bytes(), radix)
}

fn split_radix(value: &str) -> (&str, u32) {
    const PREFIXES: [(&str, u32); 6] = [
        ("0x", 16),
        ("0X", 16),
        ("0b", 2),
        ("0B", 2),
        ("0o", 8),
        ("0O", 8),
    ];

    for (prefix, radix) in PREFIXES {
        if let Some(rest) = value.strip_prefix(prefix) {
            return (rest, radix);
        }
    }
    (value, 10)
}

/// Parse a required numeric field of a provider response
pub fn parse_required(provider: &'static str, field: &'static str, value: &str) -> Result<BigUint> {
    parse_amount(value).ok_or_else(|| QuoteError::MalformedResponse {
        provider,
        field,
        value: value.to_string(),
    })
}

/// Parse an optional numeric field. Empty means "not reported"; anything
/// else must parse.
pub fn parse_optional(
    provider: &'static str,
    field: &'static str,
    value: &str,
) -> Result<Option<BigUint>> {
    if value.is_empty() {
        return Ok(None);
    }
    parse_required(provider, field, value).map(Some)
}

/// Parse a human token amount with decimal support
/// Examples: "1.0", "0.5", "1000"
pub fn parse_units(amount_str: &str, decimals: u8) -> Result<BigUint> {
    let parts: Vec<&str> = amount_str.trim().split('.').collect();

    if parts.len() > 2 || parts[0].is_empty() {
        return Err(QuoteError::InvalidAmount(format!(
            "Invalid amount format: {}",
            amount_str
        )));
    }

    let fraction = if parts.len() == 2 { parts[1] } else { "" };
    if fraction.len() > decimals as usize {
        return Err(QuoteError::InvalidAmount(format!(
            "Too many decimal places. Max: {}",
            decimals
        )));
    }

    let digits = format!(
        "{}{:0<width$}",
        parts[0],
        fraction,
        width = decimals as usize
    );
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(QuoteError::InvalidAmount(format!(
            "Invalid amount format: {}",
            amount_str
        )));
    }

    BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| QuoteError::InvalidAmount(amount_str.to_string()))
}

/// Format a base-unit amount with decimals for display
pub fn format_units(amount: &BigUint, decimals: u8) -> String {
    let raw = amount.to_str_radix(10);
    let decimals = decimals as usize;

    if decimals == 0 {
        return raw;
    }

    let padded = format!("{:0>width$}", raw, width = decimals + 1);
    let (integer_part, fraction) = padded.split_at(padded.len() - decimals);
    let trimmed = fraction.trim_end_matches('0');

    if trimmed.is_empty() {
        integer_part.to_string()
    } else {
        format!("{}.{}", integer_part, trimmed)
    }
}

/// Widen an RPC quantity into the arbitrary precision amount type
pub fn u256_to_biguint(value: U256) -> BigUint {
    let mut buf = [0u8; 32];
    value.to_big_endian(&mut buf);
    BigUint::from_bytes_be(&buf)
}

/// Narrow an amount into an RPC quantity, failing above 256 bits
pub fn biguint_to_u256(value: &BigUint) -> Result<U256> {
    let bytes = value.to_bytes_be();
    if bytes.len() > 32 {
        return Err(QuoteError::InvalidAmount(format!(
            "{} does not fit in 256 bits",
            value
        )));
    }
    Ok(U256::from_big_endian(&bytes))
}
