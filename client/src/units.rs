//! Decimal <-> base-unit conversion. Ether and the ITU Dev token both use 18 decimals.

use ethers::{
    types::U256,
    utils::{format_ether, parse_ether},
};

use crate::error::{ExchangeError, Result};

/// Parse a decimal amount such as `"0.25"` into base units. An empty string is zero.
pub fn parse_amount(text: &str) -> Result<U256> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(U256::zero());
    }
    if text.starts_with('-') {
        return Err(ExchangeError::InvalidAmount(format!("negative amount {}", text)));
    }
    parse_ether(text).map_err(|e| ExchangeError::InvalidAmount(format!("{}: {}", text, e)))
}

pub fn format_amount(amount: U256) -> String {
    format_ether(amount)
}
