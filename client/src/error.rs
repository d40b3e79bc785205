//! Error types for the exchange client

use ethers::types::H256;
use thiserror::Error;

/// Errors raised by exchange operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    /// A ratio was requested against an empty reserve or supply
    #[error("Division by zero: reserve or supply is empty")]
    DivisionByZero,

    /// Result does not fit in 256 bits
    #[error("Arithmetic overflow")]
    Overflow,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The contract call could not be built or submitted
    #[error("Contract call `{call}` failed: {reason}")]
    Contract { call: &'static str, reason: String },

    /// RPC transport or provider failure
    #[error("Provider error: {0}")]
    Provider(String),

    /// Submitted, but no receipt was ever produced
    #[error("Transaction for `{call}` was dropped from the mempool")]
    TransactionDropped { call: &'static str },

    /// Mined with status 0
    #[error("Transaction for `{call}` reverted: {hash:?}")]
    Reverted { call: &'static str, hash: H256 },

    /// The backend has no sender account to query balances for
    #[error("No sender account configured")]
    NoAccount,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for exchange operations
pub type Result<T> = std::result::Result<T, ExchangeError>;

impl From<std::io::Error> for ExchangeError {
    fn from(err: std::io::Error) -> Self {
        ExchangeError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::Config(err.to_string())
    }
}
