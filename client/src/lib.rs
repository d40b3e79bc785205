// #![deny(missing_docs)]

//! Client helpers for the ITU Dev token exchange, an ether/token AMM contract.
pub mod backend;
pub mod bindings;
pub mod client;
pub mod config;
pub mod error;
pub mod liquidity;
pub mod pool;
pub mod remote;
pub mod swap;
pub mod units;

#[cfg(test)]
mod tests;

pub use backend::{ExchangeBackend, Reserves, TxOutcome};
pub use client::ExchangeClient;
pub use config::ExchangeConfig;
pub use error::{ExchangeError, Result};
pub use swap::SwapDirection;

// Export the ethers version this crate is built against for downstream users
pub use ethers;
