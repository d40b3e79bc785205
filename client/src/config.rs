//! Exchange deployment configuration

use ethers::types::Address;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, str::FromStr};

use crate::error::{ExchangeError, Result};

pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_CHAIN_ID: u64 = 31337;
pub const DEFAULT_CONFIRMATIONS: usize = 1;

pub const ENV_RPC_URL: &str = "ITU_EXCHANGE_RPC_URL";
pub const ENV_CHAIN_ID: &str = "ITU_EXCHANGE_CHAIN_ID";
pub const ENV_EXCHANGE_ADDRESS: &str = "ITU_EXCHANGE_ADDRESS";
pub const ENV_TOKEN_ADDRESS: &str = "ITU_TOKEN_ADDRESS";
pub const ENV_CONFIRMATIONS: &str = "ITU_EXCHANGE_CONFIRMATIONS";

/// Where the exchange and token contracts live and how to reach them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub exchange_address: Address,
    pub token_address: Address,
    /// Blocks to wait after inclusion before a transaction counts as final
    pub confirmations: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            exchange_address: Address::zero(),
            token_address: Address::zero(),
            confirmations: DEFAULT_CONFIRMATIONS,
        }
    }
}

impl ExchangeConfig {
    /// Load a JSON config file (tilde-expanded), falling back to defaults when
    /// the file does not exist, then apply environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// As `load`, with overrides looked up through `lookup` instead of the process environment
    pub fn load_with<F>(path: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::from_file_or_default(path)?;
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    pub fn from_file_or_default(path: &str) -> Result<Self> {
        let expanded_path = shellexpand::tilde(path);
        let path = Path::new(expanded_path.as_ref());
        if !path.exists() {
            tracing::debug!("config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_RPC_URL) {
            self.rpc_url = url;
        }
        if let Some(chain_id) = lookup(ENV_CHAIN_ID) {
            self.chain_id = chain_id
                .parse()
                .map_err(|_| ExchangeError::Config(format!("{}: not a number", ENV_CHAIN_ID)))?;
        }
        if let Some(address) = lookup(ENV_EXCHANGE_ADDRESS) {
            self.exchange_address = parse_address(ENV_EXCHANGE_ADDRESS, &address)?;
        }
        if let Some(address) = lookup(ENV_TOKEN_ADDRESS) {
            self.token_address = parse_address(ENV_TOKEN_ADDRESS, &address)?;
        }
        if let Some(confirmations) = lookup(ENV_CONFIRMATIONS) {
            self.confirmations = confirmations.parse().map_err(|_| {
                ExchangeError::Config(format!("{}: not a number", ENV_CONFIRMATIONS))
            })?;
        }
        Ok(())
    }

    /// Both contract addresses must be set before any call is made
    pub fn validate(&self) -> Result<()> {
        if self.exchange_address.is_zero() {
            return Err(ExchangeError::Config("exchange_address is not set".to_string()));
        }
        if self.token_address.is_zero() {
            return Err(ExchangeError::Config("token_address is not set".to_string()));
        }
        Ok(())
    }
}

fn parse_address(key: &str, value: &str) -> Result<Address> {
    Address::from_str(value.trim())
        .map_err(|e| ExchangeError::Config(format!("{}: {}", key, e)))
}
