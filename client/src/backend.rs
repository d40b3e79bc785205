//! The contract-call seam every helper goes through

use async_trait::async_trait;
use ethers::types::{Address, TransactionReceipt, H256, U256};
use serde::Serialize;

use crate::error::Result;

/// A transaction that has been mined and confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TxOutcome {
    pub hash: H256,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
}

impl From<&TransactionReceipt> for TxOutcome {
    fn from(receipt: &TransactionReceipt) -> Self {
        Self {
            hash: receipt.transaction_hash,
            block_number: receipt.block_number.map(|n| n.as_u64()),
            gas_used: receipt.gas_used,
        }
    }
}

/// Pool reserves. `coin` is the exchange's native balance, `token` its ITU Dev token reserve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Reserves {
    pub coin: U256,
    pub token: U256,
}

/// Remote calls against the exchange and token contracts.
///
/// Mutating methods resolve only after the transaction is confirmed; a
/// returned `TxOutcome` is final.
#[async_trait]
pub trait ExchangeBackend: Send + Sync {
    /// `token.approve(exchange, amount)`
    async fn approve(&self, amount: U256) -> Result<TxOutcome>;

    /// `exchange.addLiquidity(token_amount)` with `coin_value` attached
    async fn add_liquidity(&self, token_amount: U256, coin_value: U256) -> Result<TxOutcome>;

    async fn remove_liquidity(&self, lp_amount: U256) -> Result<TxOutcome>;

    /// Read-only constant-product quote
    async fn get_amount_of_tokens(
        &self,
        input_amount: U256,
        input_reserve: U256,
        output_reserve: U256,
    ) -> Result<U256>;

    /// Coin in, token out; `coin_value` is attached as the call value
    async fn coin_to_token_swap(&self, min_tokens: U256, coin_value: U256) -> Result<TxOutcome>;

    /// Token in, coin out. Requires a prior approval of `tokens_in`.
    async fn token_to_coin_swap(&self, tokens_in: U256, min_coin: U256) -> Result<TxOutcome>;

    async fn coin_reserve(&self) -> Result<U256>;

    async fn token_reserve(&self) -> Result<U256>;

    async fn lp_total_supply(&self) -> Result<U256>;

    /// Sender account, if the backend signs
    fn account(&self) -> Option<Address>;

    async fn coin_balance(&self, account: Address) -> Result<U256>;

    async fn token_balance(&self, account: Address) -> Result<U256>;

    async fn lp_balance(&self, account: Address) -> Result<U256>;
}
