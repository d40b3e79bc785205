//! Reserve and balance reads

use ethers::types::{Address, U256};
use serde::Serialize;

use crate::{
    backend::{ExchangeBackend, Reserves},
    error::Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccountBalances {
    pub account: Address,
    pub coin: U256,
    pub token: U256,
    pub lp: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolSnapshot {
    pub reserves: Reserves,
    pub lp_total_supply: U256,
    /// `None` when the backend has no sender account
    pub balances: Option<AccountBalances>,
}

impl PoolSnapshot {
    /// A pool without coin reserve has no ratio yet; the first deposit sets it
    pub fn is_empty(&self) -> bool {
        self.reserves.coin.is_zero()
    }
}

pub async fn fetch_reserves<B>(backend: &B) -> Result<Reserves>
where
    B: ExchangeBackend + ?Sized,
{
    let coin = backend.coin_reserve().await?;
    let token = backend.token_reserve().await?;
    Ok(Reserves { coin, token })
}

pub async fn fetch_snapshot<B>(backend: &B) -> Result<PoolSnapshot>
where
    B: ExchangeBackend + ?Sized,
{
    let reserves = fetch_reserves(backend).await?;
    let lp_total_supply = backend.lp_total_supply().await?;
    let balances = match backend.account() {
        Some(account) => Some(AccountBalances {
            account,
            coin: backend.coin_balance(account).await?,
            token: backend.token_balance(account).await?,
            lp: backend.lp_balance(account).await?,
        }),
        None => None,
    };
    Ok(PoolSnapshot {
        reserves,
        lp_total_supply,
        balances,
    })
}
