//! Liquidity deposits and withdrawals

use ethers::types::{U256, U512};
use serde::Serialize;
use tracing::{error, info};

use crate::{
    backend::{ExchangeBackend, Reserves, TxOutcome},
    error::{ExchangeError, Result},
    units::parse_amount,
};

/// Confirmed approve + addLiquidity pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LiquidityReceipt {
    pub approval: TxOutcome,
    pub deposit: TxOutcome,
}

/// What burning an amount of LP shares returns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemovalEstimate {
    pub coin: U256,
    pub token: U256,
}

/// `floor(a * b / c)` with a 512-bit intermediate product
pub fn mul_div(a: U256, b: U256, c: U256) -> Result<U256> {
    if c.is_zero() {
        return Err(ExchangeError::DivisionByZero);
    }
    let quotient = a.full_mul(b) / U512::from(c);
    U256::try_from(quotient).map_err(|_| ExchangeError::Overflow)
}

/// Token amount that keeps the pool ratio for a deposit of `coin_amount`:
/// `coin_amount * token_reserve / coin_reserve`, rounded down.
pub fn calculate_proportional_amount(
    coin_amount: U256,
    coin_reserve: U256,
    token_reserve: U256,
) -> Result<U256> {
    mul_div(coin_amount, token_reserve, coin_reserve)
}

/// As `calculate_proportional_amount`, with the coin amount given as a decimal ether string
pub fn calculate_token_amount_for_coin(
    coin_text: &str,
    coin_reserve: U256,
    token_reserve: U256,
) -> Result<U256> {
    let coin_amount = parse_amount(coin_text)?;
    calculate_proportional_amount(coin_amount, coin_reserve, token_reserve)
}

/// Approve `token_amount` for the exchange, then deposit it together with `coin_amount`.
///
/// The deposit is only submitted once the approval is confirmed. A failure at
/// either step is logged and returned; an approval that succeeded before a
/// failed deposit stays granted.
pub async fn add_liquidity<B>(
    backend: &B,
    token_amount: U256,
    coin_amount: U256,
) -> Result<LiquidityReceipt>
where
    B: ExchangeBackend + ?Sized,
{
    info!(%token_amount, %coin_amount, "adding liquidity");
    let approval = backend.approve(token_amount).await.map_err(|e| {
        error!(error = %e, "token approval failed, liquidity not added");
        e
    })?;
    let deposit = backend
        .add_liquidity(token_amount, coin_amount)
        .await
        .map_err(|e| {
            error!(error = %e, approval = ?approval.hash, "addLiquidity failed after approval");
            e
        })?;
    Ok(LiquidityReceipt { approval, deposit })
}

/// Coin and token returned for `lp_amount` shares out of `lp_total_supply`
pub fn estimate_removal(
    lp_amount: U256,
    reserves: Reserves,
    lp_total_supply: U256,
) -> Result<RemovalEstimate> {
    Ok(RemovalEstimate {
        coin: mul_div(lp_amount, reserves.coin, lp_total_supply)?,
        token: mul_div(lp_amount, reserves.token, lp_total_supply)?,
    })
}

/// Burn `lp_amount` LP shares. The exchange burns its own token, so no approval is needed.
pub async fn remove_liquidity<B>(backend: &B, lp_amount: U256) -> Result<TxOutcome>
where
    B: ExchangeBackend + ?Sized,
{
    if lp_amount.is_zero() {
        return Err(ExchangeError::InvalidAmount("lp amount must be positive".to_string()));
    }
    info!(%lp_amount, "removing liquidity");
    backend.remove_liquidity(lp_amount).await.map_err(|e| {
        error!(error = %e, "removeLiquidity failed");
        e
    })
}
