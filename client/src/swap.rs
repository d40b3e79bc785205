//! Coin <-> token swaps

use ethers::types::U256;
use serde::Serialize;
use tracing::info;

use crate::{
    backend::{ExchangeBackend, Reserves, TxOutcome},
    error::{ExchangeError, Result},
    liquidity::mul_div,
};

pub const BPS_DENOMINATOR: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SwapDirection {
    /// Native coin in, ITU Dev token out
    CoinToToken,
    /// ITU Dev token in, native coin out
    TokenToCoin,
}

impl SwapDirection {
    pub fn from_coin_selected(coin_selected_as_input: bool) -> Self {
        if coin_selected_as_input {
            SwapDirection::CoinToToken
        } else {
            SwapDirection::TokenToCoin
        }
    }

    /// `(input_reserve, output_reserve)` for this direction
    pub fn order_reserves(self, reserves: Reserves) -> (U256, U256) {
        match self {
            SwapDirection::CoinToToken => (reserves.coin, reserves.token),
            SwapDirection::TokenToCoin => (reserves.token, reserves.coin),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwapReceipt {
    pub direction: SwapDirection,
    /// Set only for token input
    pub approval: Option<TxOutcome>,
    pub swap: TxOutcome,
}

/// Output the exchange would pay for `input_amount`, priced by the contract's own formula
pub async fn estimate_swap_output<B>(
    backend: &B,
    input_amount: U256,
    direction: SwapDirection,
    reserves: Reserves,
) -> Result<U256>
where
    B: ExchangeBackend + ?Sized,
{
    let (input_reserve, output_reserve) = direction.order_reserves(reserves);
    backend
        .get_amount_of_tokens(input_amount, input_reserve, output_reserve)
        .await
}

/// Swap `input_amount`, refusing less than `min_output_amount` on-chain.
///
/// Coin input is a single payable call. Token input approves the exchange for
/// `input_amount` first and only swaps once that approval is confirmed.
pub async fn execute_swap<B>(
    backend: &B,
    input_amount: U256,
    min_output_amount: U256,
    direction: SwapDirection,
) -> Result<SwapReceipt>
where
    B: ExchangeBackend + ?Sized,
{
    info!(?direction, %input_amount, %min_output_amount, "swapping");
    match direction {
        SwapDirection::CoinToToken => {
            let swap = backend.coin_to_token_swap(min_output_amount, input_amount).await?;
            Ok(SwapReceipt {
                direction,
                approval: None,
                swap,
            })
        }
        SwapDirection::TokenToCoin => {
            let approval = backend.approve(input_amount).await?;
            let swap = backend.token_to_coin_swap(input_amount, min_output_amount).await?;
            Ok(SwapReceipt {
                direction,
                approval: Some(approval),
                swap,
            })
        }
    }
}

/// Lowest acceptable output for `estimate` with `slippage_bps` tolerance, rounded down
pub fn min_output_with_slippage(estimate: U256, slippage_bps: u64) -> Result<U256> {
    if slippage_bps > BPS_DENOMINATOR {
        return Err(ExchangeError::InvalidAmount(format!(
            "slippage {} bps exceeds {}",
            slippage_bps, BPS_DENOMINATOR
        )));
    }
    mul_div(
        estimate,
        U256::from(BPS_DENOMINATOR - slippage_bps),
        U256::from(BPS_DENOMINATOR),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_flag() {
        assert_eq!(SwapDirection::from_coin_selected(true), SwapDirection::CoinToToken);
        assert_eq!(SwapDirection::from_coin_selected(false), SwapDirection::TokenToCoin);
    }

    #[test]
    fn test_order_reserves() {
        let reserves = Reserves {
            coin: 10.into(),
            token: 50.into(),
        };
        assert_eq!(
            SwapDirection::CoinToToken.order_reserves(reserves),
            (U256::from(10), U256::from(50))
        );
        assert_eq!(
            SwapDirection::TokenToCoin.order_reserves(reserves),
            (U256::from(50), U256::from(10))
        );
    }

    #[test]
    fn test_min_output_with_slippage() {
        assert_eq!(min_output_with_slippage(1_000.into(), 100).unwrap(), U256::from(990));
        assert_eq!(min_output_with_slippage(999.into(), 50).unwrap(), U256::from(994));
        assert_eq!(min_output_with_slippage(1_000.into(), 0).unwrap(), U256::from(1_000));
        assert!(min_output_with_slippage(1_000.into(), 10_000).unwrap().is_zero());
        assert!(matches!(
            min_output_with_slippage(1_000.into(), 10_001),
            Err(ExchangeError::InvalidAmount(_))
        ));
    }
}
