//! `ExchangeClient`: a backend bundled with the liquidity, swap and pool helpers

use ethers::{
    providers::{Http, Provider},
    signers::LocalWallet,
    types::U256,
};

use crate::{
    backend::{ExchangeBackend, Reserves, TxOutcome},
    config::ExchangeConfig,
    error::{ExchangeError, Result},
    liquidity::{self, LiquidityReceipt, RemovalEstimate},
    pool::{self, PoolSnapshot},
    remote::{self, EthersExchange, SignerClient},
    swap::{self, SwapDirection, SwapReceipt},
};

pub struct ExchangeClient<B> {
    backend: B,
}

impl ExchangeClient<EthersExchange<SignerClient>> {
    pub fn connect(config: &ExchangeConfig, wallet: LocalWallet) -> Result<Self> {
        Ok(Self::with_backend(remote::connect(config, wallet)?))
    }
}

impl ExchangeClient<EthersExchange<Provider<Http>>> {
    pub fn connect_read_only(config: &ExchangeConfig) -> Result<Self> {
        Ok(Self::with_backend(remote::connect_read_only(config)?))
    }
}

impl<B: ExchangeBackend> ExchangeClient<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn reserves(&self) -> Result<Reserves> {
        pool::fetch_reserves(&self.backend).await
    }

    pub async fn snapshot(&self) -> Result<PoolSnapshot> {
        pool::fetch_snapshot(&self.backend).await
    }

    /// Token amount to pair with `coin_amount` at the current pool ratio.
    /// `None` while the pool is empty and the depositor picks the ratio.
    pub async fn quote_liquidity(&self, coin_amount: U256) -> Result<Option<U256>> {
        let reserves = self.reserves().await?;
        match liquidity::calculate_proportional_amount(coin_amount, reserves.coin, reserves.token) {
            Ok(amount) => Ok(Some(amount)),
            Err(ExchangeError::DivisionByZero) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn add_liquidity(&self, token_amount: U256, coin_amount: U256) -> Result<LiquidityReceipt> {
        liquidity::add_liquidity(&self.backend, token_amount, coin_amount).await
    }

    pub async fn quote_removal(&self, lp_amount: U256) -> Result<RemovalEstimate> {
        let reserves = self.reserves().await?;
        let supply = self.backend.lp_total_supply().await?;
        liquidity::estimate_removal(lp_amount, reserves, supply)
    }

    pub async fn remove_liquidity(&self, lp_amount: U256) -> Result<TxOutcome> {
        liquidity::remove_liquidity(&self.backend, lp_amount).await
    }

    pub async fn quote_swap(&self, input_amount: U256, direction: SwapDirection) -> Result<U256> {
        let reserves = self.reserves().await?;
        swap::estimate_swap_output(&self.backend, input_amount, direction, reserves).await
    }

    pub async fn swap(
        &self,
        input_amount: U256,
        min_output_amount: U256,
        direction: SwapDirection,
    ) -> Result<SwapReceipt> {
        swap::execute_swap(&self.backend, input_amount, min_output_amount, direction).await
    }
}
