//! `ExchangeBackend` over ethers contract bindings

use std::sync::Arc;

use async_trait::async_trait;
use ethers::{
    abi::Detokenize,
    contract::ContractCall,
    middleware::SignerMiddleware,
    providers::{Http, Middleware, Provider},
    signers::{LocalWallet, Signer},
    types::{Address, TransactionReceipt, H256, U256, U64},
};
use tracing::{debug, info};

use crate::{
    backend::{ExchangeBackend, TxOutcome},
    bindings::{ExchangeContract, TokenContract},
    config::ExchangeConfig,
    error::{ExchangeError, Result},
};

/// Provider with a local signing key attached
pub type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

pub struct EthersExchange<M> {
    client: Arc<M>,
    exchange: ExchangeContract<M>,
    token: TokenContract<M>,
    confirmations: usize,
}

/// Signing backend for mutating calls
pub fn connect(config: &ExchangeConfig, wallet: LocalWallet) -> Result<EthersExchange<SignerClient>> {
    let provider = http_provider(config)?;
    let wallet = wallet.with_chain_id(config.chain_id);
    info!(account = ?wallet.address(), rpc = %config.rpc_url, "connecting signer");
    Ok(EthersExchange::new(Arc::new(SignerMiddleware::new(provider, wallet)), config))
}

/// Backend without a signer. Quotes and pool reads only; `account()` is `None`.
pub fn connect_read_only(config: &ExchangeConfig) -> Result<EthersExchange<Provider<Http>>> {
    let provider = http_provider(config)?;
    Ok(EthersExchange::new(Arc::new(provider), config))
}

fn http_provider(config: &ExchangeConfig) -> Result<Provider<Http>> {
    config.validate()?;
    Provider::<Http>::try_from(config.rpc_url.as_str())
        .map_err(|e| ExchangeError::Config(format!("invalid rpc url {}: {}", config.rpc_url, e)))
}

impl<M: Middleware + 'static> EthersExchange<M> {
    pub fn new(client: Arc<M>, config: &ExchangeConfig) -> Self {
        Self {
            exchange: ExchangeContract::new(config.exchange_address, client.clone()),
            token: TokenContract::new(config.token_address, client.clone()),
            client,
            confirmations: config.confirmations,
        }
    }

    pub fn exchange_address(&self) -> Address {
        self.exchange.address()
    }

    /// Submit `call` and wait for `confirmations` blocks on top of it
    async fn send_and_confirm<D>(&self, name: &'static str, call: ContractCall<M, D>) -> Result<TxOutcome>
    where
        D: Detokenize + Send + Sync,
    {
        let pending = call.send().await.map_err(|e| ExchangeError::Contract {
            call: name,
            reason: e.to_string(),
        })?;
        let hash = pending.tx_hash();
        info!(call = name, tx = ?hash, "transaction submitted");

        let receipt = pending
            .confirmations(self.confirmations)
            .await
            .map_err(|e| ExchangeError::Provider(e.to_string()))?;

        let outcome = outcome_from_receipt(name, hash, receipt)?;
        info!(call = name, tx = ?hash, block = ?outcome.block_number, "transaction confirmed");
        Ok(outcome)
    }
}

/// A missing receipt means the transaction was dropped; status 0 means it reverted
fn outcome_from_receipt(
    call: &'static str,
    hash: H256,
    receipt: Option<TransactionReceipt>,
) -> Result<TxOutcome> {
    let receipt = receipt.ok_or(ExchangeError::TransactionDropped { call })?;
    if receipt.status == Some(U64::zero()) {
        return Err(ExchangeError::Reverted { call, hash });
    }
    Ok(TxOutcome::from(&receipt))
}

fn read_failed<E: std::fmt::Display>(name: &'static str) -> impl Fn(E) -> ExchangeError {
    move |e| ExchangeError::Contract {
        call: name,
        reason: e.to_string(),
    }
}

#[async_trait]
impl<M: Middleware + 'static> ExchangeBackend for EthersExchange<M> {
    async fn approve(&self, amount: U256) -> Result<TxOutcome> {
        let call = self.token.approve(self.exchange.address(), amount);
        self.send_and_confirm("approve", call).await
    }

    async fn add_liquidity(&self, token_amount: U256, coin_value: U256) -> Result<TxOutcome> {
        let call = self.exchange.add_liquidity(token_amount).value(coin_value);
        self.send_and_confirm("addLiquidity", call).await
    }

    async fn remove_liquidity(&self, lp_amount: U256) -> Result<TxOutcome> {
        let call = self.exchange.remove_liquidity(lp_amount);
        self.send_and_confirm("removeLiquidity", call).await
    }

    async fn get_amount_of_tokens(
        &self,
        input_amount: U256,
        input_reserve: U256,
        output_reserve: U256,
    ) -> Result<U256> {
        let amount = self
            .exchange
            .get_amount_of_tokens(input_amount, input_reserve, output_reserve)
            .call()
            .await
            .map_err(read_failed("getAmountOfTokens"))?;
        debug!(%input_amount, %input_reserve, %output_reserve, %amount, "getAmountOfTokens");
        Ok(amount)
    }

    async fn coin_to_token_swap(&self, min_tokens: U256, coin_value: U256) -> Result<TxOutcome> {
        let call = self.exchange.eth_to_itu_dev_token(min_tokens).value(coin_value);
        self.send_and_confirm("ethToItuDevToken", call).await
    }

    async fn token_to_coin_swap(&self, tokens_in: U256, min_coin: U256) -> Result<TxOutcome> {
        let call = self.exchange.itu_dev_token_to_eth(tokens_in, min_coin);
        self.send_and_confirm("ituDevTokenToEth", call).await
    }

    async fn coin_reserve(&self) -> Result<U256> {
        self.client
            .get_balance(self.exchange.address(), None)
            .await
            .map_err(|e| ExchangeError::Provider(e.to_string()))
    }

    async fn token_reserve(&self) -> Result<U256> {
        self.exchange
            .get_reserve()
            .call()
            .await
            .map_err(read_failed("getReserve"))
    }

    async fn lp_total_supply(&self) -> Result<U256> {
        self.exchange
            .total_supply()
            .call()
            .await
            .map_err(read_failed("totalSupply"))
    }

    fn account(&self) -> Option<Address> {
        self.client.default_sender()
    }

    async fn coin_balance(&self, account: Address) -> Result<U256> {
        self.client
            .get_balance(account, None)
            .await
            .map_err(|e| ExchangeError::Provider(e.to_string()))
    }

    async fn token_balance(&self, account: Address) -> Result<U256> {
        self.token
            .balance_of(account)
            .call()
            .await
            .map_err(read_failed("token.balanceOf"))
    }

    async fn lp_balance(&self, account: Address) -> Result<U256> {
        self.exchange
            .balance_of(account)
            .call()
            .await
            .map_err(read_failed("exchange.balanceOf"))
    }
}
