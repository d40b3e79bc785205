#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    };

    use async_trait::async_trait;
    use ethers::types::{Address, H256, U256};

    use crate::{
        backend::{ExchangeBackend, Reserves, TxOutcome},
        client::ExchangeClient,
        error::{ExchangeError, Result},
        liquidity::{add_liquidity, remove_liquidity},
        pool::fetch_snapshot,
        swap::{estimate_swap_output, execute_swap, SwapDirection},
    };

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Approve(U256),
        AddLiquidity { token_amount: U256, coin_value: U256 },
        RemoveLiquidity(U256),
        Quote { input: U256, input_reserve: U256, output_reserve: U256 },
        CoinToToken { min_tokens: U256, coin_value: U256 },
        TokenToCoin { tokens_in: U256, min_coin: U256 },
    }

    /// In-memory exchange that records every remote call in order
    struct MockExchange {
        calls: Mutex<Vec<Call>>,
        fail_on: Option<&'static str>,
        reserves: Reserves,
        lp_supply: U256,
        account: Option<Address>,
        in_flight: AtomicBool,
        overlapped: AtomicBool,
    }

    impl MockExchange {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on: None,
                reserves: Reserves {
                    coin: 10.into(),
                    token: 50.into(),
                },
                lp_supply: 10.into(),
                account: Some(Address::repeat_byte(0x11)),
                in_flight: AtomicBool::new(false),
                overlapped: AtomicBool::new(false),
            }
        }

        fn failing_on(call: &'static str) -> Self {
            Self {
                fail_on: Some(call),
                ..Self::new()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        /// Record `call`, suspend once as a real confirmation would, then resolve
        async fn transact(&self, name: &'static str, call: Call) -> Result<TxOutcome> {
            if self.in_flight.swap(true, Ordering::SeqCst) {
                self.overlapped.store(true, Ordering::SeqCst);
            }
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(call);
                calls.len() as u64
            };
            tokio::task::yield_now().await;
            self.in_flight.store(false, Ordering::SeqCst);

            if self.fail_on == Some(name) {
                return Err(ExchangeError::Reverted {
                    call: name,
                    hash: H256::from_low_u64_be(index),
                });
            }
            Ok(TxOutcome {
                hash: H256::from_low_u64_be(index),
                block_number: Some(index),
                gas_used: Some(21_000.into()),
            })
        }
    }

    #[async_trait]
    impl ExchangeBackend for MockExchange {
        async fn approve(&self, amount: U256) -> Result<TxOutcome> {
            self.transact("approve", Call::Approve(amount)).await
        }

        async fn add_liquidity(&self, token_amount: U256, coin_value: U256) -> Result<TxOutcome> {
            self.transact("addLiquidity", Call::AddLiquidity { token_amount, coin_value })
                .await
        }

        async fn remove_liquidity(&self, lp_amount: U256) -> Result<TxOutcome> {
            self.transact("removeLiquidity", Call::RemoveLiquidity(lp_amount))
                .await
        }

        async fn get_amount_of_tokens(
            &self,
            input_amount: U256,
            input_reserve: U256,
            output_reserve: U256,
        ) -> Result<U256> {
            self.calls.lock().unwrap().push(Call::Quote {
                input: input_amount,
                input_reserve,
                output_reserve,
            });
            if self.fail_on == Some("getAmountOfTokens") {
                return Err(ExchangeError::Contract {
                    call: "getAmountOfTokens",
                    reason: "execution reverted".to_string(),
                });
            }
            // 1% fee, as the deployed exchange charges
            let input_with_fee = input_amount * 99;
            Ok(input_with_fee * output_reserve / (input_reserve * 100 + input_with_fee))
        }

        async fn coin_to_token_swap(&self, min_tokens: U256, coin_value: U256) -> Result<TxOutcome> {
            self.transact("ethToItuDevToken", Call::CoinToToken { min_tokens, coin_value })
                .await
        }

        async fn token_to_coin_swap(&self, tokens_in: U256, min_coin: U256) -> Result<TxOutcome> {
            self.transact("ituDevTokenToEth", Call::TokenToCoin { tokens_in, min_coin })
                .await
        }

        async fn coin_reserve(&self) -> Result<U256> {
            Ok(self.reserves.coin)
        }

        async fn token_reserve(&self) -> Result<U256> {
            Ok(self.reserves.token)
        }

        async fn lp_total_supply(&self) -> Result<U256> {
            Ok(self.lp_supply)
        }

        fn account(&self) -> Option<Address> {
            self.account
        }

        async fn coin_balance(&self, _account: Address) -> Result<U256> {
            Ok(1_000.into())
        }

        async fn token_balance(&self, _account: Address) -> Result<U256> {
            Ok(2_000.into())
        }

        async fn lp_balance(&self, _account: Address) -> Result<U256> {
            Ok(3.into())
        }
    }

    // ===== LIQUIDITY TESTS =====

    #[tokio::test]
    async fn test_add_liquidity_approves_then_deposits() {
        let mock = MockExchange::new();
        let receipt = add_liquidity(&mock, 50.into(), 10.into()).await.unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                Call::Approve(50.into()),
                Call::AddLiquidity {
                    token_amount: 50.into(),
                    coin_value: 10.into(),
                },
            ]
        );
        assert_eq!(receipt.approval.hash, H256::from_low_u64_be(1));
        assert_eq!(receipt.deposit.hash, H256::from_low_u64_be(2));
        assert!(!mock.overlapped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_add_liquidity_stops_when_approval_fails() {
        let mock = MockExchange::failing_on("approve");
        let err = add_liquidity(&mock, 50.into(), 10.into()).await.unwrap_err();

        assert!(matches!(err, ExchangeError::Reverted { call: "approve", .. }));
        assert_eq!(mock.calls(), vec![Call::Approve(50.into())]);
    }

    #[tokio::test]
    async fn test_add_liquidity_reports_failed_deposit() {
        let mock = MockExchange::failing_on("addLiquidity");
        let err = add_liquidity(&mock, 50.into(), 10.into()).await.unwrap_err();

        assert!(matches!(err, ExchangeError::Reverted { call: "addLiquidity", .. }));
        assert_eq!(mock.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_remove_liquidity_is_single_call() {
        let mock = MockExchange::new();
        remove_liquidity(&mock, 4.into()).await.unwrap();
        assert_eq!(mock.calls(), vec![Call::RemoveLiquidity(4.into())]);
    }

    #[tokio::test]
    async fn test_remove_liquidity_rejects_zero() {
        let mock = MockExchange::new();
        let err = remove_liquidity(&mock, U256::zero()).await.unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidAmount(_)));
        assert!(mock.calls().is_empty());
    }

    // ===== SWAP TESTS =====

    #[tokio::test]
    async fn test_coin_swap_is_single_payable_call() {
        let mock = MockExchange::new();
        let receipt = execute_swap(&mock, 7.into(), 3.into(), SwapDirection::CoinToToken)
            .await
            .unwrap();

        assert_eq!(
            mock.calls(),
            vec![Call::CoinToToken {
                min_tokens: 3.into(),
                coin_value: 7.into(),
            }]
        );
        assert!(receipt.approval.is_none());
    }

    #[tokio::test]
    async fn test_token_swap_approves_then_swaps() {
        let mock = MockExchange::new();
        let receipt = execute_swap(&mock, 7.into(), 1.into(), SwapDirection::TokenToCoin)
            .await
            .unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                Call::Approve(7.into()),
                Call::TokenToCoin {
                    tokens_in: 7.into(),
                    min_coin: 1.into(),
                },
            ]
        );
        assert!(receipt.approval.is_some());
        assert!(!mock.overlapped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_token_swap_propagates_approval_failure() {
        let mock = MockExchange::failing_on("approve");
        let err = execute_swap(&mock, 7.into(), 1.into(), SwapDirection::TokenToCoin)
            .await
            .unwrap_err();

        assert!(matches!(err, ExchangeError::Reverted { call: "approve", .. }));
        assert_eq!(mock.calls(), vec![Call::Approve(7.into())]);
    }

    #[tokio::test]
    async fn test_token_swap_failure_after_approval() {
        let mock = MockExchange::failing_on("ituDevTokenToEth");
        let err = execute_swap(&mock, 7.into(), 1.into(), SwapDirection::TokenToCoin)
            .await
            .unwrap_err();

        // approval already confirmed and stays granted
        assert!(matches!(err, ExchangeError::Reverted { call: "ituDevTokenToEth", .. }));
        assert_eq!(
            mock.calls(),
            vec![
                Call::Approve(7.into()),
                Call::TokenToCoin {
                    tokens_in: 7.into(),
                    min_coin: 1.into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_coin_swap_propagates_failure() {
        let mock = MockExchange::failing_on("ethToItuDevToken");
        let err = execute_swap(&mock, 7.into(), 3.into(), SwapDirection::CoinToToken)
            .await
            .unwrap_err();

        assert!(matches!(err, ExchangeError::Reverted { call: "ethToItuDevToken", .. }));
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_estimate_orders_reserves_by_direction() {
        let mock = MockExchange::new();
        let reserves = mock.reserves;

        estimate_swap_output(&mock, 2.into(), SwapDirection::CoinToToken, reserves)
            .await
            .unwrap();
        estimate_swap_output(&mock, 2.into(), SwapDirection::TokenToCoin, reserves)
            .await
            .unwrap();

        assert_eq!(
            mock.calls(),
            vec![
                Call::Quote {
                    input: 2.into(),
                    input_reserve: 10.into(),
                    output_reserve: 50.into(),
                },
                Call::Quote {
                    input: 2.into(),
                    input_reserve: 50.into(),
                    output_reserve: 10.into(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_estimate_propagates_contract_error() {
        let mock = MockExchange::failing_on("getAmountOfTokens");
        let err = estimate_swap_output(&mock, 2.into(), SwapDirection::CoinToToken, mock.reserves)
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::Contract { .. }));
    }

    // ===== CLIENT / POOL TESTS =====

    #[tokio::test]
    async fn test_snapshot_includes_account_balances() {
        let mock = MockExchange::new();
        let snapshot = fetch_snapshot(&mock).await.unwrap();

        assert_eq!(snapshot.reserves.token, U256::from(50));
        assert_eq!(snapshot.lp_total_supply, U256::from(10));
        let balances = snapshot.balances.unwrap();
        assert_eq!(balances.account, Address::repeat_byte(0x11));
        assert_eq!(balances.lp, U256::from(3));
    }

    #[tokio::test]
    async fn test_snapshot_without_account() {
        let mock = MockExchange {
            account: None,
            ..MockExchange::new()
        };
        assert!(fetch_snapshot(&mock).await.unwrap().balances.is_none());
    }

    #[tokio::test]
    async fn test_client_quotes() {
        let client = ExchangeClient::with_backend(MockExchange::new());

        assert_eq!(client.quote_liquidity(1.into()).await.unwrap(), Some(5.into()));

        let removal = client.quote_removal(5.into()).await.unwrap();
        assert_eq!(removal.coin, U256::from(5));
        assert_eq!(removal.token, U256::from(25));

        // 2 * 99 * 50 / (10 * 100 + 2 * 99) = 9900 / 1198
        let out = client.quote_swap(2.into(), SwapDirection::CoinToToken).await.unwrap();
        assert_eq!(out, U256::from(8));
    }

    #[tokio::test]
    async fn test_client_quote_on_empty_pool() {
        let client = ExchangeClient::with_backend(MockExchange {
            reserves: Reserves::default(),
            ..MockExchange::new()
        });
        assert_eq!(client.quote_liquidity(1.into()).await.unwrap(), None);
        assert!(client.backend().calls().is_empty());
    }
}
