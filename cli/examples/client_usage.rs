use itu_exchange::{
    ethers::signers::{LocalWallet, Signer},
    liquidity::calculate_proportional_amount,
    swap::{min_output_with_slippage, SwapDirection},
    units::{format_amount, parse_amount},
    ExchangeClient, ExchangeConfig,
};
use std::str::FromStr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Example 1: Load config (file, then ITU_EXCHANGE_* environment overrides)
    let config = ExchangeConfig::load("~/.config/itu-exchange/config.json")?;
    println!("Using RPC {}", config.rpc_url);

    // Example 2: Pure ratio math, no network
    let tokens = calculate_proportional_amount(
        parse_amount("1")?,
        parse_amount("10")?,
        parse_amount("50")?,
    )?;
    println!("1 ether pairs with {} tokens in a 10:50 pool", format_amount(tokens));

    // Example 3: Read-only client for quotes
    let reader = ExchangeClient::connect_read_only(&config)?;
    match reader.snapshot().await {
        Ok(snapshot) => println!(
            "Reserves: {} ether / {} tokens",
            format_amount(snapshot.reserves.coin),
            format_amount(snapshot.reserves.token)
        ),
        Err(e) => println!("Error reading pool: {}", e),
    }

    let input = parse_amount("0.1")?;
    match reader.quote_swap(input, SwapDirection::CoinToToken).await {
        Ok(out) => {
            let min_out = min_output_with_slippage(out, 100)?;
            println!("0.1 ether buys ~{} tokens (min {} at 1%)", format_amount(out), format_amount(min_out));
        }
        Err(e) => println!("Error quoting swap: {}", e),
    }

    // Example 4: Signing client (commented out to avoid actual transactions)
    let wallet = LocalWallet::from_str("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")?;
    println!("Signer account: {:?}", wallet.address());
    /*
    let client = ExchangeClient::connect(&config, wallet)?;
    let receipt = client.add_liquidity(tokens, parse_amount("1")?).await?;
    println!("Deposit: {:?}", receipt.deposit.hash);

    let receipt = client.swap(input, U256::zero(), SwapDirection::TokenToCoin).await?;
    println!("Swap: {:?}", receipt.swap.hash);
    */

    println!("Client usage examples completed!");
    Ok(())
}
