use clap::{Parser, Subcommand, ValueEnum};
use anyhow::{Result, Context};
use itu_exchange::{
    ethers::{
        signers::{LocalWallet, Signer},
        types::{Address, U256},
    },
    pool::PoolSnapshot,
    swap::{min_output_with_slippage, SwapDirection},
    units::{format_amount, parse_amount},
    ExchangeBackend, ExchangeClient, ExchangeConfig,
};
use std::fs;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "~/.config/itu-exchange/config.json";
const DEFAULT_KEY_PATH: &str = "~/.config/itu-exchange/key.json";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the exchange config file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    /// RPC endpoint, overrides the config file and environment
    #[arg(long, global = true)]
    rpc_url: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Input {
    /// Pay ether, receive ITU Dev tokens
    Coin,
    /// Pay ITU Dev tokens, receive ether
    Token,
}

impl From<Input> for SwapDirection {
    fn from(input: Input) -> Self {
        SwapDirection::from_coin_selected(matches!(input, Input::Coin))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show pool reserves, LP supply and, with a key, account balances
    PoolInfo {
        /// Path to signer key file; balances are shown for its account
        #[arg(long)]
        key: Option<String>,
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Token amount that matches an ether deposit at the current pool ratio
    QuoteLiquidity {
        /// Ether to deposit (decimal, e.g. 0.5)
        #[arg(long)]
        coin_amount: String,
    },
    /// Approve tokens and add ether + tokens to the pool
    AddLiquidity {
        /// Ether to deposit (decimal)
        #[arg(long)]
        coin_amount: String,
        /// Tokens to deposit; required for the first deposit, derived from the ratio otherwise
        #[arg(long)]
        token_amount: Option<String>,
        /// Path to signer key file
        #[arg(long, default_value = DEFAULT_KEY_PATH)]
        key: String,
    },
    /// Burn LP tokens for ether + tokens
    RemoveLiquidity {
        /// LP tokens to burn (decimal)
        #[arg(long)]
        lp_amount: String,
        /// Path to signer key file
        #[arg(long, default_value = DEFAULT_KEY_PATH)]
        key: String,
    },
    /// Estimate swap output
    QuoteSwap {
        /// Input amount (decimal)
        #[arg(long)]
        amount: String,
        /// Asset being paid in
        #[arg(long, value_enum)]
        input: Input,
    },
    /// Swap ether for tokens or tokens for ether
    Swap {
        /// Input amount (decimal)
        #[arg(long)]
        amount: String,
        /// Asset being paid in
        #[arg(long, value_enum)]
        input: Input,
        /// Tolerance below the quoted output, in basis points
        #[arg(long, default_value = "100")]
        slippage_bps: u64,
        /// Explicit minimum output (decimal); skips the quote
        #[arg(long)]
        min_output: Option<String>,
        /// Path to signer key file
        #[arg(long, default_value = DEFAULT_KEY_PATH)]
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = ExchangeConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config))?;
    if let Some(rpc_url) = &cli.rpc_url {
        config.rpc_url = rpc_url.clone();
    }
    tracing::debug!(?config, "loaded config");

    match &cli.command {
        Commands::PoolInfo { key, json } => {
            match key {
                Some(key) => {
                    let client = ExchangeClient::connect(&config, load_wallet(key)?)?;
                    pool_info(&client, *json).await?;
                }
                None => {
                    let client = ExchangeClient::connect_read_only(&config)?;
                    pool_info(&client, *json).await?;
                }
            }
        }
        Commands::QuoteLiquidity { coin_amount } => {
            quote_liquidity(&config, coin_amount).await?;
        }
        Commands::AddLiquidity { coin_amount, token_amount, key } => {
            let wallet = load_wallet(key)?;
            add_liquidity(
                &config,
                coin_amount,
                token_amount.as_deref(),
                wallet,
            ).await?;
        }
        Commands::RemoveLiquidity { lp_amount, key } => {
            let wallet = load_wallet(key)?;
            remove_liquidity(&config, lp_amount, wallet).await?;
        }
        Commands::QuoteSwap { amount, input } => {
            quote_swap(&config, amount, (*input).into()).await?;
        }
        Commands::Swap { amount, input, slippage_bps, min_output, key } => {
            let wallet = load_wallet(key)?;
            swap(
                &config,
                amount,
                (*input).into(),
                *slippage_bps,
                min_output.as_deref(),
                wallet,
            ).await?;
        }
    }

    Ok(())
}

// Load a signing key from file: bare hex, a quoted JSON string, or {"private_key": "..."}
fn load_wallet(path: &str) -> Result<LocalWallet> {
    let expanded_path = shellexpand::tilde(path);
    let key_data = fs::read_to_string(expanded_path.as_ref())
        .with_context(|| format!("Failed to read key file: {}", path))?;
    parse_wallet(&key_data)
}

fn parse_wallet(key_data: &str) -> Result<LocalWallet> {
    let key_data = key_data.trim();

    let hex_key = if key_data.starts_with('{') {
        #[derive(serde::Deserialize)]
        struct KeyFile {
            private_key: String,
        }

        serde_json::from_str::<KeyFile>(key_data)
            .with_context(|| "Failed to parse key JSON object")?
            .private_key
    } else if key_data.starts_with('"') {
        serde_json::from_str::<String>(key_data)
            .with_context(|| "Failed to parse quoted key")?
    } else {
        key_data.to_string()
    };

    let wallet = LocalWallet::from_str(hex_key.trim().trim_start_matches("0x"))
        .with_context(|| "Invalid private key")?;

    if wallet.address() == Address::zero() {
        return Err(anyhow::anyhow!("Invalid key: address is zero"));
    }

    Ok(wallet)
}

async fn pool_info<B: ExchangeBackend>(client: &ExchangeClient<B>, json: bool) -> Result<()> {
    let snapshot = client.snapshot().await.context("Failed to read pool state")?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }
    print_snapshot(&snapshot);
    Ok(())
}

fn print_snapshot(snapshot: &PoolSnapshot) {
    println!("Pool");
    println!("  Ether Reserve: {}", format_amount(snapshot.reserves.coin));
    println!("  Token Reserve: {}", format_amount(snapshot.reserves.token));
    println!("  LP Supply: {}", format_amount(snapshot.lp_total_supply));
    if snapshot.is_empty() {
        println!("  Pool is empty, the first deposit sets the price");
    }
    if let Some(balances) = &snapshot.balances {
        println!("Account {:?}", balances.account);
        println!("  Ether: {}", format_amount(balances.coin));
        println!("  Tokens: {}", format_amount(balances.token));
        println!("  LP Tokens: {}", format_amount(balances.lp));
    }
}

async fn quote_liquidity(config: &ExchangeConfig, coin_amount: &str) -> Result<()> {
    let client = ExchangeClient::connect_read_only(config)?;
    let coin = parse_amount(coin_amount)?;

    match client.quote_liquidity(coin).await? {
        Some(tokens) => {
            println!("Deposit {} ether with {} tokens", format_amount(coin), format_amount(tokens));
        }
        None => {
            println!("Pool is empty: any token amount is accepted and sets the initial ratio");
        }
    }

    Ok(())
}

async fn add_liquidity(
    config: &ExchangeConfig,
    coin_amount: &str,
    token_amount: Option<&str>,
    wallet: LocalWallet,
) -> Result<()> {
    println!("Adding liquidity...");
    println!("  Exchange: {:?}", config.exchange_address);
    println!("  Account: {:?}", wallet.address());

    let client = ExchangeClient::connect(config, wallet)?;
    let coin = parse_amount(coin_amount)?;
    let tokens = match token_amount {
        Some(token_amount) => parse_amount(token_amount)?,
        None => client
            .quote_liquidity(coin)
            .await?
            .context("Pool is empty: pass --token-amount to set the initial ratio")?,
    };
    println!("  Ether: {}", format_amount(coin));
    println!("  Tokens: {}", format_amount(tokens));

    let receipt = client
        .add_liquidity(tokens, coin)
        .await
        .context("Failed to add liquidity")?;
    println!("Liquidity added successfully!");
    println!("  Approval Transaction: {:?}", receipt.approval.hash);
    println!("  Deposit Transaction: {:?}", receipt.deposit.hash);

    Ok(())
}

async fn remove_liquidity(config: &ExchangeConfig, lp_amount: &str, wallet: LocalWallet) -> Result<()> {
    println!("Removing liquidity...");
    println!("  Account: {:?}", wallet.address());

    let client = ExchangeClient::connect(config, wallet)?;
    let lp = parse_amount(lp_amount)?;
    let estimate = client.quote_removal(lp).await?;
    println!("  LP Tokens: {}", format_amount(lp));
    println!("  Expected Ether: {}", format_amount(estimate.coin));
    println!("  Expected Tokens: {}", format_amount(estimate.token));

    let outcome = client
        .remove_liquidity(lp)
        .await
        .context("Failed to remove liquidity")?;
    println!("Liquidity removed successfully!");
    println!("  Transaction: {:?}", outcome.hash);

    Ok(())
}

async fn quote_swap(config: &ExchangeConfig, amount: &str, direction: SwapDirection) -> Result<()> {
    let client = ExchangeClient::connect_read_only(config)?;
    let input = parse_amount(amount)?;
    let output = client.quote_swap(input, direction).await?;
    println!("{} in -> {} out", format_amount(input), format_amount(output));
    Ok(())
}

async fn swap(
    config: &ExchangeConfig,
    amount: &str,
    direction: SwapDirection,
    slippage_bps: u64,
    min_output: Option<&str>,
    wallet: LocalWallet,
) -> Result<()> {
    println!("Swapping ({:?})...", direction);
    println!("  Account: {:?}", wallet.address());

    let client = ExchangeClient::connect(config, wallet)?;
    let input = parse_amount(amount)?;
    let min_out: U256 = match min_output {
        Some(min_output) => parse_amount(min_output)?,
        None => {
            let estimate = client.quote_swap(input, direction).await?;
            println!("  Quoted Output: {}", format_amount(estimate));
            min_output_with_slippage(estimate, slippage_bps)?
        }
    };
    println!("  Input: {}", format_amount(input));
    println!("  Minimum Output: {}", format_amount(min_out));

    let receipt = client
        .swap(input, min_out, direction)
        .await
        .context("Swap failed")?;
    println!("Swap completed successfully!");
    if let Some(approval) = receipt.approval {
        println!("  Approval Transaction: {:?}", approval.hash);
    }
    println!("  Swap Transaction: {:?}", receipt.swap.hash);

    Ok(())
}
