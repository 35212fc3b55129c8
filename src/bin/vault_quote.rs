//! Command-line access to a handle.fi vault.
//!
//! Bootstraps the vault configuration over JSON-RPC, seeds the state mirror
//! at a block and prices swaps against the live oracle:
//! - TOML config file with CLI overrides
//! - Swap quotes for one or more input amounts
//! - Encoded signed-quote payloads for the price feed
//! - Structured logging with tracing

use std::{path::Path, sync::Arc};

use alloy::{
    primitives::{Address, U256},
    providers::{Provider, ProviderBuilder},
};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::info;

use handlefi_rust_sdk::{
    logging::{init_logging, LogConfig, LogFormat},
    oracle::token_for,
    BlockTag, DexParams, HandleFiPool, InMemoryCache, OracleClient, PoolServices,
    ProviderMulticall, MULTICALL_ADDRESS, ORACLE_URL,
};
use tracing_appender::non_blocking::WorkerGuard;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser)]
#[command(name = "vault_quote")]
#[command(version, about = "handle.fi vault pricing tool", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "vault_quote.toml")]
    config: String,

    /// JSON-RPC endpoint (overrides config)
    #[arg(long, env = "HANDLEFI_RPC_URL")]
    rpc_url: Option<String>,

    /// Oracle base URL (overrides config)
    #[arg(long)]
    oracle_url: Option<String>,

    /// Block to read at (default: chain head)
    #[arg(long)]
    block: Option<u64>,

    /// Log filter directive (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output format (pretty, json, compact)
    #[arg(long)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a sample config file
    GenerateConfig {
        /// Output file path
        #[arg(short, long, default_value = "vault_quote.toml")]
        output: String,
    },
    /// Validate config without connecting
    ValidateConfig,
    /// Print the vault configuration read from chain
    Config,
    /// Quote a swap for each input amount
    Quote {
        /// Input token address or currency symbol (e.g. ETH, fxUSD)
        token_in: String,
        /// Output token address or currency symbol
        token_out: String,
        /// Raw input amounts in token units
        #[arg(required = true)]
        amounts: Vec<String>,
    },
    /// Fetch signed oracle quotes and print the encoded payload
    SignedQuotes {
        /// Token addresses or currency symbols
        #[arg(required = true)]
        tokens: Vec<String>,
    },
}

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub dex: DexParams,
    #[serde(default)]
    pub logging: LogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint (prefer HANDLEFI_RPC_URL)
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_oracle_url")]
    pub oracle_url: String,
    /// Multicall contract used for batched reads
    #[serde(default = "default_multicall")]
    pub multicall: Address,
}

fn default_rpc_url() -> String {
    "https://arb1.arbitrum.io/rpc".to_string()
}

fn default_oracle_url() -> String {
    ORACLE_URL.to_string()
}

fn default_multicall() -> Address {
    MULTICALL_ADDRESS
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            oracle_url: default_oracle_url(),
            multicall: default_multicall(),
        }
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (before parsing CLI args)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match &cli.command {
        Commands::GenerateConfig { output } => {
            generate_sample_config(output)?;
            return Ok(());
        }
        Commands::ValidateConfig => {
            let config = load_config(&cli)?;
            println!("Configuration is valid:\n{:#?}", config);
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(&cli)?;
    let _guards = setup_logging(&config, &cli)?;

    let rpc_url = cli.rpc_url.as_deref().unwrap_or(&config.network.rpc_url);
    let oracle_url = cli
        .oracle_url
        .as_deref()
        .unwrap_or(&config.network.oracle_url);

    let provider = ProviderBuilder::new().connect_http(rpc_url.parse()?);
    let block = match cli.block {
        Some(block) => block,
        None => provider.get_block_number().await?,
    };

    let oracle = Arc::new(OracleClient::new(None, Some(oracle_url)));
    let services = PoolServices {
        caller: Arc::new(ProviderMulticall::with_address(
            provider,
            config.network.multicall,
        )),
        prices: oracle.clone(),
        quotes: oracle,
        cache: Arc::new(InMemoryCache::new()),
    };

    info!(
        rpc = %rpc_url,
        oracle = %oracle_url,
        vault = %config.dex.vault,
        block = block,
        "Bootstrapping vault"
    );
    let pool =
        HandleFiPool::bootstrap("HandleFi", &config.dex, services, BlockTag::Number(block)).await?;

    match &cli.command {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(pool.config())?);
        }
        Commands::Quote {
            token_in,
            token_out,
            amounts,
        } => {
            let token_in = parse_token(token_in)?;
            let token_out = parse_token(token_out)?;
            let amounts = parse_amounts(amounts)?;

            pool.initialize(block).await?;
            match pool
                .get_amount_out(token_in, token_out, &amounts, block)
                .await?
            {
                Some(outputs) => {
                    for (amount_in, amount_out) in amounts.iter().zip(&outputs) {
                        println!("{amount_in} -> {amount_out}");
                    }
                }
                None => println!("Pair {token_in} -> {token_out} is not quotable"),
            }
        }
        Commands::SignedQuotes { tokens } => {
            let tokens = tokens
                .iter()
                .map(|t| parse_token(t))
                .collect::<Result<Vec<_>, _>>()?;
            let payload = pool.fetch_encoded_signed_quotes(&tokens).await?;
            println!("{payload}");
        }
        Commands::GenerateConfig { .. } | Commands::ValidateConfig => {}
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn load_config(cli: &Cli) -> Result<AppConfig, Box<dyn std::error::Error>> {
    load_config_from(&cli.config)
}

fn load_config_from(config_path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    if Path::new(config_path).exists() {
        let content = std::fs::read_to_string(config_path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    } else {
        // Return default config if file doesn't exist
        Ok(AppConfig::default())
    }
}

fn setup_logging(
    config: &AppConfig,
    cli: &Cli,
) -> Result<Vec<WorkerGuard>, Box<dyn std::error::Error>> {
    let mut logging = config.logging.clone();
    if let Some(format) = &cli.log_format {
        logging.stdout_format = parse_log_format(format)?;
    }
    init_logging(&logging, cli.log_level.as_deref())
}

fn parse_log_format(s: &str) -> Result<LogFormat, Box<dyn std::error::Error>> {
    match s.to_lowercase().as_str() {
        "pretty" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        "compact" => Ok(LogFormat::Compact),
        _ => Err(format!("Unknown log format '{}'. Use: pretty, json, compact", s).into()),
    }
}

/// Accept either a hex address or an oracle currency symbol.
fn parse_token(s: &str) -> Result<Address, Box<dyn std::error::Error>> {
    if s.starts_with("0x") {
        return Ok(s.parse()?);
    }
    token_for(s).ok_or_else(|| Box::<dyn std::error::Error>::from(format!("Unknown token '{}'", s)))
}

fn parse_amounts(raw: &[String]) -> Result<Vec<U256>, Box<dyn std::error::Error>> {
    raw.iter()
        .map(|s| {
            s.parse::<U256>().map_err(|e| {
                Box::<dyn std::error::Error>::from(format!("Invalid amount '{}': {}", s, e))
            })
        })
        .collect()
}

fn generate_sample_config(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let sample = AppConfig::default();
    let content = toml::to_string_pretty(&sample)?;

    let with_comments = format!(
        r#"# handle.fi Vault Quote Configuration
# See: cargo run --bin vault_quote -- --help

{}
# Note: the RPC endpoint can also be set via HANDLEFI_RPC_URL
"#,
        content
    );

    std::fs::write(path, with_comments)?;
    println!("Sample config written to: {}", path);
    Ok(())
}
