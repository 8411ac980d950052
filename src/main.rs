//! wallet-catalog command-line interface.
//!
//! # Architecture Overview
//!
//! ```text
//!   args + config.toml + WALLET_CATALOG_* env
//!              │
//!              ▼
//!   ┌──────────────────┐    ┌──────────────────────────────────────────┐
//!   │ config::load     │───▶│ command                                  │
//!   └──────────────────┘    │  derive / explorer / currency → currency │
//!                           │  keystore                     → keystore │
//!                           │  ticker / book / balances     → exchanges│
//!                           │  mint        → minting + blockchain      │
//!                           │  oracles / marketplaces       → catalog  │
//!                           └───────────────────┬──────────────────────┘
//!                                               ▼
//!                                  JSON on stdout, logs on stderr
//! ```

use std::error::Error;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use futures_util::future::join_all;
use serde::Serialize;
use serde_json::json;

use wallet_catalog::blockchain::{BlockchainClient, TxBuilder, Wallet};
use wallet_catalog::catalog::{marketplaces, oracles};
use wallet_catalog::config::{load_with_env, CatalogConfig};
use wallet_catalog::currency::{self, CurrencyDescriptor};
use wallet_catalog::exchanges::{build_client, ExchangeKind};
use wallet_catalog::minting::{
    build_pinning_service, EvmNftMinter, MintError, MintPipeline, MintRequest, NftMetadata,
};
use wallet_catalog::observability::{logging, metrics};

/// Keystore password source when `--password` is not given.
const KEYSTORE_PASSWORD_ENV_VAR: &str = "WALLET_CATALOG_KEYSTORE_PASSWORD";

#[derive(Parser)]
#[command(name = "wallet-catalog")]
#[command(about = "Wallet reference catalog: keys, explorers, exchanges, minting", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides observability.log_level
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive public key and address from a private key or mnemonic
    Derive {
        /// Currency ticker, e.g. ATOM, XLM, XRP, ETH
        currency: String,
        /// Key material; read from stdin when omitted
        #[arg(long)]
        key: Option<String>,
    },
    /// Block-explorer link for an address or transaction
    Explorer {
        currency: String,
        #[arg(long, conflicts_with = "tx", required_unless_present = "tx")]
        address: Option<String>,
        #[arg(long)]
        tx: Option<String>,
    },
    /// List currencies, or show one
    Currency { ticker: Option<String> },
    /// Decrypt a keystore file and show what it unlocks
    Keystore {
        file: PathBuf,
        /// Derive the identity for this currency from the decrypted key
        #[arg(long)]
        currency: Option<String>,
        /// Falls back to WALLET_CATALOG_KEYSTORE_PASSWORD, then stdin
        #[arg(long)]
        password: Option<String>,
        /// Print the decrypted secret
        #[arg(long)]
        reveal: bool,
    },
    /// Latest ticker for a pair; `all` queries every exchange concurrently
    Ticker { exchange: String, symbol: String },
    /// Order book snapshot
    Book {
        exchange: String,
        symbol: String,
        #[arg(long, default_value_t = 10)]
        depth: usize,
    },
    /// Non-zero account balances (needs credentials)
    Balances { exchange: String },
    /// Pin an asset and its metadata, then mint an ERC-721 token
    Mint {
        file: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        recipient: String,
        #[arg(long)]
        external_url: Option<String>,
        /// Repeatable `trait=value`
        #[arg(long = "attribute")]
        attributes: Vec<String>,
    },
    /// Price-oracle descriptors
    Oracles {
        #[arg(long)]
        chain: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// NFT marketplace descriptors
    Marketplaces {
        #[arg(long)]
        chain: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut config = load_with_env(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        config.observability.log_level = level.clone();
    }
    logging::init_logging(&config.observability);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!(error = %e, "Command failed");
        return Err(e);
    }
    Ok(())
}

async fn run(command: Commands, config: &CatalogConfig) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Derive { currency, key } => {
            let descriptor = lookup_currency(&currency)?;
            let key = match key {
                Some(key) => key,
                None => read_stdin_line()?,
            };
            let identity = descriptor.derive(&key)?;
            print_json(&json!({
                "currency": descriptor.ticker,
                "identity": identity,
                "explorer": descriptor.block_explorer_link(identity.address()),
            }))
        }
        Commands::Explorer {
            currency,
            address,
            tx,
        } => {
            let descriptor = lookup_currency(&currency)?;
            let link = match (address, tx) {
                (Some(address), _) => descriptor.block_explorer_link(&address),
                (None, Some(tx)) => descriptor.transaction_link(&tx),
                (None, None) => return Err("either --address or --tx is required".into()),
            };
            print_json(&json!({ "currency": descriptor.ticker, "url": link }))
        }
        Commands::Currency { ticker } => match ticker {
            Some(ticker) => print_json(lookup_currency(&ticker)?),
            None => print_json(&currency::all()),
        },
        Commands::Keystore {
            file,
            currency,
            password,
            reveal,
        } => {
            let document = tokio::fs::read_to_string(&file).await?;
            let keystore = wallet_catalog::keystore::Keystore::from_json(&document)?;
            let password = match password.or_else(|| std::env::var(KEYSTORE_PASSWORD_ENV_VAR).ok()) {
                Some(password) => password,
                None => read_stdin_line()?,
            };
            let secret = wallet_catalog::keystore::decrypt(&keystore, &password)?;
            tracing::info!(kind = keystore.kind(), bytes = secret.len(), "Keystore decrypted");

            let mut output = json!({ "kind": keystore.kind(), "bytes": secret.len() });
            if let Some(ticker) = currency {
                let descriptor = lookup_currency(&ticker)?;
                let identity = match secret.as_utf8().filter(|_| secret.secret_key().is_none()) {
                    Some(text) => descriptor.derive(text)?,
                    None => descriptor.derive(&secret.to_hex())?,
                };
                output["identity"] = serde_json::to_value(&identity)?;
            }
            if reveal {
                output["secret"] = match secret.as_utf8().filter(|_| secret.secret_key().is_none()) {
                    Some(text) => json!(text),
                    None => json!(secret.to_hex().as_str()),
                };
            }
            print_json(&output)
        }
        Commands::Ticker { exchange, symbol } if exchange.eq_ignore_ascii_case("all") => {
            let clients = ExchangeKind::ALL
                .iter()
                .map(|kind| exchange_client(kind.as_str(), config))
                .collect::<Result<Vec<_>, _>>()?;
            let results = join_all(clients.iter().map(|client| client.ticker(&symbol))).await;

            let rows: Vec<_> = clients
                .iter()
                .zip(results)
                .map(|(client, result)| match result {
                    Ok(ticker) => json!({ "exchange": client.name(), "ticker": ticker }),
                    Err(e) => json!({ "exchange": client.name(), "error": e.to_string() }),
                })
                .collect();
            print_json(&rows)
        }
        Commands::Ticker { exchange, symbol } => {
            let client = exchange_client(&exchange, config)?;
            print_json(&client.ticker(&symbol).await?)
        }
        Commands::Book {
            exchange,
            symbol,
            depth,
        } => {
            let client = exchange_client(&exchange, config)?;
            print_json(&client.order_book(&symbol, depth).await?)
        }
        Commands::Balances { exchange } => {
            let client = exchange_client(&exchange, config)?;
            print_json(&client.balances().await?)
        }
        Commands::Mint {
            file,
            name,
            description,
            recipient,
            external_url,
            attributes,
        } => {
            let content = tokio::fs::read(&file).await?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "asset".to_string());

            let mut metadata = NftMetadata::new(name, description, String::new());
            if let Some(url) = external_url {
                metadata = metadata.with_external_url(url);
            }
            for attribute in &attributes {
                let (trait_type, value) = attribute
                    .split_once('=')
                    .ok_or_else(|| format!("attribute '{}' is not trait=value", attribute))?;
                metadata = metadata.with_attribute(trait_type, json!(value));
            }

            let pipeline = mint_pipeline(config).await?;
            let receipt = pipeline
                .run(MintRequest {
                    file_name,
                    content,
                    metadata,
                    recipient,
                })
                .await?;
            print_json(&receipt)
        }
        Commands::Oracles { chain, name } => match (name, chain) {
            (Some(name), _) => print_json(
                oracles::find(&name).ok_or_else(|| format!("Unknown oracle: {}", name))?,
            ),
            (None, Some(chain)) => print_json(&oracles::for_chain(&chain)),
            (None, None) => print_json(&oracles::all()),
        },
        Commands::Marketplaces { chain, name } => match (name, chain) {
            (Some(name), _) => print_json(
                marketplaces::find(&name).ok_or_else(|| format!("Unknown marketplace: {}", name))?,
            ),
            (None, Some(chain)) => print_json(&marketplaces::for_chain(&chain)),
            (None, None) => print_json(&marketplaces::all()),
        },
    }
}

fn lookup_currency(ticker: &str) -> Result<&'static CurrencyDescriptor, Box<dyn Error>> {
    currency::find(ticker).ok_or_else(|| format!("Unknown currency: {}", ticker).into())
}

fn exchange_client(
    name: &str,
    config: &CatalogConfig,
) -> Result<Box<dyn wallet_catalog::ExchangeClient>, Box<dyn Error>> {
    let kind: ExchangeKind = name.parse()?;
    Ok(build_client(kind, config.exchanges.get(kind.as_str()), &config.http)?)
}

async fn mint_pipeline(config: &CatalogConfig) -> Result<MintPipeline, Box<dyn Error>> {
    let contract: Address = config
        .minting
        .contract_address
        .as_deref()
        .ok_or(MintError::NoContract)?
        .parse()?;

    let client = BlockchainClient::new(config.blockchain.clone())?;
    client.verify_chain_id().await?;
    let wallet = Wallet::from_env(config.blockchain.chain_id)?;
    tracing::info!(minter = %wallet.address(), contract = %contract, "Minting wallet loaded");

    let minter = EvmNftMinter::new(
        TxBuilder::new(client, wallet),
        contract,
        config.minting.confirmation_timeout_secs,
    );
    let pinning = build_pinning_service(&config.pinning, &config.http)?;
    Ok(MintPipeline::new(pinning, Arc::new(minter)))
}

fn read_stdin_line() -> Result<String, Box<dyn Error>> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let line = line.trim_end_matches(['\r', '\n']).to_string();
    if line.is_empty() {
        return Err("no input on stdin".into());
    }
    Ok(line)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
