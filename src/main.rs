//! Command-line client for the NFT marketplace.
//!
//! Loads `marketplace.toml` (or the file given with `--config`), detects the
//! wallet provider and runs one marketplace operation, printing the result
//! as JSON. `watch` follows account and network changes until Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;

use marketplace_client::config::{load_config, validate_config, ConfigError, MarketplaceConfig};
use marketplace_client::contract::{NftData, Royalty};
use marketplace_client::lifecycle::signals::shutdown_on_ctrl_c;
use marketplace_client::lifecycle::Shutdown;
use marketplace_client::marketplace::{parse_eth, NewProject};
use marketplace_client::notify::LogNotifier;
use marketplace_client::observability::logging;
use marketplace_client::provider::ProviderEventWatcher;
use marketplace_client::{Marketplace, MarketplaceError};

#[derive(Parser)]
#[command(name = "marketplace")]
#[command(about = "Wallet and contract client for the NFT marketplace", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "marketplace.toml")]
    config: PathBuf,

    /// Overrides `wallet.provider_url`.
    #[arg(long)]
    provider_url: Option<String>,

    /// Overrides `contract.address`.
    #[arg(long)]
    contract: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Request account access and check the network
    Connect,
    /// Sign the login message
    Sign,
    /// Show the connected account's balance
    Balance,
    /// Create an item for a backend record
    CreateNft {
        /// Backend record id, unset again if creation fails
        #[arg(long)]
        id: String,
        #[arg(long)]
        meta: String,
        /// Price in ether
        #[arg(long)]
        price: String,
        #[arg(long, default_value_t = 1)]
        copies: u64,
        /// Royalty as `receiver:basis_points`, repeatable
        #[arg(long = "royalty")]
        royalties: Vec<String>,
    },
    /// Mint copies of an item
    Mint {
        #[arg(long)]
        creator: Address,
        #[arg(long)]
        meta: String,
        /// Price in ether
        #[arg(long)]
        price: String,
        #[arg(long, default_value_t = 1)]
        copies: u64,
        /// Ether to pay
        #[arg(long)]
        amount: Option<String>,
    },
    /// Change an item's price and listing
    ChangePrice {
        token_id: U256,
        /// New price in ether
        #[arg(long)]
        price: String,
        /// Take the item off sale
        #[arg(long)]
        unlist: bool,
    },
    /// Buy an item
    Buy {
        nft_id: U256,
        #[arg(long)]
        owner: Address,
        #[arg(long)]
        creator: Address,
        /// Ether to pay
        #[arg(long)]
        amount: String,
    },
    /// Create a funding project for a backend record
    CreateProject {
        /// Backend record id, unset again if creation fails
        #[arg(long)]
        id: String,
        #[arg(long)]
        meta: String,
        /// Budget in ether
        #[arg(long)]
        budget: String,
        /// Deadline as a unix timestamp
        #[arg(long)]
        deadline: u64,
    },
    /// Fund a project
    Fund {
        project_id: U256,
        /// Ether to pay
        #[arg(long)]
        amount: String,
    },
    /// Withdraw a project's funds
    Withdraw { project_id: U256 },
    /// Follow account and network changes until Ctrl-C
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (mut config, from_file) = if cli.config.exists() {
        (load_config(&cli.config)?, true)
    } else {
        (MarketplaceConfig::default(), false)
    };
    if let Some(provider_url) = cli.provider_url {
        config.wallet.provider_url = Some(provider_url);
    }
    if let Some(contract) = cli.contract {
        config.contract.address = contract;
    }

    logging::init(&config.observability.log_level);
    if !from_file {
        tracing::warn!(path = %cli.config.display(), "Config file not found, using defaults");
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    let marketplace = Marketplace::from_config(config, Arc::new(LogNotifier))?;

    let outcome = match cli.command {
        Commands::Connect => print_result(marketplace.connect_wallet().await),
        Commands::Sign => print_result(marketplace.sign_request().await),
        Commands::Balance => print_result(marketplace.balance().await),
        Commands::CreateNft {
            id,
            meta,
            price,
            copies,
            royalties,
        } => {
            let royalties = royalties
                .iter()
                .map(|r| parse_royalty(r))
                .collect::<Result<Vec<_>, _>>()?;
            let nft = NftData {
                creator: Address::ZERO,
                metaData: meta,
                price: parse_eth(&price)?,
                copies: U256::from(copies),
            };
            print_result(marketplace.create_nft(&id, nft, royalties).await)
        }
        Commands::Mint {
            creator,
            meta,
            price,
            copies,
            amount,
        } => {
            let nft = NftData {
                creator,
                metaData: meta,
                price: parse_eth(&price)?,
                copies: U256::from(copies),
            };
            print_result(marketplace.mint_nfts(nft, amount.as_deref()).await)
        }
        Commands::ChangePrice {
            token_id,
            price,
            unlist,
        } => print_status(
            marketplace
                .change_selling_config(token_id, !unlist, &price)
                .await,
        ),
        Commands::Buy {
            nft_id,
            owner,
            creator,
            amount,
        } => print_status(marketplace.buy_nft(nft_id, owner, creator, &amount).await),
        Commands::CreateProject {
            id,
            meta,
            budget,
            deadline,
        } => {
            let project = NewProject {
                meta_data: meta,
                budget,
                deadline: U256::from(deadline),
            };
            print_result(marketplace.create_project(&id, project).await)
        }
        Commands::Fund { project_id, amount } => {
            print_result(marketplace.fund_project(project_id, &amount).await)
        }
        Commands::Withdraw { project_id } => {
            print_status(marketplace.withdraw_project_funds(project_id).await)
        }
        Commands::Watch => watch(&marketplace).await,
    };

    // A failed creation leaves its backend rollback in flight.
    marketplace.flush_rollbacks().await;
    outcome
}

/// Poll the provider for account and network changes and feed them into
/// the wallet session until Ctrl-C.
async fn watch(marketplace: &Marketplace) -> Result<(), Box<dyn std::error::Error>> {
    let provider = marketplace
        .provider()
        .ok_or(MarketplaceError::ProviderUnavailable)?;
    let interval = Duration::from_millis(marketplace.config().wallet.event_poll_interval_ms);

    let watcher = ProviderEventWatcher::new(provider, interval);
    let events = watcher.subscribe();
    let shutdown = Shutdown::new();

    let session = marketplace.session().clone();
    let mut status = session.subscribe();
    let watcher_task = tokio::spawn(watcher.run(shutdown.subscribe()));
    let session_task = {
        let shutdown_rx = shutdown.subscribe();
        tokio::spawn(async move { session.run(events, shutdown_rx).await })
    };
    let printer = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let current = status.borrow_and_update().clone();
            tracing::info!(
                account = ?current.account,
                chain_id = ?current.chain_id,
                error = ?current.error,
                session_cleared = current.session_cleared,
                "Wallet status changed"
            );
        }
    });

    tracing::info!("Watching wallet, press Ctrl-C to stop");
    shutdown_on_ctrl_c(&shutdown).await;

    let _ = watcher_task.await;
    let _ = session_task.await;
    printer.abort();
    Ok(())
}

/// Parse `receiver:basis_points`.
fn parse_royalty(input: &str) -> Result<Royalty, String> {
    let (receiver, basis_points) = input
        .split_once(':')
        .ok_or_else(|| format!("royalty '{}' must look like receiver:basis_points", input))?;
    let receiver: Address = receiver
        .trim()
        .parse()
        .map_err(|e| format!("royalty receiver '{}': {}", receiver, e))?;
    let basis_points: u64 = basis_points
        .trim()
        .parse()
        .map_err(|e| format!("royalty basis points '{}': {}", basis_points, e))?;
    if basis_points > 10_000 {
        return Err(format!("royalty basis points {} exceed 10000", basis_points));
    }

    Ok(Royalty {
        receiver,
        basisPoints: U256::from(basis_points),
    })
}

fn print_result<T: Serialize>(result: Option<T>) -> Result<(), Box<dyn std::error::Error>> {
    match result {
        Some(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        None => Err("operation failed, see log for details".into()),
    }
}

fn print_status(success: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&json!({ "success": success }))?);
    if success {
        Ok(())
    } else {
        Err("transaction failed or reverted".into())
    }
}
