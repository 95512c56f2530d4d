//! Soroban Vault Client CLI
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI command
//!       │
//!       ▼
//!   ┌──────────────────────────────────────────────────────────┐
//!   │                        AppState                          │
//!   │                                                          │
//!   │  network store ──▶ wallet session ──▶ transaction        │
//!   │  (ArcSwap)         (WalletKit +        pipeline ─────────┼──▶ relay (sponsored)
//!   │                     providers)            │              │
//!   │                                           ├──────────────┼──▶ Soroban RPC
//!   │  vault reader ──▶ query cache             │              │
//!   │  (simulations)    (DashMap)          lifecycle tracker   │
//!   │                                      (watch channel) ────┼──▶ status output
//!   └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The wallet session lives for one invocation; network and wallet choice
//! persist in the preferences file.

use clap::{Args, Parser, Subcommand};
use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use vault_client::config::load_or_default;
use vault_client::display;
use vault_client::observability::init_logging;
use vault_client::transaction::TransactionResult;
use vault_client::vault::units::parse_amount;
use vault_client::vault::{DeployParams, TokenMetadata, VaultSnapshot};
use vault_client::wallet::FixedChooser;
use vault_client::AppState;

#[derive(Parser)]
#[command(name = "vault-client")]
#[command(about = "Client for Soroban lending vaults", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wallet provider id to connect with.
    #[arg(short, long, global = true)]
    wallet: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or change the active network
    #[command(subcommand)]
    Network(NetworkCommand),
    /// Connect a wallet and remember the provider
    Connect,
    /// Forget the wallet session
    Disconnect,
    /// Token balance of the connected account
    Balance { token: String },
    /// Read or act on a vault
    #[command(subcommand)]
    Vault(VaultCommand),
    /// Deploy a new vault
    Deploy(DeployArgs),
}

#[derive(Subcommand)]
enum NetworkCommand {
    /// Print the active network
    Show,
    /// Switch to a preset (testnet, mainnet)
    Use { name: String },
    /// Switch to a custom network
    Custom {
        #[arg(long)]
        rpc_url: String,
        #[arg(long)]
        indexer_url: String,
        #[arg(long)]
        passphrase: String,
        #[arg(long)]
        explorer_url: Option<String>,
    },
    /// Submit through the sponsored relay
    RelayEnable {
        /// Relay JWT; defaults to VAULT_CLIENT_RELAY_JWT.
        #[arg(long)]
        credential: Option<String>,
    },
    /// Submit directly through RPC
    RelayDisable,
}

#[derive(Subcommand)]
enum VaultCommand {
    /// Print vault statistics and your position
    Show {
        id: String,
        /// Keep refreshing the countdown and data
        #[arg(long)]
        watch: bool,
    },
    /// Deposit underlying tokens
    Deposit { id: String, amount: String },
    /// Queue shares for redemption
    RequestRedeem { id: String, shares: String },
    /// Complete an unlocked redemption
    Redeem { id: String },
    /// Complete a locked redemption, paying the penalty
    EmergencyRedeem { id: String },
    /// Cancel a pending redemption
    CancelRedeem { id: String },
}

#[derive(Args)]
struct DeployArgs {
    /// Underlying token contract
    #[arg(long)]
    token: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    symbol: String,
    /// Strategy address; repeat for several
    #[arg(long = "strategy", required = true)]
    strategies: Vec<String>,
    /// Redemption lock in seconds
    #[arg(long, default_value_t = 86_400)]
    lock_time: u64,
    /// Early redemption penalty in percent
    #[arg(long, default_value = "10")]
    penalty: String,
    /// Minimum liquidity kept in the vault, in percent
    #[arg(long, default_value = "10")]
    min_liquidity: String,
    #[arg(long)]
    vault_wasm_hash: Option<String>,
    #[arg(long)]
    token_wasm_hash: Option<String>,
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_or_default(cli.config.as_deref())?;
    init_logging(&config.observability)?;

    tracing::debug!(
        preferences = %config.preferences_path(),
        "Configuration loaded"
    );

    let app = AppState::from_config(config)?;

    match cli.command {
        Commands::Network(command) => run_network(&app, command).await?,
        Commands::Connect => {
            connect(&app, cli.wallet).await?;
            println!("Wallet provider saved; it will be used for the next commands.");
        }
        Commands::Disconnect => {
            app.disconnect().await;
            println!("Disconnected");
        }
        Commands::Balance { token } => {
            connect(&app, cli.wallet).await?;
            let balance = app.token_balance(&token).await?;
            let metadata = token_metadata(&app, &token).await;
            println!("{}", display::format_tokens(balance, &metadata));
        }
        Commands::Vault(command) => run_vault(&app, cli.wallet, command).await?,
        Commands::Deploy(args) => {
            connect(&app, cli.wallet).await?;
            let (default_vault_hash, default_token_hash) = app.default_wasm_hashes();
            let params = DeployParams {
                token: args.token,
                name: args.name,
                symbol: args.symbol,
                strategies: args.strategies,
                lock_time_secs: args.lock_time,
                penalty_percent: args.penalty,
                min_liquidity_percent: args.min_liquidity,
                vault_wasm_hash: args.vault_wasm_hash.unwrap_or(default_vault_hash),
                token_wasm_hash: args.token_wasm_hash.unwrap_or(default_token_hash),
            };
            let watcher = spawn_status_watcher(&app);
            let (plan, result) = app.deploy(&params).await?;
            watcher.abort();
            report(&app, &result);
            if result.success {
                println!("Vault deployed at {}", plan.contract_id);
                println!("  {}", app.network().contract_url(&plan.contract_id));
            }
        }
    }

    Ok(())
}

async fn run_network(
    app: &AppState,
    command: NetworkCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        NetworkCommand::Show => {}
        NetworkCommand::Use { name } => app.use_preset(&name).await?,
        NetworkCommand::Custom {
            rpc_url,
            indexer_url,
            passphrase,
            explorer_url,
        } => {
            app.use_custom(&rpc_url, &indexer_url, &passphrase, explorer_url.as_deref())
                .await?
        }
        NetworkCommand::RelayEnable { credential } => {
            let credential = credential
                .or_else(|| app.config().relay.credential.clone())
                .ok_or("no relay credential given; pass --credential or set VAULT_CLIENT_RELAY_JWT")?;
            app.enable_relay(&credential).await?
        }
        NetworkCommand::RelayDisable => app.disable_relay().await?,
    }
    println!("{}", display::render_network(&app.network()));
    Ok(())
}

async fn run_vault(
    app: &AppState,
    wallet: Option<String>,
    command: VaultCommand,
) -> Result<(), Box<dyn std::error::Error>> {
    let action = match command {
        VaultCommand::Show { id, watch } => {
            // Reads work without a wallet; the position needs one.
            if let Err(e) = connect(app, wallet).await {
                tracing::debug!(error = %e, "Showing vault without a position");
            }
            return show_vault(app, &id, watch).await;
        }
        action => action,
    };

    connect(app, wallet).await?;
    let watcher = spawn_status_watcher(app);
    let result = match action {
        VaultCommand::Show { .. } => unreachable!("handled above"),
        VaultCommand::Deposit { id, amount } => {
            preview(app, &id, &amount, display::deposit_preview).await;
            app.deposit(&id, &amount).await
        }
        VaultCommand::RequestRedeem { id, shares } => {
            preview(app, &id, &shares, display::redeem_preview).await;
            app.request_redeem(&id, &shares).await
        }
        VaultCommand::Redeem { id } => app.redeem(&id).await,
        VaultCommand::EmergencyRedeem { id } => app.emergency_redeem(&id).await,
        VaultCommand::CancelRedeem { id } => app.cancel_redeem(&id).await,
    };
    watcher.abort();

    report(app, &result?);
    Ok(())
}

async fn connect(app: &AppState, wallet: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let wallet = match wallet {
        Some(id) => Some(id),
        None => app.selected_wallet_id().await,
    };
    if !app.connect(&FixedChooser::new(wallet)).await {
        return Err(format!(
            "unable to connect a wallet; set {} or pass --wallet",
            vault_client::wallet::SECRET_KEY_ENV_VAR
        )
        .into());
    }
    let session = app.session().await;
    if let Some(address) = session.address() {
        println!("Connected {}", address);
    }
    Ok(())
}

/// Metadata for `token`, or a generic stand-in when it cannot be read.
async fn token_metadata(app: &AppState, token: &str) -> TokenMetadata {
    app.token_metadata(token).await.unwrap_or_else(|e| {
        tracing::warn!(token = %token, error = %e, "Token metadata unavailable");
        TokenMetadata::unknown()
    })
}

/// Print what the action will produce at the current price. Failures only
/// log; the action itself reports any real problem.
async fn preview(
    app: &AppState,
    vault_id: &str,
    amount: &str,
    render: fn(&VaultSnapshot, &TokenMetadata, i128) -> String,
) {
    let Ok(value) = parse_amount(amount) else {
        return;
    };
    match app.vault(vault_id).await {
        Ok(snapshot) => {
            let metadata = token_metadata(app, &snapshot.token).await;
            println!("{}", render(&snapshot, &metadata, value));
        }
        Err(e) => tracing::debug!(vault = %vault_id, error = %e, "Preview unavailable"),
    }
}

async fn show_vault(
    app: &AppState,
    vault_id: &str,
    watch: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = app.vault(vault_id).await?;
    let metadata = token_metadata(app, &snapshot.token).await;
    println!(
        "{}",
        display::render_snapshot(&snapshot, &metadata, &app.network(), now_unix())
    );
    if !watch {
        return Ok(());
    }

    watch_vault(app, vault_id, snapshot, &metadata, tokio::signal::ctrl_c()).await;
    Ok(())
}

/// Redraw every second and refetch on the configured interval until
/// `shutdown` resolves. `shutdown` is polled across iterations, so a signal
/// that arrives during a refetch still stops the loop.
async fn watch_vault<F: Future>(
    app: &AppState,
    vault_id: &str,
    mut snapshot: VaultSnapshot,
    metadata: &TokenMetadata,
    shutdown: F,
) {
    let refetch = Duration::from_secs(app.config().cache.refetch_interval_secs.max(1));
    let mut countdown = tokio::time::interval(Duration::from_secs(1));
    let mut refresh = tokio::time::interval(refetch);
    refresh.tick().await;

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = countdown.tick() => {}
            _ = refresh.tick() => {
                let refetched = tokio::select! {
                    result = app.refresh_vault(vault_id) => result,
                    _ = &mut shutdown => break,
                };
                match refetched {
                    Ok(fresh) => snapshot = fresh,
                    Err(e) => tracing::warn!(vault = %vault_id, error = %e, "Vault refetch failed"),
                }
            }
        }
        print!("\x1b[2J\x1b[H");
        println!(
            "{}",
            display::render_snapshot(&snapshot, metadata, &app.network(), now_unix())
        );
    }
}

/// Print lifecycle progress while a submission is in flight.
fn spawn_status_watcher(app: &AppState) -> tokio::task::JoinHandle<()> {
    let mut rx = app.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let status = rx.borrow_and_update().status;
            if status.is_in_flight() {
                println!("{}", display::status_message(status));
            }
        }
    })
}

fn report(app: &AppState, result: &TransactionResult) {
    println!(
        "{}",
        display::render_tx_state(&app.tracker().current(), &app.network())
    );
    if let Some(value) = result.decoded_return_value() {
        tracing::debug!(return_value = ?value, "Contract returned");
    }
    if !result.success {
        std::process::exit(1);
    }
}
