//! Application state: owns every subsystem and exposes the user actions.
//!
//! # Responsibilities
//! - Wire network store, wallet session, lifecycle tracker and pipeline
//! - Restore and persist preferences (network, chosen wallet)
//! - Validate action input before any network call
//! - Drop dependent read caches after a successful transaction

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

use crate::cache::{QueryCache, QueryKey, QueryScope};
use crate::codec::{CodecError, EncodedOperation};
use crate::config::{ClientConfig, PreferenceStore, Preferences};
use crate::network::{NetworkConfig, NetworkError, NetworkStore};
use crate::relay::{is_valid_jwt, RelayError};
use crate::rpc::{HttpConnector, RpcConnector};
use crate::transaction::{
    PipelineSettings, SimulationResult, TransactionPipeline, TransactionResult, TxState, TxTracker,
};
use crate::vault::deploy::random_salt;
use crate::vault::units::parse_amount;
use crate::vault::{
    DeployParams, DeployPlan, TokenMetadata, VaultContract, VaultError, VaultReader, VaultSnapshot,
};
use crate::wallet::{
    LocalKeyProvider, SessionManager, WalletChooser, WalletError, WalletKit, WalletProvider,
    WalletSession,
};

/// Failures raised before a transaction reaches the pipeline.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("Failed to save preferences: {0}")]
    Preferences(#[from] std::io::Error),
}

/// Shared client state. Construct once and share behind `Arc`.
pub struct AppState {
    config: ClientConfig,
    network: Arc<NetworkStore>,
    wallet: Arc<SessionManager>,
    tracker: Arc<TxTracker>,
    pipeline: Arc<TransactionPipeline>,
    reader: VaultReader,
    vaults: QueryCache<VaultSnapshot>,
    balances: QueryCache<i128>,
    metadata: QueryCache<TokenMetadata>,
    preferences: PreferenceStore,
}

impl AppState {
    /// Build the state with explicit providers and RPC connector.
    ///
    /// Saved preferences override the config file's network. The relay
    /// credential is never read from the preferences file.
    pub fn new(
        config: ClientConfig,
        providers: Vec<Arc<dyn WalletProvider>>,
        connector: Arc<dyn RpcConnector>,
    ) -> Result<Self, AppError> {
        let preferences = PreferenceStore::new(config.preferences_path());
        let saved = preferences.load().unwrap_or_else(|e| {
            tracing::warn!(
                path = ?preferences.path(),
                error = %e,
                "Ignoring unreadable preferences"
            );
            Preferences::default()
        });

        let network = match saved.network {
            Some(mut restored) => {
                restored.relay_credential = config.relay.credential.clone();
                tracing::info!(kind = %restored.kind, "Restored saved network");
                restored
            }
            None => NetworkConfig::from_sections(&config.network, &config.relay)?,
        };

        let mut kit = WalletKit::new(providers, &network.passphrase);
        if let Some(id) = saved.selected_wallet_id.as_deref() {
            if let Err(e) = kit.set_wallet(id) {
                tracing::warn!(wallet = %id, error = %e, "Saved wallet is not available");
            }
        }

        let network = Arc::new(NetworkStore::new(network));
        let wallet = Arc::new(SessionManager::new(kit));
        let tracker = Arc::new(TxTracker::new());
        let pipeline = Arc::new(TransactionPipeline::new(
            connector,
            network.clone(),
            wallet.clone(),
            tracker.clone(),
            PipelineSettings::from_config(&config),
        ));

        Ok(Self {
            reader: VaultReader::new(pipeline.clone()),
            vaults: QueryCache::new(Duration::from_secs(config.cache.vault_stale_secs)),
            balances: QueryCache::new(Duration::from_secs(config.cache.balance_stale_secs)),
            metadata: QueryCache::new(Duration::MAX),
            config,
            network,
            wallet,
            tracker,
            pipeline,
            preferences,
        })
    }

    /// Build the state with the HTTP RPC client and the environment key
    /// provider, when a key is configured.
    pub fn from_config(config: ClientConfig) -> Result<Self, AppError> {
        let mut providers: Vec<Arc<dyn WalletProvider>> = Vec::new();
        match LocalKeyProvider::from_env() {
            Ok(provider) => providers.push(Arc::new(provider)),
            Err(e) => tracing::debug!(error = %e, "Local key provider unavailable"),
        }
        let connector = Arc::new(HttpConnector {
            timeout_secs: config.rpc.timeout_secs,
        });
        Self::new(config, providers, connector)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn network(&self) -> Arc<NetworkConfig> {
        self.network.active()
    }

    pub fn tracker(&self) -> &Arc<TxTracker> {
        &self.tracker
    }

    pub fn subscribe(&self) -> watch::Receiver<TxState> {
        self.tracker.subscribe()
    }

    pub async fn session(&self) -> WalletSession {
        self.wallet.session().await
    }

    /// Provider that `connect` will use by default.
    pub async fn selected_wallet_id(&self) -> Option<String> {
        self.wallet.selected_wallet_id().await
    }

    // Network

    /// Replace the active network. A connected session is cleared and the
    /// lifecycle state reset; cached reads belong to the old network and
    /// are dropped. The switch is in effect once this returns; failing to
    /// persist it only logs.
    pub async fn set_network(&self, config: NetworkConfig) -> Result<(), AppError> {
        let passphrase = config.passphrase.clone();
        self.network.replace(config);

        if self.wallet.reinit(&passphrase).await {
            self.tracker.reset();
        }
        self.vaults.invalidate_scope(QueryScope::Vault);
        self.balances.invalidate_scope(QueryScope::TokenBalance);
        self.metadata.invalidate_scope(QueryScope::TokenMetadata);

        if let Err(e) = self.save_preferences().await {
            tracing::warn!(error = %e, "Failed to save network preference");
        }
        Ok(())
    }

    pub async fn use_preset(&self, name: &str) -> Result<(), AppError> {
        self.set_network(NetworkConfig::preset(name)?).await
    }

    pub async fn use_custom(
        &self,
        rpc_url: &str,
        indexer_url: &str,
        passphrase: &str,
        explorer_url: Option<&str>,
    ) -> Result<(), AppError> {
        self.set_network(NetworkConfig::custom(
            rpc_url,
            indexer_url,
            passphrase,
            explorer_url,
        )?)
        .await
    }

    /// Route submissions through the sponsored relay.
    pub async fn enable_relay(&self, credential: &str) -> Result<(), AppError> {
        if !is_valid_jwt(credential) {
            return Err(RelayError::InvalidCredential.into());
        }
        let next = self.network.active().with_relay(credential);
        self.set_network(next).await
    }

    pub async fn disable_relay(&self) -> Result<(), AppError> {
        let next = self.network.active().without_relay();
        self.set_network(next).await
    }

    // Wallet

    /// Connect through `chooser`; the chosen provider is remembered.
    pub async fn connect(&self, chooser: &dyn WalletChooser) -> bool {
        if !self.wallet.connect(chooser).await {
            return false;
        }
        if let Err(e) = self.save_preferences().await {
            tracing::warn!(error = %e, "Failed to save wallet preference");
        }
        true
    }

    pub async fn disconnect(&self) {
        self.wallet.disconnect().await;
        self.tracker.reset();
    }

    async fn require_address(&self) -> Result<String, AppError> {
        self.wallet
            .session()
            .await
            .address()
            .map(str::to_string)
            .ok_or_else(|| WalletError::NotConnected.into())
    }

    async fn save_preferences(&self) -> Result<(), AppError> {
        let mut network = (*self.network.active()).clone();
        network.relay_credential = None;
        let prefs = Preferences {
            network: Some(network),
            selected_wallet_id: self.wallet.selected_wallet_id().await,
        };
        self.preferences.save(&prefs)?;
        Ok(())
    }

    // Transactions

    /// Submit through the pipeline. On success the vault and balance
    /// caches are dropped.
    pub async fn submit(&self, operation: &EncodedOperation) -> TransactionResult {
        let result = self.pipeline.submit(operation).await;
        if result.success {
            self.vaults.invalidate_scope(QueryScope::Vault);
            self.balances.invalidate_scope(QueryScope::TokenBalance);
        }
        result
    }

    pub async fn simulate(&self, operation: &EncodedOperation) -> SimulationResult {
        self.pipeline.simulate(operation).await
    }

    // Reads

    /// Vault snapshot for the connected viewer, served from cache while
    /// fresh.
    pub async fn vault(&self, vault_id: &str) -> Result<VaultSnapshot, AppError> {
        let session = self.wallet.session().await;
        let key = QueryKey::vault(vault_id, session.address());
        if let Some(snapshot) = self.vaults.get_fresh(&key) {
            return Ok(snapshot);
        }
        self.load_vault(key, vault_id, session.address()).await
    }

    /// Reload a vault snapshot regardless of cache age.
    pub async fn refresh_vault(&self, vault_id: &str) -> Result<VaultSnapshot, AppError> {
        let session = self.wallet.session().await;
        let key = QueryKey::vault(vault_id, session.address());
        self.load_vault(key, vault_id, session.address()).await
    }

    async fn load_vault(
        &self,
        key: QueryKey,
        vault_id: &str,
        viewer: Option<&str>,
    ) -> Result<VaultSnapshot, AppError> {
        let snapshot = self.reader.load(vault_id, viewer).await?;
        self.vaults.insert(key, snapshot.clone());
        Ok(snapshot)
    }

    /// Connected account's balance of `token`.
    pub async fn token_balance(&self, token: &str) -> Result<i128, AppError> {
        let owner = self.require_address().await?;
        let key = QueryKey::token_balance(token, &owner);
        if let Some(balance) = self.balances.get_fresh(&key) {
            return Ok(balance);
        }
        let balance = self.reader.token_balance(token, &owner).await?;
        self.balances.insert(key, balance);
        Ok(balance)
    }

    /// Name, symbol and decimals of `token`. Cached until the network
    /// changes; transactions never invalidate it.
    pub async fn token_metadata(&self, token: &str) -> Result<TokenMetadata, AppError> {
        let key = QueryKey::token_metadata(token);
        if let Some(metadata) = self.metadata.get_fresh(&key) {
            return Ok(metadata);
        }
        let metadata = self.reader.token_metadata(token).await?;
        self.metadata.insert(key, metadata.clone());
        Ok(metadata)
    }

    // Vault actions. Input is validated before anything touches the network.

    pub async fn deposit(&self, vault_id: &str, amount: &str) -> Result<TransactionResult, AppError> {
        let amount = parse_amount(amount).map_err(VaultError::from)?;
        let vault = VaultContract::new(vault_id)?;
        let owner = self.require_address().await?;
        let operation = vault.deposit(amount, &owner, &owner)?;
        Ok(self.submit(&operation).await)
    }

    pub async fn request_redeem(
        &self,
        vault_id: &str,
        shares: &str,
    ) -> Result<TransactionResult, AppError> {
        let shares = parse_amount(shares).map_err(VaultError::from)?;
        let vault = VaultContract::new(vault_id)?;
        let owner = self.require_address().await?;
        let operation = vault.request_redeem(shares, &owner)?;
        Ok(self.submit(&operation).await)
    }

    pub async fn redeem(&self, vault_id: &str) -> Result<TransactionResult, AppError> {
        let vault = VaultContract::new(vault_id)?;
        let owner = self.require_address().await?;
        let operation = vault.redeem(&owner, &owner)?;
        Ok(self.submit(&operation).await)
    }

    pub async fn emergency_redeem(&self, vault_id: &str) -> Result<TransactionResult, AppError> {
        let vault = VaultContract::new(vault_id)?;
        let owner = self.require_address().await?;
        let operation = vault.emergency_redeem(&owner, &owner)?;
        Ok(self.submit(&operation).await)
    }

    pub async fn cancel_redeem(&self, vault_id: &str) -> Result<TransactionResult, AppError> {
        let vault = VaultContract::new(vault_id)?;
        let owner = self.require_address().await?;
        let operation = vault.cancel_redeem(&owner)?;
        Ok(self.submit(&operation).await)
    }

    /// WASM hashes configured for the active network, `(vault, token)`.
    pub fn default_wasm_hashes(&self) -> (String, String) {
        let deploy = &self.config.deploy;
        if self.network.active().is_mainnet() {
            (
                deploy.mainnet_vault_wasm_hash.clone(),
                deploy.mainnet_token_wasm_hash.clone(),
            )
        } else {
            (
                deploy.testnet_vault_wasm_hash.clone(),
                deploy.testnet_token_wasm_hash.clone(),
            )
        }
    }

    /// Deploy a new vault. The returned plan carries the new contract id.
    pub async fn deploy(
        &self,
        params: &DeployParams,
    ) -> Result<(DeployPlan, TransactionResult), AppError> {
        params.validate().map_err(VaultError::InvalidDeploy)?;
        let deployer = self.require_address().await?;
        let passphrase = self.network.active().passphrase.clone();
        let plan = params.plan(&deployer, &passphrase, random_salt())?;

        tracing::info!(contract_id = %plan.contract_id, "Deploying vault");
        let result = self.submit(&plan.operation).await;
        Ok((plan, result))
    }
}
