//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::resilience::RetryPolicy;

/// Root configuration for the vault client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Network selection used when no saved preference exists.
    pub network: NetworkSection,

    /// Sponsored relay settings.
    pub relay: RelaySection,

    /// Chain RPC client settings.
    pub rpc: RpcConfig,

    /// Envelope construction settings.
    pub transaction: TransactionConfig,

    /// Submission polling policies.
    pub polling: PollingConfig,

    /// Read cache staleness windows.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Default WASM hashes for vault deployment.
    pub deploy: DeployConfig,

    /// Where network and wallet preferences are persisted.
    pub preferences_path: String,
}

/// Which network to start on.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkSection {
    /// "testnet", "mainnet" or "custom".
    pub preset: String,

    /// Custom RPC URL (only read when preset = "custom").
    pub rpc_url: String,

    /// Custom indexer URL.
    pub indexer_url: String,

    /// Custom network passphrase.
    pub passphrase: String,

    /// Custom explorer base URL.
    pub explorer_url: String,
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            preset: "testnet".to_string(),
            rpc_url: String::new(),
            indexer_url: String::new(),
            passphrase: String::new(),
            explorer_url: String::new(),
        }
    }
}

/// Sponsored relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelaySection {
    /// Route submissions through the relay.
    pub enabled: bool,

    /// Relay endpoint; falls back to the preset's relay URL when empty.
    pub url: String,

    /// Bearer credential. Prefer `VAULT_CLIENT_RELAY_JWT` over the file.
    pub credential: Option<String>,

    /// Client name header sent to the relay.
    pub client_name: String,
}

impl Default for RelaySection {
    fn default() -> Self {
        Self {
            enabled: false,
            url: String::new(),
            credential: None,
            client_name: "vault-client".to_string(),
        }
    }
}

/// Chain RPC configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

/// Envelope construction settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Base fee in stroops.
    pub base_fee: u32,

    /// Validity window of an envelope in seconds.
    pub timeout_secs: u64,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            base_fee: 100_000, // 0.01 XLM
            timeout_secs: 300,
        }
    }
}

/// Submission polling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Interval between `sendTransaction` retries while waiting for PENDING.
    pub accept_interval_ms: u64,

    /// Total `sendTransaction` attempts before giving up.
    pub accept_max_attempts: u32,

    /// Interval between `getTransaction` polls.
    pub finality_interval_ms: u64,

    /// Optional cap on `getTransaction` polls. Unbounded when absent.
    pub finality_max_attempts: Option<u32>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            accept_interval_ms: 1000,
            accept_max_attempts: 6,
            finality_interval_ms: 1000,
            finality_max_attempts: None,
        }
    }
}

impl PollingConfig {
    /// Policy for the bounded wait on PENDING.
    pub fn accept_policy(&self) -> RetryPolicy {
        RetryPolicy::bounded(
            Duration::from_millis(self.accept_interval_ms),
            self.accept_max_attempts,
        )
    }

    /// Policy for the wait on a terminal outcome.
    pub fn finality_policy(&self) -> RetryPolicy {
        let interval = Duration::from_millis(self.finality_interval_ms);
        match self.finality_max_attempts {
            Some(max) => RetryPolicy::bounded(interval, max),
            None => RetryPolicy::unbounded(interval),
        }
    }
}

/// Read cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Vault snapshot staleness window in seconds.
    pub vault_stale_secs: u64,

    /// Token balance staleness window in seconds.
    pub balance_stale_secs: u64,

    /// Refetch interval for `vault show --watch` in seconds.
    pub refetch_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            vault_stale_secs: 30,
            balance_stale_secs: 10,
            refetch_interval_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human format.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Deployment defaults.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DeployConfig {
    /// Hex WASM hash of the vault contract on testnet.
    pub testnet_vault_wasm_hash: String,

    /// Hex WASM hash of the share token contract on testnet.
    pub testnet_token_wasm_hash: String,

    /// Hex WASM hash of the vault contract on mainnet.
    pub mainnet_vault_wasm_hash: String,

    /// Hex WASM hash of the share token contract on mainnet.
    pub mainnet_token_wasm_hash: String,
}

impl ClientConfig {
    /// Default preferences file name, relative to the working directory.
    pub const DEFAULT_PREFERENCES_PATH: &'static str = "vault-client.prefs.json";

    /// Resolved preferences path.
    pub fn preferences_path(&self) -> &str {
        if self.preferences_path.is_empty() {
            Self::DEFAULT_PREFERENCES_PATH
        } else {
            &self.preferences_path
        }
    }
}
