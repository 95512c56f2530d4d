//! Network endpoint sets and the preset testnet/mainnet configurations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::schema::{NetworkSection, RelaySection};

/// Passphrase of the public test network.
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// Passphrase of the public main network.
pub const MAINNET_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// Default sponsored relay endpoint.
pub const DEFAULT_RELAY_URL: &str = "https://launchtube.stellar.org/api/v1";

/// Which of the three mutually exclusive network choices is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkKind {
    Testnet,
    Mainnet,
    Custom,
}

impl std::fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkKind::Testnet => write!(f, "testnet"),
            NetworkKind::Mainnet => write!(f, "mainnet"),
            NetworkKind::Custom => write!(f, "custom"),
        }
    }
}

/// Errors building a network configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NetworkError {
    /// A custom network is missing a required endpoint.
    #[error("custom network requires {0}")]
    MissingField(&'static str),

    /// Unknown preset name.
    #[error("unknown network preset '{0}'")]
    UnknownPreset(String),
}

/// The complete endpoint set for one network.
///
/// Always replaced as a whole; there are no setters for single fields.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub kind: NetworkKind,
    pub rpc_url: String,
    pub indexer_url: String,
    pub passphrase: String,
    pub explorer_url: String,
    #[serde(default)]
    pub relay_url: Option<String>,
    #[serde(default)]
    pub relay_credential: Option<String>,
    #[serde(default)]
    pub use_relay: bool,
}

impl NetworkConfig {
    /// Preset public test network.
    pub fn testnet() -> Self {
        Self {
            kind: NetworkKind::Testnet,
            rpc_url: "https://soroban-testnet.stellar.org".to_string(),
            indexer_url: "https://horizon-testnet.stellar.org".to_string(),
            passphrase: TESTNET_PASSPHRASE.to_string(),
            explorer_url: "https://stellar.expert/explorer/testnet".to_string(),
            relay_url: Some(DEFAULT_RELAY_URL.to_string()),
            relay_credential: None,
            use_relay: false,
        }
    }

    /// Preset public main network.
    pub fn mainnet() -> Self {
        Self {
            kind: NetworkKind::Mainnet,
            rpc_url: "https://soroban-rpc.mainnet.stellar.gateway.fm".to_string(),
            indexer_url: "https://horizon.stellar.org".to_string(),
            passphrase: MAINNET_PASSPHRASE.to_string(),
            explorer_url: "https://stellar.expert/explorer/public".to_string(),
            relay_url: Some(DEFAULT_RELAY_URL.to_string()),
            relay_credential: None,
            use_relay: false,
        }
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> Result<Self, NetworkError> {
        match name {
            "testnet" => Ok(Self::testnet()),
            "mainnet" => Ok(Self::mainnet()),
            other => Err(NetworkError::UnknownPreset(other.to_string())),
        }
    }

    /// A user-supplied network. RPC, indexer and passphrase are required.
    pub fn custom(
        rpc_url: &str,
        indexer_url: &str,
        passphrase: &str,
        explorer_url: Option<&str>,
    ) -> Result<Self, NetworkError> {
        if rpc_url.trim().is_empty() {
            return Err(NetworkError::MissingField("an RPC URL"));
        }
        if indexer_url.trim().is_empty() {
            return Err(NetworkError::MissingField("an indexer URL"));
        }
        if passphrase.trim().is_empty() {
            return Err(NetworkError::MissingField("a network passphrase"));
        }

        Ok(Self {
            kind: NetworkKind::Custom,
            rpc_url: rpc_url.trim().to_string(),
            indexer_url: indexer_url.trim().to_string(),
            passphrase: passphrase.to_string(),
            explorer_url: explorer_url.unwrap_or_default().trim_end_matches('/').to_string(),
            relay_url: None,
            relay_credential: None,
            use_relay: false,
        })
    }

    /// Build the startup network from the config file sections.
    pub fn from_sections(
        network: &NetworkSection,
        relay: &RelaySection,
    ) -> Result<Self, NetworkError> {
        let mut config = match network.preset.as_str() {
            "custom" => Self::custom(
                &network.rpc_url,
                &network.indexer_url,
                &network.passphrase,
                Some(network.explorer_url.as_str()),
            )?,
            name => Self::preset(name)?,
        };

        if !relay.url.is_empty() {
            config.relay_url = Some(relay.url.clone());
        }
        config.relay_credential = relay.credential.clone();
        config.use_relay = relay.enabled;
        Ok(config)
    }

    /// Copy of this config with sponsored submission switched on.
    pub fn with_relay(&self, credential: &str) -> Self {
        Self {
            relay_url: self
                .relay_url
                .clone()
                .or_else(|| Some(DEFAULT_RELAY_URL.to_string())),
            relay_credential: Some(credential.to_string()),
            use_relay: true,
            ..self.clone()
        }
    }

    /// Copy of this config with sponsored submission switched off.
    pub fn without_relay(&self) -> Self {
        Self {
            relay_credential: None,
            use_relay: false,
            ..self.clone()
        }
    }

    /// Relay URL and credential, only when the relay path should be taken.
    pub fn relay_endpoint(&self) -> Option<(&str, &str)> {
        if !self.use_relay {
            return None;
        }
        match (self.relay_url.as_deref(), self.relay_credential.as_deref()) {
            (Some(url), Some(credential)) if !url.is_empty() && !credential.is_empty() => {
                Some((url, credential))
            }
            _ => None,
        }
    }

    pub fn is_testnet(&self) -> bool {
        self.passphrase.contains("Test")
    }

    pub fn is_mainnet(&self) -> bool {
        self.passphrase.contains("Public")
    }

    /// Explorer link for a transaction hash.
    pub fn tx_url(&self, hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url, hash)
    }

    /// Explorer link for a contract id.
    pub fn contract_url(&self, contract_id: &str) -> String {
        format!("{}/contract/{}", self.explorer_url, contract_id)
    }

    /// Explorer link for an account.
    pub fn account_url(&self, account: &str) -> String {
        format!("{}/account/{}", self.explorer_url, account)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::testnet()
    }
}

impl std::fmt::Debug for NetworkConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkConfig")
            .field("kind", &self.kind)
            .field("rpc_url", &self.rpc_url)
            .field("indexer_url", &self.indexer_url)
            .field("passphrase", &self.passphrase)
            .field("explorer_url", &self.explorer_url)
            .field("relay_url", &self.relay_url)
            .field(
                "relay_credential",
                &self.relay_credential.as_ref().map(|_| "<redacted>"),
            )
            .field("use_relay", &self.use_relay)
            .finish()
    }
}
