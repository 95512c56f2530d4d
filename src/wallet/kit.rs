//! Registry of wallet providers bound to one network passphrase.

use std::sync::Arc;

use crate::wallet::provider::WalletProvider;
use crate::wallet::types::{SignOptions, WalletError, WalletOption};

/// The set of available providers plus the one currently selected.
pub struct WalletKit {
    providers: Vec<Arc<dyn WalletProvider>>,
    selected_id: Option<String>,
    network_passphrase: String,
}

impl WalletKit {
    /// Create a kit. The first provider is selected until told otherwise.
    pub fn new(providers: Vec<Arc<dyn WalletProvider>>, network_passphrase: &str) -> Self {
        let selected_id = providers.first().map(|p| p.id().to_string());
        Self {
            providers,
            selected_id,
            network_passphrase: network_passphrase.to_string(),
        }
    }

    /// Entries for a chooser, in registration order.
    pub fn options(&self) -> Vec<WalletOption> {
        self.providers
            .iter()
            .map(|p| WalletOption {
                id: p.id().to_string(),
                name: p.name().to_string(),
            })
            .collect()
    }

    pub fn set_wallet(&mut self, id: &str) -> Result<(), WalletError> {
        if !self.providers.iter().any(|p| p.id() == id) {
            return Err(WalletError::UnknownWallet(id.to_string()));
        }
        self.selected_id = Some(id.to_string());
        Ok(())
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn selected(&self) -> Result<Arc<dyn WalletProvider>, WalletError> {
        let id = self
            .selected_id
            .as_deref()
            .ok_or(WalletError::NoWalletSelected)?;
        self.providers
            .iter()
            .find(|p| p.id() == id)
            .cloned()
            .ok_or_else(|| WalletError::UnknownWallet(id.to_string()))
    }

    pub fn network_passphrase(&self) -> &str {
        &self.network_passphrase
    }

    /// Rebind to a new network. The registry and selection are kept.
    pub fn reinit(&mut self, network_passphrase: &str) {
        tracing::debug!(
            selected = ?self.selected_id,
            "Wallet kit re-initialized for new network"
        );
        self.network_passphrase = network_passphrase.to_string();
    }

    /// Signing options for the selected provider on this kit's network.
    pub fn sign_options(&self, address: &str) -> SignOptions {
        SignOptions {
            network_passphrase: self.network_passphrase.clone(),
            address: Some(address.to_string()),
        }
    }
}

impl std::fmt::Debug for WalletKit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletKit")
            .field("providers", &self.options())
            .field("selected_id", &self.selected_id)
            .field("network_passphrase", &self.network_passphrase)
            .finish()
    }
}
