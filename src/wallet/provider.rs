//! Wallet provider and chooser traits.
//!
//! Providers hold keys and sign; the client never sees key material.

use async_trait::async_trait;

use crate::wallet::types::{SignOptions, WalletError, WalletOption};

/// An external key holder able to sign transaction envelopes.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Stable identifier (persisted as the selected wallet).
    fn id(&self) -> &str;

    /// Human-readable name for the chooser.
    fn name(&self) -> &str;

    /// Public address of the account this provider signs for.
    async fn get_address(&self) -> Result<String, WalletError>;

    /// Sign a base64 envelope, returning the signed base64 envelope.
    async fn sign_transaction(
        &self,
        envelope_xdr: &str,
        options: &SignOptions,
    ) -> Result<String, WalletError>;
}

/// Picks one provider from the available options; `None` means cancelled.
#[async_trait]
pub trait WalletChooser: Send + Sync {
    async fn choose(&self, options: &[WalletOption]) -> Option<String>;
}

/// Chooser that selects a fixed id, or the first option when none is given.
#[derive(Debug, Clone, Default)]
pub struct FixedChooser {
    wallet_id: Option<String>,
}

impl FixedChooser {
    pub fn new(wallet_id: Option<String>) -> Self {
        Self { wallet_id }
    }
}

#[async_trait]
impl WalletChooser for FixedChooser {
    async fn choose(&self, options: &[WalletOption]) -> Option<String> {
        match &self.wallet_id {
            Some(id) => options.iter().find(|o| &o.id == id).map(|o| o.id.clone()),
            None => options.first().map(|o| o.id.clone()),
        }
    }
}
