//! Wallet session state and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::CodecError;

/// Errors from wallet providers and the session manager.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("wallet not connected")]
    NotConnected,

    #[error("Unknown wallet '{0}'")]
    UnknownWallet(String),

    #[error("No wallet selected")]
    NoWalletSelected,

    /// The user declined or the provider refused; carries the provider text.
    #[error("{0}")]
    Rejected(String),

    #[error("Environment variable {0} not set")]
    MissingKey(&'static str),

    #[error("Invalid secret key")]
    InvalidKey,

    #[error("Provider holds {held}, asked to sign for {requested}")]
    AddressMismatch { held: String, requested: String },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Context handed to a provider with every signing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOptions {
    pub network_passphrase: String,
    /// Account expected to sign.
    pub address: Option<String>,
}

/// One entry of the wallet chooser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletOption {
    pub id: String,
    pub name: String,
}

/// Connection state. `account_address` is non-empty exactly when connected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    pub connected: bool,
    pub account_address: String,
    pub selected_wallet_id: Option<String>,
}

impl WalletSession {
    pub fn connected(address: String, wallet_id: String) -> Self {
        Self {
            connected: true,
            account_address: address,
            selected_wallet_id: Some(wallet_id),
        }
    }

    /// Address of the connected account, if any.
    pub fn address(&self) -> Option<&str> {
        if self.connected && !self.account_address.is_empty() {
            Some(&self.account_address)
        } else {
            None
        }
    }
}
