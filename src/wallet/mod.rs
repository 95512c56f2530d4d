//! Wallet session subsystem.
//!
//! # Data Flow
//! ```text
//! connect(chooser)
//!     → kit.rs (provider registry, selected id, network passphrase)
//!     → provider.rs (WalletProvider::get_address)
//!     → session.rs (WalletSession: connected + address)
//!
//! pipeline sign request
//!     → session.rs (require connection)
//!     → provider.sign_transaction(envelope, passphrase + address)
//! ```
//!
//! # Security
//! - Key material only ever lives inside a provider
//! - `local.rs` reads its seed from the environment, never from config

pub mod kit;
pub mod local;
pub mod provider;
pub mod session;
pub mod types;

pub use kit::WalletKit;
pub use local::{LocalKeyProvider, SECRET_KEY_ENV_VAR};
pub use provider::{FixedChooser, WalletChooser, WalletProvider};
pub use session::SessionManager;
pub use types::{SignOptions, WalletError, WalletOption, WalletSession};
