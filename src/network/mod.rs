//! Network configuration subsystem.
//!
//! # Data Flow
//! ```text
//! config file [network]/[relay] or saved preferences
//!     → presets.rs (testnet / mainnet / custom endpoint sets)
//!     → store.rs (atomic swap of Arc<NetworkConfig>)
//!     → rpc, relay, wallet kit read the active snapshot
//! ```
//!
//! Switching network is all-or-nothing so the RPC URL and passphrase can
//! never disagree.

pub mod presets;
pub mod store;

pub use presets::{NetworkConfig, NetworkError, NetworkKind};
pub use store::NetworkStore;
