//! Read caches for vault snapshots, token balances and token metadata.
//!
//! # Data Flow
//! ```text
//! read view → query.rs (fresh hit?) → VaultReader on miss → insert
//! successful transaction → invalidate_scope(Vault | TokenBalance)
//! network switch → every scope, TokenMetadata included
//! ```

pub mod query;

pub use query::{QueryCache, QueryKey, QueryScope};
