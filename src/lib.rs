//! Soroban Vault Client Library

// Core subsystems
pub mod app;
pub mod config;
pub mod network;
pub mod transaction;
pub mod wallet;

// Chain access
pub mod codec;
pub mod relay;
pub mod rpc;

// Vault views
pub mod cache;
pub mod display;
pub mod vault;

// Cross-cutting concerns
pub mod observability;
pub mod resilience;

pub use app::{AppError, AppState};
pub use config::schema::ClientConfig;
pub use transaction::{TransactionResult, TxStatus};
