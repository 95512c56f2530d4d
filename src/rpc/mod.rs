//! Chain RPC subsystem.
//!
//! # Data Flow
//! ```text
//! transaction pipeline / vault reader
//!     → ChainRpc trait (the five calls the client needs)
//!     → client.rs (JSON-RPC over reqwest, per-call timeout)
//!     → types.rs (response shapes, RpcError)
//! ```
//!
//! The trait is the seam for tests: pipeline tests plug in scripted mocks.

pub mod client;
pub mod types;

use async_trait::async_trait;
use std::sync::Arc;

pub use client::SorobanRpcClient;
pub use types::{
    AccountInfo, GetTransactionResponse, RpcError, RpcResult, SendResponse, SimulateResponse,
};

/// The chain calls consumed by the client. Envelopes cross this boundary
/// as base64 XDR.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Current sequence for an account.
    async fn get_account(&self, address: &str) -> RpcResult<AccountInfo>;

    /// Dry-run an envelope against current state.
    async fn simulate_transaction(&self, envelope_xdr: &str) -> RpcResult<SimulateResponse>;

    /// Simulate and return the envelope with resources, fee and auth filled in.
    async fn prepare_transaction(&self, envelope_xdr: &str) -> RpcResult<String>;

    /// Submit a signed envelope.
    async fn send_transaction(&self, envelope_xdr: &str) -> RpcResult<SendResponse>;

    /// Look up a submitted transaction by hex hash.
    async fn get_transaction(&self, hash: &str) -> RpcResult<GetTransactionResponse>;
}

/// Opens a `ChainRpc` for an RPC URL. The pipeline connects per call so a
/// network switch takes effect on the next transaction.
pub trait RpcConnector: Send + Sync {
    fn connect(&self, rpc_url: &str) -> RpcResult<Arc<dyn ChainRpc>>;
}

/// Connector producing JSON-RPC clients with a fixed timeout.
#[derive(Debug, Clone, Copy)]
pub struct HttpConnector {
    pub timeout_secs: u64,
}

impl RpcConnector for HttpConnector {
    fn connect(&self, rpc_url: &str) -> RpcResult<Arc<dyn ChainRpc>> {
        Ok(Arc::new(SorobanRpcClient::new(rpc_url, self.timeout_secs)?))
    }
}
