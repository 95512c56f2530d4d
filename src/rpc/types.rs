//! RPC request/response shapes and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::CodecError;

/// Errors that can occur talking to the chain RPC.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Connection or HTTP failure.
    #[error("RPC transport error: {0}")]
    Transport(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// JSON-RPC error object returned by the server.
    #[error("RPC error {code}: {message}")]
    Server { code: i64, message: String },

    /// Response did not match the expected shape.
    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    /// No ledger entry exists for the account.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Simulation reported an error; carries the raw diagnostic.
    #[error("{0}")]
    Simulation(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Result type for RPC operations.
pub type RpcResult<T> = Result<T, RpcError>;

/// On-chain account state needed to build a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    pub account_id: String,
    /// Current sequence number; the next transaction uses `sequence + 1`.
    pub sequence: i64,
}

/// Outcome of one simulated host function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulateHostFunctionResult {
    #[serde(default)]
    pub auth: Option<Vec<String>>,
    /// Base64 `ScVal` return value.
    pub xdr: String,
}

/// `simulateTransaction` result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateResponse {
    #[serde(default)]
    pub error: Option<String>,
    /// Base64 `SorobanTransactionData`.
    #[serde(default)]
    pub transaction_data: Option<String>,
    /// Stringified stroop amount.
    #[serde(default)]
    pub min_resource_fee: Option<String>,
    #[serde(default)]
    pub results: Option<Vec<SimulateHostFunctionResult>>,
    #[serde(default)]
    pub latest_ledger: u64,
}

impl SimulateResponse {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// First host function result, if any.
    pub fn first_result(&self) -> Option<&SimulateHostFunctionResult> {
        self.results.as_ref().and_then(|r| r.first())
    }

    pub fn min_resource_fee(&self) -> u64 {
        self.min_resource_fee
            .as_deref()
            .and_then(|fee| fee.parse().ok())
            .unwrap_or(0)
    }
}

/// Status values returned by `sendTransaction`.
pub mod send_status {
    pub const PENDING: &str = "PENDING";
    pub const DUPLICATE: &str = "DUPLICATE";
    pub const TRY_AGAIN_LATER: &str = "TRY_AGAIN_LATER";
    pub const ERROR: &str = "ERROR";
}

/// Status values returned by `getTransaction`.
pub mod tx_status {
    pub const SUCCESS: &str = "SUCCESS";
    pub const FAILED: &str = "FAILED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
}

/// `sendTransaction` result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub status: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub error_result_xdr: Option<String>,
}

impl SendResponse {
    pub fn is_pending(&self) -> bool {
        self.status == send_status::PENDING
    }
}

/// `getTransaction` result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTransactionResponse {
    pub status: String,
    #[serde(default)]
    pub result_xdr: Option<String>,
    #[serde(default)]
    pub result_meta_xdr: Option<String>,
    /// Base64 `ScVal`, reported directly by newer RPC versions.
    #[serde(default)]
    pub return_value: Option<String>,
}

impl GetTransactionResponse {
    pub fn is_terminal(&self) -> bool {
        self.status != tx_status::NOT_FOUND
    }

    pub fn is_success(&self) -> bool {
        self.status == tx_status::SUCCESS
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct JsonRpcRequest<'a, P: Serialize> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: P,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LedgerEntriesResult {
    #[serde(default)]
    pub entries: Option<Vec<LedgerEntryResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LedgerEntryResult {
    /// Base64 `LedgerEntryData`.
    pub xdr: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulate_response_shape() {
        let json = r#"{
            "transactionData": "AAAA",
            "minResourceFee": "58181",
            "results": [{"auth": [], "xdr": "AAAAAQ=="}],
            "latestLedger": 1234
        }"#;
        let sim: SimulateResponse = serde_json::from_str(json).unwrap();
        assert!(sim.is_success());
        assert_eq!(sim.min_resource_fee(), 58181);
        assert_eq!(sim.first_result().unwrap().xdr, "AAAAAQ==");
    }

    #[test]
    fn test_simulate_error_shape() {
        let json = r#"{"error": "HostError: Error(Contract, #3)", "latestLedger": 5}"#;
        let sim: SimulateResponse = serde_json::from_str(json).unwrap();
        assert!(!sim.is_success());
        assert!(sim.first_result().is_none());
    }

    #[test]
    fn test_transaction_statuses() {
        let send: SendResponse =
            serde_json::from_str(r#"{"status": "PENDING", "hash": "ab"}"#).unwrap();
        assert!(send.is_pending());

        let get: GetTransactionResponse =
            serde_json::from_str(r#"{"status": "NOT_FOUND"}"#).unwrap();
        assert!(!get.is_terminal());

        let get: GetTransactionResponse =
            serde_json::from_str(r#"{"status": "FAILED", "resultXdr": "AAAA"}"#).unwrap();
        assert!(get.is_terminal());
        assert!(!get.is_success());
    }

    #[test]
    fn test_error_display() {
        let err = RpcError::Timeout(30);
        assert_eq!(err.to_string(), "RPC timeout after 30 seconds");

        let err = RpcError::Simulation("HostError: budget exceeded".to_string());
        assert_eq!(err.to_string(), "HostError: budget exceeded");
    }
}
