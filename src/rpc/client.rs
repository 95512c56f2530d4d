//! Soroban JSON-RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Speak JSON-RPC 2.0 over HTTP to the network's RPC endpoint
//! - Query account sequence, simulate, send, and look up transactions
//! - Assemble simulated resources into envelopes ("prepare")
//! - Bound every call with a timeout

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use stellar_xdr::curr::{LedgerEntryData, LedgerKey, LedgerKeyAccount, Limits, ReadXdr, WriteXdr};
use tokio::time::timeout;

use crate::codec::address::account_id;
use crate::observability::metrics;
use crate::rpc::types::{
    AccountInfo, GetTransactionResponse, JsonRpcRequest, JsonRpcResponse, LedgerEntriesResult,
    RpcError, RpcResult, SendResponse, SimulateResponse,
};
use crate::rpc::ChainRpc;
use crate::transaction::envelope;

/// HTTP JSON-RPC client bound to one RPC URL.
pub struct SorobanRpcClient {
    http: reqwest::Client,
    rpc_url: String,
    timeout_duration: Duration,
    next_id: AtomicU64,
}

impl SorobanRpcClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `rpc_url` - JSON-RPC endpoint
    /// * `timeout_secs` - Per-request timeout
    pub fn new(rpc_url: &str, timeout_secs: u64) -> RpcResult<Self> {
        let parsed: url::Url = rpc_url
            .parse()
            .map_err(|e| RpcError::Transport(format!("Invalid RPC URL '{}': {}", rpc_url, e)))?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        tracing::debug!(rpc_url = %parsed, timeout_secs, "RPC client initialized");

        Ok(Self {
            http,
            rpc_url: parsed.to_string(),
            timeout_duration: Duration::from_secs(timeout_secs),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn call<P, T>(&self, method: &str, params: P) -> RpcResult<T>
    where
        P: Serialize + Send,
        T: DeserializeOwned,
    {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let fut = async {
            let response = self
                .http
                .post(&self.rpc_url)
                .json(&request)
                .send()
                .await
                .map_err(|e| RpcError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(RpcError::Transport(format!("HTTP {}: {}", status, body)));
            }

            response
                .json::<JsonRpcResponse<T>>()
                .await
                .map_err(|e| RpcError::InvalidResponse(e.to_string()))
        };

        let outcome = match timeout(self.timeout_duration, fut).await {
            Ok(Ok(body)) => match (body.result, body.error) {
                (_, Some(err)) => Err(RpcError::Server {
                    code: err.code,
                    message: err.message,
                }),
                (Some(result), None) => Ok(result),
                (None, None) => Err(RpcError::InvalidResponse(format!(
                    "{} returned neither result nor error",
                    method
                ))),
            },
            Ok(Err(e)) => Err(e),
            Err(_) => Err(RpcError::Timeout(self.timeout_duration.as_secs())),
        };

        metrics::record_rpc_request(method, outcome.is_ok());
        if let Err(e) = &outcome {
            tracing::warn!(method, error = %e, "RPC call failed");
        }
        outcome
    }
}

#[async_trait]
impl ChainRpc for SorobanRpcClient {
    async fn get_account(&self, address: &str) -> RpcResult<AccountInfo> {
        let key = LedgerKey::Account(LedgerKeyAccount {
            account_id: account_id(address)?,
        });
        let encoded_key = key
            .to_xdr_base64(Limits::none())
            .map_err(|e| RpcError::Codec(e.into()))?;

        let result: LedgerEntriesResult = self
            .call("getLedgerEntries", json!({ "keys": [encoded_key] }))
            .await?;

        let entry = result
            .entries
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| RpcError::AccountNotFound(address.to_string()))?;

        match LedgerEntryData::from_xdr_base64(&entry.xdr, Limits::none())
            .map_err(|e| RpcError::Codec(e.into()))?
        {
            LedgerEntryData::Account(account) => Ok(AccountInfo {
                account_id: address.to_string(),
                sequence: account.seq_num.0,
            }),
            other => Err(RpcError::InvalidResponse(format!(
                "expected account entry, got {}",
                other.name()
            ))),
        }
    }

    async fn simulate_transaction(&self, envelope_xdr: &str) -> RpcResult<SimulateResponse> {
        self.call("simulateTransaction", json!({ "transaction": envelope_xdr }))
            .await
    }

    async fn prepare_transaction(&self, envelope_xdr: &str) -> RpcResult<String> {
        let simulation = self.simulate_transaction(envelope_xdr).await?;
        if let Some(error) = simulation.error {
            return Err(RpcError::Simulation(error));
        }
        let prepared = envelope::assemble(envelope::decode(envelope_xdr)?, &simulation)?;
        Ok(envelope::encode(&prepared)?)
    }

    async fn send_transaction(&self, envelope_xdr: &str) -> RpcResult<SendResponse> {
        self.call("sendTransaction", json!({ "transaction": envelope_xdr }))
            .await
    }

    async fn get_transaction(&self, hash: &str) -> RpcResult<GetTransactionResponse> {
        self.call("getTransaction", json!({ "hash": hash })).await
    }
}

impl std::fmt::Debug for SorobanRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SorobanRpcClient")
            .field("rpc_url", &self.rpc_url)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}
