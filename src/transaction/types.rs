//! Transaction outcomes and pipeline errors.

use serde::{Deserialize, Serialize};
use stellar_xdr::curr::ScVal;
use thiserror::Error;

use crate::codec::{scval, CodecError};
use crate::relay::RelayError;
use crate::rpc::RpcError;
use crate::wallet::WalletError;

/// Internal pipeline failure, flattened to a string at the boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Relay(#[from] RelayError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Outcome of `submit`. Never an `Err`: failures set `success = false`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResult {
    pub success: bool,
    pub hash: Option<String>,
    pub error: Option<String>,
    /// Base64 `ScVal` returned by the contract call.
    pub return_value: Option<String>,
}

impl TransactionResult {
    pub fn success(hash: String, return_value: Option<String>) -> Self {
        Self {
            success: true,
            hash: Some(hash),
            error: None,
            return_value,
        }
    }

    pub fn failure(error: impl Into<String>, hash: Option<String>) -> Self {
        Self {
            success: false,
            hash,
            error: Some(error.into()),
            return_value: None,
        }
    }

    pub fn decoded_return_value(&self) -> Option<ScVal> {
        self.return_value
            .as_deref()
            .and_then(|v| scval::from_base64(v).ok())
    }
}

/// Outcome of `simulate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub success: bool,
    pub error: Option<String>,
    /// Base64 `ScVal` of the first host function result.
    pub return_value: Option<String>,
    pub min_resource_fee: u64,
}

impl SimulationResult {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Decoded return value, or the simulation error.
    pub fn value(&self) -> Result<ScVal, String> {
        if !self.success {
            return Err(self
                .error
                .clone()
                .unwrap_or_else(|| "Simulation failed".to_string()));
        }
        let encoded = self
            .return_value
            .as_deref()
            .ok_or_else(|| "Simulation returned no value".to_string())?;
        scval::from_base64(encoded).map_err(|e| e.to_string())
    }
}
