//! Vault and token contract call encoders.
//!
//! Every method returns an `EncodedOperation` for the pipeline; nothing
//! here touches the network.

use crate::codec::address::is_valid_contract;
use crate::codec::operation::invoke_contract;
use crate::codec::scval::{address_val, i128_val};
use crate::codec::{CodecError, EncodedOperation};
use crate::vault::VaultError;

/// Read-only vault methods taking no arguments.
pub mod reads {
    pub const SHARE_TOKEN: &str = "share_token";
    pub const TOKEN: &str = "token";
    pub const TOTAL_SHARES: &str = "total_shares";
    pub const TOTAL_TOKENS: &str = "total_tokens";
    pub const LOCK_TIME: &str = "lock_time";
    pub const PENALTY_RATE: &str = "penalty_rate";
    pub const MIN_LIQUIDITY_RATE: &str = "min_liquidity_rate";
    pub const GET_STRATEGIES: &str = "get_strategies";
}

/// A deployed vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultContract {
    id: String,
}

impl VaultContract {
    pub fn new(id: &str) -> Result<Self, VaultError> {
        if !is_valid_contract(id) {
            return Err(VaultError::InvalidContract(id.to_string()));
        }
        Ok(Self { id: id.to_string() })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Deposit `amount` underlying tokens from `owner`, minting shares to
    /// `receiver`.
    pub fn deposit(
        &self,
        amount: i128,
        receiver: &str,
        owner: &str,
    ) -> Result<EncodedOperation, CodecError> {
        invoke_contract(
            &self.id,
            "deposit",
            vec![i128_val(amount), address_val(receiver)?, address_val(owner)?],
        )
    }

    /// Queue `shares` for redemption after the lock time.
    pub fn request_redeem(&self, shares: i128, owner: &str) -> Result<EncodedOperation, CodecError> {
        invoke_contract(
            &self.id,
            "request_redeem",
            vec![i128_val(shares), address_val(owner)?],
        )
    }

    /// Complete an unlocked redemption.
    pub fn redeem(&self, receiver: &str, owner: &str) -> Result<EncodedOperation, CodecError> {
        invoke_contract(
            &self.id,
            "redeem",
            vec![address_val(receiver)?, address_val(owner)?],
        )
    }

    /// Complete a locked redemption early, paying the penalty.
    pub fn emergency_redeem(
        &self,
        receiver: &str,
        owner: &str,
    ) -> Result<EncodedOperation, CodecError> {
        invoke_contract(
            &self.id,
            "emergency_redeem",
            vec![address_val(receiver)?, address_val(owner)?],
        )
    }

    pub fn cancel_redeem(&self, owner: &str) -> Result<EncodedOperation, CodecError> {
        invoke_contract(&self.id, "cancel_redeem", vec![address_val(owner)?])
    }

    /// A no-argument read such as `total_shares`.
    pub fn read(&self, method: &str) -> Result<EncodedOperation, CodecError> {
        invoke_contract(&self.id, method, vec![])
    }

    pub fn get_strategy(&self, strategy: &str) -> Result<EncodedOperation, CodecError> {
        invoke_contract(&self.id, "get_strategy", vec![address_val(strategy)?])
    }

    pub fn get_redemption_request(&self, owner: &str) -> Result<EncodedOperation, CodecError> {
        invoke_contract(&self.id, "get_redemption_request", vec![address_val(owner)?])
    }
}

/// A token contract (underlying asset or vault share token).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenContract {
    id: String,
}

impl TokenContract {
    pub fn new(id: &str) -> Result<Self, VaultError> {
        if !is_valid_contract(id) {
            return Err(VaultError::InvalidContract(id.to_string()));
        }
        Ok(Self { id: id.to_string() })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn balance(&self, owner: &str) -> Result<EncodedOperation, CodecError> {
        invoke_contract(&self.id, "balance", vec![address_val(owner)?])
    }

    pub fn name(&self) -> Result<EncodedOperation, CodecError> {
        invoke_contract(&self.id, "name", vec![])
    }

    pub fn symbol(&self) -> Result<EncodedOperation, CodecError> {
        invoke_contract(&self.id, "symbol", vec![])
    }

    pub fn decimals(&self) -> Result<EncodedOperation, CodecError> {
        invoke_contract(&self.id, "decimals", vec![])
    }
}
