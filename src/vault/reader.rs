//! Loads vault snapshots and token balances through read-only simulation.
//!
//! Core parameters must all load. Per-strategy and per-user reads degrade
//! to zero/absent with a warning, so one broken strategy does not hide the
//! vault.

use futures_util::future::join_all;
use std::sync::Arc;
use stellar_xdr::curr::ScVal;

use crate::codec::scval::{
    field, to_address, to_i128, to_option, to_string, to_u32, to_u64, to_vec,
};
use crate::codec::{CodecError, EncodedOperation};
use crate::transaction::TransactionPipeline;
use crate::vault::contract::{reads, TokenContract, VaultContract};
use crate::vault::snapshot::{
    RedemptionRequest, StrategyPosition, TokenMetadata, UserPosition, VaultSnapshot,
};
use crate::vault::VaultError;

pub struct VaultReader {
    pipeline: Arc<TransactionPipeline>,
}

impl VaultReader {
    pub fn new(pipeline: Arc<TransactionPipeline>) -> Self {
        Self { pipeline }
    }

    async fn call(&self, operation: Result<EncodedOperation, CodecError>) -> Result<ScVal, VaultError> {
        let operation = operation?;
        self.pipeline
            .simulate_read(&operation)
            .await
            .value()
            .map_err(VaultError::Read)
    }

    /// Balance of `owner` in `token`, in the token's base units.
    pub async fn token_balance(&self, token: &str, owner: &str) -> Result<i128, VaultError> {
        let token = TokenContract::new(token)?;
        Ok(to_i128(&self.call(token.balance(owner)).await?)?)
    }

    /// Name, symbol and decimals of `token`.
    pub async fn token_metadata(&self, token: &str) -> Result<TokenMetadata, VaultError> {
        let contract = TokenContract::new(token)?;
        let (name, symbol, decimals) = tokio::try_join!(
            self.call(contract.name()),
            self.call(contract.symbol()),
            self.call(contract.decimals()),
        )?;
        Ok(TokenMetadata {
            name: to_string(&name)?,
            symbol: to_string(&symbol)?,
            decimals: to_u32(&decimals)?,
        })
    }

    /// Full snapshot of a vault, with the user's position when `user` is set.
    pub async fn load(&self, vault_id: &str, user: Option<&str>) -> Result<VaultSnapshot, VaultError> {
        let vault = VaultContract::new(vault_id)?;

        let (share_token, token, total_shares, total_tokens, lock_time, penalty_rate, min_liquidity) =
            tokio::try_join!(
                self.call(vault.read(reads::SHARE_TOKEN)),
                self.call(vault.read(reads::TOKEN)),
                self.call(vault.read(reads::TOTAL_SHARES)),
                self.call(vault.read(reads::TOTAL_TOKENS)),
                self.call(vault.read(reads::LOCK_TIME)),
                self.call(vault.read(reads::PENALTY_RATE)),
                self.call(vault.read(reads::MIN_LIQUIDITY_RATE)),
            )?;

        let share_token = to_address(&share_token)?;
        let token = to_address(&token)?;
        let strategies = self.load_strategies(&vault).await;
        let user = match user {
            Some(owner) => Some(self.load_user(&vault, &share_token, &token, owner).await),
            None => None,
        };

        tracing::debug!(
            vault = %vault_id,
            strategies = strategies.len(),
            with_user = user.is_some(),
            "Vault snapshot loaded"
        );

        Ok(VaultSnapshot {
            vault_id: vault_id.to_string(),
            share_token,
            token,
            total_shares: to_i128(&total_shares)?,
            total_tokens: to_i128(&total_tokens)?,
            lock_duration_secs: to_u64(&lock_time)?,
            penalty_rate: to_i128(&penalty_rate)?,
            min_liquidity_rate: to_i128(&min_liquidity)?,
            strategies,
            user,
        })
    }

    async fn load_strategies(&self, vault: &VaultContract) -> Vec<StrategyPosition> {
        let addresses = match self.call(vault.read(reads::GET_STRATEGIES)).await.and_then(|v| {
            to_vec(&v)?
                .iter()
                .map(|item| to_address(item).map_err(VaultError::from))
                .collect::<Result<Vec<_>, _>>()
        }) {
            Ok(addresses) => addresses,
            Err(e) => {
                tracing::warn!(vault = %vault.id(), error = %e, "Failed to load strategies");
                return Vec::new();
            }
        };

        join_all(addresses.into_iter().map(|address| async move {
            let loaded = self.call(vault.get_strategy(&address)).await.and_then(|v| {
                Ok((
                    to_i128(field(&v, "borrowed")?)?,
                    to_i128(field(&v, "net_impact")?)?,
                ))
            });
            match loaded {
                Ok((borrowed, net_impact)) => StrategyPosition {
                    address,
                    borrowed,
                    net_impact,
                },
                Err(e) => {
                    tracing::warn!(strategy = %address, error = %e, "Failed to load strategy");
                    StrategyPosition {
                        address,
                        ..StrategyPosition::default()
                    }
                }
            }
        }))
        .await
    }

    async fn balance_or_zero(&self, token: &str, owner: &str) -> i128 {
        self.token_balance(token, owner).await.unwrap_or_else(|e| {
            tracing::warn!(token = %token, error = %e, "Failed to load token balance");
            0
        })
    }

    async fn redemption(&self, vault: &VaultContract, owner: &str) -> Option<RedemptionRequest> {
        let loaded = self
            .call(vault.get_redemption_request(owner))
            .await
            .and_then(|v| match to_option(&v) {
                None => Ok(None),
                Some(request) => Ok(Some(RedemptionRequest {
                    shares: to_i128(field(request, "shares")?)?,
                    unlock_time: to_u64(field(request, "unlock_time")?)?,
                })),
            });
        loaded.unwrap_or_else(|e| {
            tracing::warn!(vault = %vault.id(), error = %e, "Failed to load redemption request");
            None
        })
    }

    async fn load_user(
        &self,
        vault: &VaultContract,
        share_token: &str,
        token: &str,
        owner: &str,
    ) -> UserPosition {
        let (share_balance, underlying_balance, pending_redemption) = tokio::join!(
            self.balance_or_zero(share_token, owner),
            self.balance_or_zero(token, owner),
            self.redemption(vault, owner),
        );
        UserPosition {
            share_balance,
            underlying_balance,
            pending_redemption,
        }
    }
}
