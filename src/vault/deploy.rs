//! New vault deployment: parameter validation, salt, and contract id.
//!
//! The contract id is derived from (network id, deployer, salt) so the new
//! vault address is known before the transaction is submitted.

use rand::RngCore;
use sha2::{Digest, Sha256};
use stellar_xdr::curr::{
    ContractExecutable, ContractIdPreimage, ContractIdPreimageFromAddress, CreateContractArgsV2,
    Hash, HashIdPreimage, HashIdPreimageContractId, HostFunction, Limits, Uint256, WriteXdr,
};
use thiserror::Error;

use crate::codec::address::{
    contract_id_to_string, is_valid_account, is_valid_contract, sc_address,
};
use crate::codec::operation::host_function_op;
use crate::codec::scval::{address_val, address_vec_val, bytes_val, i128_val, string_val, u64_val};
use crate::codec::{CodecError, EncodedOperation};
use crate::config::validation::is_wasm_hash;
use crate::transaction::envelope::network_id;
use crate::vault::units::percent_to_rate;
use crate::vault::VaultError;

pub const MAX_NAME_LEN: usize = 32;
pub const MAX_SYMBOL_LEN: usize = 12;

/// One invalid deploy field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeployError {
    #[error("token must be a contract address")]
    InvalidToken,

    #[error("name must be 1-32 characters")]
    InvalidName,

    #[error("symbol must be 1-12 characters")]
    InvalidSymbol,

    #[error("at least one strategy is required")]
    NoStrategies,

    #[error("invalid strategy address '{0}'")]
    InvalidStrategy(String),

    #[error("{0} must be 64 hex characters")]
    InvalidWasmHash(&'static str),

    #[error("{field}: {message}")]
    InvalidPercent {
        field: &'static str,
        message: String,
    },
}

/// User input for a new vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployParams {
    pub token: String,
    pub name: String,
    pub symbol: String,
    pub strategies: Vec<String>,
    pub lock_time_secs: u64,
    /// Percent string, e.g. `"10"`.
    pub penalty_percent: String,
    pub min_liquidity_percent: String,
    pub vault_wasm_hash: String,
    pub token_wasm_hash: String,
}

/// A ready-to-submit deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    pub operation: EncodedOperation,
    /// Address the vault will have once deployed.
    pub contract_id: String,
    pub salt: [u8; 32],
}

pub fn random_salt() -> [u8; 32] {
    let mut salt = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

fn decode_hash(hex_str: &str) -> Result<[u8; 32], CodecError> {
    let bytes = hex::decode(hex_str).map_err(|e| CodecError::InvalidAddress(e.to_string()))?;
    bytes.try_into().map_err(|_| CodecError::UnexpectedType {
        expected: "32-byte hash",
        found: hex_str.to_string(),
    })
}

/// Address that `deployer` will create with `salt` on the given network.
pub fn derive_contract_id(
    deployer: &str,
    salt: &[u8; 32],
    passphrase: &str,
) -> Result<String, CodecError> {
    let preimage = HashIdPreimage::ContractId(HashIdPreimageContractId {
        network_id: network_id(passphrase),
        contract_id_preimage: address_preimage(deployer, salt)?,
    });
    let digest: [u8; 32] = Sha256::digest(preimage.to_xdr(Limits::none())?).into();
    Ok(contract_id_to_string(&digest))
}

fn address_preimage(deployer: &str, salt: &[u8; 32]) -> Result<ContractIdPreimage, CodecError> {
    Ok(ContractIdPreimage::Address(ContractIdPreimageFromAddress {
        address: sc_address(deployer)?,
        salt: Uint256(*salt),
    }))
}

fn rate(field: &'static str, value: &str) -> Result<i128, DeployError> {
    percent_to_rate(value).map_err(|e| DeployError::InvalidPercent {
        field,
        message: e.to_string(),
    })
}

impl DeployParams {
    /// Check every field, reporting all failures.
    pub fn validate(&self) -> Result<(), Vec<DeployError>> {
        let mut errors = Vec::new();

        if !is_valid_contract(self.token.trim()) {
            errors.push(DeployError::InvalidToken);
        }
        let name_len = self.name.trim().chars().count();
        if name_len == 0 || name_len > MAX_NAME_LEN {
            errors.push(DeployError::InvalidName);
        }
        let symbol_len = self.symbol.trim().chars().count();
        if symbol_len == 0 || symbol_len > MAX_SYMBOL_LEN {
            errors.push(DeployError::InvalidSymbol);
        }

        let strategies: Vec<&str> = self
            .strategies
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if strategies.is_empty() {
            errors.push(DeployError::NoStrategies);
        }
        for strategy in strategies {
            if !is_valid_contract(strategy) && !is_valid_account(strategy) {
                errors.push(DeployError::InvalidStrategy(strategy.to_string()));
            }
        }

        if !is_wasm_hash(&self.vault_wasm_hash) {
            errors.push(DeployError::InvalidWasmHash("vault WASM hash"));
        }
        if !is_wasm_hash(&self.token_wasm_hash) {
            errors.push(DeployError::InvalidWasmHash("token WASM hash"));
        }

        if let Err(e) = self.penalty_rate() {
            errors.push(e);
        }
        if let Err(e) = self.min_liquidity_rate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn penalty_rate(&self) -> Result<i128, DeployError> {
        rate("penalty rate", &self.penalty_percent)
    }

    pub fn min_liquidity_rate(&self) -> Result<i128, DeployError> {
        rate("minimum liquidity rate", &self.min_liquidity_percent)
    }

    /// Build the create-contract operation. Rates that do not parse are
    /// reported as `InvalidDeploy`; `validate` reports every bad field.
    pub fn plan(
        &self,
        deployer: &str,
        passphrase: &str,
        salt: [u8; 32],
    ) -> Result<DeployPlan, VaultError> {
        let strategies: Vec<String> = self
            .strategies
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let rates = (self.penalty_rate(), self.min_liquidity_rate());
        let (penalty_rate, min_liquidity_rate) = match rates {
            (Ok(penalty), Ok(min_liquidity)) => (penalty, min_liquidity),
            (penalty, min_liquidity) => {
                let errors = [penalty.err(), min_liquidity.err()]
                    .into_iter()
                    .flatten()
                    .collect();
                return Err(VaultError::InvalidDeploy(errors));
            }
        };

        let constructor_args = vec![
            address_val(self.token.trim())?,
            bytes_val(&decode_hash(&self.token_wasm_hash)?)?,
            string_val(self.name.trim())?,
            string_val(self.symbol.trim())?,
            address_vec_val(&strategies)?,
            u64_val(self.lock_time_secs),
            i128_val(penalty_rate),
            i128_val(min_liquidity_rate),
        ];

        let host_function = HostFunction::CreateContractV2(CreateContractArgsV2 {
            contract_id_preimage: address_preimage(deployer, &salt)?,
            executable: ContractExecutable::Wasm(Hash(decode_hash(&self.vault_wasm_hash)?)),
            constructor_args: constructor_args.try_into().map_err(CodecError::from)?,
        });

        Ok(DeployPlan {
            operation: host_function_op(host_function)?,
            contract_id: derive_contract_id(deployer, &salt, passphrase)?,
            salt,
        })
    }
}
