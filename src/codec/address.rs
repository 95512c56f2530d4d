//! Strkey addresses (`G...` accounts, `C...` contracts) and their XDR forms.

use stellar_strkey::{ed25519, Contract};
use stellar_xdr::curr::{AccountId, Hash, MuxedAccount, PublicKey, ScAddress, Uint256};

use crate::codec::CodecError;

/// Placeholder source account used for read-only simulations.
pub const PLACEHOLDER_ACCOUNT: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

pub fn is_valid_account(address: &str) -> bool {
    ed25519::PublicKey::from_string(address).is_ok()
}

pub fn is_valid_contract(address: &str) -> bool {
    Contract::from_string(address).is_ok()
}

/// Raw ed25519 public key of an account address.
pub fn account_bytes(address: &str) -> Result<[u8; 32], CodecError> {
    ed25519::PublicKey::from_string(address)
        .map(|pk| pk.0)
        .map_err(|_| CodecError::InvalidAddress(address.to_string()))
}

pub fn account_id(address: &str) -> Result<AccountId, CodecError> {
    let bytes = account_bytes(address)?;
    Ok(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(bytes))))
}

pub fn muxed_account(address: &str) -> Result<MuxedAccount, CodecError> {
    Ok(MuxedAccount::Ed25519(Uint256(account_bytes(address)?)))
}

/// Parse either an account or a contract address.
pub fn sc_address(address: &str) -> Result<ScAddress, CodecError> {
    if let Ok(contract) = Contract::from_string(address) {
        return Ok(ScAddress::Contract(Hash(contract.0)));
    }
    Ok(ScAddress::Account(account_id(address)?))
}

pub fn contract_address(address: &str) -> Result<ScAddress, CodecError> {
    Contract::from_string(address)
        .map(|c| ScAddress::Contract(Hash(c.0)))
        .map_err(|_| CodecError::InvalidAddress(address.to_string()))
}

/// Render an address back to its strkey form.
pub fn address_to_string(address: &ScAddress) -> String {
    match address {
        ScAddress::Account(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(bytes)))) => {
            ed25519::PublicKey(*bytes).to_string()
        }
        ScAddress::Contract(Hash(bytes)) => Contract(*bytes).to_string(),
    }
}

pub fn contract_id_to_string(hash: &[u8; 32]) -> String {
    Contract(*hash).to_string()
}

/// `GABC...WXYZ` form for display.
pub fn short_address(address: &str) -> String {
    if address.len() <= 8 {
        return address.to_string();
    }
    format!("{}...{}", &address[..4], &address[address.len() - 4..])
}
