//! Local signing key provider.
//!
//! # Security
//! - The secret seed is loaded ONLY from an environment variable
//! - Keys are never logged or serialized

use async_trait::async_trait;
use ed25519_dalek::{Signer, SigningKey};
use stellar_strkey::ed25519;
use stellar_xdr::curr::{DecoratedSignature, Signature, SignatureHint};

use crate::transaction::envelope;
use crate::wallet::provider::WalletProvider;
use crate::wallet::types::{SignOptions, WalletError};

/// Environment variable holding the `S...` secret seed.
pub const SECRET_KEY_ENV_VAR: &str = "VAULT_CLIENT_SECRET_KEY";

pub const LOCAL_WALLET_ID: &str = "local";

/// Provider backed by an ed25519 seed held in process memory.
pub struct LocalKeyProvider {
    signing_key: SigningKey,
    address: String,
}

impl LocalKeyProvider {
    /// Create a provider from an `S...` strkey seed.
    pub fn from_secret(secret: &str) -> Result<Self, WalletError> {
        let seed = ed25519::PrivateKey::from_string(secret.trim())
            .map_err(|_| WalletError::InvalidKey)?;
        let signing_key = SigningKey::from_bytes(&seed.0);
        let address = ed25519::PublicKey(signing_key.verifying_key().to_bytes()).to_string();

        tracing::info!(address = %address, "Local signing key loaded");

        Ok(Self {
            signing_key,
            address,
        })
    }

    /// Load the seed from `VAULT_CLIENT_SECRET_KEY`.
    pub fn from_env() -> Result<Self, WalletError> {
        let secret = std::env::var(SECRET_KEY_ENV_VAR)
            .map_err(|_| WalletError::MissingKey(SECRET_KEY_ENV_VAR))?;
        Self::from_secret(&secret)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    fn hint(&self) -> SignatureHint {
        let public = self.signing_key.verifying_key().to_bytes();
        SignatureHint([public[28], public[29], public[30], public[31]])
    }
}

#[async_trait]
impl WalletProvider for LocalKeyProvider {
    fn id(&self) -> &str {
        LOCAL_WALLET_ID
    }

    fn name(&self) -> &str {
        "Local key"
    }

    async fn get_address(&self) -> Result<String, WalletError> {
        Ok(self.address.clone())
    }

    async fn sign_transaction(
        &self,
        envelope_xdr: &str,
        options: &SignOptions,
    ) -> Result<String, WalletError> {
        if let Some(requested) = options.address.as_deref() {
            if requested != self.address {
                return Err(WalletError::AddressMismatch {
                    held: self.address.clone(),
                    requested: requested.to_string(),
                });
            }
        }

        let unsigned = envelope::decode(envelope_xdr)?;
        let hash = envelope::transaction_hash(&unsigned, &options.network_passphrase)?;
        let signature = self.signing_key.sign(&hash);

        let decorated = DecoratedSignature {
            hint: self.hint(),
            signature: Signature(
                signature
                    .to_bytes()
                    .to_vec()
                    .try_into()
                    .map_err(crate::codec::CodecError::from)?,
            ),
        };
        let signed = envelope::add_signature(unsigned, decorated)?;
        tracing::debug!(hash = %hex::encode(hash), "Envelope signed");
        Ok(envelope::encode(&signed)?)
    }
}

impl std::fmt::Debug for LocalKeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKeyProvider")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::address::contract_id_to_string;
    use crate::codec::operation::invoke_contract;
    use crate::network::presets::TESTNET_PASSPHRASE;
    use crate::transaction::envelope::{build_envelope, signature_count, EnvelopeSettings};
    use ed25519_dalek::{Verifier, VerifyingKey};
    use stellar_xdr::curr::TransactionEnvelope;

    fn test_secret() -> String {
        ed25519::PrivateKey([7u8; 32]).to_string()
    }

    fn unsigned_for(address: &str) -> String {
        let op = invoke_contract(&contract_id_to_string(&[2u8; 32]), "total_shares", vec![])
            .unwrap();
        let env = build_envelope(address, 10, &op, &EnvelopeSettings::default(), 0).unwrap();
        envelope::encode(&env).unwrap()
    }

    #[test]
    fn test_from_secret() {
        let provider = LocalKeyProvider::from_secret(&test_secret()).unwrap();
        assert!(provider.address().starts_with('G'));
        assert!(matches!(
            LocalKeyProvider::from_secret("SNOTAKEY"),
            Err(WalletError::InvalidKey)
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let provider = LocalKeyProvider::from_secret(&test_secret()).unwrap();
        let debug = format!("{:?}", provider);
        assert!(!debug.contains(&test_secret()));
    }

    #[tokio::test]
    async fn test_signature_verifies() {
        let provider = LocalKeyProvider::from_secret(&test_secret()).unwrap();
        let address = provider.get_address().await.unwrap();
        let unsigned = unsigned_for(&address);

        let options = SignOptions {
            network_passphrase: TESTNET_PASSPHRASE.to_string(),
            address: Some(address.clone()),
        };
        let signed = envelope::decode(&provider.sign_transaction(&unsigned, &options).await.unwrap())
            .unwrap();
        assert_eq!(signature_count(&signed), 1);

        let hash = envelope::transaction_hash(&signed, TESTNET_PASSPHRASE).unwrap();
        let TransactionEnvelope::Tx(v1) = &signed else {
            panic!("expected v1 envelope");
        };
        let raw: [u8; 64] = v1.signatures[0].signature.0.to_vec().try_into().unwrap();
        let public = VerifyingKey::from_bytes(&ed25519::PublicKey::from_string(&address).unwrap().0)
            .unwrap();
        assert!(public
            .verify(&hash, &ed25519_dalek::Signature::from_bytes(&raw))
            .is_ok());
    }

    #[tokio::test]
    async fn test_refuses_other_account() {
        let provider = LocalKeyProvider::from_secret(&test_secret()).unwrap();
        let other = crate::codec::address::PLACEHOLDER_ACCOUNT;
        let options = SignOptions {
            network_passphrase: TESTNET_PASSPHRASE.to_string(),
            address: Some(other.to_string()),
        };
        let result = provider.sign_transaction(&unsigned_for(other), &options).await;
        assert!(matches!(result, Err(WalletError::AddressMismatch { .. })));
    }
}
