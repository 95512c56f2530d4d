//! Wallet connection lifecycle.
//!
//! # Responsibilities
//! - Connect through a chooser and remember the chosen provider
//! - Clear the session on disconnect and on network change
//! - Route signing requests to the connected provider

use tokio::sync::RwLock;

use crate::codec::address::short_address;
use crate::wallet::kit::WalletKit;
use crate::wallet::provider::WalletChooser;
use crate::wallet::types::{WalletError, WalletSession};

/// Owns the wallet kit and the current session.
pub struct SessionManager {
    kit: RwLock<WalletKit>,
    session: RwLock<WalletSession>,
}

impl SessionManager {
    pub fn new(kit: WalletKit) -> Self {
        Self {
            kit: RwLock::new(kit),
            session: RwLock::new(WalletSession::default()),
        }
    }

    /// Snapshot of the current session.
    pub async fn session(&self) -> WalletSession {
        self.session.read().await.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.session.read().await.address().is_some()
    }

    /// Preselect a provider, e.g. one restored from preferences.
    pub async fn select_wallet(&self, id: &str) -> Result<(), WalletError> {
        self.kit.write().await.set_wallet(id)
    }

    pub async fn selected_wallet_id(&self) -> Option<String> {
        self.kit.read().await.selected_id().map(str::to_string)
    }

    /// Present the providers to `chooser` and connect the chosen one.
    ///
    /// Returns `false` on cancel or provider error; the session is left
    /// unchanged in that case.
    pub async fn connect(&self, chooser: &dyn WalletChooser) -> bool {
        let options = self.kit.read().await.options();
        let Some(wallet_id) = chooser.choose(&options).await else {
            tracing::info!("Wallet selection cancelled");
            return false;
        };

        let provider = {
            let mut kit = self.kit.write().await;
            if let Err(e) = kit.set_wallet(&wallet_id) {
                tracing::warn!(error = %e, "Unable to connect wallet");
                return false;
            }
            match kit.selected() {
                Ok(provider) => provider,
                Err(e) => {
                    tracing::warn!(error = %e, "Unable to connect wallet");
                    return false;
                }
            }
        };

        match provider.get_address().await {
            Ok(address) if !address.is_empty() => {
                tracing::info!(
                    wallet = %wallet_id,
                    address = %short_address(&address),
                    "Wallet connected"
                );
                *self.session.write().await = WalletSession::connected(address, wallet_id);
                true
            }
            Ok(_) => {
                tracing::warn!(wallet = %wallet_id, "Wallet returned an empty address");
                false
            }
            Err(e) => {
                tracing::warn!(wallet = %wallet_id, error = %e, "Failed to get wallet address");
                false
            }
        }
    }

    /// Forget the session.
    pub async fn disconnect(&self) {
        let mut session = self.session.write().await;
        if session.connected {
            tracing::info!("Wallet disconnected");
        }
        *session = WalletSession::default();
    }

    /// Rebind the kit to a new network passphrase. An active session is
    /// cleared. Returns whether a session was cleared.
    pub async fn reinit(&self, network_passphrase: &str) -> bool {
        self.kit.write().await.reinit(network_passphrase);
        let mut session = self.session.write().await;
        let was_connected = session.connected;
        if was_connected {
            tracing::info!("Network changed, wallet session cleared");
            *session = WalletSession::default();
        }
        was_connected
    }

    /// Have the connected provider sign `envelope_xdr`.
    pub async fn sign(&self, envelope_xdr: &str) -> Result<String, WalletError> {
        let address = self
            .session
            .read()
            .await
            .address()
            .map(str::to_string)
            .ok_or(WalletError::NotConnected)?;

        let (provider, options) = {
            let kit = self.kit.read().await;
            (kit.selected()?, kit.sign_options(&address))
        };
        provider.sign_transaction(envelope_xdr, &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::presets::{MAINNET_PASSPHRASE, TESTNET_PASSPHRASE};
    use crate::wallet::provider::{FixedChooser, WalletProvider};
    use crate::wallet::types::{SignOptions, WalletOption};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::Mutex;

    struct StubProvider {
        id: &'static str,
        address: Result<String, String>,
        seen_passphrase: Mutex<Option<String>>,
    }

    impl StubProvider {
        fn ok(id: &'static str, address: &str) -> Arc<Self> {
            Arc::new(Self {
                id,
                address: Ok(address.to_string()),
                seen_passphrase: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl WalletProvider for StubProvider {
        fn id(&self) -> &str {
            self.id
        }

        fn name(&self) -> &str {
            "Stub"
        }

        async fn get_address(&self) -> Result<String, WalletError> {
            self.address.clone().map_err(WalletError::Rejected)
        }

        async fn sign_transaction(
            &self,
            envelope_xdr: &str,
            options: &SignOptions,
        ) -> Result<String, WalletError> {
            *self.seen_passphrase.lock().unwrap() = Some(options.network_passphrase.clone());
            Ok(format!("signed:{}", envelope_xdr))
        }
    }

    struct CancelChooser;

    #[async_trait]
    impl WalletChooser for CancelChooser {
        async fn choose(&self, _options: &[WalletOption]) -> Option<String> {
            None
        }
    }

    fn manager(provider: Arc<dyn WalletProvider>) -> SessionManager {
        SessionManager::new(WalletKit::new(vec![provider], TESTNET_PASSPHRASE))
    }

    #[tokio::test]
    async fn test_connect_and_disconnect() {
        let manager = manager(StubProvider::ok("stub", "GSTUB"));
        assert!(manager.connect(&FixedChooser::default()).await);

        let session = manager.session().await;
        assert!(session.connected);
        assert_eq!(session.account_address, "GSTUB");
        assert_eq!(session.selected_wallet_id.as_deref(), Some("stub"));

        manager.disconnect().await;
        assert_eq!(manager.session().await, WalletSession::default());
    }

    #[tokio::test]
    async fn test_cancel_leaves_session_empty() {
        let manager = manager(StubProvider::ok("stub", "GSTUB"));
        assert!(!manager.connect(&CancelChooser).await);
        assert!(!manager.is_connected().await);
    }

    #[tokio::test]
    async fn test_provider_error_returns_false() {
        let failing: Arc<dyn WalletProvider> = Arc::new(StubProvider {
            id: "broken",
            address: Err("locked".to_string()),
            seen_passphrase: Mutex::new(None),
        });
        let manager = manager(failing);
        assert!(!manager.connect(&FixedChooser::default()).await);
        assert!(!manager.is_connected().await);
    }

    #[tokio::test]
    async fn test_reinit_clears_session_and_rebinds() {
        let stub = StubProvider::ok("stub", "GSTUB");
        let manager = manager(stub.clone());
        assert!(manager.connect(&FixedChooser::default()).await);

        assert!(manager.reinit(MAINNET_PASSPHRASE).await);
        assert!(!manager.is_connected().await);
        assert!(matches!(
            manager.sign("xdr").await,
            Err(WalletError::NotConnected)
        ));

        assert!(manager.connect(&FixedChooser::default()).await);
        assert_eq!(manager.sign("xdr").await.unwrap(), "signed:xdr");
        assert_eq!(
            stub.seen_passphrase.lock().unwrap().as_deref(),
            Some(MAINNET_PASSPHRASE)
        );
    }
}
