//! Transaction pipeline: build, prepare, sign, submit, confirm.
//!
//! # Responsibilities
//! - Build a single-operation envelope against the account's sequence
//! - Choose the relay path or the direct RPC path
//! - Drive the lifecycle tracker through its states
//! - Poll for acceptance (bounded) and finality (unbounded by default)
//! - Fold every failure into a `TransactionResult`

use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use stellar_xdr::curr::{Limits, ReadXdr, TransactionMeta};
use tracing::Instrument;
use uuid::Uuid;

use crate::codec::address::{short_address, PLACEHOLDER_ACCOUNT};
use crate::codec::{scval, EncodedOperation};
use crate::config::ClientConfig;
use crate::network::{NetworkConfig, NetworkStore};
use crate::observability::metrics;
use crate::relay::RelayClient;
use crate::resilience::{poll_until, PollOutcome, RetryPolicy};
use crate::rpc::{ChainRpc, GetTransactionResponse, RpcConnector, SimulateResponse};
use crate::transaction::envelope::{self, EnvelopeSettings};
use crate::transaction::lifecycle::{Generation, TxStatus, TxTracker};
use crate::transaction::types::{PipelineError, SimulationResult, TransactionResult};
use crate::wallet::{SessionManager, WalletError};

/// Tunables for envelope building and polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub envelope: EnvelopeSettings,
    /// Re-send policy until the RPC reports PENDING.
    pub accept: RetryPolicy,
    /// `getTransaction` policy until a terminal status.
    pub finality: RetryPolicy,
    pub relay_timeout_secs: u64,
    pub client_name: String,
}

impl PipelineSettings {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            envelope: EnvelopeSettings {
                base_fee: config.transaction.base_fee,
                timeout_secs: config.transaction.timeout_secs,
            },
            accept: config.polling.accept_policy(),
            finality: config.polling.finality_policy(),
            relay_timeout_secs: config.rpc.timeout_secs,
            client_name: config.relay.client_name.clone(),
        }
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Contract return value from a confirmed transaction, as base64 `ScVal`.
fn extract_return_value(tx: &GetTransactionResponse) -> Option<String> {
    if let Some(value) = &tx.return_value {
        return Some(value.clone());
    }
    let meta = TransactionMeta::from_xdr_base64(tx.result_meta_xdr.as_deref()?, Limits::none())
        .ok()?;
    match meta {
        TransactionMeta::V3(v3) => v3
            .soroban_meta
            .and_then(|soroban| scval::to_base64(&soroban.return_value).ok()),
        _ => None,
    }
}

fn simulation_result(simulation: SimulateResponse) -> SimulationResult {
    if let Some(error) = simulation.error.clone() {
        return SimulationResult::failure(error);
    }
    SimulationResult {
        success: true,
        error: None,
        return_value: simulation.first_result().map(|r| r.xdr.clone()),
        min_resource_fee: simulation.min_resource_fee(),
    }
}

/// Submits and simulates encoded operations for the connected account.
pub struct TransactionPipeline {
    connector: Arc<dyn RpcConnector>,
    network: Arc<NetworkStore>,
    wallet: Arc<SessionManager>,
    tracker: Arc<TxTracker>,
    settings: PipelineSettings,
}

impl TransactionPipeline {
    pub fn new(
        connector: Arc<dyn RpcConnector>,
        network: Arc<NetworkStore>,
        wallet: Arc<SessionManager>,
        tracker: Arc<TxTracker>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            connector,
            network,
            wallet,
            tracker,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn tracker(&self) -> &Arc<TxTracker> {
        &self.tracker
    }

    /// Build, sign, submit and confirm `operation`.
    ///
    /// Requires a connected wallet; without one, returns a failure and makes
    /// no network calls.
    pub async fn submit(&self, operation: &EncodedOperation) -> TransactionResult {
        let session = self.wallet.session().await;
        let Some(source) = session.address().map(str::to_string) else {
            return TransactionResult::failure(WalletError::NotConnected.to_string(), None);
        };

        let network = self.network.active();
        let path = if network.relay_endpoint().is_some() {
            "relay"
        } else {
            "direct"
        };
        let span = tracing::info_span!(
            "submit",
            submission_id = %Uuid::new_v4(),
            network = %network.kind,
            source = %short_address(&source),
            path
        );

        async move {
            let generation = self.tracker.begin();
            let started = Instant::now();

            let result = match self
                .run_submit(generation, &network, &source, operation)
                .await
            {
                Ok(result) => result,
                Err(e) => TransactionResult::failure(e.to_string(), None),
            };

            metrics::record_transaction(path, result.success, started.elapsed());
            if result.success {
                tracing::info!(hash = ?result.hash, "Transaction succeeded");
            } else {
                tracing::warn!(error = ?result.error, hash = ?result.hash, "Transaction failed");
            }
            self.tracker.finish_in(generation, result.clone());
            result
        }
        .instrument(span)
        .await
    }

    async fn run_submit(
        &self,
        generation: Generation,
        network: &NetworkConfig,
        source: &str,
        operation: &EncodedOperation,
    ) -> Result<TransactionResult, PipelineError> {
        let relay = match network.relay_endpoint() {
            Some((url, credential)) => Some(RelayClient::new(
                url,
                credential,
                &self.settings.client_name,
                self.settings.relay_timeout_secs,
            )?),
            None => None,
        };

        let rpc = self.connector.connect(&network.rpc_url)?;
        let account = rpc.get_account(source).await?;
        let unsigned = envelope::encode(&envelope::build_envelope(
            source,
            account.sequence,
            operation,
            &self.settings.envelope,
            now_unix(),
        )?)?;
        tracing::debug!(sequence = account.sequence + 1, "Envelope built");

        if let Some(relay) = relay {
            self.tracker.advance_in(generation, TxStatus::AwaitingSignature);
            let signed = self.wallet.sign(&unsigned).await?;
            self.tracker.advance_in(generation, TxStatus::Submitting);
            let hash = relay.submit(&signed, self.settings.envelope.base_fee).await?;
            return Ok(TransactionResult::success(hash, None));
        }

        let prepared = rpc.prepare_transaction(&unsigned).await?;
        self.tracker.advance_in(generation, TxStatus::AwaitingSignature);
        let signed = self.wallet.sign(&prepared).await?;
        self.tracker.advance_in(generation, TxStatus::Submitting);

        let local_hash = hex::encode(envelope::transaction_hash(
            &envelope::decode(&signed)?,
            &network.passphrase,
        )?);
        self.send_and_confirm(rpc.as_ref(), &signed, local_hash).await
    }

    async fn send_and_confirm(
        &self,
        rpc: &dyn ChainRpc,
        signed: &str,
        local_hash: String,
    ) -> Result<TransactionResult, PipelineError> {
        let accepted = poll_until(
            &self.settings.accept,
            |attempt| async move {
                tracing::debug!(attempt, "Sending transaction");
                rpc.send_transaction(signed).await
            },
            |response| response.is_pending(),
        )
        .await?;

        let sent = match accepted {
            PollOutcome::Ready(sent) => sent,
            PollOutcome::Exhausted { last, attempts } => {
                tracing::warn!(status = %last.status, attempts, "Transaction not accepted");
                let hash = (!last.hash.is_empty()).then_some(last.hash);
                return Ok(TransactionResult::failure(
                    format!("Failed to submit transaction: {}", last.status),
                    hash,
                ));
            }
        };

        let hash = if sent.hash.is_empty() {
            local_hash
        } else {
            sent.hash
        };
        tracing::info!(hash = %hash, "Transaction accepted, awaiting finality");

        let finality = poll_until(
            &self.settings.finality,
            |_| rpc.get_transaction(&hash),
            |response| response.is_terminal(),
        )
        .await?;

        Ok(match finality {
            PollOutcome::Ready(tx) if tx.is_success() => {
                TransactionResult::success(hash, extract_return_value(&tx))
            }
            PollOutcome::Ready(tx) => {
                TransactionResult::failure(format!("Transaction failed: {}", tx.status), Some(hash))
            }
            PollOutcome::Exhausted { last, attempts } => TransactionResult::failure(
                format!(
                    "Transaction not confirmed after {} polls: {}",
                    attempts, last.status
                ),
                Some(hash),
            ),
        })
    }

    /// Simulate `operation` as the connected account.
    pub async fn simulate(&self, operation: &EncodedOperation) -> SimulationResult {
        let session = self.wallet.session().await;
        let Some(source) = session.address() else {
            return SimulationResult::failure(WalletError::NotConnected.to_string());
        };

        let network = self.network.active();
        match self.run_simulate(&network, source, None, operation).await {
            Ok(result) => result,
            Err(e) => SimulationResult::failure(e.to_string()),
        }
    }

    /// Simulate a read-only call from the placeholder account. No wallet
    /// connection is needed.
    pub async fn simulate_read(&self, operation: &EncodedOperation) -> SimulationResult {
        let network = self.network.active();
        match self
            .run_simulate(&network, PLACEHOLDER_ACCOUNT, Some(0), operation)
            .await
        {
            Ok(result) => result,
            Err(e) => SimulationResult::failure(e.to_string()),
        }
    }

    async fn run_simulate(
        &self,
        network: &NetworkConfig,
        source: &str,
        sequence: Option<i64>,
        operation: &EncodedOperation,
    ) -> Result<SimulationResult, PipelineError> {
        let rpc = self.connector.connect(&network.rpc_url)?;
        let sequence = match sequence {
            Some(sequence) => sequence,
            None => rpc.get_account(source).await?.sequence,
        };
        let unsigned = envelope::encode(&envelope::build_envelope(
            source,
            sequence,
            operation,
            &self.settings.envelope,
            now_unix(),
        )?)?;
        let simulation = rpc.simulate_transaction(&unsigned).await?;
        Ok(simulation_result(simulation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::address::contract_id_to_string;
    use crate::codec::operation::invoke_contract;
    use crate::network::presets::TESTNET_PASSPHRASE;
    use crate::rpc::types::{send_status, tx_status, SimulateHostFunctionResult};
    use crate::rpc::{AccountInfo, RpcError, RpcResult, SendResponse};
    use crate::transaction::lifecycle::TxState;
    use crate::wallet::{
        FixedChooser, LocalKeyProvider, SignOptions, WalletKit, WalletProvider,
    };
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct MockRpc {
        send_statuses: Mutex<VecDeque<&'static str>>,
        tx_statuses: Mutex<VecDeque<&'static str>>,
        calls: Mutex<Vec<&'static str>>,
        fail_account: bool,
    }

    impl MockRpc {
        fn scripted(send: &[&'static str], tx: &[&'static str]) -> Arc<Self> {
            Arc::new(Self {
                send_statuses: Mutex::new(send.iter().copied().collect()),
                tx_statuses: Mutex::new(tx.iter().copied().collect()),
                ..Self::default()
            })
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn count(&self, call: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
        }

        fn total_calls(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn next(queue: &Mutex<VecDeque<&'static str>>) -> &'static str {
            let mut queue = queue.lock().unwrap();
            if queue.len() > 1 {
                queue.pop_front().unwrap()
            } else {
                queue.front().copied().unwrap_or(send_status::ERROR)
            }
        }
    }

    #[async_trait]
    impl ChainRpc for MockRpc {
        async fn get_account(&self, address: &str) -> RpcResult<AccountInfo> {
            self.record("getAccount");
            if self.fail_account {
                return Err(RpcError::Transport("connection refused".to_string()));
            }
            Ok(AccountInfo {
                account_id: address.to_string(),
                sequence: 5,
            })
        }

        async fn simulate_transaction(&self, _envelope_xdr: &str) -> RpcResult<SimulateResponse> {
            self.record("simulateTransaction");
            Ok(SimulateResponse {
                min_resource_fee: Some("100".to_string()),
                results: Some(vec![SimulateHostFunctionResult {
                    auth: None,
                    xdr: scval::to_base64(&scval::i128_val(42)).unwrap(),
                }]),
                ..SimulateResponse::default()
            })
        }

        async fn prepare_transaction(&self, envelope_xdr: &str) -> RpcResult<String> {
            self.record("prepareTransaction");
            Ok(envelope_xdr.to_string())
        }

        async fn send_transaction(&self, _envelope_xdr: &str) -> RpcResult<SendResponse> {
            self.record("sendTransaction");
            Ok(SendResponse {
                status: Self::next(&self.send_statuses).to_string(),
                hash: "c0ffee".to_string(),
                error_result_xdr: None,
            })
        }

        async fn get_transaction(&self, _hash: &str) -> RpcResult<GetTransactionResponse> {
            self.record("getTransaction");
            Ok(GetTransactionResponse {
                status: Self::next(&self.tx_statuses).to_string(),
                ..GetTransactionResponse::default()
            })
        }
    }

    struct MockConnector(Arc<MockRpc>);

    impl RpcConnector for MockConnector {
        fn connect(&self, _rpc_url: &str) -> RpcResult<Arc<dyn ChainRpc>> {
            Ok(self.0.clone())
        }
    }

    struct DecliningProvider;

    #[async_trait]
    impl WalletProvider for DecliningProvider {
        fn id(&self) -> &str {
            "declining"
        }

        fn name(&self) -> &str {
            "Declining"
        }

        async fn get_address(&self) -> Result<String, WalletError> {
            Ok(PLACEHOLDER_ACCOUNT.to_string())
        }

        async fn sign_transaction(
            &self,
            _envelope_xdr: &str,
            _options: &SignOptions,
        ) -> Result<String, WalletError> {
            Err(WalletError::Rejected("User declined access".to_string()))
        }
    }

    /// Signs with a local key after dismissing the tracked transaction,
    /// as a disconnect during signing would.
    struct DismissingProvider {
        tracker: Arc<TxTracker>,
        inner: Arc<dyn WalletProvider>,
    }

    #[async_trait]
    impl WalletProvider for DismissingProvider {
        fn id(&self) -> &str {
            "dismissing"
        }

        fn name(&self) -> &str {
            "Dismissing"
        }

        async fn get_address(&self) -> Result<String, WalletError> {
            self.inner.get_address().await
        }

        async fn sign_transaction(
            &self,
            envelope_xdr: &str,
            options: &SignOptions,
        ) -> Result<String, WalletError> {
            self.tracker.reset();
            self.inner.sign_transaction(envelope_xdr, options).await
        }
    }

    fn fast_settings() -> PipelineSettings {
        PipelineSettings {
            accept: RetryPolicy::bounded(Duration::from_millis(1), 3),
            finality: RetryPolicy::unbounded(Duration::from_millis(1)),
            ..PipelineSettings::default()
        }
    }

    fn local_provider() -> Arc<dyn WalletProvider> {
        let secret = stellar_strkey::ed25519::PrivateKey([9u8; 32]).to_string();
        Arc::new(LocalKeyProvider::from_secret(&secret).unwrap())
    }

    async fn pipeline_with(
        rpc: Arc<MockRpc>,
        provider: Arc<dyn WalletProvider>,
        network: NetworkConfig,
        connect: bool,
    ) -> TransactionPipeline {
        let wallet = Arc::new(SessionManager::new(WalletKit::new(
            vec![provider],
            TESTNET_PASSPHRASE,
        )));
        if connect {
            assert!(wallet.connect(&FixedChooser::default()).await);
        }
        TransactionPipeline::new(
            Arc::new(MockConnector(rpc)),
            Arc::new(NetworkStore::new(network)),
            wallet,
            Arc::new(TxTracker::new()),
            fast_settings(),
        )
    }

    fn deposit_op() -> EncodedOperation {
        invoke_contract(
            &contract_id_to_string(&[4u8; 32]),
            "total_tokens",
            vec![],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_not_connected_makes_no_calls() {
        let rpc = MockRpc::scripted(&[send_status::PENDING], &[tx_status::SUCCESS]);
        let pipeline =
            pipeline_with(rpc.clone(), local_provider(), NetworkConfig::testnet(), false).await;

        let result = pipeline.submit(&deposit_op()).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("wallet not connected"));
        assert_eq!(rpc.total_calls(), 0);
        assert_eq!(pipeline.tracker().current().status, TxStatus::None);

        let simulation = pipeline.simulate(&deposit_op()).await;
        assert!(!simulation.success);
        assert_eq!(rpc.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_pending_then_success() {
        let rpc = MockRpc::scripted(
            &[send_status::PENDING],
            &[tx_status::NOT_FOUND, tx_status::SUCCESS],
        );
        let pipeline =
            pipeline_with(rpc.clone(), local_provider(), NetworkConfig::testnet(), true).await;

        let result = pipeline.submit(&deposit_op()).await;
        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.hash.as_deref(), Some("c0ffee"));
        assert_eq!(rpc.count("sendTransaction"), 1);
        assert_eq!(rpc.count("getTransaction"), 2);

        let state = pipeline.tracker().current();
        assert_eq!(state.status, TxStatus::Succeeded);
        assert_eq!(state.result, Some(result));
    }

    #[tokio::test]
    async fn test_resend_until_pending() {
        let rpc = MockRpc::scripted(
            &[send_status::TRY_AGAIN_LATER, send_status::PENDING],
            &[tx_status::SUCCESS],
        );
        let pipeline =
            pipeline_with(rpc.clone(), local_provider(), NetworkConfig::testnet(), true).await;

        let result = pipeline.submit(&deposit_op()).await;
        assert!(result.success);
        assert_eq!(rpc.count("sendTransaction"), 2);
    }

    #[tokio::test]
    async fn test_never_pending_fails_without_polling() {
        let rpc = MockRpc::scripted(&[send_status::TRY_AGAIN_LATER], &[tx_status::SUCCESS]);
        let pipeline =
            pipeline_with(rpc.clone(), local_provider(), NetworkConfig::testnet(), true).await;

        let result = pipeline.submit(&deposit_op()).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("TRY_AGAIN_LATER"));
        assert_eq!(rpc.count("sendTransaction"), 3);
        assert_eq!(rpc.count("getTransaction"), 0);
        assert_eq!(pipeline.tracker().current().status, TxStatus::Failed);
    }

    #[tokio::test]
    async fn test_failed_transaction_keeps_hash() {
        let rpc = MockRpc::scripted(&[send_status::PENDING], &[tx_status::FAILED]);
        let pipeline =
            pipeline_with(rpc.clone(), local_provider(), NetworkConfig::testnet(), true).await;

        let result = pipeline.submit(&deposit_op()).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Transaction failed: FAILED"));
        assert_eq!(result.hash.as_deref(), Some("c0ffee"));
    }

    #[tokio::test]
    async fn test_declined_signature_surfaces_provider_text() {
        let rpc = MockRpc::scripted(&[send_status::PENDING], &[tx_status::SUCCESS]);
        let pipeline = pipeline_with(
            rpc.clone(),
            Arc::new(DecliningProvider),
            NetworkConfig::testnet(),
            true,
        )
        .await;

        let result = pipeline.submit(&deposit_op()).await;
        assert_eq!(result.error.as_deref(), Some("User declined access"));
        assert_eq!(rpc.count("sendTransaction"), 0);
        assert_eq!(pipeline.tracker().current().status, TxStatus::Failed);
    }

    #[tokio::test]
    async fn test_dismissed_submission_leaves_tracker_idle() {
        let rpc = MockRpc::scripted(&[send_status::PENDING], &[tx_status::SUCCESS]);
        let tracker = Arc::new(TxTracker::new());
        let provider: Arc<dyn WalletProvider> = Arc::new(DismissingProvider {
            tracker: tracker.clone(),
            inner: local_provider(),
        });
        let wallet = Arc::new(SessionManager::new(WalletKit::new(
            vec![provider],
            TESTNET_PASSPHRASE,
        )));
        assert!(wallet.connect(&FixedChooser::default()).await);
        let pipeline = TransactionPipeline::new(
            Arc::new(MockConnector(rpc.clone())),
            Arc::new(NetworkStore::new(NetworkConfig::testnet())),
            wallet,
            tracker.clone(),
            fast_settings(),
        );

        let result = pipeline.submit(&deposit_op()).await;
        assert!(result.success, "{:?}", result.error);
        assert_eq!(tracker.current(), TxState::default());
    }

    #[tokio::test]
    async fn test_transport_error_is_folded() {
        let rpc = Arc::new(MockRpc {
            fail_account: true,
            ..MockRpc::default()
        });
        let pipeline =
            pipeline_with(rpc.clone(), local_provider(), NetworkConfig::testnet(), true).await;

        let result = pipeline.submit(&deposit_op()).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_invalid_relay_credential_skips_network() {
        let rpc = MockRpc::scripted(&[send_status::PENDING], &[tx_status::SUCCESS]);
        let network = NetworkConfig::testnet().with_relay("short.bad.jwt");
        let pipeline = pipeline_with(rpc.clone(), local_provider(), network, true).await;

        let result = pipeline.submit(&deposit_op()).await;
        assert_eq!(result.error.as_deref(), Some("Invalid relay credential"));
        assert_eq!(rpc.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_simulate_read_needs_no_wallet() {
        let rpc = MockRpc::scripted(&[], &[]);
        let pipeline =
            pipeline_with(rpc.clone(), local_provider(), NetworkConfig::testnet(), false).await;

        let simulation = pipeline.simulate_read(&deposit_op()).await;
        assert!(simulation.success);
        assert_eq!(simulation.min_resource_fee, 100);
        assert_eq!(scval::to_i128(&simulation.value().unwrap()).unwrap(), 42);
        assert_eq!(rpc.count("getAccount"), 0);
        assert_eq!(rpc.count("simulateTransaction"), 1);
    }

    #[test]
    fn test_return_value_prefers_direct_field() {
        let encoded = scval::to_base64(&scval::u64_val(7)).unwrap();
        let tx = GetTransactionResponse {
            status: tx_status::SUCCESS.to_string(),
            return_value: Some(encoded.clone()),
            ..GetTransactionResponse::default()
        };
        assert_eq!(extract_return_value(&tx), Some(encoded));

        let tx = GetTransactionResponse {
            status: tx_status::SUCCESS.to_string(),
            result_meta_xdr: Some("garbage".to_string()),
            ..GetTransactionResponse::default()
        };
        assert_eq!(extract_return_value(&tx), None);
    }
}
