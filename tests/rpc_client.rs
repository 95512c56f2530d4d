//! Soroban RPC client against a mock JSON-RPC server.

use serde_json::json;
use stellar_strkey::ed25519;
use vault_client::codec::address::PLACEHOLDER_ACCOUNT;
use vault_client::codec::scval::u64_val;
use vault_client::rpc::{ChainRpc, RpcError, SorobanRpcClient};

mod common;

fn account() -> String {
    ed25519::PublicKey([5u8; 32]).to_string()
}

#[tokio::test]
async fn test_get_account_reads_sequence() {
    let address = account();
    let entry_owner = address.clone();
    let mock = common::start_mock_rpc(move |method, _| match method {
        "getLedgerEntries" => Ok(common::ledger_entries_reply(&entry_owner, 4242)),
        other => Err((-32601, format!("unexpected {other}"))),
    })
    .await;

    let client = SorobanRpcClient::new(&mock.url, 5).unwrap();
    let info = client.get_account(&address).await.unwrap();
    assert_eq!(info.account_id, address);
    assert_eq!(info.sequence, 4242);
    assert_eq!(mock.calls(), vec!["getLedgerEntries"]);
}

#[tokio::test]
async fn test_missing_account() {
    let mock = common::start_mock_rpc(|_, _| Ok(json!({ "entries": [], "latestLedger": 1 }))).await;

    let client = SorobanRpcClient::new(&mock.url, 5).unwrap();
    let err = client.get_account(PLACEHOLDER_ACCOUNT).await.unwrap_err();
    assert!(matches!(err, RpcError::AccountNotFound(_)));
}

#[tokio::test]
async fn test_server_error_is_surfaced() {
    let mock = common::start_mock_rpc(|_, _| Err((-32600, "invalid request".to_string()))).await;

    let client = SorobanRpcClient::new(&mock.url, 5).unwrap();
    let err = client.get_transaction("ab").await.unwrap_err();
    match err {
        RpcError::Server { code, message } => {
            assert_eq!(code, -32600);
            assert_eq!(message, "invalid request");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_send_and_get_transaction_shapes() {
    let mock = common::start_mock_rpc(|method, _| match method {
        "sendTransaction" => Ok(json!({ "status": "PENDING", "hash": "deadbeef" })),
        "getTransaction" => Ok(json!({ "status": "SUCCESS", "returnValue": "AAAAAQ==" })),
        other => Err((-32601, format!("unexpected {other}"))),
    })
    .await;

    let client = SorobanRpcClient::new(&mock.url, 5).unwrap();
    let sent = client.send_transaction("AAAA").await.unwrap();
    assert!(sent.is_pending());
    assert_eq!(sent.hash, "deadbeef");

    let tx = client.get_transaction("deadbeef").await.unwrap();
    assert!(tx.is_success());
    assert_eq!(tx.return_value.as_deref(), Some("AAAAAQ=="));
}

#[tokio::test]
async fn test_prepare_surfaces_simulation_error() {
    let mock = common::start_mock_rpc(|method, _| match method {
        "simulateTransaction" => Ok(json!({
            "error": "HostError: Error(Contract, #7)",
            "latestLedger": 9
        })),
        other => Err((-32601, format!("unexpected {other}"))),
    })
    .await;

    let client = SorobanRpcClient::new(&mock.url, 5).unwrap();
    let err = client.prepare_transaction("AAAA").await.unwrap_err();
    assert_eq!(err.to_string(), "HostError: Error(Contract, #7)");
}

#[tokio::test]
async fn test_simulation_result_is_passed_through() {
    let mock = common::start_mock_rpc(|_, _| Ok(common::simulation_reply(&u64_val(86_400)))).await;

    let client = SorobanRpcClient::new(&mock.url, 5).unwrap();
    let sim = client.simulate_transaction("AAAA").await.unwrap();
    assert!(sim.is_success());
    assert_eq!(sim.min_resource_fee(), 1000);
    assert!(sim.first_result().is_some());
}
