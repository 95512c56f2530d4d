//! Sponsored relay client against a mock relay.

use serde_json::json;
use vault_client::relay::{RelayClient, RelayError};

mod common;

#[tokio::test]
async fn test_relay_success_sends_headers_and_form() {
    let (url, requests) =
        common::start_mock_relay(200, json!({ "status": "SUCCESS", "hash": "abc123" })).await;

    let client = RelayClient::new(&url, common::TEST_JWT, "vault-client-tests", 5).unwrap();
    let hash = client.submit("AAAAenvelope", 100_000).await.unwrap();
    assert_eq!(hash, "abc123");

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(
        request.authorization.as_deref(),
        Some(format!("Bearer {}", common::TEST_JWT).as_str())
    );
    assert_eq!(request.client_name.as_deref(), Some("vault-client-tests"));
    assert_eq!(
        request.client_version.as_deref(),
        Some(env!("CARGO_PKG_VERSION"))
    );
    assert!(request.body.contains("name=\"xdr\""));
    assert!(request.body.contains("AAAAenvelope"));
    assert!(request.body.contains("name=\"fee\""));
    assert!(request.body.contains("100000"));
    assert!(request.body.contains("name=\"sim\""));
}

#[tokio::test]
async fn test_relay_http_error_carries_body() {
    let (url, _) = common::start_mock_relay(401, json!({ "error": "expired token" })).await;

    let client = RelayClient::new(&url, common::TEST_JWT, "vault-client", 5).unwrap();
    let err = client.submit("AAAA", 100).await.unwrap_err();
    match &err {
        RelayError::Http { status, body } => {
            assert_eq!(*status, 401);
            assert!(body.contains("expired token"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().starts_with("Relay error (401): "));
}

#[tokio::test]
async fn test_relay_rejection_uses_error_then_message() {
    let (url, _) =
        common::start_mock_relay(200, json!({ "status": "ERROR", "error": "tx_bad_seq" })).await;
    let client = RelayClient::new(&url, common::TEST_JWT, "vault-client", 5).unwrap();
    assert_eq!(
        client.submit("AAAA", 100).await.unwrap_err(),
        RelayError::Rejected("tx_bad_seq".to_string())
    );

    let (url, _) =
        common::start_mock_relay(200, json!({ "status": "ERROR", "message": "fee too low" }))
            .await;
    let client = RelayClient::new(&url, common::TEST_JWT, "vault-client", 5).unwrap();
    assert_eq!(
        client.submit("AAAA", 100).await.unwrap_err(),
        RelayError::Rejected("fee too low".to_string())
    );
}

#[tokio::test]
async fn test_malformed_credential_makes_no_request() {
    let (url, requests) = common::start_mock_relay(200, json!({ "status": "SUCCESS" })).await;
    let err = RelayClient::new(&url, "short.token.x", "vault-client", 5).unwrap_err();
    assert_eq!(err, RelayError::InvalidCredential);
    assert_eq!(err.to_string(), "Invalid relay credential");
    assert!(requests.lock().unwrap().is_empty());
}
