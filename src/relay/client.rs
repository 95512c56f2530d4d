//! Sponsored-submission relay client.
//!
//! The relay pays fees and submits on the caller's behalf. It receives the
//! signed envelope as a multipart form and answers with a JSON status.

use reqwest::multipart::Form;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// Value sent in the `X-Client-Version` header.
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors from the relay path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelayError {
    /// Credential is not shaped like a JWT; nothing was sent.
    #[error("Invalid relay credential")]
    InvalidCredential,

    /// Non-2xx response.
    #[error("Relay error ({status}): {body}")]
    Http { status: u16, body: String },

    /// 2xx response that did not report success.
    #[error("{0}")]
    Rejected(String),

    #[error("Relay request failed: {0}")]
    Transport(String),

    #[error("Relay timeout after {0} seconds")]
    Timeout(u64),
}

/// Three base64url segments separated by dots, longer than 30 characters.
pub fn is_valid_jwt(credential: &str) -> bool {
    if credential.len() <= 30 {
        return false;
    }
    let segments: Vec<&str> = credential.split('.').collect();
    segments.len() == 3
        && segments.iter().all(|segment| {
            !segment.is_empty()
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        })
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    hash: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Client for one relay endpoint and credential.
pub struct RelayClient {
    http: reqwest::Client,
    url: String,
    credential: String,
    client_name: String,
    timeout_duration: Duration,
}

impl RelayClient {
    /// Create a client. Fails without any network activity when the
    /// credential is malformed.
    pub fn new(
        url: &str,
        credential: &str,
        client_name: &str,
        timeout_secs: u64,
    ) -> Result<Self, RelayError> {
        if !is_valid_jwt(credential) {
            return Err(RelayError::InvalidCredential);
        }
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            url: url.to_string(),
            credential: credential.to_string(),
            client_name: client_name.to_string(),
            timeout_duration: Duration::from_secs(timeout_secs),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Submit a signed envelope. Returns the transaction hash on success.
    ///
    /// # Arguments
    /// * `envelope_xdr` - Signed base64 envelope
    /// * `fee` - Fee the relay may spend, in stroops
    pub async fn submit(&self, envelope_xdr: &str, fee: u32) -> Result<String, RelayError> {
        let form = Form::new()
            .text("xdr", envelope_xdr.to_string())
            .text("fee", fee.to_string())
            .text("sim", "true");

        let request = self
            .http
            .post(&self.url)
            .bearer_auth(&self.credential)
            .header("X-Client-Name", &self.client_name)
            .header("X-Client-Version", CLIENT_VERSION)
            .multipart(form);

        let fut = async {
            let response = request
                .send()
                .await
                .map_err(|e| RelayError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(RelayError::Http {
                    status: status.as_u16(),
                    body,
                });
            }

            response
                .json::<RelayResponse>()
                .await
                .map_err(|e| RelayError::Transport(e.to_string()))
        };

        let body = match timeout(self.timeout_duration, fut).await {
            Ok(result) => result?,
            Err(_) => return Err(RelayError::Timeout(self.timeout_duration.as_secs())),
        };

        match (body.status.as_deref(), body.hash) {
            (Some("SUCCESS"), Some(hash)) if !hash.is_empty() => {
                tracing::debug!(hash = %hash, "Relay accepted transaction");
                Ok(hash)
            }
            _ => Err(RelayError::Rejected(
                body.error
                    .or(body.message)
                    .unwrap_or_else(|| "Relay transaction failed".to_string()),
            )),
        }
    }
}

impl std::fmt::Debug for RelayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayClient")
            .field("url", &self.url)
            .field("credential", &"<redacted>")
            .field("client_name", &self.client_name)
            .finish()
    }
}
