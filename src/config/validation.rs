//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate URLs and value ranges
//! - Check the custom network is complete
//!
//! Returns all validation errors, not just the first.

use std::fmt;

use crate::config::schema::ClientConfig;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match config.network.preset.as_str() {
        "testnet" | "mainnet" => {}
        "custom" => {
            check_url(&mut errors, "network.rpc_url", &config.network.rpc_url);
            check_url(&mut errors, "network.indexer_url", &config.network.indexer_url);
            if config.network.passphrase.trim().is_empty() {
                errors.push(ValidationError::new(
                    "network.passphrase",
                    "must not be empty for a custom network",
                ));
            }
            if !config.network.explorer_url.is_empty() {
                check_url(&mut errors, "network.explorer_url", &config.network.explorer_url);
            }
        }
        other => errors.push(ValidationError::new(
            "network.preset",
            format!("unknown preset '{}', expected testnet, mainnet or custom", other),
        )),
    }

    if !config.relay.url.is_empty() {
        check_url(&mut errors, "relay.url", &config.relay.url);
    }

    if config.rpc.timeout_secs == 0 {
        errors.push(ValidationError::new("rpc.timeout_secs", "must be greater than 0"));
    }
    if config.transaction.base_fee == 0 {
        errors.push(ValidationError::new("transaction.base_fee", "must be greater than 0"));
    }
    if config.transaction.timeout_secs == 0 {
        errors.push(ValidationError::new("transaction.timeout_secs", "must be greater than 0"));
    }
    if config.polling.accept_max_attempts == 0 {
        errors.push(ValidationError::new(
            "polling.accept_max_attempts",
            "must be at least 1",
        ));
    }
    if config.polling.finality_max_attempts == Some(0) {
        errors.push(ValidationError::new(
            "polling.finality_max_attempts",
            "must be at least 1 when set",
        ));
    }

    for (field, hash) in [
        ("deploy.testnet_vault_wasm_hash", &config.deploy.testnet_vault_wasm_hash),
        ("deploy.testnet_token_wasm_hash", &config.deploy.testnet_token_wasm_hash),
        ("deploy.mainnet_vault_wasm_hash", &config.deploy.mainnet_vault_wasm_hash),
        ("deploy.mainnet_token_wasm_hash", &config.deploy.mainnet_token_wasm_hash),
    ] {
        if !hash.is_empty() && !is_wasm_hash(hash) {
            errors.push(ValidationError::new(field, "must be 64 hex characters"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        Ok(parsed) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", parsed.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {}", e))),
    }
}

/// A WASM hash is 32 bytes rendered as 64 hex characters.
pub fn is_wasm_hash(value: &str) -> bool {
    value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit())
}
