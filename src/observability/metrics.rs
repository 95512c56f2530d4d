//! Metrics collection.
//!
//! # Metrics
//! - `vault_client_transactions_total` (counter): submissions by path, outcome
//! - `vault_client_submit_duration_seconds` (histogram): submit latency
//! - `vault_client_rpc_requests_total` (counter): RPC calls by method, outcome
//! - `vault_client_cache_invalidations_total` (counter): cache scope drops
//!
//! Recording goes through the `metrics` facade; with no recorder installed
//! the calls are no-ops.

use std::time::Duration;

fn outcome(ok: bool) -> &'static str {
    if ok {
        "success"
    } else {
        "failure"
    }
}

/// Record a finished submission.
///
/// # Arguments
/// * `path` - `"direct"` or `"relay"`
pub fn record_transaction(path: &'static str, ok: bool, duration: Duration) {
    metrics::counter!(
        "vault_client_transactions_total",
        "path" => path,
        "outcome" => outcome(ok)
    )
    .increment(1);
    metrics::histogram!("vault_client_submit_duration_seconds", "path" => path)
        .record(duration.as_secs_f64());
}

pub fn record_rpc_request(method: &str, ok: bool) {
    metrics::counter!(
        "vault_client_rpc_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome(ok)
    )
    .increment(1);
}

pub fn record_cache_invalidation(scope: &'static str, removed: usize) {
    metrics::counter!("vault_client_cache_invalidations_total", "scope" => scope)
        .increment(removed as u64);
}
