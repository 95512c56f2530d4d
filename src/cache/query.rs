//! Keyed read cache with a staleness window.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::observability::metrics;

/// Families of cached reads; a successful transaction drops whole scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryScope {
    Vault,
    TokenBalance,
    /// Token name, symbol and decimals. Not touched by transactions.
    TokenMetadata,
}

impl QueryScope {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryScope::Vault => "vault",
            QueryScope::TokenBalance => "token-balance",
            QueryScope::TokenMetadata => "token-metadata",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub scope: QueryScope,
    /// Scope-specific identity, e.g. `vault_id` plus viewer.
    pub id: String,
}

impl QueryKey {
    pub fn vault(vault_id: &str, viewer: Option<&str>) -> Self {
        Self {
            scope: QueryScope::Vault,
            id: format!("{}:{}", vault_id, viewer.unwrap_or("-")),
        }
    }

    pub fn token_metadata(token: &str) -> Self {
        Self {
            scope: QueryScope::TokenMetadata,
            id: token.to_string(),
        }
    }

    pub fn token_balance(token: &str, owner: &str) -> Self {
        Self {
            scope: QueryScope::TokenBalance,
            id: format!("{}:{}", token, owner),
        }
    }
}

#[derive(Debug, Clone)]
struct CachedEntry<V> {
    value: V,
    fetched_at: Instant,
}

/// Thread-safe cache; clones share the same map.
#[derive(Debug, Clone)]
pub struct QueryCache<V> {
    inner: Arc<DashMap<QueryKey, CachedEntry<V>>>,
    stale_after: Duration,
}

impl<V: Clone> QueryCache<V> {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            stale_after,
        }
    }

    /// The cached value if it is younger than the staleness window.
    pub fn get_fresh(&self, key: &QueryKey) -> Option<V> {
        self.inner
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.stale_after)
            .map(|entry| entry.value.clone())
    }

    /// The cached value regardless of age.
    pub fn get_any(&self, key: &QueryKey) -> Option<V> {
        self.inner.get(key).map(|entry| entry.value.clone())
    }

    pub fn insert(&self, key: QueryKey, value: V) {
        self.inner.insert(
            key,
            CachedEntry {
                value,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Drop every entry in `scope`. Returns how many were removed.
    pub fn invalidate_scope(&self, scope: QueryScope) -> usize {
        let before = self.inner.len();
        self.inner.retain(|key, _| key.scope != scope);
        let removed = before.saturating_sub(self.inner.len());
        metrics::record_cache_invalidation(scope.as_str(), removed);
        tracing::debug!(scope = scope.as_str(), removed, "Cache scope invalidated");
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
