//! Holder of the active network configuration.

use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::network::presets::NetworkConfig;

/// The active network, swapped atomically as a whole.
pub struct NetworkStore {
    active: ArcSwap<NetworkConfig>,
}

impl NetworkStore {
    pub fn new(initial: NetworkConfig) -> Self {
        Self {
            active: ArcSwap::from_pointee(initial),
        }
    }

    /// Snapshot of the active configuration.
    pub fn active(&self) -> Arc<NetworkConfig> {
        self.active.load_full()
    }

    /// Replace the whole configuration, returning the previous one.
    pub fn replace(&self, config: NetworkConfig) -> Arc<NetworkConfig> {
        tracing::info!(
            kind = %config.kind,
            rpc_url = %config.rpc_url,
            relay = config.relay_endpoint().is_some(),
            "Network configuration replaced"
        );
        self.active.swap(Arc::new(config))
    }
}

impl Default for NetworkStore {
    fn default() -> Self {
        Self::new(NetworkConfig::default())
    }
}
