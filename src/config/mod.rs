//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!
//! preferences file (JSON)
//!     → preferences.rs (last network + wallet id)
//!     → overrides the config file's network on startup
//! ```
//!
//! All fields have defaults so running without a config file works.

pub mod loader;
pub mod preferences;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use preferences::{PreferenceStore, Preferences};
pub use schema::{
    CacheConfig, ClientConfig, DeployConfig, ObservabilityConfig, PollingConfig, RelaySection,
    RpcConfig, TransactionConfig,
};
