//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, one span per submission)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stderr (plain or JSON)
//!     → whatever metrics recorder the embedding application installs
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
