//! Transaction subsystem.
//!
//! # Data Flow
//! ```text
//! EncodedOperation (from vault actions)
//!     → pipeline.rs (session check, relay or direct path)
//!     → envelope.rs (envelope, assembly, hash)
//!     → wallet signature → rpc / relay submission
//!     → lifecycle.rs (TxTracker watch channel)
//!     → types.rs (TransactionResult, SimulationResult)
//! ```

pub mod envelope;
pub mod lifecycle;
pub mod pipeline;
pub mod types;

pub use envelope::EnvelopeSettings;
pub use lifecycle::{Generation, TxState, TxStatus, TxTracker};
pub use pipeline::{PipelineSettings, TransactionPipeline};
pub use types::{PipelineError, SimulationResult, TransactionResult};
