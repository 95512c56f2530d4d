//! Vault read and action views.
//!
//! # Data Flow
//! ```text
//! user input (amounts, percents)
//!     → units.rs (exact 10^7 fixed point)
//!     → contract.rs / deploy.rs (EncodedOperation)
//!     → transaction pipeline
//!
//! vault id (+ connected account)
//!     → reader.rs (read-only simulations)
//!     → snapshot.rs (VaultSnapshot, share price, utilization, countdown)
//! ```

pub mod contract;
pub mod deploy;
pub mod reader;
pub mod snapshot;
pub mod units;

use thiserror::Error;

use crate::codec::CodecError;

pub use contract::{TokenContract, VaultContract};
pub use deploy::{DeployError, DeployParams, DeployPlan};
pub use reader::VaultReader;
pub use snapshot::{
    format_time_remaining, RedemptionRequest, RedemptionStatus, StrategyPosition, TokenMetadata,
    UserPosition, VaultSnapshot,
};
pub use units::AmountError;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Invalid contract address: {0}")]
    InvalidContract(String),

    #[error("Invalid amount: {0}")]
    Amount(#[from] AmountError),

    #[error("Invalid deploy parameters: {}", join_errors(.0))]
    InvalidDeploy(Vec<DeployError>),

    /// A read simulation failed; carries the diagnostic.
    #[error("{0}")]
    Read(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

fn join_errors(errors: &[DeployError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
