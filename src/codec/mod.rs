//! Contract wire format.
//!
//! # Data Flow
//! ```text
//! typed arguments (amounts, addresses, strings)
//!     → scval.rs (ScVal encoders)
//!     → operation.rs (InvokeHostFunction operation, base64 XDR)
//!     → transaction pipeline
//!
//! simulation / transaction return value (base64 ScVal)
//!     → scval.rs (decoders into i128, u64, String, Vec, struct fields)
//! ```

pub mod address;
pub mod operation;
pub mod scval;

use thiserror::Error;

pub use operation::EncodedOperation;

/// Errors encoding or decoding contract values.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Malformed XDR or a value exceeding an XDR length limit.
    #[error("XDR error: {0}")]
    Xdr(#[from] stellar_xdr::curr::Error),

    /// Not a valid account or contract strkey.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// A decoded value had the wrong type.
    #[error("Expected {expected}, found {found}")]
    UnexpectedType {
        expected: &'static str,
        found: String,
    },

    /// A contract struct lacked an expected field.
    #[error("Missing field: {0}")]
    MissingField(String),
}
