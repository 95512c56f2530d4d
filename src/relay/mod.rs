//! Sponsored submission.
//!
//! # Data Flow
//! ```text
//! pipeline (relay configured: flag + URL + credential)
//!     → client.rs (credential shape check, multipart POST, JSON status)
//!     → transaction hash or RelayError
//! ```

pub mod client;

pub use client::{is_valid_jwt, RelayClient, RelayError};
