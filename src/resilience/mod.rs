//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Submission to chain:
//!     → poll.rs (bounded wait for PENDING, re-sending each interval)
//!     → poll.rs (unbounded wait for SUCCESS / FAILED)
//! RPC calls:
//!     → tokio timeout per request (rpc::client)
//! ```
//!
//! Polling cadence is a declared [`RetryPolicy`] value, not inline timing.

pub mod poll;

pub use poll::{poll_until, PollOutcome, RetryPolicy};
