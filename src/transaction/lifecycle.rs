//! Transaction lifecycle state shared with the UI.
//!
//! One tracker per application; it follows the single transaction the
//! user is looking at. Observers subscribe to a `watch` channel.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

use crate::transaction::types::TransactionResult;

/// Where the tracked transaction currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxStatus {
    #[default]
    None,
    Building,
    AwaitingSignature,
    Submitting,
    Succeeded,
    Failed,
}

impl TxStatus {
    fn rank(self) -> u8 {
        match self {
            TxStatus::None => 0,
            TxStatus::Building => 1,
            TxStatus::AwaitingSignature => 2,
            TxStatus::Submitting => 3,
            TxStatus::Succeeded | TxStatus::Failed => 4,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TxStatus::Succeeded | TxStatus::Failed)
    }

    /// Building, awaiting signature or submitting.
    pub fn is_in_flight(self) -> bool {
        matches!(
            self,
            TxStatus::Building | TxStatus::AwaitingSignature | TxStatus::Submitting
        )
    }

    /// Whether `self → next` is a legal transition.
    pub fn can_advance_to(self, next: TxStatus) -> bool {
        next == TxStatus::None || (!self.is_terminal() && next.rank() > self.rank())
    }
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TxStatus::None => "none",
            TxStatus::Building => "building",
            TxStatus::AwaitingSignature => "awaiting signature",
            TxStatus::Submitting => "submitting",
            TxStatus::Succeeded => "succeeded",
            TxStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Status plus the outcome once one exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxState {
    pub status: TxStatus,
    pub result: Option<TransactionResult>,
}

/// Identifies one submission from `begin` until the next `begin` or
/// `reset`. Transitions tagged with an older generation are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

/// Forward-only state holder.
#[derive(Debug)]
pub struct TxTracker {
    state: watch::Sender<TxState>,
    generation: AtomicU64,
}

impl TxTracker {
    pub fn new() -> Self {
        let (state, _) = watch::channel(TxState::default());
        Self {
            state,
            generation: AtomicU64::new(0),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TxState> {
        self.state.subscribe()
    }

    pub fn current(&self) -> TxState {
        self.state.borrow().clone()
    }

    /// Move to `next` if the transition is forward. Returns whether the
    /// state changed.
    pub fn advance(&self, next: TxStatus) -> bool {
        self.transition(None, next, None)
    }

    /// `advance` on behalf of the submission started as `generation`.
    pub fn advance_in(&self, generation: Generation, next: TxStatus) -> bool {
        self.transition(Some(generation), next, None)
    }

    /// Start tracking a new submission. Earlier generations stop
    /// affecting the state.
    pub fn begin(&self) -> Generation {
        let mut started = Generation(0);
        self.state.send_modify(|state| {
            started = Generation(self.generation.fetch_add(1, Ordering::SeqCst) + 1);
            *state = TxState {
                status: TxStatus::Building,
                result: None,
            };
        });
        started
    }

    /// Record the terminal outcome.
    pub fn finish(&self, result: TransactionResult) {
        self.transition(None, terminal_status(&result), Some(result));
    }

    /// `finish` on behalf of the submission started as `generation`.
    pub fn finish_in(&self, generation: Generation, result: TransactionResult) {
        self.transition(Some(generation), terminal_status(&result), Some(result));
    }

    /// Back to `None`; any in-flight submission is orphaned.
    pub fn reset(&self) {
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = TxState::default();
        });
    }

    fn transition(
        &self,
        generation: Option<Generation>,
        next: TxStatus,
        result: Option<TransactionResult>,
    ) -> bool {
        self.state.send_if_modified(|state| {
            if let Some(Generation(tag)) = generation {
                if tag != self.generation.load(Ordering::SeqCst) {
                    tracing::debug!(to = %next, "Ignored transition from a stale submission");
                    return false;
                }
            }
            if state.status == next || !state.status.can_advance_to(next) {
                tracing::debug!(from = %state.status, to = %next, "Ignored lifecycle transition");
                return false;
            }
            state.status = next;
            state.result = if next.is_terminal() { result } else { None };
            true
        })
    }
}

fn terminal_status(result: &TransactionResult) -> TxStatus {
    if result.success {
        TxStatus::Succeeded
    } else {
        TxStatus::Failed
    }
}

impl Default for TxTracker {
    fn default() -> Self {
        Self::new()
    }
}
