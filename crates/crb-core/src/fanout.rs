//! Best-effort fan-out over registered channels.
//!
//! Ban, unban, broadcast, and broadcast-deletion all share this loop: apply
//! one remote action per target, classify whatever comes back, keep going.
//! A single failing channel never aborts the run.

use async_trait::async_trait;
use std::time::Duration;

use crate::{
    domain::{ChatId, MessageId},
    Error, Result,
};

/// One channel to apply a remote operation to.
#[derive(Clone, Debug)]
pub struct FanOutTarget {
    pub chat_id: ChatId,
    pub name: String,
}

/// Per-target classification of an action's result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetOutcome {
    Success,
    /// The remote end-state already holds (e.g. unbanning a user who was
    /// never banned). Rendered as informational, but still part of the
    /// failure tally.
    Skipped { reason: String },
    Failed { reason: String },
}

impl TargetOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TargetOutcome::Success)
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        TargetOutcome::Skipped {
            reason: reason.into(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        TargetOutcome::Failed {
            reason: reason.into(),
        }
    }
}

/// Outcome of one target within a completed run.
#[derive(Clone, Debug)]
pub struct TargetResult {
    pub chat_id: ChatId,
    pub name: String,
    pub outcome: TargetOutcome,
    /// Message id produced by the action (broadcast records it so the
    /// message can be deleted later).
    pub message_id: Option<MessageId>,
}

/// Aggregated result of a fan-out run.
///
/// Invariant: `succeeded + failed == results.len()`.
#[derive(Clone, Debug, Default)]
pub struct FanOutRun {
    pub results: Vec<TargetResult>,
    pub succeeded: usize,
    pub failed: usize,
}

/// An operation applied to each target of a fan-out run.
#[async_trait]
pub trait FanOutAction: Send + Sync {
    /// Apply the operation to one target. A returned message id is recorded
    /// on the target's result.
    async fn apply(&self, target: &FanOutTarget) -> Result<Option<MessageId>>;

    /// Map an action error to an outcome. Operation-specific; unknown errors
    /// must fall back to a generic truncated reason.
    fn classify(&self, err: &Error) -> TargetOutcome;

    /// Pause inserted after a target to stay under remote rate limits.
    fn pause_after(&self, outcome: &TargetOutcome) -> Option<Duration> {
        let _ = outcome;
        None
    }
}

/// Receives a progress tick every `progress_every` processed targets.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn update(&self, processed: usize, succeeded: usize, failed: usize);
}

/// Run `action` against every target exactly once, in order.
///
/// Errors raised by the action are classified and counted; they never
/// propagate to the caller.
pub async fn run(
    targets: &[FanOutTarget],
    action: &dyn FanOutAction,
    progress: Option<&dyn ProgressSink>,
    progress_every: usize,
) -> FanOutRun {
    let mut run = FanOutRun::default();

    for target in targets {
        let (outcome, message_id) = match action.apply(target).await {
            Ok(id) => (TargetOutcome::Success, id),
            Err(err) => {
                tracing::warn!(chat_id = target.chat_id.0, error = %err, "fan-out action failed");
                (action.classify(&err), None)
            }
        };

        if outcome.is_success() {
            run.succeeded += 1;
        } else {
            run.failed += 1;
        }

        let processed = run.succeeded + run.failed;
        if let Some(sink) = progress {
            if progress_every > 0 && processed % progress_every == 0 {
                sink.update(processed, run.succeeded, run.failed).await;
            }
        }

        let pause = action.pause_after(&outcome);
        run.results.push(TargetResult {
            chat_id: target.chat_id,
            name: target.name.clone(),
            outcome,
            message_id,
        });

        if let Some(delay) = pause {
            tokio::time::sleep(delay).await;
        }
    }

    run
}
