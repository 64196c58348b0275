//! Outcome model: common result format for attempts.
//!
//! This module is architecture-agnostic: it does not assume queues or
//! workers. It only defines the "shape" of results that the system can
//! record and explain later.

use serde::{Deserialize, Serialize};

/// A unified classification of an attempt result.
///
/// We intentionally serialize as SCREAMING_SNAKE_CASE:
/// SUCCESS / FAILURE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeKind {
    Success,
    Failure,
}

/// A common result format for one delivery of a task.
///
/// - `SUCCESS`: the handler ran to completion.
/// - `FAILURE`: the handler reported an error; with at-most-once delivery
///   this is terminal for the task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptOutcome {
    pub kind: OutcomeKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AttemptOutcome {
    pub fn success() -> Self {
        Self {
            kind: OutcomeKind::Success,
            reason: None,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::Failure,
            reason: Some(reason.into()),
        }
    }
}
