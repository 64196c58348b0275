use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a task kind, used to route envelopes to handlers.
///
/// # 命名規約
/// - `{namespace}.{domain}.{action}.v{major}`
/// - 例: `ambler.feed.backfill.v1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskType(String);

impl TaskType {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
