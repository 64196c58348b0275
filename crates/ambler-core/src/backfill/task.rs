//! The backfill unit of work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::typed::Task;

/// Opaque position token into the feed's ordering.
///
/// Owned exclusively by the feed provider; the walker never inspects it,
/// only passes it back on the next fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The distinguished token a seed task uses to start from the head of
    /// the feed.
    pub fn start() -> Self {
        Self(String::new())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("<start>")
        } else {
            self.0.fmt(f)
        }
    }
}

/// One step of a backfill chain.
///
/// `start_time` is the stopping boundary and is copied unchanged into every
/// continuation; only `cursor` advances. The payload keys match the wire
/// format of the queue record (`cursor` / `startTime`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillTask {
    pub cursor: Cursor,
    pub start_time: DateTime<Utc>,
}

impl Task for BackfillTask {
    const TYPE: &'static str = "ambler.feed.backfill.v1";
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn payload_uses_camel_case_keys() {
        let task = BackfillTask {
            cursor: Cursor::new("C0"),
            start_time: Utc.timestamp_opt(1000, 0).unwrap(),
        };

        let payload = serde_json::to_value(&task).unwrap();
        assert_eq!(payload["cursor"], "C0");
        assert!(payload.get("startTime").is_some());
        assert!(payload.get("start_time").is_none());
    }

    #[test]
    fn start_cursor_displays_as_marker() {
        assert_eq!(Cursor::start().to_string(), "<start>");
        assert_eq!(Cursor::new("C1").to_string(), "C1");
    }
}
