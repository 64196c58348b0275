//! Feed-fetch port (interface).
//!
//! The feed itself is an external collaborator; this trait is the seam the
//! walker calls through, and the seam tests script against.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::task::Cursor;

/// Requested ordering of records within a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// One fetched page of the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPage {
    /// Cursor to request the page after this one.
    pub next_cursor: Cursor,

    /// Timestamp of the last record in the page. With descending order this
    /// is the oldest record fetched so far.
    pub last_created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Request(String),

    #[error("feed returned malformed page: {0}")]
    Malformed(String),

    #[error("feed fetch timed out after {0:?}")]
    Timeout(Duration),
}

/// Remote feed the walker paginates through. Opaque: any call may fail.
#[async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch(
        &self,
        cursor: &Cursor,
        page_size: u32,
        order: SortOrder,
    ) -> Result<FeedPage, FeedError>;
}
