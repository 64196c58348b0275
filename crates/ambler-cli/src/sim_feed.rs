//! Deterministic-enough feed for exercising the walker locally.
//!
//! Pages step backward in time from a fixed "newest" instant; cursors are
//! `p0`, `p1`, ... with the empty start token mapping to the first page.
//! Walking past the end of the generated history fails the fetch, which is
//! exactly how the walker's failure path behaves against a real provider.

use ambler_core::backfill::{Cursor, FeedClient, FeedError, FeedPage, SortOrder};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;

pub struct SimulatedFeed {
    /// Oldest timestamp of each page, newest page first.
    pages: Vec<DateTime<Utc>>,
}

impl SimulatedFeed {
    pub fn generate(pages: u32, newest: DateTime<Utc>, page_step: chrono::Duration) -> Self {
        let mut rng = rand::thread_rng();
        let jitter_bound = (page_step.num_seconds() / 4).max(1);

        let mut out = Vec::with_capacity(pages as usize);
        let mut oldest = newest;
        for _ in 0..pages {
            let jitter = chrono::Duration::seconds(rng.gen_range(0..jitter_bound));
            oldest = oldest - page_step - jitter;
            out.push(oldest);
        }
        Self { pages: out }
    }

    fn index_of(cursor: &Cursor) -> Result<usize, FeedError> {
        if cursor.as_str().is_empty() {
            return Ok(0);
        }
        cursor
            .as_str()
            .strip_prefix('p')
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| FeedError::Malformed(format!("unknown cursor {cursor}")))
    }
}

#[async_trait]
impl FeedClient for SimulatedFeed {
    async fn fetch(
        &self,
        cursor: &Cursor,
        _page_size: u32,
        _order: SortOrder,
    ) -> Result<FeedPage, FeedError> {
        let index = Self::index_of(cursor)?;
        let Some(&last_created_at) = self.pages.get(index) else {
            return Err(FeedError::Request(
                "cursor points past the end of the feed".to_string(),
            ));
        };

        Ok(FeedPage {
            next_cursor: Cursor::new(format!("p{}", index + 1)),
            last_created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed() -> SimulatedFeed {
        SimulatedFeed::generate(4, Utc::now(), chrono::Duration::hours(1))
    }

    #[tokio::test]
    async fn start_token_maps_to_the_newest_page() {
        let feed = feed();
        let page = feed
            .fetch(&Cursor::start(), 2, SortOrder::Descending)
            .await
            .unwrap();
        assert_eq!(page.next_cursor, Cursor::new("p1"));
        assert_eq!(page.last_created_at, feed.pages[0]);
    }

    #[tokio::test]
    async fn pages_step_strictly_backward_in_time() {
        let feed = feed();
        let mut cursor = Cursor::start();
        let mut previous: Option<DateTime<Utc>> = None;

        for _ in 0..feed.pages.len() {
            let page = feed.fetch(&cursor, 2, SortOrder::Descending).await.unwrap();
            if let Some(previous) = previous {
                assert!(page.last_created_at < previous);
            }
            previous = Some(page.last_created_at);
            cursor = page.next_cursor;
        }
    }

    #[tokio::test]
    async fn walking_past_the_end_fails_the_fetch() {
        let feed = feed();
        let err = feed
            .fetch(&Cursor::new("p99"), 2, SortOrder::Descending)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Request(_)));
    }

    #[tokio::test]
    async fn garbage_cursor_is_malformed() {
        let feed = feed();
        let err = feed
            .fetch(&Cursor::new("nonsense"), 2, SortOrder::Descending)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::Malformed(_)));
    }
}
