//! Deterministic simulated feed for demos and tests.
//!
//! Models a virtualized timeline the way a rendered one behaves: only a
//! sliding window of posts is visible at a time, advancing moves the window
//! with overlap, and once the end is reached further advances change
//! nothing. Content is generated from a seeded RNG, so two feeds built with
//! the same arguments produce identical posts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use gleaner_common::Post;

use crate::traits::{ViewAdvancer, ViewSampler};

const LEXICON: &[&str] = &[
    "launch", "update", "community", "weekend", "project", "release", "meetup",
    "thread", "announcement", "question", "photo", "replay", "garden", "coffee",
    "deadline", "volunteers", "winter", "market", "library", "bikes",
];

struct SimFeedInner {
    posts: Vec<Post>,
    window: usize,
    stride: usize,
    // Index one past the last visible post.
    cursor: AtomicUsize,
}

/// Cheap-clone handle to one simulated timeline; clones share the cursor,
/// so the same feed can serve as both sampler and advancer.
#[derive(Clone)]
pub struct SimFeed {
    inner: Arc<SimFeedInner>,
}

impl SimFeed {
    /// Build a timeline of `size` posts with a `window`-post visible view
    /// that advances by `stride` posts per scroll.
    pub fn generate(size: usize, window: usize, stride: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let posts = (0..size)
            .map(|i| {
                let words: Vec<&str> = (0..rng.random_range(5..12))
                    .map(|_| LEXICON[rng.random_range(0..LEXICON.len())])
                    .collect();
                Post::new(format!("@user{i}"), format!("Post {i}: {}", words.join(" ")))
                    .with_timestamp(base + ChronoDuration::minutes(i as i64))
                    .with_url(format!("https://example.social/user{i}/status/{i}"))
            })
            .collect();

        Self {
            inner: Arc::new(SimFeedInner {
                posts,
                window: window.max(1),
                stride: stride.max(1),
                cursor: AtomicUsize::new(window.max(1).min(size)),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.posts.is_empty()
    }

    fn visible(&self) -> Vec<Post> {
        let end = self.inner.cursor.load(Ordering::Relaxed);
        let start = end.saturating_sub(self.inner.window);
        self.inner.posts[start..end].to_vec()
    }
}

#[async_trait]
impl ViewSampler for SimFeed {
    async fn sample(&self) -> Result<Vec<Post>> {
        Ok(self.visible())
    }
}

#[async_trait]
impl ViewAdvancer for SimFeed {
    async fn advance(&self) -> Result<()> {
        let len = self.inner.posts.len();
        let stride = self.inner.stride;
        // Saturating advance: scrolling past the end keeps showing the tail.
        self.inner
            .cursor
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |end| {
                Some((end + stride).min(len))
            })
            .ok();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn window_slides_with_overlap() {
        let feed = SimFeed::generate(40, 15, 10, 7);
        let first = feed.sample().await.unwrap();
        assert_eq!(first.len(), 15);
        assert_eq!(first[0].handle, "@user0");

        feed.advance().await.unwrap();
        let second = feed.sample().await.unwrap();
        assert_eq!(second[0].handle, "@user10");
        assert_eq!(second[14].handle, "@user24");
    }

    #[tokio::test]
    async fn advancing_past_the_end_is_idempotent() {
        let feed = SimFeed::generate(12, 5, 10, 7);
        for _ in 0..10 {
            feed.advance().await.unwrap();
        }
        let tail = feed.sample().await.unwrap();
        assert_eq!(tail.len(), 5);
        assert_eq!(tail.last().unwrap().handle, "@user11");
    }

    #[tokio::test]
    async fn same_seed_generates_identical_posts() {
        let a = SimFeed::generate(20, 15, 10, 42);
        let b = SimFeed::generate(20, 15, 10, 42);
        assert_eq!(a.sample().await.unwrap(), b.sample().await.unwrap());
    }
}
