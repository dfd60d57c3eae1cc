// Test mocks for the collector loop.
//
// Three mocks matching the three capability traits:
// - ScriptedSampler (ViewSampler) — one canned batch per call
// - CountingAdvancer (ViewAdvancer) — counts calls, never fails
// - RecordedDelay (Delay) — returns immediately, records durations
//
// Plus FailingSampler for propagation tests and post-batch helpers.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use gleaner_common::Post;

use crate::traits::{Delay, ViewAdvancer, ViewSampler};

/// One post per index in `range`, `@user{i}` handles, distinct bodies.
pub fn user_posts(range: Range<usize>) -> Vec<Post> {
    range
        .map(|i| {
            Post::new(format!("@user{i}"), format!("Post body {i}"))
                .with_url(format!("https://example.social/user{i}/status/{i}"))
        })
        .collect()
}

/// Sampler that replays a scripted sequence of batches, one per call.
///
/// After the script runs out it returns empty batches, or repeats the last
/// batch when built with [`ScriptedSampler::repeating`]. Optionally raises
/// a cancel flag once a given number of calls have completed, to simulate
/// a user aborting mid-run.
pub struct ScriptedSampler {
    batches: Vec<Vec<Post>>,
    repeat_last: bool,
    calls: AtomicUsize,
    cancel_after: Option<(usize, Arc<AtomicBool>)>,
}

impl ScriptedSampler {
    pub fn new(batches: Vec<Vec<Post>>) -> Self {
        Self {
            batches,
            repeat_last: false,
            calls: AtomicUsize::new(0),
            cancel_after: None,
        }
    }

    /// Every call returns the same batch, like a view that never loads more.
    pub fn repeating(batch: Vec<Post>) -> Self {
        Self {
            batches: vec![batch],
            repeat_last: true,
            calls: AtomicUsize::new(0),
            cancel_after: None,
        }
    }

    /// Raise `flag` once `calls` sampling calls have completed.
    pub fn cancel_after(mut self, calls: usize, flag: Arc<AtomicBool>) -> Self {
        self.cancel_after = Some((calls, flag));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ViewSampler for ScriptedSampler {
    async fn sample(&self) -> Result<Vec<Post>> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let batch = match self.batches.get(index) {
            Some(batch) => batch.clone(),
            None if self.repeat_last => self.batches.last().cloned().unwrap_or_default(),
            None => Vec::new(),
        };
        if let Some((after, flag)) = &self.cancel_after {
            if index + 1 >= *after {
                flag.store(true, Ordering::Relaxed);
            }
        }
        Ok(batch)
    }
}

/// Sampler whose every call fails, for error-propagation tests.
pub struct FailingSampler;

#[async_trait]
impl ViewSampler for FailingSampler {
    async fn sample(&self) -> Result<Vec<Post>> {
        bail!("view sampling failed")
    }
}

/// Advancer that counts calls and always succeeds.
#[derive(Default)]
pub struct CountingAdvancer {
    calls: AtomicUsize,
}

impl CountingAdvancer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ViewAdvancer for CountingAdvancer {
    async fn advance(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Delay that never sleeps but records every requested duration.
#[derive(Default)]
pub struct RecordedDelay {
    waits: Mutex<Vec<Duration>>,
}

impl RecordedDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().expect("delay log lock poisoned").clone()
    }
}

#[async_trait]
impl Delay for RecordedDelay {
    async fn wait(&self, duration: Duration) {
        self.waits
            .lock()
            .expect("delay log lock poisoned")
            .push(duration);
    }
}
