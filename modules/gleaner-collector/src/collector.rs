//! The bounded incremental collection loop.
//!
//! Alternates sampling and advancing until the target count is reached, the
//! cycle budget is exhausted, cancellation is observed, or the source stalls.
//! Candidates are deduplicated by [`Post::dedup_key`] across cycles and the
//! working set is capped with FIFO eviction, so memory stays bounded no
//! matter how long the source keeps re-rendering the same material.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, warn};

use gleaner_common::{Config, Post};

use crate::cache::{BoundedPostCache, InsertOutcome};
use crate::traits::{Delay, ViewAdvancer, ViewSampler};

/// Absolute ceiling on the working-set size, independent of the target.
pub const HARD_BUFFER_LIMIT: usize = 500;
/// Slack on top of `2 * max_posts` before the hard limit kicks in.
pub const BUFFER_SLACK: usize = 50;
/// Consecutive no-growth cycles before the extended recheck.
pub const STALL_THRESHOLD: u32 = 5;
/// Per-cycle settle wait after advancing the view.
pub const SETTLE_DELAY: Duration = Duration::from_millis(800);
/// Extended wait before the final stall recheck.
pub const STALL_RECHECK_DELAY: Duration = Duration::from_millis(2000);

/// Parameters for one harvest run. Immutable for the duration of the run.
#[derive(Debug, Clone)]
pub struct HarvestParams {
    /// Target number of distinct posts. Must be > 0 for a useful run.
    pub max_posts: usize,
    /// Upper bound on advance/sample cycles.
    pub max_cycles: u32,
    pub settle: Duration,
    pub stall_recheck: Duration,
}

impl Default for HarvestParams {
    fn default() -> Self {
        Self {
            max_posts: 30,
            max_cycles: 10,
            settle: SETTLE_DELAY,
            stall_recheck: STALL_RECHECK_DELAY,
        }
    }
}

impl HarvestParams {
    pub fn new(max_posts: usize, max_cycles: u32) -> Self {
        Self {
            max_posts,
            max_cycles,
            ..Self::default()
        }
    }

    /// Working-set capacity: `min(HARD_BUFFER_LIMIT, max_posts * 2 + BUFFER_SLACK)`.
    pub fn buffer_cap(&self) -> usize {
        HARD_BUFFER_LIMIT.min(self.max_posts * 2 + BUFFER_SLACK)
    }
}

impl From<&Config> for HarvestParams {
    fn from(config: &Config) -> Self {
        Self {
            max_posts: config.max_posts,
            max_cycles: config.max_cycles,
            settle: config.settle(),
            stall_recheck: config.stall_recheck(),
        }
    }
}

/// Why a run stopped. Mutually exclusive; the first cause reached wins.
/// None of these is an error — the run always returns what it gathered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationCause {
    TargetReached,
    CyclesExhausted,
    Cancelled,
    Stalled,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct HarvestStats {
    pub sample_passes: u32,
    pub advances: u32,
    pub duplicates_dropped: u32,
    pub evicted: u32,
    pub stall_cycles: u32,
}

impl std::fmt::Display for HarvestStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} sample passes, {} advances, {} duplicates dropped, \
             {} evicted, {} stall cycles",
            self.sample_passes,
            self.advances,
            self.duplicates_dropped,
            self.evicted,
            self.stall_cycles,
        )
    }
}

/// Outcome of one harvest run: at most `max_posts` posts in first-seen
/// order, plus how and why the run ended.
#[derive(Debug, Clone, Serialize)]
pub struct HarvestReport {
    pub posts: Vec<Post>,
    pub cause: TerminationCause,
    pub stats: HarvestStats,
}

/// The collector. Owns the three injected capabilities; one `run` call is
/// one harvest with its own working set and counters.
pub struct Harvester<S, A, D> {
    sampler: S,
    advancer: A,
    delay: D,
}

impl<S, A, D> Harvester<S, A, D>
where
    S: ViewSampler,
    A: ViewAdvancer,
    D: Delay,
{
    pub fn new(sampler: S, advancer: A, delay: D) -> Self {
        Self {
            sampler,
            advancer,
            delay,
        }
    }

    /// Run one harvest.
    ///
    /// Single logical task: the loop suspends only at the advance and delay
    /// calls, so cache mutation needs no locking. Cancellation is polled at
    /// the cycle boundary and after the settle wait; it is a normal
    /// termination path, never an error. A failing `sample` or `advance`
    /// propagates immediately and the partial harvest is lost.
    pub async fn run(&self, params: &HarvestParams, cancel: &AtomicBool) -> Result<HarvestReport> {
        let mut cache = BoundedPostCache::new(params.buffer_cap());
        let mut stats = HarvestStats::default();
        let mut cycles_done: u32 = 0;
        let mut stall_streak: u32 = 0;

        // One sampling pass before any advancing.
        self.sample_into(&mut cache, &mut stats).await?;
        debug!(collected = cache.len(), "Initial sampling pass");

        let cause = loop {
            if cache.len() >= params.max_posts {
                break TerminationCause::TargetReached;
            }
            if cycles_done >= params.max_cycles {
                break TerminationCause::CyclesExhausted;
            }
            if cancel.load(Ordering::Relaxed) {
                break TerminationCause::Cancelled;
            }

            let previous = cache.len();

            self.advancer.advance().await?;
            cycles_done += 1;
            stats.advances += 1;
            self.delay.wait(params.settle).await;

            if cancel.load(Ordering::Relaxed) {
                break TerminationCause::Cancelled;
            }

            self.sample_into(&mut cache, &mut stats).await?;
            debug!(
                cycle = cycles_done,
                collected = cache.len(),
                net_new = cache.len() - previous,
                "Cycle sampled"
            );

            if cache.len() >= params.max_posts {
                break TerminationCause::TargetReached;
            }

            if cache.len() == previous {
                stall_streak += 1;
                stats.stall_cycles += 1;
                if stall_streak >= STALL_THRESHOLD {
                    // Wait longer and recheck once before giving up.
                    self.delay.wait(params.stall_recheck).await;
                    self.sample_into(&mut cache, &mut stats).await?;
                    if cache.len() == previous {
                        warn!(
                            collected = cache.len(),
                            cycles = cycles_done,
                            "Source stalled, stopping early"
                        );
                        break TerminationCause::Stalled;
                    }
                    // Growth resumed; a cancel raised during the extended
                    // wait is caught at the top of the next iteration.
                    stall_streak = 0;
                }
            } else {
                stall_streak = 0;
            }
        };

        let posts = cache.into_posts(params.max_posts);
        info!(
            posts = posts.len(),
            cycles = cycles_done,
            cause = ?cause,
            %stats,
            "Harvest complete"
        );

        Ok(HarvestReport {
            posts,
            cause,
            stats,
        })
    }

    /// One sampling pass: fetch candidates and merge them into the cache.
    /// First-seen wins per key; at capacity the oldest entry is evicted so
    /// the newest candidate always lands.
    async fn sample_into(
        &self,
        cache: &mut BoundedPostCache,
        stats: &mut HarvestStats,
    ) -> Result<()> {
        let batch = self.sampler.sample().await?;
        stats.sample_passes += 1;
        for post in batch {
            let key = post.dedup_key();
            match cache.insert_if_absent(key, post) {
                InsertOutcome::AlreadyPresent => stats.duplicates_dropped += 1,
                InsertOutcome::InsertedEvictingOldest => stats.evicted += 1,
                InsertOutcome::Inserted => {}
            }
        }
        Ok(())
    }
}
