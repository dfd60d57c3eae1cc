// Trait abstractions for the three injected collector capabilities.
//
// ViewSampler — read-only snapshot of whatever the view currently shows.
// ViewAdvancer — side effect that lets the next sample see more material.
// Delay — asynchronous suspension between cycles.
//
// These enable deterministic testing with ScriptedSampler, CountingAdvancer
// and RecordedDelay: no browser, no timers. `cargo test` in milliseconds.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use gleaner_common::Post;

#[async_trait]
pub trait ViewSampler: Send + Sync {
    /// Snapshot the posts currently visible in the view.
    ///
    /// Returns an empty vec when nothing is visible — "nothing new" is not
    /// a failure. An `Err` aborts the whole run; the collector does not
    /// catch it.
    async fn sample(&self) -> Result<Vec<Post>>;
}

#[async_trait]
pub trait ViewAdvancer: Send + Sync {
    /// Nudge the view so the next `sample` can observe more material.
    /// Safe to call repeatedly once the source is exhausted; it simply
    /// yields no growth.
    async fn advance(&self) -> Result<()>;
}

#[async_trait]
pub trait Delay: Send + Sync {
    /// Suspend the collector for approximately `duration`.
    async fn wait(&self, duration: Duration);
}

// Capability bundles are usually shared or borrowed (the run holds them for
// its whole lifetime), so the traits pass through references and Arc.

#[async_trait]
impl<T: ViewSampler + ?Sized> ViewSampler for &T {
    async fn sample(&self) -> Result<Vec<Post>> {
        (**self).sample().await
    }
}

#[async_trait]
impl<T: ViewSampler + ?Sized> ViewSampler for std::sync::Arc<T> {
    async fn sample(&self) -> Result<Vec<Post>> {
        (**self).sample().await
    }
}

#[async_trait]
impl<T: ViewAdvancer + ?Sized> ViewAdvancer for &T {
    async fn advance(&self) -> Result<()> {
        (**self).advance().await
    }
}

#[async_trait]
impl<T: ViewAdvancer + ?Sized> ViewAdvancer for std::sync::Arc<T> {
    async fn advance(&self) -> Result<()> {
        (**self).advance().await
    }
}

#[async_trait]
impl<T: Delay + ?Sized> Delay for &T {
    async fn wait(&self, duration: Duration) {
        (**self).wait(duration).await
    }
}

#[async_trait]
impl<T: Delay + ?Sized> Delay for std::sync::Arc<T> {
    async fn wait(&self, duration: Duration) {
        (**self).wait(duration).await
    }
}

/// Production delay binding backed by the tokio timer.
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
