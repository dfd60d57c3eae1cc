//! gleaner-collector — bounded incremental harvesting of posts from a
//! continuously re-rendering, virtualized view.
//!
//! The collector alternates "sample the current view" with "advance the
//! view" until a target count is reached, the cycle budget runs out, the
//! run is cancelled, or the source stalls. Sampling, advancing, and
//! delaying are injected capability traits, so the whole loop runs
//! deterministically in tests with no real rendering surface.

pub mod cache;
pub mod collector;
pub mod simfeed;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;


pub use cache::{BoundedPostCache, InsertOutcome};
pub use collector::{
    HarvestParams, HarvestReport, HarvestStats, Harvester, TerminationCause,
};
pub use simfeed::SimFeed;
pub use traits::{Delay, TokioDelay, ViewAdvancer, ViewSampler};
