use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::info;

use crate::error::GleanerError;

/// Collection configuration loaded from environment variables.
/// Every knob has a default matching the production harvest settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Target number of distinct posts per run.
    pub max_posts: usize,
    /// Upper bound on advance/sample cycles per run.
    pub max_cycles: u32,
    /// Per-cycle settle wait after advancing, in milliseconds.
    pub settle_ms: u64,
    /// Extended wait before the final stall recheck, in milliseconds.
    pub stall_recheck_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_posts: 30,
            max_cycles: 10,
            settle_ms: 800,
            stall_recheck_ms: 2000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, GleanerError> {
        let defaults = Self::default();
        Ok(Self {
            max_posts: parsed_env("GLEANER_MAX_POSTS", defaults.max_posts)?,
            max_cycles: parsed_env("GLEANER_MAX_CYCLES", defaults.max_cycles)?,
            settle_ms: parsed_env("GLEANER_SETTLE_MS", defaults.settle_ms)?,
            stall_recheck_ms: parsed_env("GLEANER_STALL_RECHECK_MS", defaults.stall_recheck_ms)?,
        })
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn stall_recheck(&self) -> Duration {
        Duration::from_millis(self.stall_recheck_ms)
    }

    /// Log the effective configuration.
    pub fn log(&self) {
        info!(
            max_posts = self.max_posts,
            max_cycles = self.max_cycles,
            settle_ms = self.settle_ms,
            stall_recheck_ms = self.stall_recheck_ms,
            "Gleaner configuration"
        );
    }
}

fn parsed_env<T: FromStr>(key: &str, default: T) -> Result<T, GleanerError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| GleanerError::Config(format!("{key} must be a number, got {raw:?}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_production_harvest_settings() {
        let config = Config::default();
        assert_eq!(config.max_posts, 30);
        assert_eq!(config.max_cycles, 10);
        assert_eq!(config.settle(), Duration::from_millis(800));
        assert_eq!(config.stall_recheck(), Duration::from_millis(2000));
    }
}
