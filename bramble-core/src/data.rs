//! Run configuration for Bramble properties.

use crate::error::{Error, Result};
use std::env;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Environment variable consulted for a replay seed.
pub const SEED_ENV: &str = "BRAMBLE_SEED";

/// Configuration for property testing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of tests to run.
    pub test_limit: usize,

    /// Maximum number of shrinks to accept.
    pub shrink_limit: usize,

    /// Maximum number of discards before giving up.
    pub discard_limit: usize,

    /// Seed for the run. Falls back to `BRAMBLE_SEED`, then the clock.
    pub seed: Option<u64>,

    /// Stop starting new trials once this much time has passed.
    pub time_limit: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            test_limit: 100,
            shrink_limit: 1000,
            discard_limit: 100,
            seed: None,
            time_limit: None,
        }
    }
}

impl Config {
    /// Create a new config with the given number of tests.
    pub fn with_tests(mut self, tests: usize) -> Self {
        self.test_limit = tests;
        self
    }

    /// Create a new config with the given shrink limit.
    pub fn with_shrinks(mut self, shrinks: usize) -> Self {
        self.shrink_limit = shrinks;
        self
    }

    /// Create a new config with the given discard limit.
    pub fn with_discards(mut self, discards: usize) -> Self {
        self.discard_limit = discards;
        self
    }

    /// Fix the seed, making the run reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// The seed this run will use.
    pub fn resolve_seed(&self) -> Result<u64> {
        if let Some(seed) = self.seed {
            return Ok(seed);
        }
        match env::var(SEED_ENV) {
            Ok(text) => parse_seed(&text),
            Err(_) => Ok(clock_seed()),
        }
    }
}

fn parse_seed(text: &str) -> Result<u64> {
    text.trim().parse().map_err(|_| Error::InvalidConfig {
        message: format!("{SEED_ENV} must be an unsigned integer, got {text:?}"),
    })
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or(0)
}
