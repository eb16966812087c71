//! Checker configuration.

use serde::{Deserialize, Serialize};

use crate::DEFAULT_SEED;

/// Configuration for an [`OutputChecker`](crate::OutputChecker).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckerConfig {
    /// Seed handed to the seed hook at session start.
    pub seed: u64,

    /// Significant digits used when formatting drift rows.
    pub significant_digits: usize,
}

impl CheckerConfig {
    /// Set a custom session seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of significant digits in drift rows.
    pub fn with_significant_digits(mut self, digits: usize) -> Self {
        self.significant_digits = digits.max(1);
        self
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            significant_digits: 4,
        }
    }
}
