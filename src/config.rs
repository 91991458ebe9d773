//! Caller-facing run parameters, validated before any task is dispatched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{parameter} must be at least 1 (got {got})")]
    ZeroCount { parameter: &'static str, got: usize },
    #[error("{parameter} must lie in (0, 1] (got {got})")]
    UnitInterval { parameter: &'static str, got: f64 },
}

/// Retry budgets for the dyad-rewiring loop.
///
/// `initial` applies while an ensemble is healthy; once one replicate times
/// out the rest of that ensemble falls back to `degraded` to bound runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryBudget {
    pub initial: usize,
    pub degraded: usize,
}

/// Everything the caller can tune for one run.
///
/// Defaults mirror the original command-line surface: ten replicates per
/// negative control, prevalence 1 (a conserved edge sits in every member),
/// fifty permutation sets, signed comparison on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Replicates per negative control (`n`).
    pub replicates: usize,
    /// Stratifier calls per positive-control task (`npos`).
    pub positive_replicates: usize,
    /// Conserved-core fractions; empty disables positive controls.
    pub fractions: Vec<f64>,
    /// Core prevalences paired with every fraction.
    pub prevalences: Vec<f64>,
    /// Whether edge sign participates in set identities.
    pub sign: bool,
    /// Whether difference rows are produced.
    pub difference: bool,
    /// Intersection thresholds, each in (0, 1].
    pub intersection_sizes: Vec<f64>,
    /// Permutation rounds drawn from the negative ensembles per group.
    pub permutations: usize,
    /// Upper bound on resamples per subset size; `None` keeps every subset
    /// the enumeration branch can reach.
    pub limit: Option<usize>,
    /// Explicit subsample sizes; `None` walks 1..=N.
    pub numbers: Option<Vec<usize>>,
    /// Worker-pool size; `None` means available cores minus one.
    pub cores: Option<usize>,
    /// Base RNG seed; `None` draws one from the thread RNG.
    pub seed: Option<u64>,
    pub swap_retry_budget: usize,
    pub degraded_retry_budget: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            replicates: 10,
            positive_replicates: 10,
            fractions: Vec::new(),
            prevalences: vec![1.0],
            sign: true,
            difference: true,
            intersection_sizes: vec![1.0],
            permutations: 50,
            limit: None,
            numbers: None,
            cores: None,
            seed: None,
            swap_retry_budget: 100_000,
            degraded_retry_budget: 100,
        }
    }
}

impl RunConfig {
    /// Rejects out-of-range parameters with a descriptive error.
    ///
    /// Group-dependent checks (core size versus member edge counts) happen
    /// in the dispatcher, which is the first place the groups are known.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::at_least_one("replicates", self.replicates)?;
        Self::at_least_one("positive_replicates", self.positive_replicates)?;
        Self::at_least_one("permutations", self.permutations)?;
        Self::at_least_one("swap_retry_budget", self.swap_retry_budget)?;
        Self::at_least_one("degraded_retry_budget", self.degraded_retry_budget)?;
        if let Some(limit) = self.limit {
            Self::at_least_one("limit", limit)?;
        }
        if let Some(cores) = self.cores {
            Self::at_least_one("cores", cores)?;
        }
        if let Some(numbers) = &self.numbers {
            for &number in numbers {
                Self::at_least_one("numbers", number)?;
            }
        }
        for &fraction in &self.fractions {
            Self::unit_interval("fractions", fraction)?;
        }
        for &prevalence in &self.prevalences {
            Self::unit_interval("prevalences", prevalence)?;
        }
        for &size in &self.intersection_sizes {
            Self::unit_interval("intersection_sizes", size)?;
        }
        Ok(())
    }

    /// Worker-pool size: the configured value, else available cores minus
    /// one, never below one.
    pub fn worker_count(&self) -> usize {
        self.cores.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get().saturating_sub(1))
                .unwrap_or(1)
                .max(1)
        })
    }

    pub fn retry_budget(&self) -> RetryBudget {
        RetryBudget {
            initial: self.swap_retry_budget,
            degraded: self.degraded_retry_budget,
        }
    }

    fn at_least_one(parameter: &'static str, got: usize) -> Result<(), ConfigError> {
        if got == 0 {
            return Err(ConfigError::ZeroCount { parameter, got });
        }
        Ok(())
    }

    fn unit_interval(parameter: &'static str, got: f64) -> Result<(), ConfigError> {
        if !(got > 0.0 && got <= 1.0) {
            return Err(ConfigError::UnitInterval { parameter, got });
        }
        Ok(())
    }
}
