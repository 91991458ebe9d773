//! Task descriptors and the per-task execution path.

use std::fmt;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::core::generate_core;
use super::error::NullModelError;
use super::randomize::{randomize_dyads, randomize_network};
use crate::config::RetryBudget;
use crate::network::{Group, Network};

/// Which randomization regime a task runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NullMode {
    /// Edges are placed uniformly at random; degrees are not preserved.
    Random,
    /// Dyad rewiring; every node keeps its degree.
    Degree,
}

impl NullMode {
    pub const ALL: [NullMode; 2] = [NullMode::Random, NullMode::Degree];

    pub fn label(&self) -> &'static str {
        match self {
            NullMode::Random => "random",
            NullMode::Degree => "degree",
        }
    }
}

impl fmt::Display for NullMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structured warnings collected while a task runs.
///
/// Tasks return their diagnostics instead of mutating process-wide logger
/// state; the dispatcher merges them so callers can inspect every warning
/// without scraping a log. Each warning is still emitted through the `log`
/// facade as it is recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    pub warnings: Vec<String>,
    /// Set when any degree-preserving replicate exhausted its retry budget.
    pub timed_out: bool,
}

impl Diagnostics {
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.warnings.push(message);
    }

    pub fn merge(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
        self.timed_out |= other.timed_out;
    }
}

/// An immutable parameter bundle for one generation task.
///
/// Descriptors carry their own copy of the source data and no shared state,
/// so any worker can run any descriptor in any order. The two shapes are
/// discriminated by variant, never by inspecting payload arity.
#[derive(Debug, Clone)]
pub enum TaskDescriptor {
    /// Independent replicates of one group member.
    NegativeControl {
        group: String,
        member_index: usize,
        network: Network,
        mode: NullMode,
        replicates: usize,
    },
    /// Core-stratified coupled ensembles over a whole group.
    PositiveControl {
        group: Group,
        mode: NullMode,
        fraction: f64,
        prevalence: f64,
        rounds: usize,
    },
}

/// One task's produced ensembles plus its diagnostics.
#[derive(Debug, Clone)]
pub enum TaskOutput {
    Negative {
        group: String,
        member_index: usize,
        mode: NullMode,
        ensemble: Vec<Network>,
        diagnostics: Diagnostics,
    },
    Positive {
        group: String,
        mode: NullMode,
        fraction: f64,
        prevalence: f64,
        rounds: Vec<Vec<Network>>,
        diagnostics: Diagnostics,
    },
}

/// Runs one descriptor to completion.
///
/// The seed is assigned by the dispatcher per task, which keeps runs
/// reproducible regardless of worker scheduling.
pub(crate) fn run(
    descriptor: &TaskDescriptor,
    seed: u64,
    budget: RetryBudget,
) -> Result<TaskOutput, NullModelError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    match descriptor {
        TaskDescriptor::NegativeControl {
            group,
            member_index,
            network,
            mode,
            replicates,
        } => {
            let mut diagnostics = Diagnostics::default();
            if network.edge_count() == 0 {
                diagnostics.warn(format!(
                    "network '{}' in group '{}' has no edges; its null models are empty",
                    network.name(),
                    group
                ));
            }
            let mut ensemble = Vec::with_capacity(*replicates);
            let mut degraded = false;
            for _ in 0..*replicates {
                match mode {
                    NullMode::Random => {
                        ensemble.push(randomize_network(network, &[], &mut rng)?);
                    }
                    NullMode::Degree => {
                        let outcome =
                            randomize_dyads(network, &[], budget, degraded, &mut rng)?;
                        if outcome.timed_out && !degraded {
                            diagnostics.warn(format!(
                                "could not produce a fully mixed degree-preserving model \
                                 for network '{}' ({} of {} swaps applied)",
                                network.name(),
                                outcome.completed_swaps,
                                outcome.requested_swaps
                            ));
                        }
                        degraded |= outcome.timed_out;
                        ensemble.push(outcome.network);
                    }
                }
            }
            diagnostics.timed_out = degraded;
            Ok(TaskOutput::Negative {
                group: group.clone(),
                member_index: *member_index,
                mode: *mode,
                ensemble,
                diagnostics,
            })
        }
        TaskDescriptor::PositiveControl {
            group,
            mode,
            fraction,
            prevalence,
            rounds,
        } => {
            let mut diagnostics = Diagnostics::default();
            let mut produced = Vec::with_capacity(*rounds);
            for _ in 0..*rounds {
                produced.push(generate_core(
                    group,
                    *mode,
                    *fraction,
                    *prevalence,
                    budget,
                    &mut rng,
                    &mut diagnostics,
                )?);
            }
            Ok(TaskOutput::Positive {
                group: group.name().to_string(),
                mode: *mode,
                fraction: *fraction,
                prevalence: *prevalence,
                rounds: produced,
                diagnostics,
            })
        }
    }
}
