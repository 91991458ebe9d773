//! Task dispatch over a fixed-size worker pool, and result reassembly.

use std::collections::HashMap;

use rand::Rng;
use rayon::prelude::*;

use super::core::{core_size, hosting_slots};
use super::error::NullModelError;
use super::task::{self, Diagnostics, NullMode, TaskDescriptor, TaskOutput};
use crate::config::RunConfig;
use crate::network::{Group, Network};

/// The positive-control ensembles for one `(fraction, prevalence)` setting:
/// `rounds` coupled ensembles, each with one slot per group member.
#[derive(Debug, Clone)]
pub struct CoreModels {
    pub fraction: f64,
    pub prevalence: f64,
    pub rounds: Vec<Vec<Network>>,
}

/// Everything generated for one group under one mode.
#[derive(Debug, Clone, Default)]
pub struct GroupModels {
    /// Negative-control ensembles, indexed like the group's members.
    pub replicates: Vec<Vec<Network>>,
    /// Positive-control ensembles, one entry per `(fraction, prevalence)`.
    pub core: Vec<CoreModels>,
}

impl GroupModels {
    /// Looks up the core models for one parameter pair. The values are the
    /// caller's own configuration entries, so exact comparison is intended.
    pub fn core_models(&self, fraction: f64, prevalence: f64) -> Option<&CoreModels> {
        self.core
            .iter()
            .find(|c| c.fraction == fraction && c.prevalence == prevalence)
    }
}

/// The aggregated output of one generation run, addressable as
/// mode → group → replicates / core\[fraction]\[prevalence].
#[derive(Debug, Clone, Default)]
pub struct NullModels {
    pub random: HashMap<String, GroupModels>,
    pub degree: HashMap<String, GroupModels>,
    /// Merged warnings from every task.
    pub diagnostics: Diagnostics,
}

impl NullModels {
    pub fn for_mode(&self, mode: NullMode) -> &HashMap<String, GroupModels> {
        match mode {
            NullMode::Random => &self.random,
            NullMode::Degree => &self.degree,
        }
    }

    fn for_mode_mut(&mut self, mode: NullMode) -> &mut HashMap<String, GroupModels> {
        match mode {
            NullMode::Random => &mut self.random,
            NullMode::Degree => &mut self.degree,
        }
    }
}

/// Generates every null model a run needs.
///
/// One task is built per `(member, mode)` pair and, when fractions are
/// configured, per `(group, fraction, prevalence, mode)` tuple. Tasks run on
/// a dedicated worker pool sized by the configuration; each carries its own
/// seed so the run is reproducible under any scheduling. Any task error
/// aborts the whole batch — there is no retry and no partial result.
pub fn generate_null(groups: &[Group], config: &RunConfig) -> Result<NullModels, NullModelError> {
    config.validate()?;
    let descriptors = build_descriptors(groups, config)?;

    let base_seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let seeded: Vec<(u64, TaskDescriptor)> = descriptors
        .into_iter()
        .enumerate()
        .map(|(index, descriptor)| (task_seed(base_seed, index), descriptor))
        .collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_count())
        .build()
        .map_err(|e| NullModelError::PoolBuild {
            reason: e.to_string(),
        })?;
    let budget = config.retry_budget();
    let outputs: Result<Vec<TaskOutput>, NullModelError> = pool.install(|| {
        seeded
            .par_iter()
            .map(|(seed, descriptor)| task::run(descriptor, *seed, budget))
            .collect()
    });

    // Reassembly is sequential and happens strictly after the pool returns.
    let mut models = empty_models(groups);
    for output in outputs? {
        match output {
            TaskOutput::Negative {
                group,
                member_index,
                mode,
                ensemble,
                diagnostics,
            } => {
                models.diagnostics.merge(diagnostics);
                if let Some(entry) = models.for_mode_mut(mode).get_mut(&group) {
                    entry.replicates[member_index] = ensemble;
                }
            }
            TaskOutput::Positive {
                group,
                mode,
                fraction,
                prevalence,
                rounds,
                diagnostics,
            } => {
                models.diagnostics.merge(diagnostics);
                if let Some(entry) = models.for_mode_mut(mode).get_mut(&group) {
                    entry.core.push(CoreModels {
                        fraction,
                        prevalence,
                        rounds,
                    });
                }
            }
        }
    }
    Ok(models)
}

fn empty_models(groups: &[Group]) -> NullModels {
    let mut models = NullModels::default();
    for group in groups {
        for mode in NullMode::ALL {
            models.for_mode_mut(mode).insert(
                group.name().to_string(),
                GroupModels {
                    replicates: vec![Vec::new(); group.len()],
                    core: Vec::new(),
                },
            );
        }
    }
    models
}

/// Spreads task indices across the seed space so neighbouring tasks do not
/// draw correlated streams.
fn task_seed(base: u64, index: usize) -> u64 {
    base.wrapping_add((index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

fn build_descriptors(
    groups: &[Group],
    config: &RunConfig,
) -> Result<Vec<TaskDescriptor>, NullModelError> {
    let mut descriptors = Vec::new();
    for group in groups {
        if group.is_empty() {
            return Err(NullModelError::EmptyGroup {
                group: group.name().to_string(),
            });
        }
        for (member_index, network) in group.networks().iter().enumerate() {
            for mode in NullMode::ALL {
                descriptors.push(TaskDescriptor::NegativeControl {
                    group: group.name().to_string(),
                    member_index,
                    network: network.clone(),
                    mode,
                    replicates: config.replicates,
                });
            }
        }
        if config.fractions.is_empty() {
            continue;
        }
        // Group-dependent validation happens here, before any dispatch, so
        // an inconsistent parameter set never reaches a worker.
        let union = group.edge_union(false).len();
        let smallest = group.min_edge_count().unwrap_or(0);
        for &fraction in &config.fractions {
            let conserved = core_size(union, fraction);
            if conserved == 0 {
                return Err(NullModelError::EmptyCore {
                    group: group.name().to_string(),
                    union,
                    fraction,
                });
            }
            if conserved > smallest {
                return Err(NullModelError::CoreTooLarge {
                    group: group.name().to_string(),
                    requested: conserved,
                    available: smallest,
                });
            }
            log::info!(
                "the {} core for group '{}' conserves {} of {} union edges",
                fraction,
                group.name(),
                conserved,
                union
            );
            for &prevalence in &config.prevalences {
                if hosting_slots(prevalence, group.len()) == 0 {
                    return Err(NullModelError::PrevalenceTooLow {
                        group: group.name().to_string(),
                        prevalence,
                        members: group.len(),
                    });
                }
                for mode in NullMode::ALL {
                    descriptors.push(TaskDescriptor::PositiveControl {
                        group: group.clone(),
                        mode,
                        fraction,
                        prevalence,
                        rounds: config.positive_replicates,
                    });
                }
            }
        }
    }
    Ok(descriptors)
}
