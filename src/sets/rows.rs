//! Measurement rows: the tabular output unit of the set sizing engine.

use std::fmt;

use rand::Rng;
use serde::Serialize;

use super::ops;
use crate::config::RunConfig;
use crate::network::{Group, Network};
use crate::null::{NullMode, NullModels};

/// Which model family produced the networks behind a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ModelKind {
    Input,
    Random,
    Degree,
}

impl ModelKind {
    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::Input => "Input",
            ModelKind::Random => "Random",
            ModelKind::Degree => "Degree",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<NullMode> for ModelKind {
    fn from(mode: NullMode) -> Self {
        match mode {
            NullMode::Random => ModelKind::Random,
            NullMode::Degree => ModelKind::Degree,
        }
    }
}

/// Which set operation a row measures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SetKind {
    Difference,
    Intersection { threshold: f64 },
}

impl fmt::Display for SetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetKind::Difference => f.write_str("Difference"),
            SetKind::Intersection { threshold } => write!(f, "Intersection {}", threshold),
        }
    }
}

/// One measured set size, as handed to the statistics and export
/// collaborators.
///
/// `set_size` is `None` when the measured list was degenerate (§ error
/// handling: the run continues with an undefined cell). For intersections,
/// `absolute_size` is the threshold expressed in networks, `K × s`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRow {
    pub group: String,
    pub model: ModelKind,
    pub network_type: String,
    pub fraction: Option<f64>,
    pub prevalence: Option<f64>,
    pub set_kind: SetKind,
    pub set_size: Option<usize>,
    pub absolute_size: Option<f64>,
    pub samples: usize,
}

/// Appends one row per configured set operation for a network list.
fn rows_for(
    group: &str,
    model: ModelKind,
    networks: &[&Network],
    fraction: Option<f64>,
    prevalence: Option<f64>,
    config: &RunConfig,
    rows: &mut Vec<MeasurementRow>,
) {
    let samples = networks.len();
    let network_type = format!("{} networks", model.label());
    if config.difference {
        rows.push(MeasurementRow {
            group: group.to_string(),
            model,
            network_type: network_type.clone(),
            fraction,
            prevalence,
            set_kind: SetKind::Difference,
            set_size: ops::difference(networks, config.sign),
            absolute_size: None,
            samples,
        });
    }
    for &threshold in &config.intersection_sizes {
        rows.push(MeasurementRow {
            group: group.to_string(),
            model,
            network_type: network_type.clone(),
            fraction,
            prevalence,
            set_kind: SetKind::Intersection { threshold },
            set_size: ops::intersection(networks, threshold, config.sign),
            absolute_size: Some(samples as f64 * threshold),
            samples,
        });
    }
}

/// Measures every configured set size for the given member subset of one
/// group: the inputs themselves, `permutations` draws from the negative
/// ensembles, and every positive-control round.
pub(crate) fn sizes_for_subset(
    group: &Group,
    models: &NullModels,
    config: &RunConfig,
    member_indices: &[usize],
    rng: &mut impl Rng,
    rows: &mut Vec<MeasurementRow>,
) {
    let inputs: Vec<&Network> = member_indices
        .iter()
        .map(|&i| &group.networks()[i])
        .collect();
    rows_for(group.name(), ModelKind::Input, &inputs, None, None, config, rows);

    for mode in NullMode::ALL {
        let Some(entry) = models.for_mode(mode).get(group.name()) else {
            continue;
        };
        let kind = ModelKind::from(mode);
        // Negative controls: each permutation round draws one replicate per
        // member, so a round is a plausible alternative group.
        for _ in 0..config.permutations {
            let drawn: Option<Vec<&Network>> = member_indices
                .iter()
                .map(|&i| {
                    let ensemble = &entry.replicates[i];
                    if ensemble.is_empty() {
                        None
                    } else {
                        Some(&ensemble[rng.gen_range(0..ensemble.len())])
                    }
                })
                .collect();
            if let Some(networks) = drawn {
                rows_for(group.name(), kind, &networks, None, None, config, rows);
            }
        }
        // Positive controls are already coupled per round; the subset picks
        // the same slots out of every round.
        for core in &entry.core {
            for round in &core.rounds {
                let selected: Vec<&Network> =
                    member_indices.iter().map(|&i| &round[i]).collect();
                rows_for(
                    group.name(),
                    kind,
                    &selected,
                    Some(core.fraction),
                    Some(core.prevalence),
                    config,
                    rows,
                );
            }
        }
    }
}

/// Measures set sizes over the full member list of every group.
pub fn generate_sizes(
    groups: &[Group],
    models: &NullModels,
    config: &RunConfig,
    rng: &mut impl Rng,
) -> Vec<MeasurementRow> {
    let mut rows = Vec::new();
    for group in groups {
        let indices: Vec<usize> = (0..group.len()).collect();
        sizes_for_subset(group, models, config, &indices, rng, &mut rows);
    }
    rows
}
