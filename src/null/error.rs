//! Error types for the null-model engine.

use thiserror::Error;

use crate::config::ConfigError;
use crate::network::NetworkError;

/// Fatal conditions in null-model generation.
///
/// Everything here aborts the batch; recoverable conditions (degenerate
/// inputs, rewiring degradation) travel as warnings in
/// [`crate::null::Diagnostics`] instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NullModelError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("group '{group}' contains no networks")]
    EmptyGroup { group: String },
    #[error(
        "keep set for network '{network}' holds {keep} edges but the network only has {edges}"
    )]
    KeepSetTooLarge {
        network: String,
        keep: usize,
        edges: usize,
    },
    #[error(
        "network '{network}' requires {required} edges but only {capacity} node pairs exist"
    )]
    TooManyEdges {
        network: String,
        required: usize,
        capacity: usize,
    },
    #[error(
        "core of {requested} edges for group '{group}' exceeds the smallest member ({available} edges)"
    )]
    CoreTooLarge {
        group: String,
        requested: usize,
        available: usize,
    },
    #[error(
        "fraction {fraction} of the {union}-edge union of group '{group}' rounds to an empty core"
    )]
    EmptyCore {
        group: String,
        union: usize,
        fraction: f64,
    },
    #[error(
        "prevalence {prevalence} over the {members} members of group '{group}' rounds to zero hosting slots"
    )]
    PrevalenceTooLow {
        group: String,
        prevalence: f64,
        members: usize,
    },
    #[error("worker pool could not be built: {reason}")]
    PoolBuild { reason: String },
}
