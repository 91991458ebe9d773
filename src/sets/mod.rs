//! Set sizing, measurement rows and the resampling driver.
pub mod ops;
pub mod resample;
pub mod rows;

// Re-export key types for convenient access
pub use ops::{consensus_network, difference, intersection, intersection_edges};
pub use resample::{generate_sample_sizes, ENUMERATION_CAP};
pub use rows::{generate_sizes, MeasurementRow, ModelKind, SetKind};
