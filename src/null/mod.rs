//! Null-model generation: randomizers, core stratification and dispatch.
pub mod core;
pub mod dispatch;
pub mod error;
pub mod randomize;
pub mod task;

// Re-export key types for convenient access
pub use self::core::generate_core;
pub use dispatch::{generate_null, CoreModels, GroupModels, NullModels};
pub use error::NullModelError;
pub use randomize::{randomize_dyads, randomize_network, RewireOutcome};
pub use task::{Diagnostics, NullMode, TaskDescriptor, TaskOutput};
