//! Canonical network representation shared by every engine in the crate.
pub mod edge;
pub mod graph;
pub mod group;

// Re-export key types for convenient access
pub use edge::{weight_sign, EdgeIdentity, EdgeKey};
pub use graph::{Network, NetworkError, NodeId};
pub use group::{Group, UnionEdge};
