//! The `Network` wrapper around an undirected petgraph graph.

use std::collections::HashMap;
use std::sync::Arc;

use petgraph::graph::{NodeIndex, UnGraph};
use thiserror::Error;

use super::edge::EdgeKey;

/// A unique, stable identifier for a node within one network.
///
/// This is a type alias for `petgraph::graph::NodeIndex` to abstract the
/// underlying graph implementation.
pub type NodeId = NodeIndex;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetworkError {
    #[error("self-loop on '{node}' rejected in network '{network}'")]
    SelfLoop { network: String, node: String },
}

/// An undirected, weighted simple graph over stable string identifiers.
///
/// This is the canonical representation handed over by the loader boundary:
/// no duplicate edges, no self-loops, every edge carrying a signed weight
/// (loaders substitute `1.0` for unweighted formats). All randomization and
/// set operations in this crate read and produce this type.
#[derive(Debug, Clone, Default)]
pub struct Network {
    name: String,
    graph: UnGraph<Arc<str>, f64>,
    ids: HashMap<Arc<str>, NodeId>,
}

impl Network {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph: UnGraph::default(),
            ids: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Interns a node identifier, returning the existing index if present.
    pub fn ensure_node(&mut self, id: &str) -> NodeId {
        if let Some(&idx) = self.ids.get(id) {
            return idx;
        }
        let label: Arc<str> = Arc::from(id);
        let idx = self.graph.add_node(label.clone());
        self.ids.insert(label, idx);
        idx
    }

    /// Adds an undirected edge, interning endpoints as needed.
    ///
    /// Re-adding an existing edge updates its weight instead of creating a
    /// parallel edge; self-loops are rejected.
    pub fn add_edge(&mut self, u: &str, v: &str, weight: f64) -> Result<(), NetworkError> {
        if u == v {
            return Err(NetworkError::SelfLoop {
                network: self.name.clone(),
                node: u.to_string(),
            });
        }
        let a = self.ensure_node(u);
        let b = self.ensure_node(v);
        match self.graph.find_edge(a, b) {
            Some(edge) => {
                // find_edge checks both orientations on an undirected graph.
                self.graph[edge] = weight;
            }
            None => {
                self.graph.add_edge(a, b, weight);
            }
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_index(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// Node labels in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = Arc<str>> + '_ {
        self.graph.node_indices().map(move |i| self.graph[i].clone())
    }

    pub fn has_edge(&self, u: &str, v: &str) -> bool {
        match (self.node_index(u), self.node_index(v)) {
            (Some(a), Some(b)) => self.graph.find_edge(a, b).is_some(),
            _ => false,
        }
    }

    pub fn weight(&self, u: &str, v: &str) -> Option<f64> {
        let a = self.node_index(u)?;
        let b = self.node_index(v)?;
        let edge = self.graph.find_edge(a, b)?;
        Some(self.graph[edge])
    }

    /// All edges as `(endpoint, endpoint, weight)` triples.
    pub fn edges(&self) -> impl Iterator<Item = (Arc<str>, Arc<str>, f64)> + '_ {
        use petgraph::visit::EdgeRef;
        self.graph.edge_references().map(move |e| {
            (
                self.graph[e.source()].clone(),
                self.graph[e.target()].clone(),
                *e.weight(),
            )
        })
    }

    /// All edges as direction-normalized keys.
    pub fn edge_keys(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edges().map(|(u, v, _)| EdgeKey::new(u, v))
    }

    /// The sorted degree sequence.
    pub fn degree_sequence(&self) -> Vec<usize> {
        let mut degrees: Vec<usize> = self
            .graph
            .node_indices()
            .map(|i| self.graph.neighbors(i).count())
            .collect();
        degrees.sort_unstable();
        degrees
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_edge_updates_existing_weight() {
        let mut net = Network::new("test");
        net.add_edge("sp1", "sp2", 1.0).unwrap();
        net.add_edge("sp2", "sp1", -1.0).unwrap();
        assert_eq!(net.edge_count(), 1);
        assert_eq!(net.weight("sp1", "sp2"), Some(-1.0));
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut net = Network::new("test");
        let err = net.add_edge("sp1", "sp1", 1.0).unwrap_err();
        assert!(matches!(err, NetworkError::SelfLoop { .. }));
        assert_eq!(net.edge_count(), 0);
    }

    #[test]
    fn test_degree_sequence() {
        let mut net = Network::new("star");
        net.add_edge("hub", "sp1", 1.0).unwrap();
        net.add_edge("hub", "sp2", 1.0).unwrap();
        net.add_edge("hub", "sp3", 1.0).unwrap();
        assert_eq!(net.degree_sequence(), vec![1, 1, 1, 3]);
    }

    #[test]
    fn test_isolated_nodes_are_kept() {
        let mut net = Network::new("sparse");
        net.ensure_node("alone");
        net.add_edge("sp1", "sp2", 1.0).unwrap();
        assert_eq!(net.node_count(), 3);
        assert_eq!(net.edge_count(), 1);
    }
}
