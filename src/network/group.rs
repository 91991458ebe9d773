//! Named, ordered collections of replicate networks.

use std::collections::HashSet;

use super::edge::{EdgeIdentity, EdgeKey};
use super::graph::Network;

/// One edge of a group union: the canonical key and the representative
/// weight (first occurrence across the group wins).
#[derive(Debug, Clone, PartialEq)]
pub struct UnionEdge {
    pub key: EdgeKey,
    pub weight: f64,
}

/// A named, ordered collection of networks treated as replicates of one
/// system. All ensemble and set operations are scoped to a group; member
/// order is significant because null ensembles are paired with members by
/// position.
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    networks: Vec<Network>,
}

impl Group {
    pub fn new(name: impl Into<String>, networks: Vec<Network>) -> Self {
        Self {
            name: name.into(),
            networks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// The deduplicated union of member edges, in first-occurrence order.
    ///
    /// With `sign` set, entries are deduplicated by `(endpoints, weight
    /// sign)`, so an interaction observed with both signs contributes two
    /// entries. Without it, deduplication is by endpoints alone.
    pub fn edge_union(&self, sign: bool) -> Vec<UnionEdge> {
        let mut seen: HashSet<EdgeIdentity> = HashSet::new();
        let mut union = Vec::new();
        for network in &self.networks {
            for (u, v, weight) in network.edges() {
                let key = EdgeKey::new(u, v);
                let identity = if sign {
                    EdgeIdentity::signed(key.clone(), weight)
                } else {
                    EdgeIdentity::unsigned(key.clone())
                };
                if seen.insert(identity) {
                    union.push(UnionEdge { key, weight });
                }
            }
        }
        union
    }

    /// The smallest member edge count, used to validate core sizes before
    /// dispatch. `None` for an empty group.
    pub fn min_edge_count(&self) -> Option<usize> {
        self.networks.iter().map(|n| n.edge_count()).min()
    }
}
