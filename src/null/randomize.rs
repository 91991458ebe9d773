//! Pure and degree-preserving randomization of a single network.

use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use super::error::NullModelError;
use crate::config::RetryBudget;
use crate::network::{EdgeKey, Network, UnionEdge};

/// Result of one dyad-rewiring pass.
///
/// `timed_out` marks the network as an approximation: the retry budget ran
/// out before all requested swaps were attempted. The degree sequence is
/// still exactly preserved; only the mixing quality suffers.
#[derive(Debug, Clone)]
pub struct RewireOutcome {
    pub network: Network,
    pub timed_out: bool,
    pub completed_swaps: usize,
    pub requested_swaps: usize,
}

/// Builds a randomized network with the source's node set and edge count.
///
/// Keep-set edges are inserted first, verbatim with their recorded weight.
/// The remaining slots are filled by placing edges between uniformly sampled
/// unoccupied node pairs, each carrying one weight from the shuffled
/// multiset of source weights that the keep set did not claim.
pub fn randomize_network(
    source: &Network,
    keep: &[UnionEdge],
    rng: &mut impl Rng,
) -> Result<Network, NullModelError> {
    let nodes: Vec<Arc<str>> = source.nodes().collect();
    let target_edges = source.edge_count();
    let capacity = nodes.len() * nodes.len().saturating_sub(1) / 2;
    if target_edges > capacity {
        return Err(NullModelError::TooManyEdges {
            network: source.name().to_string(),
            required: target_edges,
            capacity,
        });
    }
    if keep.len() > target_edges {
        return Err(NullModelError::KeepSetTooLarge {
            network: source.name().to_string(),
            keep: keep.len(),
            edges: target_edges,
        });
    }

    let mut null = Network::new(source.name());
    for id in &nodes {
        null.ensure_node(id);
    }
    let mut present: HashSet<EdgeKey> = HashSet::with_capacity(target_edges);
    for entry in keep {
        let (u, v) = entry.key.endpoints();
        null.add_edge(u, v, entry.weight)?;
        present.insert(entry.key.clone());
    }

    // Weight pool: every source weight whose edge the keep set did not
    // claim. The pool is always at least as large as the deficit because a
    // keep edge missing from the source leaves its slot's weight unclaimed.
    let mut pool: Vec<f64> = source
        .edges()
        .filter(|(u, v, _)| !present.contains(&EdgeKey::new(u.clone(), v.clone())))
        .map(|(_, _, weight)| weight)
        .collect();
    pool.shuffle(rng);

    let deficit = target_edges.saturating_sub(null.edge_count());
    for slot in 0..deficit {
        // Rejection-sample an unoccupied pair; the capacity check above
        // guarantees one exists.
        loop {
            let x = rng.gen_range(0..nodes.len());
            let mut y = rng.gen_range(0..nodes.len() - 1);
            if y >= x {
                y += 1;
            }
            let key = EdgeKey::new(nodes[x].clone(), nodes[y].clone());
            if present.contains(&key) {
                continue;
            }
            let (u, v) = key.endpoints();
            null.add_edge(u, v, pool[slot])?;
            present.insert(key);
            break;
        }
    }
    Ok(null)
}

/// Rewires a network by double-edge swaps, preserving every node's degree.
///
/// Performs up to `2 × |E|` swaps. A candidate pair `(a,b)`, `(c,d)` is
/// rejected when the replacement pairs `(a,c)` / `(b,d)` already exist, when
/// an endpoint is shared (which would shift a degree), or when either edge
/// is protected by the keep set. Each attempt retries up to the budget;
/// exhausting it abandons the remaining swaps and flags the result, after
/// which the caller is expected to pass `degraded` for the rest of the
/// ensemble.
pub fn randomize_dyads(
    source: &Network,
    keep: &[UnionEdge],
    budget: RetryBudget,
    degraded: bool,
    rng: &mut impl Rng,
) -> Result<RewireOutcome, NullModelError> {
    let mut edges: Vec<(Arc<str>, Arc<str>, f64)> = source.edges().collect();
    let mut present: HashSet<EdgeKey> = edges
        .iter()
        .map(|(u, v, _)| EdgeKey::new(u.clone(), v.clone()))
        .collect();
    let keep_keys: HashSet<EdgeKey> = keep.iter().map(|entry| entry.key.clone()).collect();

    let requested = if edges.len() < 2 { 0 } else { 2 * edges.len() };
    let max_tries = if degraded {
        budget.degraded
    } else {
        budget.initial
    };
    let mut timed_out = false;
    let mut completed = 0;

    'swaps: for _ in 0..requested {
        let mut tries = 0;
        loop {
            if tries > max_tries {
                timed_out = true;
                break 'swaps;
            }
            let i = rng.gen_range(0..edges.len());
            let mut j = rng.gen_range(0..edges.len() - 1);
            if j >= i {
                j += 1;
            }
            let (a, b) = (edges[i].0.clone(), edges[i].1.clone());
            let (c, d) = (edges[j].0.clone(), edges[j].1.clone());
            // A shared first or second endpoint would move a degree.
            if a == c || b == d {
                tries += 1;
                continue;
            }
            let first = EdgeKey::new(a.clone(), c.clone());
            let second = EdgeKey::new(b.clone(), d.clone());
            // Occupied targets also cover the diagonal collisions a == d and
            // b == c, where a replacement would collapse onto an old edge.
            if present.contains(&first) || present.contains(&second) {
                tries += 1;
                continue;
            }
            let old_i = EdgeKey::new(a.clone(), b.clone());
            let old_j = EdgeKey::new(c.clone(), d.clone());
            if keep_keys.contains(&old_i) || keep_keys.contains(&old_j) {
                tries += 1;
                continue;
            }
            present.remove(&old_i);
            present.remove(&old_j);
            present.insert(first);
            present.insert(second);
            edges[i] = (a, c, edges[i].2);
            edges[j] = (b, d, edges[j].2);
            completed += 1;
            break;
        }
    }

    let mut null = Network::new(source.name());
    for id in source.nodes() {
        null.ensure_node(&id);
    }
    for (u, v, weight) in &edges {
        null.add_edge(u, v, *weight)?;
    }
    Ok(RewireOutcome {
        network: null,
        timed_out,
        completed_swaps: completed,
        requested_swaps: requested,
    })
}
