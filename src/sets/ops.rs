//! Set-theoretic overlap measures across lists of networks.

use std::collections::HashMap;

use crate::network::{EdgeIdentity, EdgeKey, Network, NetworkError};

/// Occurrence count per canonical edge identity across the list.
///
/// Each network contributes an identity at most once (it is a simple
/// graph), so a count is the number of networks containing that identity.
fn identity_counts(networks: &[&Network], sign: bool) -> HashMap<EdgeIdentity, usize> {
    let mut counts = HashMap::new();
    for network in networks {
        for (u, v, weight) in network.edges() {
            let key = EdgeKey::new(u, v);
            let identity = if sign {
                EdgeIdentity::signed(key, weight)
            } else {
                EdgeIdentity::unsigned(key)
            };
            *counts.entry(identity).or_insert(0usize) += 1;
        }
    }
    counts
}

/// A list with nothing to measure: no networks, or none carrying edges.
fn degenerate(networks: &[&Network]) -> bool {
    networks.is_empty() || networks.iter().all(|n| n.edge_count() == 0)
}

/// Number of edge identities present in exactly one network of the list.
///
/// Returns `None` for degenerate input; the run continues and the caller
/// records an undefined cell.
pub fn difference(networks: &[&Network], sign: bool) -> Option<usize> {
    if degenerate(networks) {
        log::warn!("set difference over a degenerate network list is undefined");
        return None;
    }
    let counts = identity_counts(networks, sign);
    Some(counts.values().filter(|&&count| count == 1).count())
}

/// Number of edge identities present in at least `round(size × K)` of the
/// `K` networks.
///
/// A threshold that rounds to one network or fewer is the complement of the
/// difference rather than a meaningful intersection, so it contributes
/// nothing. Returns `None` for degenerate input.
pub fn intersection(networks: &[&Network], size: f64, sign: bool) -> Option<usize> {
    if degenerate(networks) {
        log::warn!("set intersection over a degenerate network list is undefined");
        return None;
    }
    let required = (size * networks.len() as f64).round() as usize;
    if required <= 1 {
        return Some(0);
    }
    let counts = identity_counts(networks, sign);
    Some(counts.values().filter(|&&count| count >= required).count())
}

/// The edge identities satisfying an intersection threshold, in canonical
/// order.
pub fn intersection_edges(networks: &[&Network], size: f64, sign: bool) -> Vec<EdgeIdentity> {
    let required = (size * networks.len() as f64).round() as usize;
    if required <= 1 {
        return Vec::new();
    }
    let mut shared: Vec<EdgeIdentity> = identity_counts(networks, sign)
        .into_iter()
        .filter(|(_, count)| *count >= required)
        .map(|(identity, _)| identity)
        .collect();
    shared.sort();
    shared
}

/// Builds the consensus network of an intersection: one edge per shared
/// identity, weighted by the mean weight across the members that contain
/// its endpoints.
pub fn consensus_network(
    name: &str,
    networks: &[&Network],
    size: f64,
    sign: bool,
) -> Result<Network, NetworkError> {
    let shared = intersection_edges(networks, size, sign);
    let mut consensus = Network::new(name);
    for identity in &shared {
        let (u, v) = identity.key.endpoints();
        let weights: Vec<f64> = networks.iter().filter_map(|n| n.weight(u, v)).collect();
        let mean = weights.iter().sum::<f64>() / weights.len() as f64;
        consensus.add_edge(u, v, mean)?;
    }
    Ok(consensus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::fixtures::fixture_trio;
    use rstest::rstest;

    fn trio() -> Vec<Network> {
        let (a, b, c) = fixture_trio();
        vec![a, b, c]
    }

    fn refs(networks: &[Network]) -> Vec<&Network> {
        networks.iter().collect()
    }

    #[test]
    fn test_difference_unsigned() {
        let nets = trio();
        assert_eq!(difference(&refs(&nets), false), Some(4));
    }

    #[test]
    fn test_difference_signed() {
        // The sign flip on sp1--sp2 adds a fifth unique identity.
        let nets = trio();
        assert_eq!(difference(&refs(&nets), true), Some(5));
    }

    #[rstest]
    #[case(1.0, false, 4)]
    #[case(1.0, true, 3)]
    #[case(0.6, true, 5)]
    fn test_intersection_thresholds(
        #[case] size: f64,
        #[case] sign: bool,
        #[case] expected: usize,
    ) {
        let nets = trio();
        assert_eq!(intersection(&refs(&nets), size, sign), Some(expected));
    }

    #[test]
    fn test_intersection_of_single_network_is_empty() {
        // round(1 × 1) = 1 reduces to "present anywhere", which is not an
        // intersection.
        let nets = trio();
        assert_eq!(intersection(&refs(&nets)[..1], 1.0, false), Some(0));
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(4)]
    fn test_difference_of_identical_copies_is_zero(#[case] copies: usize) {
        let (a, _, _) = fixture_trio();
        let nets = vec![a; copies];
        assert_eq!(difference(&refs(&nets), true), Some(0));
    }

    #[test]
    fn test_intersection_of_identical_copies_is_edge_count() {
        let (a, _, _) = fixture_trio();
        let nets = vec![a.clone(), a.clone(), a.clone()];
        assert_eq!(intersection(&refs(&nets), 1.0, false), Some(a.edge_count()));
    }

    #[test]
    fn test_degenerate_input_is_undefined() {
        let empty = Network::new("hollow");
        assert_eq!(difference(&[], true), None);
        assert_eq!(difference(&[&empty], true), None);
        assert_eq!(intersection(&[&empty, &empty], 1.0, false), None);
    }

    #[test]
    fn test_intersection_edges_are_sorted_and_complete() {
        let nets = trio();
        let shared = intersection_edges(&refs(&nets), 1.0, false);
        let labels: Vec<String> = shared.iter().map(|s| s.key.to_string()).collect();
        assert_eq!(
            labels,
            vec!["sp1--sp2", "sp1--sp3", "sp2--sp5", "sp3--sp4"]
        );
    }

    #[test]
    fn test_consensus_network_averages_weights() {
        let nets = trio();
        let consensus = consensus_network("consensus", &refs(&nets), 1.0, false).unwrap();
        assert_eq!(consensus.edge_count(), 4);
        // sp1--sp2 carries +1, +1 and -1 across the members.
        let weight = consensus.weight("sp1", "sp2").unwrap();
        assert!((weight - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(consensus.weight("sp3", "sp4"), Some(-1.0));
    }
}
