//! Resampling driver: set sizes over k-subsets of a group.

use rand::seq::index;
use rand::Rng;

use super::rows::{sizes_for_subset, MeasurementRow};
use crate::config::RunConfig;
use crate::network::Group;
use crate::null::NullModels;

/// Ceiling on materialized subset enumerations. Above this many k-subsets
/// the driver samples subsets directly instead of listing them, bounding
/// memory for large groups.
pub const ENUMERATION_CAP: u128 = 10_000;

/// Exact binomial coefficient, saturating at `u128::MAX`.
pub(crate) fn binomial(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        // Exact at every step: the running product of i+1 consecutive
        // integers is divisible by (i+1)!.
        result = result.saturating_mul((n - i) as u128) / (i as u128 + 1);
    }
    result
}

/// All k-subsets of `0..n` in lexicographic order.
fn enumerate_combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut combos = Vec::new();
    if k == 0 || k > n {
        return combos;
    }
    let mut current: Vec<usize> = (0..k).collect();
    loop {
        combos.push(current.clone());
        // Rightmost position that can still advance.
        let mut pos = k;
        while pos > 0 && current[pos - 1] == n - k + pos - 1 {
            pos -= 1;
        }
        if pos == 0 {
            return combos;
        }
        current[pos - 1] += 1;
        for i in pos..k {
            current[i] = current[i - 1] + 1;
        }
    }
}

/// Chooses the member subsets to measure for one subset size.
///
/// When `C(members, k)` fits under [`ENUMERATION_CAP`] the enumeration is
/// materialized and a distinct sample of `min(limit, C)` subsets is taken
/// from it. Beyond the cap, `limit` independent subsets are drawn directly —
/// duplicates are possible but memory stays bounded.
pub(crate) fn subsets_for(
    members: usize,
    k: usize,
    limit: Option<usize>,
    rng: &mut impl Rng,
) -> Vec<Vec<usize>> {
    let total = binomial(members, k);
    if total <= ENUMERATION_CAP {
        let all = enumerate_combinations(members, k);
        let wanted = limit.map_or(all.len(), |l| l.min(all.len()));
        if wanted == all.len() {
            return all;
        }
        index::sample(rng, all.len(), wanted)
            .iter()
            .map(|i| all[i].clone())
            .collect()
    } else {
        let wanted = limit.unwrap_or_else(|| {
            log::warn!(
                "{} {}-subsets exceed the enumeration cap and no limit is set; \
                 drawing {} random subsets instead",
                total,
                k,
                ENUMERATION_CAP
            );
            ENUMERATION_CAP as usize
        });
        (0..wanted)
            .map(|_| {
                let mut subset: Vec<usize> = index::sample(rng, members, k).iter().collect();
                subset.sort_unstable();
                subset
            })
            .collect()
    }
}

/// Measures set sizes over subsampled member lists of every group, for each
/// subset size in `config.numbers` (default `1..=N`). Every row carries the
/// subset size as its sample count, which is how downstream plots show the
/// effect of acquiring more replicates.
pub fn generate_sample_sizes(
    groups: &[Group],
    models: &NullModels,
    config: &RunConfig,
    rng: &mut impl Rng,
) -> Vec<MeasurementRow> {
    let mut rows = Vec::new();
    for group in groups {
        let members = group.len();
        let sizes: Vec<usize> = match &config.numbers {
            Some(numbers) => numbers.clone(),
            None => (1..=members).collect(),
        };
        for k in sizes {
            if k == 0 || k > members {
                log::warn!(
                    "subsample size {} is outside group '{}' with {} members; skipped",
                    k,
                    group.name(),
                    members
                );
                continue;
            }
            for subset in subsets_for(members, k, config.limit, rng) {
                sizes_for_subset(group, models, config, &subset, rng, &mut rows);
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::fixtures::fixture_trio;
    use crate::null::generate_null;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use rstest::rstest;

    fn trio_group() -> Group {
        let (a, b, c) = fixture_trio();
        Group::new("trio", vec![a, b, c])
    }

    fn config() -> RunConfig {
        RunConfig {
            replicates: 3,
            positive_replicates: 2,
            permutations: 2,
            cores: Some(2),
            seed: Some(7),
            ..RunConfig::default()
        }
    }

    #[rstest]
    #[case(5, 2, 10)]
    #[case(3, 3, 1)]
    #[case(3, 1, 3)]
    #[case(4, 0, 1)]
    #[case(2, 5, 0)]
    fn test_binomial(#[case] n: usize, #[case] k: usize, #[case] expected: u128) {
        assert_eq!(binomial(n, k), expected);
    }

    #[test]
    fn test_enumeration_is_lexicographic_and_complete() {
        let combos = enumerate_combinations(4, 2);
        assert_eq!(combos.len(), 6);
        assert_eq!(combos.first().unwrap(), &vec![0, 1]);
        assert_eq!(combos.last().unwrap(), &vec![2, 3]);
    }

    #[test]
    fn test_subsets_respect_limit_within_enumeration() {
        let mut rng = SmallRng::seed_from_u64(11);
        let subsets = subsets_for(5, 2, Some(4), &mut rng);
        assert_eq!(subsets.len(), 4);
        for subset in &subsets {
            assert_eq!(subset.len(), 2);
            assert!(subset[0] < subset[1]);
        }
    }

    #[test]
    fn test_direct_draw_branch_bounds_memory() {
        // C(30, 15) is far beyond the cap, so subsets are drawn directly.
        let mut rng = SmallRng::seed_from_u64(13);
        let subsets = subsets_for(30, 15, Some(5), &mut rng);
        assert_eq!(subsets.len(), 5);
        for subset in &subsets {
            assert_eq!(subset.len(), 15);
            assert!(subset.windows(2).all(|w| w[0] < w[1]));
            assert!(subset.iter().all(|&i| i < 30));
        }
    }

    #[test]
    fn test_total_row_count_identity() {
        let groups = vec![trio_group()];
        let config = config();
        let models = generate_null(&groups, &config).unwrap();
        let mut rng = SmallRng::seed_from_u64(5);
        let rows = generate_sample_sizes(&groups, &models, &config, &mut rng);
        // rows per subset: (1 input + 2 modes × 2 permutations) sets × 2
        // operations; subsets per size k: min(limit, C(3, k)) with no limit.
        let rows_per_subset = 5 * 2;
        let expected: usize = (1..=3)
            .map(|k| rows_per_subset * binomial(3, k) as usize)
            .sum();
        assert_eq!(rows.len(), expected);
    }

    #[test]
    fn test_row_count_identity_with_limit() {
        let groups = vec![trio_group()];
        let config = RunConfig {
            limit: Some(2),
            ..config()
        };
        let models = generate_null(&groups, &config).unwrap();
        let mut rng = SmallRng::seed_from_u64(6);
        let rows = generate_sample_sizes(&groups, &models, &config, &mut rng);
        let rows_per_subset = 5 * 2;
        let expected: usize = (1..=3)
            .map(|k| rows_per_subset * binomial(3, k).min(2) as usize)
            .sum();
        assert_eq!(rows.len(), expected);
    }

    #[test]
    fn test_rows_are_tagged_with_subset_size() {
        let groups = vec![trio_group()];
        let config = RunConfig {
            numbers: Some(vec![2]),
            ..config()
        };
        let models = generate_null(&groups, &config).unwrap();
        let mut rng = SmallRng::seed_from_u64(8);
        let rows = generate_sample_sizes(&groups, &models, &config, &mut rng);
        assert!(!rows.is_empty());
        assert!(rows.iter().all(|row| row.samples == 2));
    }
}
