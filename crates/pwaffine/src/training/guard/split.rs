//! Splitting a group around a conflicting counterexample.
//!
//! A group conflicts with a counterexample `ce` of the opposite polarity when
//! the oracle cannot separate the group from `{ce}`. Splitting produces two
//! non-empty halves whose union is the group and each of which the oracle can
//! separate from `{ce}`. Strategies are tried in the configured order; the
//! first one that yields a valid bipartition wins.

use rand::rngs::StdRng;

use crate::data::{pair_index, Point, PointSet};
use crate::oracle::SeparationOracle;

/// Group splitting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitStrategy {
    /// Partition by `x[k] < ce[k]` on the first axis without ties.
    AxisThreshold,
    /// Partition by `x[i] ± x[j]` against the same value at `ce`.
    PairwiseThreshold,
    /// Longest prefix of the group (in point order) that stays separable.
    Incremental,
    /// Sign of a random hyperplane through `ce`.
    RandomHyperplane,
}

impl SplitStrategy {
    pub const ALL: [SplitStrategy; 4] = [
        SplitStrategy::AxisThreshold,
        SplitStrategy::PairwiseThreshold,
        SplitStrategy::Incremental,
        SplitStrategy::RandomHyperplane,
    ];
}

/// Which side of the separator the group being split sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub(crate) fn opposite(self) -> Self {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        }
    }
}

/// Whether `group` (of the given polarity) and `other` (of the opposite one)
/// are separable, asking the oracle with the sides in the right order.
pub(crate) fn apart<O>(oracle: &O, polarity: Polarity, group: &PointSet, other: &PointSet) -> bool
where
    O: SeparationOracle + ?Sized,
{
    match polarity {
        Polarity::Positive => oracle.separable(group, other),
        Polarity::Negative => oracle.separable(other, group),
    }
}

pub(crate) struct Splitter<'a, O: SeparationOracle + ?Sized> {
    pub oracle: &'a O,
    pub strategies: &'a [SplitStrategy],
    pub retries: usize,
}

impl<O: SeparationOracle + ?Sized> Splitter<'_, O> {
    /// Split `group` so that both halves are separable from `ce`.
    ///
    /// Returns `None` if every strategy fails.
    pub fn split(
        &self,
        group: &PointSet,
        polarity: Polarity,
        ce: &Point,
        rng: &mut StdRng,
    ) -> Option<(PointSet, PointSet)> {
        if group.len() < 2 {
            return None;
        }
        let ce_set = PointSet::singleton(ce.clone());
        let valid = |half: &PointSet| apart(self.oracle, polarity, half, &ce_set);
        let accept = |(a, b): (PointSet, PointSet)| {
            (!a.is_empty() && !b.is_empty() && valid(&a) && valid(&b)).then_some((a, b))
        };

        for strategy in self.strategies {
            let found = match strategy {
                SplitStrategy::AxisThreshold => (0..ce.dims())
                    .filter_map(|k| split_by_key(group, ce, |p| p[k]))
                    .find_map(&accept),
                SplitStrategy::PairwiseThreshold => pair_index(ce.dims())
                    .flat_map(|(_, i, j)| {
                        [
                            split_by_key(group, ce, |p| p[i] + p[j]),
                            split_by_key(group, ce, |p| p[i] - p[j]),
                        ]
                    })
                    .flatten()
                    .find_map(&accept),
                SplitStrategy::Incremental => incremental(group, &valid),
                SplitStrategy::RandomHyperplane => (0..self.retries).find_map(|_| {
                    let f = self.oracle.hyperplane_through(ce, group, rng)?;
                    accept(group.partition(|p| f.evaluate(p) > 0.0))
                }),
            };
            if let Some(halves) = found {
                log::trace!(
                    "split group of {} into {} + {} with {:?}",
                    group.len(),
                    halves.0.len(),
                    halves.1.len(),
                    strategy
                );
                return Some(halves);
            }
        }
        None
    }
}

/// Partition by `key(p) < key(ce)`, or `None` if some point ties with `ce`.
fn split_by_key(group: &PointSet, ce: &Point, key: impl Fn(&Point) -> f32) -> Option<(PointSet, PointSet)> {
    let pivot = key(ce);
    if group.iter().any(|p| key(p) == pivot) {
        return None;
    }
    Some(group.partition(|p| key(p) < pivot))
}

/// Move points into a prefix while it stays separable, and accept if the
/// remainder is separable too.
///
/// Separability from a single point is monotone under taking subsets, so the
/// longest separable prefix is found by bisection and gives the remainder its
/// best chance.
fn incremental(group: &PointSet, valid: impl Fn(&PointSet) -> bool) -> Option<(PointSet, PointSet)> {
    let points: Vec<&Point> = group.iter().collect();
    let prefix = |k: usize| points[..k].iter().map(|&p| p.clone()).collect::<PointSet>();

    if !valid(&prefix(1)) {
        return None;
    }
    // prefix(lo) is separable; prefix(hi) is not, or hi == len
    let (mut lo, mut hi) = (1, points.len());
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if valid(&prefix(mid)) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let k = lo.min(points.len() - 1);
    let rest: PointSet = points[k..].iter().map(|&p| p.clone()).collect();
    valid(&rest).then(|| (prefix(k), rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OracleParams;
    use crate::oracle::LinearOracle;
    use rand::SeedableRng;

    fn set(points: &[[f32; 2]]) -> PointSet {
        points.iter().map(|&p| Point::from(p)).collect()
    }

    fn splitter<'a>(oracle: &'a LinearOracle, strategies: &'a [SplitStrategy]) -> Splitter<'a, LinearOracle> {
        Splitter { oracle, strategies, retries: 32 }
    }

    fn check_split(group: &PointSet, halves: &(PointSet, PointSet)) {
        assert!(!halves.0.is_empty() && !halves.1.is_empty());
        assert_eq!(halves.0.len() + halves.1.len(), group.len());
        assert_eq!(&halves.0.union(&halves.1), group);
    }

    #[test]
    fn axis_split_around_interior_point() {
        // negative group around a positive counterexample in its hull
        let oracle = LinearOracle::new(OracleParams::axis_aligned());
        let group = set(&[[0.0, 0.0], [2.0, 0.0], [0.0, 2.0], [2.0, 2.0]]);
        let ce = Point::from([1.0, 1.0]);
        let mut rng = StdRng::seed_from_u64(0);
        let halves = splitter(&oracle, &[SplitStrategy::AxisThreshold])
            .split(&group, Polarity::Negative, &ce, &mut rng)
            .unwrap();
        check_split(&group, &halves);
        assert_eq!(halves.0, set(&[[0.0, 0.0], [0.0, 2.0]]));
    }

    #[test]
    fn axis_split_skips_tied_axes() {
        let oracle = LinearOracle::new(OracleParams::axis_aligned());
        // every point shares x0 with ce, so only axis 1 can be used
        let group = set(&[[1.0, 0.0], [1.0, 3.0]]);
        let ce = Point::from([1.0, 1.0]);
        let mut rng = StdRng::seed_from_u64(0);
        let halves = splitter(&oracle, &[SplitStrategy::AxisThreshold])
            .split(&group, Polarity::Positive, &ce, &mut rng)
            .unwrap();
        assert_eq!(halves.0, set(&[[1.0, 0.0]]));
        assert_eq!(halves.1, set(&[[1.0, 3.0]]));
    }

    #[test]
    fn incremental_split_finds_longest_prefix() {
        let oracle = LinearOracle::new(OracleParams::axis_aligned());
        let group = set(&[[0.0, 0.0], [0.0, 4.0], [4.0, 0.0], [4.0, 4.0]]);
        let ce = Point::from([2.0, 2.0]);
        let mut rng = StdRng::seed_from_u64(0);
        let halves = splitter(&oracle, &[SplitStrategy::Incremental])
            .split(&group, Polarity::Negative, &ce, &mut rng)
            .unwrap();
        check_split(&group, &halves);
        assert_eq!(halves.0, set(&[[0.0, 0.0], [0.0, 4.0]]));
    }

    #[test]
    fn random_hyperplane_split() {
        let oracle = LinearOracle::default();
        let group = set(&[[0.0, 0.0], [2.0, 0.0], [0.0, 2.0], [2.0, 2.0]]);
        let ce = Point::from([1.0, 1.0]);
        let mut rng = StdRng::seed_from_u64(11);
        let halves = splitter(&oracle, &[SplitStrategy::RandomHyperplane])
            .split(&group, Polarity::Negative, &ce, &mut rng)
            .unwrap();
        check_split(&group, &halves);
        let ce_set = PointSet::singleton(ce);
        assert!(oracle.separable(&ce_set, &halves.0));
        assert!(oracle.separable(&ce_set, &halves.1));
    }

    #[test]
    fn singleton_cannot_be_split() {
        let oracle = LinearOracle::default();
        let group = set(&[[0.0, 0.0]]);
        let mut rng = StdRng::seed_from_u64(0);
        let out = splitter(&oracle, &SplitStrategy::ALL).split(&group, Polarity::Negative, &Point::from([1.0, 1.0]), &mut rng);
        assert!(out.is_none());
    }

    #[test]
    fn pairwise_split_falls_back_to_difference() {
        let oracle = LinearOracle::new(OracleParams::axis_aligned());
        let ce = Point::from([1.0, 1.0]);
        let mut rng = StdRng::seed_from_u64(0);
        let pairwise = [SplitStrategy::PairwiseThreshold];

        // sums tie with ce, differences do not
        let group = set(&[[0.0, 2.0], [2.0, 0.0]]);
        let (a, b) = splitter(&oracle, &pairwise)
            .split(&group, Polarity::Negative, &ce, &mut rng)
            .unwrap();
        assert_eq!(a, set(&[[0.0, 2.0]]));
        assert_eq!(b, set(&[[2.0, 0.0]]));

        // some sum and some difference tie
        let group = set(&[[0.0, 2.0], [2.0, 0.0], [3.0, 3.0]]);
        assert!(splitter(&oracle, &pairwise)
            .split(&group, Polarity::Negative, &ce, &mut rng)
            .is_none());
    }
}
