//! Guard synthesis by counterexample-guided refinement.
//!
//! Points that must satisfy the guard and points that must not are kept in
//! *groups*. The candidate guard is a conjunction, over negative groups, of
//! disjunctions, over positive groups, of the oracle's separator for each
//! (positive, negative) pair. Each round evaluates the candidate on all points
//! and repairs the groups with the first misclassified point of each
//! polarity:
//!
//! - opposite groups that cannot be separated from the counterexample are
//!   split (see [`SplitStrategy`]);
//! - the counterexample joins the first own group that remains separable from
//!   every opposite group, or starts a new singleton group.
//!
//! A guard without counterexamples is optionally simplified by merging groups
//! (see [`simplify_groups`]) and returned. Synthesis stops with a best-effort
//! guard once the configured number of splits is reached.

mod simplify;
mod split;

pub use simplify::simplify_groups;
pub use split::SplitStrategy;

use rand::rngs::StdRng;

use crate::data::{Point, PointSet};
use crate::model::GuardParams;
use crate::oracle::SeparationOracle;
use crate::repr::{GuardPredicate, OrClause};

use split::{apart, Polarity, Splitter};

// =============================================================================
// Results
// =============================================================================

/// Outcome of a successful synthesis call.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub guard: GuardPredicate,
    /// Group splits performed.
    pub splits: usize,
    /// Refinement rounds.
    pub rounds: usize,
    /// Training points the guard still misclassifies.
    pub residual: usize,
    pub pos_groups: usize,
    pub neg_groups: usize,
}

impl Synthesis {
    /// No point is misclassified.
    #[inline]
    pub fn is_exact(&self) -> bool {
        self.residual == 0
    }

    fn constant(guard: GuardPredicate) -> Self {
        Self { guard, splits: 0, rounds: 0, residual: 0, pos_groups: 0, neg_groups: 0 }
    }
}

/// Guard synthesis failures.
///
/// Both variants carry the last well-formed candidate (or the always-false
/// guard if there was none) for callers that prefer an approximate guard to
/// none at all.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GuardError {
    #[error("no split strategy could divide a group of {group_size} points (after {splits} splits)")]
    SplitExhausted {
        group_size: usize,
        splits: usize,
        best_effort: GuardPredicate,
    },

    #[error("guard synthesis stalled after {rounds} rounds with {residual} misclassified points")]
    Stalled {
        rounds: usize,
        residual: usize,
        best_effort: GuardPredicate,
    },
}

impl GuardError {
    pub fn best_effort(&self) -> &GuardPredicate {
        match self {
            Self::SplitExhausted { best_effort, .. } | Self::Stalled { best_effort, .. } => best_effort,
        }
    }
}

// =============================================================================
// Candidate construction
// =============================================================================

/// A (positive group, negative group) pair the oracle could not separate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    pub pos: usize,
    pub neg: usize,
}

/// Build the CNF guard `AND_n OR_p separate(p, n)`.
///
/// Fails with the first inseparable pair instead of leaving a term out.
pub fn build_guard<O>(oracle: &O, pos: &[PointSet], neg: &[PointSet]) -> Result<GuardPredicate, Conflict>
where
    O: SeparationOracle + ?Sized,
{
    let clauses = neg
        .iter()
        .enumerate()
        .map(|(j, n)| {
            let terms = pos
                .iter()
                .enumerate()
                .map(|(i, p)| oracle.separate(p, n).ok_or(Conflict { pos: i, neg: j }))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(OrClause::new(terms))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(GuardPredicate::new(clauses))
}

/// Number of points `guard` gets wrong.
pub fn count_misclassified(guard: &GuardPredicate, pos: &PointSet, neg: &PointSet) -> usize {
    pos.iter().filter(|p| !guard.evaluate(p)).count() + neg.iter().filter(|q| guard.evaluate(q)).count()
}

// =============================================================================
// GuardSynthesizer
// =============================================================================

#[derive(Debug, Default)]
struct Groups {
    pos: Vec<PointSet>,
    neg: Vec<PointSet>,
}

impl Groups {
    fn own_mut(&mut self, polarity: Polarity) -> &mut Vec<PointSet> {
        match polarity {
            Polarity::Positive => &mut self.pos,
            Polarity::Negative => &mut self.neg,
        }
    }

    fn sides_mut(&mut self, polarity: Polarity) -> (&mut Vec<PointSet>, &mut Vec<PointSet>) {
        match polarity {
            Polarity::Positive => (&mut self.pos, &mut self.neg),
            Polarity::Negative => (&mut self.neg, &mut self.pos),
        }
    }
}

/// Counterexample-guided guard synthesizer.
pub struct GuardSynthesizer<'a, O: SeparationOracle + ?Sized> {
    oracle: &'a O,
    params: &'a GuardParams,
}

impl<'a, O: SeparationOracle + ?Sized> GuardSynthesizer<'a, O> {
    pub fn new(oracle: &'a O, params: &'a GuardParams) -> Self {
        Self { oracle, params }
    }

    fn splitter(&self) -> Splitter<'_, O> {
        Splitter {
            oracle: self.oracle,
            strategies: &self.params.split_strategies,
            retries: self.params.split_retries,
        }
    }

    /// Synthesize a guard holding on `pos` and failing on `neg`.
    ///
    /// `pos` and `neg` must be disjoint. An empty `pos` yields the
    /// always-false guard and an empty `neg` the always-true guard.
    ///
    /// # Errors
    ///
    /// [`GuardError::SplitExhausted`] if a conflicting group cannot be split
    /// before the split budget is used up, [`GuardError::Stalled`] if a round
    /// leaves the groups unchanged.
    pub fn synthesize(
        &self,
        pos: &PointSet,
        neg: &PointSet,
        n_features: usize,
        rng: &mut StdRng,
    ) -> Result<Synthesis, GuardError> {
        let (Some(p0), Some(n0)) = (pos.first(), neg.first()) else {
            let guard = if pos.is_empty() {
                GuardPredicate::always_false(n_features)
            } else {
                GuardPredicate::always_true(n_features)
            };
            return Ok(Synthesis::constant(guard));
        };

        let mut groups = Groups {
            pos: vec![PointSet::singleton(p0.clone())],
            neg: vec![PointSet::singleton(n0.clone())],
        };
        let mut splits = 0usize;
        let mut rounds = 0usize;
        let mut best: Option<GuardPredicate> = None;

        loop {
            rounds += 1;
            let step = match build_guard(self.oracle, &groups.pos, &groups.neg) {
                Ok(guard) => {
                    let pos_ce = pos.iter().find(|p| !guard.evaluate(p)).cloned();
                    let neg_ce = neg.iter().find(|q| guard.evaluate(q)).cloned();
                    if pos_ce.is_none() && neg_ce.is_none() {
                        log::debug!("exact guard after {rounds} rounds, {splits} splits");
                        return Ok(self.finish(guard, groups, pos, neg, splits, rounds));
                    }
                    if splits >= self.params.max_splits {
                        log::debug!("split budget {} reached after {rounds} rounds", self.params.max_splits);
                        return Ok(self.finish(guard, groups, pos, neg, splits, rounds));
                    }
                    log::trace!(
                        "round {rounds}: {} + {} groups, counterexamples {:?} / {:?}",
                        groups.pos.len(),
                        groups.neg.len(),
                        pos_ce.as_deref(),
                        neg_ce.as_deref()
                    );
                    best = Some(guard);

                    let mut step = Ok(false);
                    for (ce, polarity) in [(pos_ce, Polarity::Positive), (neg_ce, Polarity::Negative)] {
                        let Some(ce) = ce else { continue };
                        match self.absorb(&mut groups, ce, polarity, &mut splits, rng) {
                            Ok(changed) => step = step.map(|any| any || changed),
                            Err(size) => {
                                step = Err(size);
                                break;
                            }
                        }
                    }
                    step
                }
                Err(conflict) if splits >= self.params.max_splits => {
                    log::debug!("split budget reached with groups {conflict:?} inseparable");
                    return Ok(self.best_effort(best, &groups, pos, neg, splits, rounds));
                }
                Err(conflict) => {
                    log::trace!("round {rounds}: groups {conflict:?} are inseparable");
                    self.repair(&mut groups, conflict, &mut splits, rng).map(|()| true)
                }
            };

            match step {
                Ok(true) => {}
                Ok(false) => {
                    let guard = best.unwrap_or_else(|| GuardPredicate::always_false(n_features));
                    let residual = count_misclassified(&guard, pos, neg);
                    return Err(GuardError::Stalled { rounds, residual, best_effort: guard });
                }
                Err(_) if splits >= self.params.max_splits => {
                    return Ok(self.best_effort(best, &groups, pos, neg, splits, rounds));
                }
                Err(group_size) => {
                    log::debug!("split exhausted on a group of {group_size} after {splits} splits");
                    return Err(GuardError::SplitExhausted {
                        group_size,
                        splits,
                        best_effort: best.unwrap_or_else(|| GuardPredicate::always_false(n_features)),
                    });
                }
            }
        }
    }

    /// Make room for `ce` among the opposite groups and add it to its own side.
    ///
    /// Returns whether the groups changed, or the size of the group that
    /// could not be split.
    fn absorb(
        &self,
        groups: &mut Groups,
        ce: Point,
        polarity: Polarity,
        splits: &mut usize,
        rng: &mut StdRng,
    ) -> Result<bool, usize> {
        let before = *splits;
        self.split_conflicting(groups, &ce, polarity, splits, rng)?;

        let (own, opposite) = groups.sides_mut(polarity);
        // only a separator that misclassifies its own group gets here
        if own.iter().any(|g| g.contains(&ce)) {
            return Ok(*splits > before);
        }
        let opposite: &[PointSet] = opposite;
        for group in own.iter_mut() {
            let joined = group.insert_if(ce.clone(), |g| {
                opposite.iter().all(|o| apart(self.oracle, polarity, g, o))
            });
            if joined {
                return Ok(true);
            }
        }
        own.push(PointSet::singleton(ce));
        Ok(true)
    }

    /// Split every opposite group that conflicts with `ce`.
    fn split_conflicting(
        &self,
        groups: &mut Groups,
        ce: &Point,
        polarity: Polarity,
        splits: &mut usize,
        rng: &mut StdRng,
    ) -> Result<(), usize> {
        let ce_set = PointSet::singleton(ce.clone());
        let splitter = self.splitter();
        let opposite = groups.own_mut(polarity.opposite());

        let mut remaining = std::mem::take(opposite).into_iter();
        let mut next = Vec::with_capacity(remaining.len() + 1);
        while let Some(group) = remaining.next() {
            if apart(self.oracle, polarity, &ce_set, &group) {
                next.push(group);
                continue;
            }
            let Some((a, b)) = splitter.split(&group, polarity.opposite(), ce, rng) else {
                let size = group.len();
                next.push(group);
                next.extend(remaining.by_ref());
                *opposite = next;
                return Err(size);
            };
            *splits += 1;
            next.push(a);
            next.push(b);
        }
        *opposite = next;
        Ok(())
    }

    /// Resolve an inseparable pair of groups.
    ///
    /// A member of one group that on its own cannot be separated from the
    /// other group is treated as a counterexample against it. If every member
    /// is separable individually, the positive group is halved.
    fn repair(&self, groups: &mut Groups, conflict: Conflict, splits: &mut usize, rng: &mut StdRng) -> Result<(), usize> {
        let p = &groups.pos[conflict.pos];
        let n = &groups.neg[conflict.neg];

        let pos_witness = p
            .iter()
            .find(|x| !self.oracle.separable(&PointSet::singleton((*x).clone()), n))
            .cloned();
        if let Some(ce) = pos_witness {
            return self.split_conflicting(groups, &ce, Polarity::Positive, splits, rng);
        }
        let neg_witness = n
            .iter()
            .find(|x| !self.oracle.separable(p, &PointSet::singleton((*x).clone())))
            .cloned();
        if let Some(ce) = neg_witness {
            return self.split_conflicting(groups, &ce, Polarity::Negative, splits, rng);
        }

        let group = &groups.pos[conflict.pos];
        if group.len() < 2 {
            return Err(group.len());
        }
        let half = group.len() / 2;
        let mut taken = 0;
        let (a, b) = group.partition(|_| {
            taken += 1;
            taken <= half
        });
        groups.pos[conflict.pos] = a;
        groups.pos.insert(conflict.pos + 1, b);
        *splits += 1;
        Ok(())
    }

    /// Best candidate so far, for when the split budget runs out mid-repair.
    fn best_effort(
        &self,
        best: Option<GuardPredicate>,
        groups: &Groups,
        pos: &PointSet,
        neg: &PointSet,
        splits: usize,
        rounds: usize,
    ) -> Synthesis {
        let n_features = pos.dims().or(neg.dims()).unwrap_or_default();
        let guard = best.unwrap_or_else(|| GuardPredicate::always_false(n_features));
        let residual = count_misclassified(&guard, pos, neg);
        Synthesis {
            guard,
            splits,
            rounds,
            residual,
            pos_groups: groups.pos.len(),
            neg_groups: groups.neg.len(),
        }
    }

    /// Simplify if enabled and count what the final guard gets wrong.
    fn finish(
        &self,
        guard: GuardPredicate,
        groups: Groups,
        pos: &PointSet,
        neg: &PointSet,
        splits: usize,
        rounds: usize,
    ) -> Synthesis {
        let residual = count_misclassified(&guard, pos, neg);
        let mut out = Synthesis {
            guard,
            splits,
            rounds,
            residual,
            pos_groups: groups.pos.len(),
            neg_groups: groups.neg.len(),
        };
        if !self.params.simplify {
            return out;
        }

        let (sp, sn) = simplify_groups(self.oracle, &groups.pos, &groups.neg);
        if sp.len() == groups.pos.len() && sn.len() == groups.neg.len() {
            return out;
        }
        if let Ok(simplified) = build_guard(self.oracle, &sp, &sn) {
            let residual = count_misclassified(&simplified, pos, neg);
            if residual <= out.residual {
                log::trace!(
                    "simplified {} + {} groups to {} + {}",
                    out.pos_groups,
                    out.neg_groups,
                    sp.len(),
                    sn.len()
                );
                out.guard = simplified;
                out.residual = residual;
                out.pos_groups = sp.len();
                out.neg_groups = sn.len();
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OracleParams;
    use crate::oracle::LinearOracle;
    use crate::testing::{Fault, FaultyOracle};
    use rand::SeedableRng;

    fn set(points: &[[f32; 2]]) -> PointSet {
        points.iter().map(|&p| Point::from(p)).collect()
    }

    fn synthesize(oracle: &LinearOracle, params: &GuardParams, pos: &PointSet, neg: &PointSet) -> Synthesis {
        let mut rng = StdRng::seed_from_u64(42);
        GuardSynthesizer::new(oracle, params)
            .synthesize(pos, neg, 2, &mut rng)
            .unwrap()
    }

    fn assert_exact(guard: &GuardPredicate, pos: &PointSet, neg: &PointSet) {
        assert!(pos.iter().all(|p| guard.evaluate(p)), "positive rejected by {guard}");
        assert!(neg.iter().all(|q| !guard.evaluate(q)), "negative accepted by {guard}");
    }

    #[test]
    fn degenerate_inputs() {
        let oracle = LinearOracle::default();
        let params = GuardParams::default();
        let pts = set(&[[1.0, 2.0]]);

        let s = synthesize(&oracle, &params, &PointSet::new(), &pts);
        assert_eq!(s.guard, GuardPredicate::always_false(2));
        let s = synthesize(&oracle, &params, &pts, &PointSet::new());
        assert_eq!(s.guard, GuardPredicate::always_true(2));
    }

    #[test]
    fn separable_sets_need_one_clause() {
        let oracle = LinearOracle::default();
        let pos = set(&[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        let neg = set(&[[3.0, 3.0], [4.0, 3.0]]);
        let s = synthesize(&oracle, &GuardParams::default(), &pos, &neg);
        assert!(s.is_exact());
        assert_eq!(s.splits, 0);
        assert_eq!(s.guard.complexity(), (1, 1, 1));
        assert_exact(&s.guard, &pos, &neg);
    }

    #[test]
    fn xor_needs_multiple_groups() {
        let oracle = LinearOracle::new(OracleParams::axis_aligned());
        let pos = set(&[[0.0, 0.0], [2.0, 2.0]]);
        let neg = set(&[[0.0, 2.0], [2.0, 0.0]]);
        let s = synthesize(&oracle, &GuardParams::default(), &pos, &neg);
        assert!(s.is_exact());
        assert_exact(&s.guard, &pos, &neg);
        assert_eq!((s.pos_groups, s.neg_groups), (2, 2));
    }

    #[test]
    fn ring_around_a_point_forces_splits() {
        let oracle = LinearOracle::default();
        let pos = set(&[[0.0, 0.0], [2.0, 0.0], [0.0, 2.0], [2.0, 2.0], [1.0, 3.0]]);
        let neg = set(&[[1.0, 1.0]]);
        let s = synthesize(&oracle, &GuardParams::default(), &pos, &neg);
        assert!(s.is_exact());
        assert_exact(&s.guard, &pos, &neg);
        assert!(s.pos_groups >= 2);
    }

    #[test]
    fn zero_budget_returns_best_effort() {
        let oracle = LinearOracle::new(OracleParams::axis_aligned());
        let pos = set(&[[0.0, 0.0], [2.0, 0.0], [0.0, 2.0], [2.0, 2.0]]);
        let neg = set(&[[1.0, 1.0], [3.0, 3.0]]);
        let params = GuardParams::default().with_max_splits(0);
        let s = synthesize(&oracle, &params, &pos, &neg);
        assert_eq!(s.splits, 0);
        assert!(!s.is_exact());
        assert_eq!(s.residual, count_misclassified(&s.guard, &pos, &neg));
    }

    #[test]
    fn build_guard_reports_conflict() {
        let oracle = LinearOracle::default();
        let pos = vec![set(&[[0.0, 0.0]]), set(&[[0.0, 0.0], [2.0, 2.0]])];
        let neg = vec![set(&[[5.0, 5.0]]), set(&[[1.0, 1.0]])];
        assert_eq!(build_guard(&oracle, &pos, &neg), Err(Conflict { pos: 1, neg: 1 }));
    }

    #[test]
    fn deterministic_for_a_seed() {
        let oracle = LinearOracle::default();
        let params = GuardParams::default();
        let pos = set(&[[0.0, 0.0], [2.0, 0.0], [0.0, 2.0], [2.0, 2.0]]);
        let neg = set(&[[1.0, 1.0], [5.0, 5.0]]);
        let a = synthesize(&oracle, &params, &pos, &neg);
        let b = synthesize(&oracle, &params, &pos, &neg);
        assert_eq!(a, b);
    }

    fn grid(x0: f32, width: usize, height: usize) -> PointSet {
        (0..width)
            .flat_map(|i| (0..height).map(move |j| Point::from([x0 + i as f32, j as f32])))
            .collect()
    }

    #[test]
    fn refused_separations_are_repaired() {
        let pos = grid(0.0, 4, 3);
        let neg = grid(8.0, 4, 3);
        let params = GuardParams::default();

        let plain = synthesize(&LinearOracle::default(), &params, &pos, &neg);
        assert_eq!(plain.splits, 0);

        let oracle = FaultyOracle::new(LinearOracle::default(), Fault::RefuseEvery { n: 2, limit: 3 });
        let mut rng = StdRng::seed_from_u64(42);
        let s = GuardSynthesizer::new(&oracle, &params)
            .synthesize(&pos, &neg, 2, &mut rng)
            .unwrap();

        // two of the three refusals hit a two-point group while building
        // the candidate, and each is repaired by halving it
        assert_eq!(oracle.refused(), 3);
        assert!(s.is_exact());
        assert_eq!(s.splits, 2);
        assert_exact(&s.guard, &pos, &neg);
    }

    #[test]
    fn unsplittable_group_exhausts_strategies() {
        // every point of the negative group shares an axis value with (1, 1)
        let oracle = FaultyOracle::new(LinearOracle::new(OracleParams::axis_aligned()), Fault::NoHyperplanes);
        let params = GuardParams {
            split_strategies: vec![SplitStrategy::AxisThreshold, SplitStrategy::RandomHyperplane],
            ..GuardParams::default()
        };
        let pos = set(&[[1.0, -10.0], [1.0, 1.0]]);
        let neg = set(&[[0.0, 1.0], [1.0, 0.0]]);
        let mut rng = StdRng::seed_from_u64(42);

        let err = GuardSynthesizer::new(&oracle, &params)
            .synthesize(&pos, &neg, 2, &mut rng)
            .unwrap_err();

        assert!(
            matches!(err, GuardError::SplitExhausted { group_size: 2, splits: 0, .. }),
            "got: {err:?}"
        );
        let guard = err.best_effort();
        assert_eq!(guard.n_features(), Some(2));
        assert!(guard.evaluate(&[1.0, -10.0]));
        assert!(neg.iter().all(|q| !guard.evaluate(q)));
        assert_eq!(count_misclassified(guard, &pos, &neg), 1);
    }

    #[test]
    fn unchanged_groups_stall() {
        let oracle = FaultyOracle::new(LinearOracle::default(), Fault::WrongPredicate);
        let pos = set(&[[0.0, 0.0], [9.0, 0.0]]);
        let neg = set(&[[5.0, 5.0]]);
        let mut rng = StdRng::seed_from_u64(42);

        let err = GuardSynthesizer::new(&oracle, &GuardParams::default())
            .synthesize(&pos, &neg, 2, &mut rng)
            .unwrap_err();

        match &err {
            GuardError::Stalled { rounds, residual, best_effort } => {
                assert_eq!(*rounds, 2);
                assert_eq!(*residual, 2);
                assert_eq!(best_effort, &GuardPredicate::always_false(2));
            }
            other => panic!("expected a stall, got {other:?}"),
        }
        assert!(err.to_string().contains("stalled"));
    }
}
