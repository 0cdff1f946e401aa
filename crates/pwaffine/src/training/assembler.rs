//! Assembling a piecewise model from discovered affine pieces.
//!
//! 1. Optionally rescale every feature by `1 / mean(|x_k|)`.
//! 2. Discover affine functions with [`RegionLearner`] until every sample is
//!    covered.
//! 3. Count each function's coverage over the whole dataset.
//! 4. Finalize functions smallest coverage first. A sample is a positive for
//!    the selected function if no other pending function covers it, and a
//!    negative if the selected function misses it but another pending one
//!    covers it. Samples covered by an already finalized function are
//!    skipped.
//! 5. Synthesize a guard per finalized function (in parallel when allowed);
//!    the last function becomes the catch-all.

use std::borrow::Cow;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::guard::{GuardError, GuardSynthesizer, Synthesis};
use super::logger::{TrainingLogger, Verbosity};
use super::region::RegionLearner;
use super::TrainError;
use crate::data::{Dataset, PointSet};
use crate::model::GuardParams;
use crate::oracle::SeparationOracle;
use crate::repr::{AffineFunction, PiecewiseModel, Region};
use crate::utils::Parallelism;

// =============================================================================
// Params
// =============================================================================

/// Parameters of [`ModelAssembler`].
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblerParams {
    /// Residual threshold τ.
    pub threshold: f32,
    /// Rescale features by `1 / mean(|x_k|)` before learning.
    pub normalize: bool,
    pub guard: GuardParams,
    /// Region `k` synthesizes its guard with an RNG seeded by `seed + k`.
    pub seed: u64,
    pub verbosity: Verbosity,
}

impl Default for AssemblerParams {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            normalize: true,
            guard: GuardParams::default(),
            seed: 42,
            verbosity: Verbosity::default(),
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// How a region's guard came about.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    /// Separates all labelled samples.
    Exact,
    /// Split budget reached; `residual` samples are misclassified.
    BestEffort { residual: usize },
    /// Synthesis failed; the region was left out of the model.
    Aborted { reason: String },
    /// Last region, guarded by `true`.
    CatchAll,
}

/// Per-region training statistics, in finalization order.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionReport {
    /// Index of the function in discovery order.
    pub function: usize,
    pub coverage: usize,
    pub positives: usize,
    pub negatives: usize,
    pub splits: usize,
    pub rounds: usize,
    pub outcome: GuardOutcome,
}

/// What happened during training.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrainingReport {
    pub n_samples: usize,
    /// Coverage of each discovered function over the whole dataset.
    pub coverage: Vec<usize>,
    pub regions: Vec<RegionReport>,
    /// Samples no discovered function covers.
    pub uncovered: usize,
}

impl TrainingReport {
    pub fn n_functions(&self) -> usize {
        self.coverage.len()
    }

    pub fn n_aborted(&self) -> usize {
        self.regions
            .iter()
            .filter(|r| matches!(r.outcome, GuardOutcome::Aborted { .. }))
            .count()
    }

    /// Every guard is exact and every sample is covered.
    pub fn is_exact(&self) -> bool {
        self.uncovered == 0
            && self
                .regions
                .iter()
                .all(|r| matches!(r.outcome, GuardOutcome::Exact | GuardOutcome::CatchAll))
    }
}

// =============================================================================
// ModelAssembler
// =============================================================================

/// Labels for one finalized function.
struct GuardJob {
    function: usize,
    pos: PointSet,
    neg: PointSet,
}

pub struct ModelAssembler<'a, O: SeparationOracle + ?Sized> {
    oracle: &'a O,
    params: &'a AssemblerParams,
}

impl<'a, O: SeparationOracle + ?Sized> ModelAssembler<'a, O> {
    pub fn new(oracle: &'a O, params: &'a AssemblerParams) -> Self {
        Self { oracle, params }
    }

    /// Learn a piecewise model of `data`.
    ///
    /// # Errors
    ///
    /// [`TrainError::EmptyDataset`] if `data` has no samples.
    pub fn assemble(
        &self,
        data: &Dataset,
        parallelism: Parallelism,
    ) -> Result<(PiecewiseModel, TrainingReport), TrainError> {
        if data.is_empty() {
            return Err(TrainError::EmptyDataset);
        }
        let n_features = data.n_features();
        let mut logger = TrainingLogger::new(self.params.verbosity);
        logger.start_training(data.len(), n_features);

        let (scale, work) = if self.params.normalize {
            let scale = data.feature_scale();
            let scaled = data.scaled(&scale);
            logger.info(format_args!("feature scale {scale:?}"));
            (scale, Cow::Owned(scaled))
        } else {
            (vec![1.0; n_features], Cow::Borrowed(data))
        };
        let work: &Dataset = &work;

        let learner = RegionLearner::new(self.oracle, self.params.threshold);
        let (functions, uncovered) = self.discover(&learner, work, &logger);
        let covers: Vec<Vec<bool>> = functions
            .iter()
            .map(|f| work.iter().map(|s| learner.covers(f, &s.x, s.y)).collect())
            .collect();
        let coverage: Vec<usize> = covers.iter().map(|c| c.iter().filter(|&&b| b).count()).collect();

        let mut report = TrainingReport {
            n_samples: work.len(),
            coverage: coverage.clone(),
            regions: Vec::with_capacity(functions.len()),
            uncovered,
        };
        let Some(order) = selection_order(&coverage) else {
            logger.finish_training(0);
            return Ok((PiecewiseModel::new(Vec::new(), scale), report));
        };
        let (guarded, last) = order.split_at(order.len() - 1);

        let jobs = label_regions(work, &covers, guarded);
        for (k, job) in jobs.iter().enumerate() {
            logger.log_region(k, job.pos.len(), job.neg.len());
        }

        let synthesizer = GuardSynthesizer::new(self.oracle, &self.params.guard);
        let seed = self.params.seed;
        let outcomes: Vec<Result<Synthesis, GuardError>> =
            parallelism.maybe_par_map(jobs.iter().enumerate().collect::<Vec<_>>(), |(k, job)| {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(k as u64));
                synthesizer.synthesize(&job.pos, &job.neg, n_features, &mut rng)
            });

        let mut regions = Vec::with_capacity(functions.len());
        for (k, (job, outcome)) in jobs.iter().zip(outcomes).enumerate() {
            let mut entry = RegionReport {
                function: job.function,
                coverage: coverage[job.function],
                positives: job.pos.len(),
                negatives: job.neg.len(),
                splits: 0,
                rounds: 0,
                outcome: GuardOutcome::Exact,
            };
            match outcome {
                Ok(synthesis) => {
                    let (clauses, _, terms) = synthesis.guard.complexity();
                    logger.log_guard(k, synthesis.rounds, synthesis.splits, clauses, terms);
                    entry.splits = synthesis.splits;
                    entry.rounds = synthesis.rounds;
                    if !synthesis.is_exact() {
                        logger.warn(format_args!(
                            "region {k}: split budget reached, {} samples misclassified",
                            synthesis.residual
                        ));
                        entry.outcome = GuardOutcome::BestEffort { residual: synthesis.residual };
                    }
                    regions.push(Region::new(functions[job.function].clone(), synthesis.guard));
                }
                Err(err) => {
                    logger.warn(format_args!("region {k} dropped: {err}"));
                    entry.outcome = GuardOutcome::Aborted { reason: err.to_string() };
                }
            }
            report.regions.push(entry);
        }

        let last = last[0];
        regions.push(Region::catch_all(functions[last].clone()));
        report.regions.push(RegionReport {
            function: last,
            coverage: coverage[last],
            positives: 0,
            negatives: 0,
            splits: 0,
            rounds: 0,
            outcome: GuardOutcome::CatchAll,
        });

        logger.finish_training(regions.len());
        Ok((PiecewiseModel::new(regions, scale), report))
    }

    /// Learn functions until every sample is covered or no progress is made.
    ///
    /// Returns the functions in discovery order and the number of samples
    /// left uncovered.
    fn discover(
        &self,
        learner: &RegionLearner<'_, O>,
        data: &Dataset,
        logger: &TrainingLogger,
    ) -> (Vec<AffineFunction>, usize) {
        let mut covered = vec![false; data.len()];
        let mut remaining = data.len();
        let mut functions = Vec::new();

        while remaining > 0 {
            let Some(f) = learner.learn(data, &covered) else {
                logger.warn(format_args!("no function fits the remaining samples, stopping with {remaining} uncovered"));
                break;
            };
            let mut newly = 0;
            for (flag, s) in covered.iter_mut().zip(data.iter()) {
                if !*flag && learner.covers(&f, &s.x, s.y) {
                    *flag = true;
                    newly += 1;
                }
            }
            if newly == 0 {
                logger.warn(format_args!("function {} covers no new samples, stopping with {remaining} uncovered", functions.len()));
                break;
            }
            remaining -= newly;
            logger.log_function(functions.len(), newly, remaining);
            functions.push(f);
        }
        (functions, remaining)
    }
}

/// Function indices ordered smallest coverage first, ties to the lower
/// index. `None` when there are no functions.
fn selection_order(coverage: &[usize]) -> Option<Vec<usize>> {
    if coverage.is_empty() {
        return None;
    }
    let mut order: Vec<usize> = (0..coverage.len()).collect();
    order.sort_by_key(|&k| (coverage[k], k));
    Some(order)
}

/// Positive and negative samples of each function in `order`, finalizing
/// them one after another.
fn label_regions(data: &Dataset, covers: &[Vec<bool>], order: &[usize]) -> Vec<GuardJob> {
    let mut finalized = vec![false; covers.len()];
    let mut jobs = Vec::with_capacity(order.len());

    for &sel in order {
        let mut pos = Vec::new();
        let mut neg = Vec::new();
        for i in 0..data.len() {
            let claimed = (0..covers.len()).any(|k| finalized[k] && covers[k][i]);
            if claimed {
                continue;
            }
            let here = covers[sel][i];
            let elsewhere = (0..covers.len()).any(|k| k != sel && !finalized[k] && covers[k][i]);
            match (here, elsewhere) {
                (true, false) => pos.push(i),
                (false, true) => neg.push(i),
                _ => {}
            }
        }
        finalized[sel] = true;
        jobs.push(GuardJob {
            function: sel,
            pos: data.point_set(pos),
            neg: data.point_set(neg),
        });
    }
    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::LinearOracle;
    use crate::repr::GuardPredicate;
    use crate::testing::{checkerboard, Fault, FaultyOracle};

    #[test]
    fn order_is_smallest_coverage_first() {
        assert_eq!(selection_order(&[5, 3, 3, 9]), Some(vec![1, 2, 0, 3]));
        assert_eq!(selection_order(&[]), None);
    }

    #[test]
    fn labels_skip_finalized_coverage() {
        let data = Dataset::from_rows((0..4).map(|i| (vec![i as f32], 0.0))).unwrap();
        // f0 covers {0, 1}, f1 covers {1, 2}, f2 covers {2, 3}
        let covers = vec![
            vec![true, true, false, false],
            vec![false, true, true, false],
            vec![false, false, true, true],
        ];
        let jobs = label_regions(&data, &covers, &[0, 1]);

        // f0: 0 is only its own, 1 is shared, 2 and 3 belong to others
        assert_eq!(jobs[0].pos, data.point_set([0]));
        assert_eq!(jobs[0].neg, data.point_set([2, 3]));
        // f1: 0 and 1 are claimed by f0, 2 is shared with f2, 3 is f2's
        assert_eq!(jobs[1].pos, PointSet::new());
        assert_eq!(jobs[1].neg, data.point_set([3]));
    }

    #[test]
    fn two_lines_give_two_regions() {
        let data = Dataset::from_rows((0..20).map(|i| {
            let x = i as f32;
            (vec![x], if i < 10 { 2.0 * x } else { 40.0 - x })
        }))
        .unwrap();
        let oracle = LinearOracle::default();
        let params = AssemblerParams { threshold: 0.1, normalize: false, ..Default::default() };
        let (model, report) = ModelAssembler::new(&oracle, &params)
            .assemble(&data, Parallelism::Sequential)
            .unwrap();

        assert_eq!(report.n_functions(), 2);
        assert!(report.is_exact());
        assert_eq!(model.n_regions(), 2);
        for s in data.iter() {
            approx::assert_abs_diff_eq!(model.evaluate(&s.x), s.y, epsilon = 1e-3);
        }
    }

    #[test]
    fn empty_dataset_is_an_error() {
        let oracle = LinearOracle::default();
        let params = AssemblerParams::default();
        let out = ModelAssembler::new(&oracle, &params).assemble(&Dataset::default(), Parallelism::Sequential);
        assert!(matches!(out, Err(TrainError::EmptyDataset)));
    }

    #[test]
    fn failed_guard_drops_the_region() {
        let data = checkerboard(4);
        let oracle = FaultyOracle::new(LinearOracle::default(), Fault::WrongPredicate);
        let params = AssemblerParams { threshold: 0.1, normalize: false, ..Default::default() };
        let (model, report) = ModelAssembler::new(&oracle, &params)
            .assemble(&data, Parallelism::Sequential)
            .unwrap();

        match &report.regions[0].outcome {
            GuardOutcome::Aborted { reason } => assert!(reason.contains("stalled"), "reason: {reason}"),
            other => panic!("expected an aborted region, got {other:?}"),
        }
        assert!(!report.is_exact());
        assert!(matches!(report.regions.last().map(|r| &r.outcome), Some(GuardOutcome::CatchAll)));
        assert_eq!(model.n_regions(), report.regions.len() - report.n_aborted());

        let last = model.regions().last().unwrap();
        assert_eq!(last.guard, GuardPredicate::always_true(2));
    }
}
