//! Separation and regression oracle.
//!
//! The learner never solves linear programs or regressions itself; it asks
//! a [`SeparationOracle`] for
//!
//! - a predicate separating two point sets ([`separate`](SeparationOracle::separate)),
//! - a least-squares affine fit ([`fit_affine`](SeparationOracle::fit_affine)),
//! - a random hyperplane through a point avoiding a set
//!   ([`hyperplane_through`](SeparationOracle::hyperplane_through)).
//!
//! [`LinearOracle`] is the built-in implementation. Its separator is an
//! ordered list of [`SeparatorKind`] tiers; the first tier that produces a
//! predicate wins.

mod hyperplane;
mod lp;
mod regression;
mod simplex;
mod threshold;

use rand::rngs::StdRng;

use crate::data::{Point, PointSet};
use crate::model::OracleParams;
use crate::repr::{AffineFunction, Predicate};

pub use lp::verify as separates;
pub use simplex::{LinearProgram, SimplexResult, SimplexStats};

// =============================================================================
// Trait
// =============================================================================

/// Geometric queries used by guard synthesis and region learning.
///
/// Implementations must be deterministic for identical inputs (randomized
/// queries draw only from the supplied `rng`).
pub trait SeparationOracle: Send + Sync {
    /// A predicate holding (`>= 0`) on every point of `positive` and failing
    /// (`< 0`) on every point of `negative`, or `None` if none was found.
    fn separate(&self, positive: &PointSet, negative: &PointSet) -> Option<Predicate>;

    /// Least-squares affine fit of `y` on `x` over `n_features` features.
    fn fit_affine(&self, samples: &[(&Point, f32)], n_features: usize) -> Option<AffineFunction>;

    /// An affine function that is zero at `anchor` and non-zero on every
    /// point of `others`.
    fn hyperplane_through(&self, anchor: &Point, others: &PointSet, rng: &mut StdRng) -> Option<AffineFunction>;

    /// Whether [`separate`](Self::separate) would succeed.
    fn separable(&self, positive: &PointSet, negative: &PointSet) -> bool {
        self.separate(positive, negative).is_some()
    }
}

// =============================================================================
// Separator tiers
// =============================================================================

/// Strategy for finding a separating predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeparatorKind {
    /// `x[k] <= t` or `x[k] >= t` for a single axis.
    AxisThreshold,
    /// Threshold on `x[i] + x[j]` or `x[i] - x[j]`.
    PairwiseThreshold,
    /// Maximum-margin linear program over all coordinates.
    LinearProgram,
}

impl SeparatorKind {
    pub const ALL: [SeparatorKind; 3] = [
        SeparatorKind::AxisThreshold,
        SeparatorKind::PairwiseThreshold,
        SeparatorKind::LinearProgram,
    ];
}

// =============================================================================
// LinearOracle
// =============================================================================

/// Built-in oracle: envelope thresholds, simplex LP, Cholesky least squares.
#[derive(Debug, Clone, Default)]
pub struct LinearOracle {
    params: OracleParams,
}

impl LinearOracle {
    pub fn new(params: OracleParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &OracleParams {
        &self.params
    }

    fn lp_settings(&self) -> lp::LpSettings {
        lp::LpSettings {
            max_rounds: self.params.max_lp_rounds,
            batch: self.params.lp_batch,
            max_pivots: self.params.max_pivots,
        }
    }
}

impl SeparationOracle for LinearOracle {
    fn separate(&self, positive: &PointSet, negative: &PointSet) -> Option<Predicate> {
        let d = positive.dims().or(negative.dims())?;
        // one side empty: a constant predicate does it
        let (pos_env, neg_env) = match (positive.envelope(), negative.envelope()) {
            (Some(p), Some(n)) => (p, n),
            (None, _) => return Some(Predicate::always_false(d)),
            (_, None) => return Some(Predicate::always_true(d)),
        };

        for kind in &self.params.separators {
            let found = match kind {
                SeparatorKind::AxisThreshold => threshold::axis_separator(pos_env, neg_env),
                SeparatorKind::PairwiseThreshold => threshold::pairwise_separator(pos_env, neg_env),
                SeparatorKind::LinearProgram => lp::lp_separator(positive, negative, d, &self.lp_settings()),
            };
            if found.is_some() {
                return found;
            }
        }
        None
    }

    fn fit_affine(&self, samples: &[(&Point, f32)], n_features: usize) -> Option<AffineFunction> {
        regression::least_squares(samples, n_features, self.params.ridge)
    }

    fn hyperplane_through(&self, anchor: &Point, others: &PointSet, rng: &mut StdRng) -> Option<AffineFunction> {
        hyperplane::through_point(
            anchor,
            others,
            rng,
            self.params.hyperplane_retries,
            self.params.hyperplane_min_gap,
        )
    }
}
