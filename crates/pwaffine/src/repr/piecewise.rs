//! Ordered list of guarded affine regions.

use super::affine::AffineFunction;
use super::guard::GuardPredicate;

/// Value returned when no region applies or the input has the wrong shape.
pub const NO_REGION_VALUE: f32 = 0.0;

/// One mode of the model: an affine function and the guard selecting it.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub function: AffineFunction,
    pub guard: GuardPredicate,
}

impl Region {
    pub fn new(function: AffineFunction, guard: GuardPredicate) -> Self {
        Self { function, guard }
    }

    /// Region whose guard holds everywhere.
    pub fn catch_all(function: AffineFunction) -> Self {
        let n = function.n_features();
        Self { function, guard: GuardPredicate::always_true(n) }
    }
}

/// Piecewise affine model.
///
/// Inputs are multiplied elementwise by `scale` and then matched against the
/// regions in order; the first region whose guard holds produces the output.
/// Guards and functions live in the scaled feature space. An empty `scale`
/// means identity.
///
/// # Example
///
/// ```
/// use pwaffine::repr::{AffineFunction, PiecewiseModel, Region};
///
/// let model = PiecewiseModel::new(
///     vec![Region::catch_all(AffineFunction::new(vec![2.0, 1.0]))],
///     vec![1.0],
/// );
/// assert_eq!(model.evaluate(&[3.0]), 7.0);
/// // wrong dimensionality falls back to the sentinel
/// assert_eq!(model.evaluate(&[3.0, 1.0]), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PiecewiseModel {
    regions: Vec<Region>,
    scale: Vec<f32>,
}

impl PiecewiseModel {
    pub fn new(regions: Vec<Region>, scale: Vec<f32>) -> Self {
        Self { regions, scale }
    }

    #[inline]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    #[inline]
    pub fn scale(&self) -> &[f32] {
        &self.scale
    }

    #[inline]
    pub fn n_regions(&self) -> usize {
        self.regions.len()
    }

    /// Input dimensionality, taken from the scale vector or the first region.
    pub fn n_features(&self) -> Option<usize> {
        if !self.scale.is_empty() {
            return Some(self.scale.len());
        }
        self.regions.first().map(|r| r.function.n_features())
    }

    /// Map a raw input into the model's feature space.
    pub fn scale_input(&self, x: &[f32]) -> Vec<f32> {
        if self.scale.is_empty() {
            return x.to_vec();
        }
        x.iter().zip(&self.scale).map(|(v, s)| v * s).collect()
    }

    /// Index of the first region whose guard holds at the scaled input.
    pub fn region_index(&self, x: &[f32]) -> Option<usize> {
        if self.n_features() != Some(x.len()) {
            return None;
        }
        let scaled = self.scale_input(x);
        self.regions.iter().position(|r| r.guard.evaluate(&scaled))
    }

    /// Evaluate at a raw input point.
    ///
    /// Returns [`NO_REGION_VALUE`] if no guard holds or `x` has the wrong
    /// number of features.
    pub fn evaluate(&self, x: &[f32]) -> f32 {
        if self.n_features() != Some(x.len()) {
            return NO_REGION_VALUE;
        }
        let scaled = self.scale_input(x);
        self.regions
            .iter()
            .find(|r| r.guard.evaluate(&scaled))
            .map_or(NO_REGION_VALUE, |r| r.function.evaluate(&scaled))
    }
}
