//! Nested parameter groups for [`PwaConfig`](super::PwaConfig).
//!
//! - [`GuardParams`]: counterexample-guided guard synthesis (split cap,
//!   split strategies, simplification)
//! - [`OracleParams`]: separator tiers and numeric limits of the built-in
//!   [`LinearOracle`](crate::oracle::LinearOracle)
//!
//! Each group has sensible defaults and a `validate` method.

use crate::oracle::SeparatorKind;
use crate::training::SplitStrategy;

// =============================================================================
// GuardParams
// =============================================================================

/// Guard synthesis parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct GuardParams {
    /// Number of group splits after which synthesis stops and returns the
    /// current guard as a best effort.
    pub max_splits: usize,
    /// Split strategies, tried in order.
    pub split_strategies: Vec<SplitStrategy>,
    /// Attempts of the random-hyperplane split before it gives up.
    pub split_retries: usize,
    /// Merge compatible groups once synthesis has finished.
    pub simplify: bool,
}

impl Default for GuardParams {
    fn default() -> Self {
        Self {
            max_splits: 100,
            split_strategies: SplitStrategy::ALL.to_vec(),
            split_retries: 32,
            simplify: true,
        }
    }
}

impl GuardParams {
    /// Set the split cap.
    pub fn with_max_splits(mut self, max_splits: usize) -> Self {
        self.max_splits = max_splits;
        self
    }

    /// Validate parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if no split strategy is configured or a retry count is zero.
    pub fn validate(&self) -> Result<(), ParamValidationError> {
        if self.split_strategies.is_empty() {
            return Err(ParamValidationError::NoSplitStrategies);
        }
        if self.split_retries == 0
            && self.split_strategies.contains(&SplitStrategy::RandomHyperplane)
        {
            return Err(ParamValidationError::ZeroRetries("split_retries"));
        }
        Ok(())
    }
}

// =============================================================================
// OracleParams
// =============================================================================

/// Parameters of the built-in separation oracle.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleParams {
    /// Separator tiers, tried in order.
    pub separators: Vec<SeparatorKind>,
    /// Constraint-generation rounds of the LP separator.
    pub max_lp_rounds: usize,
    /// Violated points added to the LP per round.
    pub lp_batch: usize,
    /// Simplex pivot limit per LP solve.
    pub max_pivots: usize,
    /// Draws of a random hyperplane through a point.
    pub hyperplane_retries: usize,
    /// Minimum `|f(p)|` a random hyperplane must keep from the other points.
    pub hyperplane_min_gap: f32,
    /// Initial ridge term when the least-squares system is singular.
    pub ridge: f64,
}

impl Default for OracleParams {
    fn default() -> Self {
        Self {
            separators: SeparatorKind::ALL.to_vec(),
            max_lp_rounds: 64,
            lp_batch: 16,
            max_pivots: 20_000,
            hyperplane_retries: 64,
            hyperplane_min_gap: 1e-6,
            ridge: 1e-9,
        }
    }
}

impl OracleParams {
    /// Only single-axis thresholds: guards become CNFs of `x[k] <= t` /
    /// `x[k] >= t` literals.
    pub fn axis_aligned() -> Self {
        Self {
            separators: vec![SeparatorKind::AxisThreshold],
            ..Self::default()
        }
    }

    /// Replace the separator tiers.
    pub fn with_separators(mut self, separators: impl Into<Vec<SeparatorKind>>) -> Self {
        self.separators = separators.into();
        self
    }

    /// Validate parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if no separator is configured or a limit is out of range.
    pub fn validate(&self) -> Result<(), ParamValidationError> {
        if self.separators.is_empty() {
            return Err(ParamValidationError::NoSeparators);
        }
        if self.separators.contains(&SeparatorKind::LinearProgram) {
            if self.max_lp_rounds == 0 {
                return Err(ParamValidationError::ZeroRetries("max_lp_rounds"));
            }
            if self.lp_batch == 0 {
                return Err(ParamValidationError::ZeroRetries("lp_batch"));
            }
            if self.max_pivots == 0 {
                return Err(ParamValidationError::ZeroRetries("max_pivots"));
            }
        }
        if self.hyperplane_retries == 0 {
            return Err(ParamValidationError::ZeroRetries("hyperplane_retries"));
        }
        if !(self.hyperplane_min_gap.is_finite() && self.hyperplane_min_gap > 0.0) {
            return Err(ParamValidationError::InvalidMinGap(self.hyperplane_min_gap));
        }
        if !(self.ridge.is_finite() && self.ridge > 0.0) {
            return Err(ParamValidationError::InvalidRidge(self.ridge));
        }
        Ok(())
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Parameter validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamValidationError {
    /// At least one separator tier is required.
    #[error("separators must not be empty")]
    NoSeparators,

    /// At least one split strategy is required.
    #[error("split_strategies must not be empty")]
    NoSplitStrategies,

    /// A retry or round limit must be positive.
    #[error("{0} must be > 0")]
    ZeroRetries(&'static str),

    /// hyperplane_min_gap must be finite and > 0.
    #[error("hyperplane_min_gap must be finite and > 0, got {0}")]
    InvalidMinGap(f32),

    /// ridge must be finite and > 0.
    #[error("ridge must be finite and > 0, got {0}")]
    InvalidRidge(f64),
}
