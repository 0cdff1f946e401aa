//! Prediction and evaluation.
//!
//! - [`Predictor`]: anything that maps a feature row to a scalar, with
//!   default batch methods that respect [`Parallelism`]
//! - [`infer`]: predict a labelled dataset and summarize the errors in an
//!   [`InferenceReport`]
//! - [`metrics`]: RMSE, MAE and threshold precision
//!
//! # Example
//!
//! ```
//! use pwaffine::data::Dataset;
//! use pwaffine::inference::infer;
//! use pwaffine::repr::{AffineFunction, PiecewiseModel, Region};
//! use pwaffine::Parallelism;
//!
//! // f(x) = 2*x0 + 1 everywhere
//! let model = PiecewiseModel::new(vec![Region::catch_all(AffineFunction::new(vec![2.0, 1.0]))], vec![]);
//! let data = Dataset::from_rows([(vec![3.0], 7.0)]).unwrap();
//!
//! let report = infer(&model, &data, Some(0.5), Parallelism::Sequential);
//! assert_eq!(report.rmse, 0.0);
//! assert_eq!(report.precision, Some(1.0));
//! ```

pub mod metrics;

use std::fmt;

use ndarray::{Array1, ArrayView2};

use crate::data::Dataset;
use crate::repr::PiecewiseModel;
use crate::utils::Parallelism;

pub use metrics::{Mae, MetricFn, Precision, Rmse};

// =============================================================================
// Predictor
// =============================================================================

/// A model that predicts one scalar per feature row.
pub trait Predictor: Sync {
    /// Predict a single row of raw (unscaled) features.
    fn predict_row(&self, features: &[f32]) -> f32;

    /// Predict every row of a `[n_samples, n_features]` matrix.
    fn predict_batch(&self, features: ArrayView2<f32>, parallelism: Parallelism) -> Array1<f32> {
        let preds = parallelism.maybe_par_map(0..features.nrows(), |i| {
            let row = features.row(i);
            match row.as_slice() {
                Some(slice) => self.predict_row(slice),
                None => self.predict_row(&row.to_vec()),
            }
        });
        Array1::from_vec(preds)
    }

    /// Predict every sample of a dataset, in dataset order.
    fn predict_dataset(&self, data: &Dataset, parallelism: Parallelism) -> Vec<f32> {
        parallelism.maybe_par_map(data.samples(), |s| self.predict_row(&s.x))
    }
}

impl Predictor for PiecewiseModel {
    #[inline]
    fn predict_row(&self, features: &[f32]) -> f32 {
        self.evaluate(features)
    }
}

// =============================================================================
// Inference report
// =============================================================================

/// Expected and predicted value of one test sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub expected: f32,
    pub predicted: f32,
}

/// Result of [`infer`].
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceReport {
    /// One entry per sample, in dataset order.
    pub predictions: Vec<Prediction>,
    pub rmse: f64,
    pub mae: f64,
    /// Present when a threshold was supplied.
    pub precision: Option<f64>,
    pub threshold: Option<f32>,
}

impl InferenceReport {
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }
}

impl fmt::Display for InferenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for p in &self.predictions {
            writeln!(f, "Expected: {}, Inferred: {}", p.expected, p.predicted)?;
        }
        writeln!(f, "RMSE: {}", self.rmse)?;
        writeln!(f, "MAE: {}", self.mae)?;
        if let (Some(precision), Some(threshold)) = (self.precision, self.threshold) {
            writeln!(f, "Precision (threshold {threshold}): {precision}")?;
        }
        Ok(())
    }
}

/// Predict every sample of `data` and compare against its label.
///
/// Precision is computed only when `threshold` is given; a prediction
/// within `threshold` of its label counts as correct.
pub fn infer<P: Predictor + ?Sized>(
    predictor: &P,
    data: &Dataset,
    threshold: Option<f32>,
    parallelism: Parallelism,
) -> InferenceReport {
    let predicted = Array1::from_vec(predictor.predict_dataset(data, parallelism));
    let expected: Array1<f32> = data.labels().collect();

    let rmse = Rmse.compute(predicted.view(), expected.view());
    let mae = Mae.compute(predicted.view(), expected.view());
    let precision = threshold.map(|t| Precision::new(t).compute(predicted.view(), expected.view()));
    log::debug!("inferred {} samples: rmse {rmse}, mae {mae}", data.len());

    InferenceReport {
        predictions: expected
            .iter()
            .zip(predicted.iter())
            .map(|(&expected, &predicted)| Prediction { expected, predicted })
            .collect(),
        rmse,
        mae,
        precision,
        threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::{AffineFunction, GuardPredicate, OrClause, Predicate, Region};
    use ndarray::array;

    fn step_model() -> PiecewiseModel {
        // x0 <= 0 → -1, otherwise 1
        let left = Region::new(
            AffineFunction::constant(1, -1.0),
            GuardPredicate::new(vec![OrClause::single(Predicate::at_most(1, 0, 0.0))]),
        );
        PiecewiseModel::new(vec![left, Region::catch_all(AffineFunction::constant(1, 1.0))], vec![])
    }

    #[test]
    fn batch_matches_rows() {
        let model = step_model();
        let features = array![[-2.0f32], [0.0], [3.0]];
        for par in [Parallelism::Sequential, Parallelism::Parallel] {
            let preds = model.predict_batch(features.view(), par);
            assert_eq!(preds.to_vec(), vec![-1.0, -1.0, 1.0]);
        }
    }

    #[test]
    fn batch_handles_non_contiguous_rows() {
        let model = step_model();
        let features = array![[-2.0f32, 5.0], [3.0, 5.0]];
        let column_major = features.t().to_owned();
        let view = column_major.t();
        assert!(view.row(0).as_slice().is_none());
        let preds = model.predict_batch(view.slice(ndarray::s![.., 0..1]), Parallelism::Sequential);
        assert_eq!(preds.to_vec(), vec![-1.0, 1.0]);
    }

    #[test]
    fn report_counts_errors() {
        let model = step_model();
        let data = Dataset::from_rows([(vec![-1.0], -1.0), (vec![1.0], 1.0), (vec![2.0], -1.0)]).unwrap();
        let report = infer(&model, &data, Some(0.1), Parallelism::Sequential);
        assert_eq!(report.len(), 3);
        approx::assert_abs_diff_eq!(report.precision.unwrap(), 2.0 / 3.0, epsilon = 1e-12);
        approx::assert_abs_diff_eq!(report.rmse, (4.0f64 / 3.0).sqrt(), epsilon = 1e-9);

        let text = report.to_string();
        assert!(text.starts_with("Expected: -1, Inferred: -1\n"));
        assert!(text.contains("Precision (threshold 0.1)"));
    }

    #[test]
    fn no_threshold_no_precision() {
        let model = step_model();
        let data = Dataset::from_rows([(vec![1.0], 1.0)]).unwrap();
        let report = infer(&model, &data, None, Parallelism::Sequential);
        assert_eq!(report.precision, None);
        assert!(!report.to_string().contains("Precision"));
    }
}
