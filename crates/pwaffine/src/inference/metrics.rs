//! Evaluation metrics for single-output predictions.

use ndarray::ArrayView1;

/// A metric over predictions and targets of equal length.
pub trait MetricFn: Send + Sync {
    fn compute(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f64;

    fn higher_is_better(&self) -> bool;

    fn name(&self) -> &'static str;
}

// =============================================================================
// RMSE (Root Mean Squared Error)
// =============================================================================

/// Root Mean Squared Error: sqrt(mean((pred - label)²))
///
/// Lower is better.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rmse;

impl MetricFn for Rmse {
    fn compute(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f64 {
        let n = predictions.len();
        if n == 0 {
            return 0.0;
        }
        let sum_sq = predictions
            .iter()
            .zip(targets.iter())
            .fold(0.0f64, |acc, (&p, &l)| {
                let diff = (p as f64) - (l as f64);
                acc + diff * diff
            });
        (sum_sq / n as f64).sqrt()
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "rmse"
    }
}

// =============================================================================
// MAE (Mean Absolute Error)
// =============================================================================

/// Mean Absolute Error: mean(|pred - label|)
#[derive(Debug, Clone, Copy, Default)]
pub struct Mae;

impl MetricFn for Mae {
    fn compute(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f64 {
        let n = predictions.len();
        if n == 0 {
            return 0.0;
        }
        let sum_ae = predictions
            .iter()
            .zip(targets.iter())
            .fold(0.0f64, |acc, (&p, &l)| acc + ((p as f64) - (l as f64)).abs());
        sum_ae / n as f64
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "mae"
    }
}

// =============================================================================
// Precision
// =============================================================================

/// Fraction of predictions within `threshold` of the target:
/// `1 - |{i : |pred_i - y_i| > threshold}| / n`.
///
/// With `±1` labels and a threshold below 1 this is classification accuracy.
#[derive(Debug, Clone, Copy)]
pub struct Precision {
    pub threshold: f32,
}

impl Precision {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }
}

impl MetricFn for Precision {
    fn compute(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f64 {
        let n = predictions.len();
        if n == 0 {
            return 0.0;
        }
        let wrong = predictions
            .iter()
            .zip(targets.iter())
            .filter(|&(&p, &l)| (p - l).abs() > self.threshold)
            .count();
        1.0 - wrong as f64 / n as f64
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "precision"
    }
}
