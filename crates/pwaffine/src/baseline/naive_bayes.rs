//! Gaussian naive Bayes regression baseline.

use ndarray::Array2;

use crate::data::Dataset;
use crate::inference::Predictor;
use crate::repr::NO_REGION_VALUE;
use crate::training::TrainError;

/// Relative variance floor, as a fraction of the largest feature variance.
const VAR_SMOOTHING: f64 = 1e-9;

/// Naive Bayes over the distinct label values.
///
/// Every distinct label `y_c` is a class with prior `P(y_c)` (its relative
/// frequency) and, per feature, a normal distribution `P(x_i | y_c)`.
/// Prediction is the posterior expectation `Σ_c y_c P(y_c | x)`.
///
/// # Example
///
/// ```
/// use pwaffine::baseline::GaussianNaiveBayes;
/// use pwaffine::data::Dataset;
/// use pwaffine::inference::Predictor;
///
/// let data = Dataset::from_rows([
///     (vec![0.0], -1.0), (vec![0.2], -1.0),
///     (vec![5.0], 1.0), (vec![5.2], 1.0),
/// ]).unwrap();
/// let nb = GaussianNaiveBayes::fit(&data).unwrap();
/// assert!(nb.predict_row(&[0.1]) < -0.99);
/// assert!(nb.predict_row(&[5.1]) > 0.99);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianNaiveBayes {
    /// Distinct labels, ascending.
    classes: Vec<f32>,
    priors: Vec<f64>,
    /// `[n_classes, n_features]`
    means: Array2<f64>,
    /// `[n_classes, n_features]`, already smoothed.
    variances: Array2<f64>,
}

impl GaussianNaiveBayes {
    /// Estimate priors and per-class feature distributions.
    ///
    /// # Errors
    ///
    /// [`TrainError::EmptyDataset`] if `data` has no samples.
    pub fn fit(data: &Dataset) -> Result<Self, TrainError> {
        if data.is_empty() {
            return Err(TrainError::EmptyDataset);
        }
        let n_features = data.n_features();

        let mut classes: Vec<f32> = data.labels().collect();
        classes.sort_by(f32::total_cmp);
        classes.dedup();
        let n_classes = classes.len();

        let mut counts = vec![0usize; n_classes];
        let mut sums = Array2::<f64>::zeros((n_classes, n_features));
        let mut sq_sums = Array2::<f64>::zeros((n_classes, n_features));
        for s in data.iter() {
            let Ok(c) = classes.binary_search_by(|y| y.total_cmp(&s.y)) else {
                continue;
            };
            counts[c] += 1;
            for (i, &v) in s.x.iter().enumerate() {
                let v = f64::from(v);
                sums[[c, i]] += v;
                sq_sums[[c, i]] += v * v;
            }
        }

        let mut means = Array2::<f64>::zeros((n_classes, n_features));
        let mut variances = Array2::<f64>::zeros((n_classes, n_features));
        for c in 0..n_classes {
            let n = counts[c] as f64;
            for i in 0..n_features {
                let mean = sums[[c, i]] / n;
                means[[c, i]] = mean;
                variances[[c, i]] = (sq_sums[[c, i]] / n - mean * mean).max(0.0);
            }
        }
        let max_var = variances.iter().copied().fold(0.0f64, f64::max);
        let epsilon = if max_var > 0.0 { VAR_SMOOTHING * max_var } else { VAR_SMOOTHING };
        variances.mapv_inplace(|v| v + epsilon);

        let total = data.len() as f64;
        let priors = counts.iter().map(|&n| n as f64 / total).collect();
        log::debug!("naive bayes: {n_classes} classes over {n_features} features");

        Ok(Self { classes, priors, means, variances })
    }

    /// Assemble from stored parameters. Shapes must agree.
    pub(crate) fn from_parts(
        classes: Vec<f32>,
        priors: Vec<f64>,
        means: Array2<f64>,
        variances: Array2<f64>,
    ) -> Self {
        Self { classes, priors, means, variances }
    }

    pub fn classes(&self) -> &[f32] {
        &self.classes
    }

    pub fn priors(&self) -> &[f64] {
        &self.priors
    }

    pub fn means(&self) -> &Array2<f64> {
        &self.means
    }

    pub fn variances(&self) -> &Array2<f64> {
        &self.variances
    }

    pub fn n_features(&self) -> usize {
        self.means.ncols()
    }

    /// Posterior `P(y_c | x)` for every class, or `None` on a dimension
    /// mismatch.
    pub fn posterior(&self, x: &[f32]) -> Option<Vec<f64>> {
        if x.len() != self.n_features() || self.classes.is_empty() {
            return None;
        }
        let log_joint: Vec<f64> = (0..self.classes.len())
            .map(|c| {
                let log_likelihood: f64 = x
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| {
                        let var = self.variances[[c, i]];
                        let d = f64::from(v) - self.means[[c, i]];
                        -0.5 * (2.0 * std::f64::consts::PI * var).ln() - 0.5 * d * d / var
                    })
                    .sum();
                self.priors[c].ln() + log_likelihood
            })
            .collect();

        let max = log_joint.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = log_joint.iter().map(|&l| (l - max).exp()).collect();
        let norm: f64 = weights.iter().sum();
        Some(weights.into_iter().map(|w| w / norm).collect())
    }
}

impl Predictor for GaussianNaiveBayes {
    fn predict_row(&self, features: &[f32]) -> f32 {
        match self.posterior(features) {
            Some(post) => post
                .iter()
                .zip(&self.classes)
                .map(|(&p, &y)| p * f64::from(y))
                .sum::<f64>() as f32,
            None => NO_REGION_VALUE,
        }
    }
}
