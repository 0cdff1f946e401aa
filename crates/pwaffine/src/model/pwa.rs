//! Piecewise affine model implementation.
//!
//! High-level wrapper around [`PiecewiseModel`] with training and prediction.
//! Access components via [`model()`](PwaModel::model), [`meta()`](PwaModel::meta),
//! and [`config()`](PwaModel::config).

use ndarray::{Array1, ArrayView2};

use crate::data::Dataset;
use crate::inference::Predictor;
use crate::model::meta::ModelMeta;
use crate::oracle::LinearOracle;
use crate::repr::{PiecewiseModel, RawModelDisplay};
use crate::training::{ModelAssembler, TrainError, TrainingReport};
use crate::utils::{run_with_threads, Parallelism};

use super::summary::ModelSummary;
use super::PwaConfig;

/// High-level piecewise affine model with training and prediction.
///
/// # Example
///
/// ```
/// use pwaffine::data::Dataset;
/// use pwaffine::model::{PwaConfig, PwaModel};
///
/// // y = 2x on [0, 9], y = 40 - x on [10, 19]
/// let data = Dataset::from_rows((0..20).map(|i| {
///     let x = i as f32;
///     (vec![x], if i < 10 { 2.0 * x } else { 40.0 - x })
/// }))
/// .unwrap();
///
/// let config = PwaConfig::builder().threshold(0.1).build().unwrap();
/// let model = PwaModel::train(&data, config).unwrap();
/// assert_eq!(model.model().n_regions(), 2);
/// assert!((model.evaluate(&[4.0]) - 8.0).abs() < 0.1);
/// ```
#[derive(Clone)]
pub struct PwaModel {
    model: PiecewiseModel,
    meta: ModelMeta,
    /// Default for models loaded from disk.
    config: PwaConfig,
}

impl PwaModel {
    /// Wrap an existing model. The configuration is the default one.
    pub fn from_model(model: PiecewiseModel, meta: ModelMeta) -> Self {
        Self { model, meta, config: PwaConfig::default() }
    }

    pub fn from_parts(model: PiecewiseModel, meta: ModelMeta, config: PwaConfig) -> Self {
        Self { model, meta, config }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn model(&self) -> &PiecewiseModel {
        &self.model
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    /// Training configuration.
    pub fn config(&self) -> &PwaConfig {
        &self.config
    }

    pub fn into_model(self) -> PiecewiseModel {
        self.model
    }

    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.meta.feature_names = Some(names);
        self
    }

    // =========================================================================
    // Training
    // =========================================================================

    /// Train a model on `data`.
    ///
    /// # Errors
    ///
    /// [`TrainError::Config`] for an invalid configuration,
    /// [`TrainError::EmptyDataset`] if `data` has no samples.
    pub fn train(data: &Dataset, config: PwaConfig) -> Result<Self, TrainError> {
        Self::train_with_report(data, config).map(|(model, _)| model)
    }

    /// Like [`train`](Self::train), also returning what happened per region.
    pub fn train_with_report(
        data: &Dataset,
        config: PwaConfig,
    ) -> Result<(Self, TrainingReport), TrainError> {
        config.validate()?;
        run_with_threads(config.thread_count(), |parallelism| {
            Self::train_inner(data, config, parallelism)
        })
    }

    /// Training without thread pool management.
    fn train_inner(
        data: &Dataset,
        config: PwaConfig,
        parallelism: Parallelism,
    ) -> Result<(Self, TrainingReport), TrainError> {
        let oracle = LinearOracle::new(config.oracle.clone());
        let params = config.to_assembler_params();
        let (model, report) = ModelAssembler::new(&oracle, &params).assemble(data, parallelism)?;

        let meta = ModelMeta::new(data.n_features())
            .with_threshold(config.threshold)
            .with_n_samples(data.len())
            .with_n_functions(report.n_functions());

        Ok((Self { model, meta, config }, report))
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Evaluate at one raw input point.
    pub fn evaluate(&self, x: &[f32]) -> f32 {
        self.model.evaluate(x)
    }

    /// Predict every row of a `[n_samples, n_features]` matrix.
    ///
    /// * `n_threads` - Thread count: 0 = auto, 1 = sequential, >1 = exact count
    pub fn predict(&self, features: ArrayView2<f32>, n_threads: usize) -> Array1<f32> {
        if features.nrows() == 0 {
            return Array1::zeros(0);
        }
        run_with_threads(n_threads, |parallelism| self.model.predict_batch(features, parallelism))
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    pub fn summary(&self) -> ModelSummary {
        ModelSummary::of(&self.model)
    }

    /// Printable form with coefficients in raw feature units.
    pub fn display_raw(&self) -> RawModelDisplay<'_> {
        self.model.display_raw()
    }
}

impl Predictor for PwaModel {
    #[inline]
    fn predict_row(&self, features: &[f32]) -> f32 {
        self.model.evaluate(features)
    }
}

impl std::fmt::Debug for PwaModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PwaModel")
            .field("n_regions", &self.model.n_regions())
            .field("n_features", &self.meta.n_features)
            .field("threshold", &self.meta.threshold)
            .finish()
    }
}
