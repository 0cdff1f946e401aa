//! Model metadata.
//!
//! Training context stored next to a model, persisted under the optional
//! `meta` key of the model file.

use serde::{Deserialize, Serialize};

/// Metadata about how a model was trained.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Number of input features.
    pub n_features: usize,
    /// Residual threshold the model was trained with.
    pub threshold: Option<f32>,
    /// Number of (deduplicated) training samples.
    pub n_samples: Option<usize>,
    /// Number of affine functions discovered during training.
    pub n_functions: Option<usize>,
    /// Feature names (optional).
    pub feature_names: Option<Vec<String>>,
}

impl ModelMeta {
    pub fn new(n_features: usize) -> Self {
        Self { n_features, ..Default::default() }
    }

    /// Set the training threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Set the training sample count.
    pub fn with_n_samples(mut self, n_samples: usize) -> Self {
        self.n_samples = Some(n_samples);
        self
    }

    pub fn with_n_functions(mut self, n_functions: usize) -> Self {
        self.n_functions = Some(n_functions);
        self
    }

    /// Set feature names.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }

    /// Name of feature `i`, falling back to `x{i}`.
    pub fn feature_name(&self, i: usize) -> String {
        self.feature_names
            .as_ref()
            .and_then(|names| names.get(i).cloned())
            .unwrap_or_else(|| format!("x{i}"))
    }
}
