//! Schema types for model serialization.
//!
//! These types define the on-disk JSON layout independently of the runtime
//! types, so the file format can stay stable while the runtime
//! representation evolves. Conversions (with validation) live in
//! [`convert`](super::convert).
//!
//! ```text
//! Model          := { regions: [Region], scale: [float], meta?: Meta }
//! Region         := { f: AffineFunction, g: GuardPredicate }
//! AffineFunction := { coeff: [float] }      // weights then constant
//! GuardPredicate := { clauses: [OrClause] }
//! OrClause       := { terms: [AffineFunction] }  // each term is f(x) >= 0
//! ```

use serde::{Deserialize, Serialize};

/// Affine function: weights followed by the constant term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffineFunctionSchema {
    pub coeff: Vec<f32>,
}

/// Disjunction of half-space predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrClauseSchema {
    pub terms: Vec<AffineFunctionSchema>,
}

/// Conjunction of clauses. No clauses means the guard never holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardPredicateSchema {
    pub clauses: Vec<OrClauseSchema>,
}

/// One guarded region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSchema {
    pub f: AffineFunctionSchema,
    pub g: GuardPredicateSchema,
}

/// Model metadata schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetaSchema {
    /// Number of features.
    pub num_features: usize,
    /// Residual threshold used in training.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_samples: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_functions: Option<usize>,
    /// Feature names (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

/// Piecewise affine model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSchema {
    pub regions: Vec<RegionSchema>,
    /// Per-feature input scale; empty means identity.
    pub scale: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ModelMetaSchema>,
}

/// One class of the naive Bayes baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesClassSchema {
    pub label: f32,
    pub prior: f64,
    pub mean: Vec<f64>,
    pub var: Vec<f64>,
}

/// Gaussian naive Bayes baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayesSchema {
    pub num_features: usize,
    pub classes: Vec<NaiveBayesClassSchema>,
}
