//! pwaffine: piecewise affine regression with synthesized guards.
//!
//! Learns models of the form
//!
//! ```text
//! if g_1(x) then f_1(x) elif g_2(x) then f_2(x) ... else f_n(x)
//! ```
//!
//! where each `f_i` is affine and each guard `g_i` is a CNF formula of
//! half-space predicates. Functions are grown greedily from seed samples;
//! guards are synthesized by counterexample-guided search against a
//! linear separation oracle.
//!
//! # Key Types
//!
//! - [`PwaModel`] / [`PwaConfig`] - High-level model with train/predict
//! - [`PiecewiseModel`] - The bare region list
//! - [`Dataset`] - Sorted, duplicate-free labelled points
//! - [`Predictor`] - Shared prediction interface (also for the baseline)
//!
//! # Training
//!
//! Use `PwaConfig::builder()` to configure, then `PwaModel::train()`.
//! See the [`model`] module for details.
//!
//! # Persistence
//!
//! Models round-trip through JSON with [`SerializableModel`].
//! See the [`persist`] module for the file layout.

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod baseline;
pub mod data;
pub mod inference;
pub mod model;
pub mod oracle;
pub mod persist;
pub mod repr;
pub mod testing;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// High-level model types
pub use model::{ModelMeta, PwaConfig, PwaModel};

// Core representation
pub use repr::PiecewiseModel;

// Data types
pub use data::{Dataset, DatasetBuilder, DatasetError, Point, PointSet};

// Prediction and persistence
pub use inference::{infer, InferenceReport, Predictor};
pub use persist::SerializableModel;

// Training
pub use training::{TrainError, TrainingReport};

// Shared utilities
pub use utils::{run_with_threads, Parallelism};
