//! Learning piecewise affine models.
//!
//! - [`RegionLearner`]: grows one affine function from a seed sample
//! - [`GuardSynthesizer`]: counterexample-guided CNF guard synthesis with
//!   group splitting and simplification
//! - [`ModelAssembler`]: discovers all functions, orders them and builds one
//!   guard per region
//! - [`TrainingLogger`], [`Verbosity`]: progress reporting

mod assembler;
pub mod guard;
mod logger;
mod region;

pub use assembler::{AssemblerParams, GuardOutcome, ModelAssembler, RegionReport, TrainingReport};
pub use guard::{GuardError, GuardSynthesizer, SplitStrategy, Synthesis};
pub use logger::{TrainingLogger, Verbosity};
pub use region::RegionLearner;

use crate::model::ConfigError;

/// Errors that abort training.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrainError {
    #[error("training dataset is empty")]
    EmptyDataset,

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
