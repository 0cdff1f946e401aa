//! High-level training configuration with builder pattern.
//!
//! [`PwaConfig`] composes the nested [`GuardParams`] and [`OracleParams`]
//! groups and uses the `bon` crate for builder generation with validation.
//!
//! # Example
//!
//! ```
//! use pwaffine::model::{GuardParams, OracleParams, PwaConfig};
//!
//! // All defaults
//! let config = PwaConfig::builder().build().unwrap();
//!
//! // Tight threshold, axis-aligned guards, fewer splits
//! let config = PwaConfig::builder()
//!     .threshold(0.1)
//!     .oracle(OracleParams::axis_aligned())
//!     .guard(GuardParams::default().with_max_splits(20))
//!     .build()
//!     .unwrap();
//! ```

use std::num::NonZeroUsize;

use bon::Builder;

use super::params::{GuardParams, OracleParams, ParamValidationError};
use crate::training::{AssemblerParams, Verbosity};

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Threshold must be finite and positive.
    InvalidThreshold(f32),
    /// A nested parameter group failed validation.
    InvalidParams {
        group: &'static str,
        source: ParamValidationError,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidThreshold(v) => {
                write!(f, "threshold must be finite and positive, got {}", v)
            }
            Self::InvalidParams { group, source } => write!(f, "{}: {}", group, source),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidParams { source, .. } => Some(source),
            Self::InvalidThreshold(_) => None,
        }
    }
}

// =============================================================================
// PwaConfig
// =============================================================================

/// Configuration for piecewise affine model training.
///
/// # Structure
///
/// - **Fit**: residual `threshold` and feature normalization
/// - **Guard**: CEGIS synthesis via [`GuardParams`]
/// - **Oracle**: separator tiers and solver limits via [`OracleParams`]
/// - **Resources**: threading, seeding and logging
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct PwaConfig {
    // === Fit ===
    /// Residual threshold τ: `f` covers `(x, y)` when `|f(x) - y| < τ`.
    /// Default: 0.5.
    #[builder(default = 0.5)]
    pub threshold: f32,

    /// Scale each feature by `1 / mean(|x_k|)` before learning. Default: true.
    #[builder(default = true)]
    pub normalize: bool,

    // === Nested parameter groups ===
    /// Guard synthesis parameters.
    #[builder(default)]
    pub guard: GuardParams,

    /// Separation oracle parameters.
    #[builder(default)]
    pub oracle: OracleParams,

    // === Reproducibility ===
    /// Random seed; region `k` uses `seed + k`. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,

    // === Resource control ===
    /// Number of threads. `None` uses all available cores.
    pub n_threads: Option<NonZeroUsize>,

    // === Logging ===
    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

/// Custom finishing function that validates the config.
impl<S: pwa_config_builder::IsComplete> PwaConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the threshold is not finite and positive or
    /// a nested parameter group is invalid.
    pub fn build(self) -> Result<PwaConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl PwaConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(ConfigError::InvalidThreshold(self.threshold));
        }
        self.guard
            .validate()
            .map_err(|source| ConfigError::InvalidParams { group: "guard", source })?;
        self.oracle
            .validate()
            .map_err(|source| ConfigError::InvalidParams { group: "oracle", source })?;
        Ok(())
    }

    /// Thread count in `run_with_threads` convention (0 = all cores).
    pub fn thread_count(&self) -> usize {
        self.n_threads.map_or(0, NonZeroUsize::get)
    }

    /// Convert to the assembler's parameters.
    pub(crate) fn to_assembler_params(&self) -> AssemblerParams {
        AssemblerParams {
            threshold: self.threshold,
            normalize: self.normalize,
            guard: self.guard.clone(),
            seed: self.seed,
            verbosity: self.verbosity,
        }
    }
}

impl Default for PwaConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            normalize: true,
            guard: GuardParams::default(),
            oracle: OracleParams::default(),
            seed: 42,
            n_threads: None,
            verbosity: Verbosity::default(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
