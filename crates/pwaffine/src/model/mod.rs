//! High-level model wrappers.
//!
//! This module provides the user-facing model type that combines training,
//! prediction, and serialization into a cohesive API.
//!
//! # Overview
//!
//! - [`PwaModel`]: piecewise affine model with its metadata and config
//! - [`PwaConfig`]: validated training configuration (builder)
//! - [`GuardParams`] / [`OracleParams`]: nested parameter groups
//! - [`ModelMeta`]: training context persisted with the model
//! - [`ModelSummary`]: region count and guard complexity
//!
//! # Example
//!
//! ```no_run
//! use pwaffine::data::io::load_text;
//! use pwaffine::model::{PwaConfig, PwaModel};
//! use pwaffine::persist::{JsonWriteOptions, SerializableModel};
//!
//! let data = load_text("train.csv")?;
//! let config = PwaConfig::builder().threshold(0.1).build()?;
//! let model = PwaModel::train(&data, config)?;
//!
//! println!("{}", model.display_raw());
//! model.save_json("model.json", &JsonWriteOptions::pretty())?;
//! let loaded = PwaModel::load_json("model.json")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod meta;
mod params;
mod pwa;
mod summary;

pub use config::{ConfigError, PwaConfig};
pub use meta::ModelMeta;
pub use params::{GuardParams, OracleParams, ParamValidationError};
pub use pwa::PwaModel;
pub use summary::{ModelSummary, RegionSummary};
