//! Model persistence.
//!
//! Models are stored as JSON through separate [`schema`] types; reading
//! validates the file and rejects models whose dimensions disagree (see
//! [`convert`]).
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//!
//! use pwaffine::persist::{JsonWriteOptions, SerializableModel};
//! use pwaffine::repr::{AffineFunction, PiecewiseModel, Region};
//!
//! let model = PiecewiseModel::new(vec![Region::catch_all(AffineFunction::new(vec![2.0, 1.0]))], vec![]);
//!
//! let mut buf = Vec::new();
//! model.write_json_into(&mut buf, &JsonWriteOptions::compact()).unwrap();
//! let loaded = PiecewiseModel::read_json_from(Cursor::new(&buf)).unwrap();
//! assert_eq!(loaded, model);
//! ```

pub mod convert;
mod error;
pub mod schema;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::baseline::GaussianNaiveBayes;
use crate::model::PwaModel;
use crate::repr::PiecewiseModel;

pub use error::{ReadError, WriteError};
use schema::{ModelSchema, NaiveBayesSchema};

/// JSON output formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonWriteOptions {
    /// Indent nested values.
    pub pretty: bool,
}

impl JsonWriteOptions {
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

/// A model with a JSON file format.
pub trait SerializableModel: Sized {
    type Schema: Serialize + DeserializeOwned;

    fn to_schema(&self) -> Self::Schema;

    /// Validate and convert a parsed schema.
    fn from_schema(schema: Self::Schema) -> Result<Self, ReadError>;

    fn write_json_into<W: Write>(&self, writer: W, options: &JsonWriteOptions) -> Result<(), WriteError> {
        let schema = self.to_schema();
        let mut writer = BufWriter::new(writer);
        if options.pretty {
            serde_json::to_writer_pretty(&mut writer, &schema)?;
        } else {
            serde_json::to_writer(&mut writer, &schema)?;
        }
        writer.flush()?;
        Ok(())
    }

    fn read_json_from<R: Read>(reader: R) -> Result<Self, ReadError> {
        let schema: Self::Schema = serde_json::from_reader(BufReader::new(reader))?;
        Self::from_schema(schema)
    }

    fn to_json_string(&self, options: &JsonWriteOptions) -> Result<String, WriteError> {
        let schema = self.to_schema();
        let json = if options.pretty {
            serde_json::to_string_pretty(&schema)?
        } else {
            serde_json::to_string(&schema)?
        };
        Ok(json)
    }

    fn save_json(&self, path: impl AsRef<Path>, options: &JsonWriteOptions) -> Result<(), WriteError> {
        let file = File::create(path.as_ref())?;
        self.write_json_into(file, options)?;
        log::debug!("wrote model to {}", path.as_ref().display());
        Ok(())
    }

    fn load_json(path: impl AsRef<Path>) -> Result<Self, ReadError> {
        let file = File::open(path.as_ref())?;
        Self::read_json_from(file)
    }
}

impl SerializableModel for PiecewiseModel {
    type Schema = ModelSchema;

    fn to_schema(&self) -> ModelSchema {
        self.into()
    }

    fn from_schema(schema: ModelSchema) -> Result<Self, ReadError> {
        schema.try_into()
    }
}

impl SerializableModel for PwaModel {
    type Schema = ModelSchema;

    fn to_schema(&self) -> ModelSchema {
        self.into()
    }

    fn from_schema(schema: ModelSchema) -> Result<Self, ReadError> {
        schema.try_into()
    }
}

impl SerializableModel for GaussianNaiveBayes {
    type Schema = NaiveBayesSchema;

    fn to_schema(&self) -> NaiveBayesSchema {
        self.into()
    }

    fn from_schema(schema: NaiveBayesSchema) -> Result<Self, ReadError> {
        schema.try_into()
    }
}
