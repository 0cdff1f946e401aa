//! Dataset loaders.
//!
//! The text format has one sample per line: comma separated values, the
//! last of which is the label. Blank lines are skipped.
//!
//! ```text
//! 1,1,1
//! 1,51,-1
//! ```

mod error;
mod text;

pub use error::DatasetLoadError;
pub use text::{load_text, parse_text};
