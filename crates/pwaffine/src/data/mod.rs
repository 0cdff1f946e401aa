//! Points, point sets and labelled datasets.
//!
//! # Overview
//!
//! - [`Point`]: feature vector with a total order (exact equality)
//! - [`PointSet`]: ordered set of points with a cached [`Envelope`] of
//!   per-axis and per-axis-pair extremes
//! - [`Dataset`]: points mapped to labels, sorted and duplicate-free
//!
//! Loaders for the text format live in [`io`].

mod dataset;
pub mod io;
mod point;
mod point_set;

pub use dataset::{Dataset, DatasetBuilder, DatasetError, Sample};
pub use point::Point;
pub use point_set::{n_pairs, pair_index, Envelope, Interval, PointSet};
