//! Labelled datasets.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use super::point::Point;
use super::point_set::PointSet;

/// Errors raised while assembling a [`Dataset`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    #[error("sample has {got} features, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("sample has no features")]
    NoFeatures,

    #[error("non-finite value {value} in sample")]
    NonFinite { value: f32 },
}

/// A labelled point.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub x: Point,
    pub y: f32,
}

/// Mapping from points to scalar labels.
///
/// Samples are kept sorted by [`Point`] order with duplicates removed, so
/// index `i` names the same sample for the lifetime of the dataset and
/// "first uncovered point" style tie-breaking is deterministic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    samples: Vec<Sample>,
    n_features: usize,
}

impl Dataset {
    /// Build from `(features, label)` rows. See [`DatasetBuilder`].
    pub fn from_rows<I, F>(rows: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = (F, f32)>,
        F: Into<Vec<f32>>,
    {
        let mut builder = DatasetBuilder::new();
        for (x, y) in rows {
            builder.push(x.into(), y)?;
        }
        Ok(builder.build())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[inline]
    pub fn sample(&self, i: usize) -> &Sample {
        &self.samples[i]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.samples.iter().map(|s| &s.x)
    }

    pub fn labels(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().map(|s| s.y)
    }

    /// Label of `x`, if present.
    pub fn label(&self, x: &Point) -> Option<f32> {
        self.samples
            .binary_search_by(|s| s.x.cmp(x))
            .ok()
            .map(|i| self.samples[i].y)
    }

    /// Points at the given indices as a set.
    pub fn point_set(&self, indices: impl IntoIterator<Item = usize>) -> PointSet {
        indices.into_iter().map(|i| self.samples[i].x.clone()).collect()
    }

    /// Per-feature scale `1 / mean(|x_k|)`.
    ///
    /// Features whose mean magnitude is zero or not finite get scale 1.
    pub fn feature_scale(&self) -> Vec<f32> {
        let n = self.samples.len();
        if n == 0 {
            return vec![1.0; self.n_features];
        }
        let mut sums = vec![0.0f64; self.n_features];
        for s in &self.samples {
            for (acc, &v) in sums.iter_mut().zip(s.x.iter()) {
                *acc += f64::from(v.abs());
            }
        }
        sums.into_iter()
            .map(|sum| {
                let mean = sum / n as f64;
                let scale = (1.0 / mean) as f32;
                if mean > 0.0 && scale.is_finite() && scale > 0.0 {
                    scale
                } else {
                    1.0
                }
            })
            .collect()
    }

    /// Copy with every point multiplied elementwise by `scale`.
    ///
    /// Points that collide after rounding keep the first label.
    pub fn scaled(&self, scale: &[f32]) -> Dataset {
        let mut builder = DatasetBuilder::new();
        builder.n_features = Some(self.n_features);
        for s in &self.samples {
            builder.insert(s.x.scaled(scale), s.y);
        }
        builder.build()
    }
}

/// Incremental [`Dataset`] construction with validation.
///
/// ```
/// use pwaffine::data::DatasetBuilder;
///
/// let mut builder = DatasetBuilder::new();
/// builder.push(vec![1.0, 2.0], 3.0).unwrap();
/// builder.push(vec![0.0, 1.0], 1.0).unwrap();
/// builder.push(vec![1.0, 2.0], 9.0).unwrap(); // duplicate, first label kept
/// let data = builder.build();
/// assert_eq!(data.len(), 2);
/// assert_eq!(data.sample(0).y, 1.0);
/// ```
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    rows: BTreeMap<Point, f32>,
    n_features: Option<usize>,
    duplicates: usize,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample. A repeated point keeps its first label.
    pub fn push(&mut self, features: Vec<f32>, label: f32) -> Result<&mut Self, DatasetError> {
        if features.is_empty() {
            return Err(DatasetError::NoFeatures);
        }
        if let Some(expected) = self.n_features {
            if features.len() != expected {
                return Err(DatasetError::DimensionMismatch { expected, got: features.len() });
            }
        }
        if let Some(&value) = features.iter().find(|v| !v.is_finite()) {
            return Err(DatasetError::NonFinite { value });
        }
        if !label.is_finite() {
            return Err(DatasetError::NonFinite { value: label });
        }
        self.n_features = Some(features.len());
        self.insert(Point::new(features), label);
        Ok(self)
    }

    /// Add a sample without validation. Callers guarantee finite values of
    /// a consistent dimension.
    pub(crate) fn insert(&mut self, x: Point, y: f32) {
        self.n_features.get_or_insert(x.dims());
        match self.rows.entry(x) {
            Entry::Vacant(e) => {
                e.insert(y);
            }
            Entry::Occupied(_) => self.duplicates += 1,
        }
    }

    /// Number of rows dropped as duplicates so far.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn build(self) -> Dataset {
        if self.duplicates > 0 {
            log::debug!("dropped {} duplicate points", self.duplicates);
        }
        Dataset {
            n_features: self.n_features.unwrap_or(0),
            samples: self.rows.into_iter().map(|(x, y)| Sample { x, y }).collect(),
        }
    }
}
