//! Structural statistics of a piecewise model.

use std::fmt;

use crate::repr::{AffineFunction, PiecewiseModel};

/// Guard complexity of one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSummary {
    /// Function in raw feature units.
    pub function: AffineFunction,
    pub clauses: usize,
    /// Widest clause.
    pub max_terms: usize,
    pub total_terms: usize,
}

/// Region count and per-region guard complexity.
///
/// ```
/// use pwaffine::model::ModelSummary;
/// use pwaffine::repr::{AffineFunction, PiecewiseModel, Region};
///
/// let model = PiecewiseModel::new(vec![Region::catch_all(AffineFunction::new(vec![1.0, 0.0]))], vec![]);
/// let summary = ModelSummary::of(&model);
/// assert_eq!(summary.n_regions(), 1);
/// assert_eq!(summary.regions[0].clauses, 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub n_features: Option<usize>,
    pub regions: Vec<RegionSummary>,
}

impl ModelSummary {
    pub fn of(model: &PiecewiseModel) -> Self {
        let regions = model
            .regions()
            .iter()
            .map(|r| {
                let (clauses, max_terms, total_terms) = r.guard.complexity();
                RegionSummary {
                    function: r.function.unscaled(model.scale()),
                    clauses,
                    max_terms,
                    total_terms,
                }
            })
            .collect();
        Self { n_features: model.n_features(), regions }
    }

    pub fn n_regions(&self) -> usize {
        self.regions.len()
    }

    /// Predicates over all guards.
    pub fn total_terms(&self) -> usize {
        self.regions.iter().map(|r| r.total_terms).sum()
    }
}

impl fmt::Display for ModelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of regions: {}", self.n_regions())?;
        if let Some(n) = self.n_features {
            writeln!(f, "Number of features: {n}")?;
        }
        for (i, r) in self.regions.iter().enumerate() {
            writeln!(f, "Region {i}")?;
            writeln!(f, "-- Affine function: {}", r.function)?;
            if r.clauses == 0 {
                writeln!(f, "-- Guard complexity: true")?;
            } else {
                writeln!(
                    f,
                    "-- Guard complexity: {} x {} ({} terms)",
                    r.clauses, r.max_terms, r.total_terms
                )?;
            }
        }
        Ok(())
    }
}
