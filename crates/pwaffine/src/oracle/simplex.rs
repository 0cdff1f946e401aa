//! Dense primal simplex for small linear programs.
//!
//! Solves
//!
//! ```text
//! maximize    c · x
//! subject to  A x <= b,  x >= 0,  b >= 0
//! ```
//!
//! Because `b >= 0` the all-slack basis is feasible and no phase one is
//! needed. Pivoting follows Bland's rule (lowest eligible index for both the
//! entering and the leaving variable), so degenerate programs terminate.

use ndarray::{Array1, Array2};

/// Reduced costs and pivot entries smaller than this are treated as zero.
const PIVOT_EPS: f64 = 1e-12;

/// Simplex statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimplexStats {
    pub pivots: usize,
}

/// Result of [`LinearProgram::maximize`].
#[derive(Debug, Clone, PartialEq)]
pub enum SimplexResult {
    /// Optimal vertex and objective value.
    Optimal { x: Array1<f64>, value: f64 },
    /// Objective unbounded above.
    Unbounded,
    /// Pivot limit reached before optimality was proven.
    Unknown,
}

/// A linear program in `A x <= b` form with non-negative right-hand side.
#[derive(Debug, Clone)]
pub struct LinearProgram {
    objective: Array1<f64>,
    rows: Vec<(Array1<f64>, f64)>,
}

impl LinearProgram {
    pub fn new(objective: Array1<f64>) -> Self {
        Self { objective, rows: Vec::new() }
    }

    #[inline]
    pub fn n_vars(&self) -> usize {
        self.objective.len()
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Add the constraint `coeffs · x <= rhs`.
    ///
    /// # Panics
    ///
    /// Panics if `rhs` is negative or `coeffs` has the wrong length.
    pub fn add_row(&mut self, coeffs: Array1<f64>, rhs: f64) {
        assert_eq!(coeffs.len(), self.n_vars(), "row length mismatch");
        assert!(rhs >= 0.0, "right-hand side must be non-negative");
        self.rows.push((coeffs, rhs));
    }

    /// Run the simplex method with at most `max_pivots` pivots.
    pub fn maximize(&self, max_pivots: usize) -> (SimplexResult, SimplexStats) {
        let mut tableau = Tableau::new(self);
        let mut stats = SimplexStats::default();

        loop {
            let Some(entering) = tableau.entering() else {
                return (tableau.solution(), stats);
            };
            let Some(leaving) = tableau.leaving(entering) else {
                return (SimplexResult::Unbounded, stats);
            };
            if stats.pivots == max_pivots {
                return (SimplexResult::Unknown, stats);
            }
            tableau.pivot(leaving, entering);
            stats.pivots += 1;
        }
    }
}

// =============================================================================
// Tableau
// =============================================================================

/// Layout: one row per constraint plus the objective row last; columns are
/// structural variables, then slacks, then the right-hand side.
struct Tableau {
    t: Array2<f64>,
    basis: Vec<usize>,
    n_vars: usize,
}

impl Tableau {
    fn new(lp: &LinearProgram) -> Self {
        let m = lp.n_rows();
        let n = lp.n_vars();
        let cols = n + m + 1;
        let mut t = Array2::<f64>::zeros((m + 1, cols));
        for (i, (coeffs, rhs)) in lp.rows.iter().enumerate() {
            t.row_mut(i).slice_mut(ndarray::s![..n]).assign(coeffs);
            t[[i, n + i]] = 1.0;
            t[[i, cols - 1]] = *rhs;
        }
        for j in 0..n {
            t[[m, j]] = -lp.objective[j];
        }
        Self { t, basis: (n..n + m).collect(), n_vars: n }
    }

    #[inline]
    fn n_rows(&self) -> usize {
        self.t.nrows() - 1
    }

    #[inline]
    fn rhs_col(&self) -> usize {
        self.t.ncols() - 1
    }

    /// Lowest-index column with a negative reduced cost.
    fn entering(&self) -> Option<usize> {
        let obj = self.n_rows();
        (0..self.rhs_col()).find(|&j| self.t[[obj, j]] < -PIVOT_EPS)
    }

    /// Minimum-ratio row; ties go to the lowest basic variable index.
    fn leaving(&self, col: usize) -> Option<usize> {
        let rhs = self.rhs_col();
        let mut best: Option<(usize, f64)> = None;
        for i in 0..self.n_rows() {
            let a = self.t[[i, col]];
            if a <= PIVOT_EPS {
                continue;
            }
            let ratio = self.t[[i, rhs]] / a;
            best = match best {
                None => Some((i, ratio)),
                Some((r, best_ratio)) => {
                    if ratio < best_ratio - PIVOT_EPS
                        || (ratio <= best_ratio + PIVOT_EPS && self.basis[i] < self.basis[r])
                    {
                        Some((i, ratio))
                    } else {
                        Some((r, best_ratio))
                    }
                }
            };
        }
        best.map(|(i, _)| i)
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let p = self.t[[row, col]];
        self.t.row_mut(row).mapv_inplace(|v| v / p);
        let pivot_row = self.t.row(row).to_owned();
        for i in 0..self.t.nrows() {
            if i == row {
                continue;
            }
            let factor = self.t[[i, col]];
            if factor == 0.0 {
                continue;
            }
            self.t.row_mut(i).scaled_add(-factor, &pivot_row);
        }
        self.basis[row] = col;
    }

    fn solution(&self) -> SimplexResult {
        let rhs = self.rhs_col();
        let mut x = Array1::<f64>::zeros(self.n_vars);
        for (i, &b) in self.basis.iter().enumerate() {
            if b < self.n_vars {
                x[b] = self.t[[i, rhs]];
            }
        }
        let value = self.t[[self.n_rows(), rhs]];
        SimplexResult::Optimal { x, value }
    }
}
