//! Maximum-margin linear separation by constraint generation.
//!
//! The program, over preconditioned coordinates `x' = x / s`:
//!
//! ```text
//! maximize  t
//! s.t.      w · p + b >=  t      for positive p
//!           w · q + b <= -t      for negative q
//!           -1 <= w_k <= 1,  -B <= b <= B,  0 <= t <= 1
//! ```
//!
//! Free variables are split into non-negative parts so the program fits
//! [`LinearProgram`]. The sets are separable iff the optimum `t` is
//! positive. Only a small active subset of the points is put into the
//! program; after each solve the points violating half the margin are added
//! and the program is solved again.

use std::collections::BTreeSet;

use ndarray::Array1;

use super::simplex::{LinearProgram, SimplexResult};
use crate::data::{Point, PointSet};
use crate::repr::{AffineFunction, Predicate};

/// Optimal margins at or below this are treated as "not separable".
const MARGIN_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
pub struct LpSettings {
    pub max_rounds: usize,
    pub batch: usize,
    pub max_pivots: usize,
}

struct Problem<'a> {
    pos: Vec<&'a Point>,
    neg: Vec<&'a Point>,
    /// Per-axis preconditioning divisor.
    scale: Vec<f64>,
    bound: f64,
}

impl<'a> Problem<'a> {
    fn new(pos: &'a PointSet, neg: &'a PointSet, d: usize) -> Self {
        let pos: Vec<&Point> = pos.iter().collect();
        let neg: Vec<&Point> = neg.iter().collect();
        let n = (pos.len() + neg.len()) as f64;

        let mut scale = vec![0.0f64; d];
        let mut max_abs = vec![0.0f64; d];
        for p in pos.iter().chain(neg.iter()) {
            for k in 0..d {
                let v = f64::from(p[k]).abs();
                scale[k] += v;
                max_abs[k] = max_abs[k].max(v);
            }
        }
        for (k, s) in scale.iter_mut().enumerate() {
            *s /= n;
            if *s <= f64::EPSILON {
                *s = 1.0;
            }
            max_abs[k] /= *s;
        }
        let bound = 1.0 + max_abs.iter().sum::<f64>();
        Self { pos, neg, scale, bound }
    }

    #[inline]
    fn coord(&self, p: &Point, k: usize) -> f64 {
        f64::from(p[k]) / self.scale[k]
    }

    fn value(&self, w: &[f64], b: f64, p: &Point) -> f64 {
        w.iter().enumerate().map(|(k, wk)| wk * self.coord(p, k)).sum::<f64>() + b
    }

    /// Seed the active set with the per-axis extremes of both sides.
    fn initial_active(&self, d: usize) -> (BTreeSet<usize>, BTreeSet<usize>) {
        let extremes = |pts: &[&Point]| {
            let mut idx = BTreeSet::new();
            idx.insert(0);
            for k in 0..d {
                let mut lo = 0;
                let mut hi = 0;
                for (i, p) in pts.iter().enumerate() {
                    if p[k] < pts[lo][k] {
                        lo = i;
                    }
                    if p[k] > pts[hi][k] {
                        hi = i;
                    }
                }
                idx.insert(lo);
                idx.insert(hi);
            }
            idx
        };
        (extremes(self.pos.as_slice()), extremes(self.neg.as_slice()))
    }

    /// Solve on the active subset; returns `(w, b, t)`.
    fn solve(
        &self,
        d: usize,
        active_pos: &BTreeSet<usize>,
        active_neg: &BTreeSet<usize>,
        max_pivots: usize,
    ) -> Option<(Vec<f64>, f64, f64)> {
        // variables: w+ (d), w- (d), b+, b-, t
        let nv = 2 * d + 3;
        let (bp, bn, t) = (2 * d, 2 * d + 1, 2 * d + 2);

        let mut objective = Array1::<f64>::zeros(nv);
        objective[t] = 1.0;
        let mut lp = LinearProgram::new(objective);

        for (points, active, sign) in [(&self.pos, active_pos, -1.0), (&self.neg, active_neg, 1.0)] {
            for &i in active {
                let p = points[i];
                let mut row = Array1::<f64>::zeros(nv);
                for k in 0..d {
                    let x = self.coord(p, k);
                    row[k] = sign * x;
                    row[d + k] = -sign * x;
                }
                row[bp] = sign;
                row[bn] = -sign;
                row[t] = 1.0;
                lp.add_row(row, 0.0);
            }
        }
        for (var, ub) in (0..2 * d).map(|v| (v, 1.0)).chain([(bp, self.bound), (bn, self.bound), (t, 1.0)]) {
            let mut row = Array1::<f64>::zeros(nv);
            row[var] = 1.0;
            lp.add_row(row, ub);
        }

        let (result, stats) = lp.maximize(max_pivots);
        match result {
            SimplexResult::Optimal { x, value } => {
                let w: Vec<f64> = (0..d).map(|k| x[k] - x[d + k]).collect();
                Some((w, x[bp] - x[bn], value))
            }
            other => {
                log::debug!("separation LP stopped after {} pivots: {:?}", stats.pivots, other);
                None
            }
        }
    }
}

/// Find a predicate with every positive point on the closed side and every
/// negative point strictly outside, or `None` if the LP finds no positive
/// margin within the configured limits.
pub fn lp_separator(pos: &PointSet, neg: &PointSet, d: usize, settings: &LpSettings) -> Option<Predicate> {
    if pos.is_empty() || neg.is_empty() {
        return None;
    }
    let problem = Problem::new(pos, neg, d);
    let (mut active_pos, mut active_neg) = problem.initial_active(d);

    for _ in 0..settings.max_rounds {
        let (w, b, t) = problem.solve(d, &active_pos, &active_neg, settings.max_pivots)?;
        if t <= MARGIN_EPS {
            return None;
        }

        let half = 0.5 * t;
        let mut violated: Vec<(f64, bool, usize)> = Vec::new();
        for (i, p) in problem.pos.iter().enumerate() {
            let v = problem.value(&w, b, p);
            if v < half && !active_pos.contains(&i) {
                violated.push((half - v, true, i));
            }
        }
        for (i, q) in problem.neg.iter().enumerate() {
            let v = problem.value(&w, b, q);
            if v > -half && !active_neg.contains(&i) {
                violated.push((v + half, false, i));
            }
        }

        if violated.is_empty() {
            let weights: Vec<f32> = w
                .iter()
                .zip(&problem.scale)
                .map(|(wk, sk)| (wk / sk) as f32)
                .collect();
            let candidate = Predicate::new(AffineFunction::from_parts(&weights, b as f32));
            return tighten(candidate, pos, neg);
        }

        violated.sort_by(|a, b| b.0.total_cmp(&a.0));
        for &(_, is_pos, i) in violated.iter().take(settings.batch.max(1)) {
            if is_pos {
                active_pos.insert(i);
            } else {
                active_neg.insert(i);
            }
        }
    }
    log::debug!(
        "separation LP did not converge in {} rounds ({} + {} points)",
        settings.max_rounds,
        pos.len(),
        neg.len()
    );
    None
}

/// Shift the predicate so the closest positive point sits on the boundary,
/// keeping whichever of the shifted and unshifted predicates verifies in `f32`.
fn tighten(candidate: Predicate, pos: &PointSet, neg: &PointSet) -> Option<Predicate> {
    let min_pos = pos.iter().map(|p| candidate.value(p)).fold(f32::INFINITY, f32::min);
    if min_pos.is_finite() && min_pos > 0.0 {
        let f = candidate.function();
        let shifted = Predicate::new(f.with_constant(f.constant_term() - min_pos));
        if verify(&shifted, pos, neg) {
            return Some(shifted);
        }
    }
    verify(&candidate, pos, neg).then_some(candidate)
}

/// All positives evaluate `>= 0` and all negatives `< 0`.
pub fn verify(pred: &Predicate, pos: &PointSet, neg: &PointSet) -> bool {
    pos.iter().all(|p| pred.value(p) >= 0.0) && neg.iter().all(|q| pred.value(q) < 0.0)
}
