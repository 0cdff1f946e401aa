//! Threshold separators read straight off the point-set envelopes.
//!
//! Thresholds are placed on the extreme positive value, so the positive
//! side is closed and touches the positive set, and every negative point is
//! strictly outside it.

use crate::data::{pair_index, Envelope};
use crate::repr::{AffineFunction, Predicate};

/// Separate along a single axis: `x[k] <= max_pos` or `x[k] >= min_pos`.
pub fn axis_separator(pos: &Envelope, neg: &Envelope) -> Option<Predicate> {
    let d = pos.dims();
    for k in 0..d {
        let p = pos.axis(k);
        let n = neg.axis(k);
        if p.hi < n.lo {
            return Some(Predicate::at_most(d, k, p.hi));
        }
        if p.lo > n.hi {
            return Some(Predicate::at_least(d, k, p.lo));
        }
    }
    None
}

/// Separate along `x[i] + x[j]` or `x[i] - x[j]` for some axis pair.
pub fn pairwise_separator(pos: &Envelope, neg: &Envelope) -> Option<Predicate> {
    let d = pos.dims();
    for (k, i, j) in pair_index(d) {
        let (p, n) = (pos.pair_sum(k), neg.pair_sum(k));
        if p.hi < n.lo {
            return Some(pair_predicate(d, (i, -1.0), (j, -1.0), p.hi));
        }
        if p.lo > n.hi {
            return Some(pair_predicate(d, (i, 1.0), (j, 1.0), -p.lo));
        }

        let (p, n) = (pos.pair_diff(k), neg.pair_diff(k));
        if p.hi < n.lo {
            return Some(pair_predicate(d, (i, -1.0), (j, 1.0), p.hi));
        }
        if p.lo > n.hi {
            return Some(pair_predicate(d, (i, 1.0), (j, -1.0), -p.lo));
        }
    }
    None
}

fn pair_predicate(d: usize, a: (usize, f32), b: (usize, f32), constant: f32) -> Predicate {
    let mut coeff = vec![0.0; d + 1];
    coeff[a.0] = a.1;
    coeff[b.0] = b.1;
    coeff[d] = constant;
    Predicate::new(AffineFunction::new(coeff))
}
