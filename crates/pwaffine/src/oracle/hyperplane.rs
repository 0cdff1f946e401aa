//! Random hyperplanes through a fixed point.

use rand::rngs::StdRng;
use rand::Rng;

use crate::data::{Point, PointSet};
use crate::repr::AffineFunction;

/// Sample an affine function that is exactly zero at `anchor` and at least
/// `min_gap` away from zero at every point of `others`.
///
/// Weights are drawn uniformly from `[-1, 1]`; the constant is the negated
/// weighted sum at `anchor`, computed with the same `f32` accumulation as
/// [`AffineFunction::evaluate`], so `f(anchor)` is exactly `0.0`.
///
/// Gives up after `retries` draws.
pub fn through_point(
    anchor: &Point,
    others: &PointSet,
    rng: &mut StdRng,
    retries: usize,
    min_gap: f32,
) -> Option<AffineFunction> {
    let d = anchor.dims();
    for _ in 0..retries {
        let weights: Vec<f32> = (0..d).map(|_| rng.gen_range(-1.0f32..=1.0)).collect();
        let partial = AffineFunction::from_parts(&weights, 0.0).evaluate(anchor);
        let f = AffineFunction::from_parts(&weights, -partial);
        if f.evaluate(anchor) != 0.0 {
            continue;
        }
        if others.iter().all(|p| f.evaluate(p).abs() >= min_gap) {
            return Some(f);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn zero_at_anchor_nonzero_elsewhere() {
        let anchor = Point::from([0.3, -1.7, 2.2]);
        let others: PointSet = (0..20)
            .map(|i| Point::from([i as f32 * 0.1, 1.0, -(i as f32)]))
            .collect();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let f = through_point(&anchor, &others, &mut rng, 64, 1e-6).unwrap();
            assert_eq!(f.evaluate(&anchor), 0.0);
            assert!(others.iter().all(|p| f.evaluate(p) != 0.0));
            assert!(f.weights().iter().all(|w| (-1.0..=1.0).contains(w)));
        }
    }

    #[test]
    fn deterministic_for_a_seed() {
        let anchor = Point::from([1.0, 2.0]);
        let others: PointSet = [Point::from([0.0, 0.0])].into_iter().collect();
        let a = through_point(&anchor, &others, &mut StdRng::seed_from_u64(3), 8, 1e-6);
        let b = through_point(&anchor, &others, &mut StdRng::seed_from_u64(3), 8, 1e-6);
        assert_eq!(a, b);
    }

    #[test]
    fn impossible_gap_gives_up() {
        let anchor = Point::from([0.0]);
        // any line through the origin is zero at the origin itself
        let others: PointSet = [Point::from([0.0])].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(through_point(&anchor, &others, &mut rng, 16, 1e-6).is_none());
    }
}
