//! Seeded synthetic data for tests, benches and demos.
//!
//! Every generator is deterministic for a given seed.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::prelude::*;

use crate::data::{Dataset, DatasetBuilder, Point, PointSet};
use crate::oracle::{LinearOracle, SeparationOracle};
use crate::repr::{AffineFunction, Predicate};

/// Integer grid `1..=n` squared, labelled `1.0` on the lower-left and
/// upper-right quadrants and `-1.0` elsewhere.
///
/// ```
/// let data = pwaffine::testing::checkerboard(4);
/// assert_eq!(data.len(), 16);
/// assert_eq!(data.label(&[2.0, 2.0].into()), Some(1.0));
/// assert_eq!(data.label(&[2.0, 3.0].into()), Some(-1.0));
/// ```
pub fn checkerboard(n: usize) -> Dataset {
    let half = n / 2;
    let mut builder = DatasetBuilder::new();
    for i in 1..=n {
        for j in 1..=n {
            let same = (i <= half) == (j <= half);
            builder.insert(Point::new(vec![i as f32, j as f32]), if same { 1.0 } else { -1.0 });
        }
    }
    builder.build()
}

/// One-dimensional piecewise linear data.
///
/// Piece `k` covers the integer inputs `k * n_per_piece .. (k + 1) * n_per_piece`
/// and is labelled `slope * x + intercept` from `pieces[k]`.
pub fn piecewise_line(n_per_piece: usize, pieces: &[(f32, f32)]) -> Dataset {
    let mut builder = DatasetBuilder::new();
    for (k, &(slope, intercept)) in pieces.iter().enumerate() {
        for i in k * n_per_piece..(k + 1) * n_per_piece {
            let x = i as f32;
            builder.insert(Point::new(vec![x]), slope * x + intercept);
        }
    }
    builder.build()
}

/// `n` points uniform in `[min, max]^dims`.
pub fn random_points(n: usize, dims: usize, seed: u64, min: f32, max: f32) -> Vec<Point> {
    assert!(max >= min);
    let mut rng = StdRng::seed_from_u64(seed);
    let width = max - min;
    (0..n)
        .map(|_| Point::new((0..dims).map(|_| min + rng.gen::<f32>() * width).collect::<Vec<_>>()))
        .collect()
}

/// Two point clouds in `[-1, 1]^dims` on either side of a random hyperplane,
/// at least `margin` away from it.
///
/// Returns `(positive, negative, hyperplane)`; positives satisfy
/// `hyperplane(x) >= margin`.
pub fn linearly_separable(n: usize, dims: usize, margin: f32, seed: u64) -> (PointSet, PointSet, AffineFunction) {
    let mut rng = StdRng::seed_from_u64(seed);
    let weights: Vec<f32> = (0..dims).map(|_| rng.gen::<f32>() * 2.0 - 1.0).collect();
    let bias = rng.gen::<f32>() * 0.5 - 0.25;
    let plane = AffineFunction::from_parts(&weights, bias);

    let mut pos = PointSet::new();
    let mut neg = PointSet::new();
    for p in random_points(n, dims, seed.wrapping_add(1), -1.0, 1.0) {
        let v = plane.evaluate(&p);
        if v >= margin {
            pos.insert(p);
        } else if v <= -margin {
            neg.insert(p);
        }
    }
    (pos, neg, plane)
}

/// `n` random points labelled by `f`.
pub fn labelled_by(f: impl Fn(&[f32]) -> f32, n: usize, dims: usize, seed: u64) -> Dataset {
    let mut builder = DatasetBuilder::new();
    for p in random_points(n, dims, seed, -10.0, 10.0) {
        let y = f(&p);
        builder.insert(p, y);
    }
    builder.build()
}

// =============================================================================
// Fault injection
// =============================================================================

/// Failure injected by [`FaultyOracle`].
///
/// Only separations whose positive side has more than one point are
/// affected; single points are always answered by the wrapped oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Refuse the `n`-th, `2n`-th, ... such separation, at most `limit` times.
    RefuseEvery { n: usize, limit: usize },
    /// Answer such separations with a predicate that holds nowhere.
    WrongPredicate,
    /// Never find a hyperplane through a point.
    NoHyperplanes,
}

/// [`LinearOracle`] with a scripted [`Fault`].
#[derive(Debug)]
pub struct FaultyOracle {
    inner: LinearOracle,
    fault: Fault,
    calls: AtomicUsize,
    refused: AtomicUsize,
}

impl FaultyOracle {
    pub fn new(inner: LinearOracle, fault: Fault) -> Self {
        Self { inner, fault, calls: AtomicUsize::new(0), refused: AtomicUsize::new(0) }
    }

    /// Separations refused so far.
    pub fn refused(&self) -> usize {
        self.refused.load(Ordering::Relaxed)
    }
}

impl SeparationOracle for FaultyOracle {
    fn separate(&self, positive: &PointSet, negative: &PointSet) -> Option<Predicate> {
        if positive.len() > 1 {
            match self.fault {
                Fault::RefuseEvery { n, limit } => {
                    let k = self.calls.fetch_add(1, Ordering::Relaxed) + 1;
                    if k % n == 0 && self.refused() < limit {
                        self.refused.fetch_add(1, Ordering::Relaxed);
                        return None;
                    }
                }
                Fault::WrongPredicate => return positive.dims().map(Predicate::always_false),
                Fault::NoHyperplanes => {}
            }
        }
        self.inner.separate(positive, negative)
    }

    fn fit_affine(&self, samples: &[(&Point, f32)], n_features: usize) -> Option<AffineFunction> {
        self.inner.fit_affine(samples, n_features)
    }

    fn hyperplane_through(&self, anchor: &Point, others: &PointSet, rng: &mut StdRng) -> Option<AffineFunction> {
        match self.fault {
            Fault::NoHyperplanes => None,
            _ => self.inner.hyperplane_through(anchor, others, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkerboard_quadrants() {
        let data = checkerboard(100);
        assert_eq!(data.len(), 10_000);
        assert_eq!(data.label(&[50.0, 50.0].into()), Some(1.0));
        assert_eq!(data.label(&[51.0, 51.0].into()), Some(1.0));
        assert_eq!(data.label(&[51.0, 49.0].into()), Some(-1.0));
        assert_eq!(data.label(&[49.0, 51.0].into()), Some(-1.0));
    }

    #[test]
    fn piecewise_line_labels() {
        let data = piecewise_line(5, &[(1.0, 0.0), (0.0, 7.0)]);
        assert_eq!(data.len(), 10);
        assert_eq!(data.label(&[3.0].into()), Some(3.0));
        assert_eq!(data.label(&[8.0].into()), Some(7.0));
    }

    #[test]
    fn generators_are_deterministic() {
        assert_eq!(random_points(10, 3, 7, 0.0, 1.0), random_points(10, 3, 7, 0.0, 1.0));
        let (p1, n1, f1) = linearly_separable(50, 2, 0.05, 3);
        let (p2, n2, f2) = linearly_separable(50, 2, 0.05, 3);
        assert_eq!((p1, n1, f1), (p2, n2, f2));
    }

    #[test]
    fn faulty_oracle_refuses_on_schedule() {
        let oracle = FaultyOracle::new(LinearOracle::default(), Fault::RefuseEvery { n: 2, limit: 1 });
        let pos: PointSet = [Point::from([0.0, 0.0]), Point::from([0.0, 1.0])].into_iter().collect();
        let neg = PointSet::singleton(Point::from([5.0, 5.0]));
        let single = PointSet::singleton(Point::from([0.0, 0.0]));

        assert!(oracle.separable(&pos, &neg));
        assert!(oracle.separable(&single, &neg));
        assert!(!oracle.separable(&pos, &neg));
        assert!(oracle.separable(&pos, &neg));
        assert!(oracle.separable(&pos, &neg));
        assert_eq!(oracle.refused(), 1);
    }

    #[test]
    fn separable_clouds_respect_margin() {
        let (pos, neg, plane) = linearly_separable(200, 3, 0.1, 11);
        assert!(!pos.is_empty() && !neg.is_empty());
        assert!(pos.iter().all(|p| plane.evaluate(p) >= 0.1));
        assert!(neg.iter().all(|p| plane.evaluate(p) <= -0.1));
    }
}
