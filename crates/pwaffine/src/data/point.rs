//! Feature vectors with a total order.

use std::cmp::Ordering;
use std::ops::Deref;

/// A feature vector.
///
/// Points are compared lexicographically with [`f32::total_cmp`], so they
/// can key ordered sets and maps: equality is exact (no tolerance) and the
/// order is total even for NaN. `-0.0` is stored as `+0.0` so that the
/// two zeros are the same point.
#[derive(Debug, Clone)]
pub struct Point(Box<[f32]>);

impl Point {
    pub fn new(values: impl Into<Box<[f32]>>) -> Self {
        let mut values = values.into();
        for v in values.iter_mut() {
            if *v == 0.0 {
                *v = 0.0;
            }
        }
        Self(values)
    }

    #[inline]
    pub fn dims(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Euclidean distance, accumulated in `f64`.
    pub fn distance(&self, other: &Point) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(&a, &b)| {
                let d = f64::from(a) - f64::from(b);
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }

    /// Elementwise product with `scale`; an empty scale is the identity.
    pub fn scaled(&self, scale: &[f32]) -> Point {
        if scale.is_empty() {
            return self.clone();
        }
        debug_assert_eq!(scale.len(), self.dims());
        Point::new(
            self.0
                .iter()
                .zip(scale)
                .map(|(v, s)| v * s)
                .collect::<Vec<_>>(),
        )
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

impl Deref for Point {
    type Target = [f32];

    #[inline]
    fn deref(&self) -> &[f32] {
        &self.0
    }
}

impl From<Vec<f32>> for Point {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}

impl<const N: usize> From<[f32; N]> for Point {
    fn from(values: [f32; N]) -> Self {
        Self::new(values.to_vec())
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match a.total_cmp(b) {
                Ordering::Equal => {}
                ord => return ord,
            }
        }
        self.0.len().cmp(&other.0.len())
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Point {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn lexicographic_order() {
        let a = Point::from([1.0, 5.0]);
        let b = Point::from([2.0, 0.0]);
        let c = Point::from([2.0, 1.0]);
        assert!(a < b);
        assert!(b < c);
        assert!(Point::from([1.0]) < Point::from([1.0, 0.0]));
    }

    #[test]
    fn signed_zeros_are_one_point() {
        let mut set = BTreeSet::new();
        set.insert(Point::from([0.0, 1.0]));
        set.insert(Point::from([-0.0, 1.0]));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn equality_is_exact() {
        assert_ne!(Point::from([0.1, 0.2]), Point::from([0.1, 0.200_000_02]));
        assert_eq!(Point::from([0.1, 0.2]), Point::from(vec![0.1, 0.2]));
    }

    #[test]
    fn nan_has_a_place_in_the_order() {
        let mut set = BTreeSet::new();
        set.insert(Point::from([f32::NAN]));
        set.insert(Point::from([f32::NAN]));
        set.insert(Point::from([1.0]));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn distance_and_scaling() {
        let a = Point::from([0.0, 0.0]);
        let b = Point::from([3.0, 4.0]);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.scaled(&[2.0, 0.5]).as_slice(), &[6.0, 2.0]);
        assert_eq!(b.scaled(&[]).as_slice(), b.as_slice());
    }
}
