//! Ordered point sets with a cached bounding envelope.

use std::collections::btree_set;
use std::collections::BTreeSet;

use super::point::Point;

/// Closed interval `[lo, hi]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub lo: f32,
    pub hi: f32,
}

impl Interval {
    #[inline]
    fn point(v: f32) -> Self {
        Self { lo: v, hi: v }
    }

    #[inline]
    fn include(&mut self, v: f32) {
        if v < self.lo {
            self.lo = v;
        }
        if v > self.hi {
            self.hi = v;
        }
    }
}

/// Per-axis and per-axis-pair extremes of a non-empty point set.
///
/// Pair statistics are kept for every `i < j` in row-major pair order (see
/// [`pair_index`]). Sums and differences are computed in `f32` as
/// `x[i] + x[j]` and `x[i] - x[j]`, which is exactly what evaluating a
/// predicate with coefficients `±1` on axes `i` and `j` computes.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    axes: Vec<Interval>,
    sums: Vec<Interval>,
    diffs: Vec<Interval>,
}

impl Envelope {
    fn of(p: &Point) -> Self {
        let d = p.dims();
        let axes = p.iter().copied().map(Interval::point).collect();
        let mut sums = Vec::with_capacity(n_pairs(d));
        let mut diffs = Vec::with_capacity(n_pairs(d));
        for i in 0..d {
            for j in (i + 1)..d {
                sums.push(Interval::point(p[i] + p[j]));
                diffs.push(Interval::point(p[i] - p[j]));
            }
        }
        Self { axes, sums, diffs }
    }

    fn include(&mut self, p: &Point) {
        let d = p.dims();
        for (iv, &v) in self.axes.iter_mut().zip(p.iter()) {
            iv.include(v);
        }
        let mut k = 0;
        for i in 0..d {
            for j in (i + 1)..d {
                self.sums[k].include(p[i] + p[j]);
                self.diffs[k].include(p[i] - p[j]);
                k += 1;
            }
        }
    }

    #[inline]
    pub fn dims(&self) -> usize {
        self.axes.len()
    }

    #[inline]
    pub fn axis(&self, i: usize) -> Interval {
        self.axes[i]
    }

    /// Range of `x[i] + x[j]` for pair index `k`.
    #[inline]
    pub fn pair_sum(&self, k: usize) -> Interval {
        self.sums[k]
    }

    /// Range of `x[i] - x[j]` for pair index `k`.
    #[inline]
    pub fn pair_diff(&self, k: usize) -> Interval {
        self.diffs[k]
    }
}

/// Number of unordered axis pairs in `d` dimensions.
#[inline]
pub fn n_pairs(d: usize) -> usize {
    d * d.saturating_sub(1) / 2
}

/// Iterate `(k, i, j)` over axis pairs `i < j` in the order used by [`Envelope`].
pub fn pair_index(d: usize) -> impl Iterator<Item = (usize, usize, usize)> {
    (0..d)
        .flat_map(move |i| ((i + 1)..d).map(move |j| (i, j)))
        .enumerate()
        .map(|(k, (i, j))| (k, i, j))
}

/// Ordered, duplicate-free set of points.
///
/// Iteration follows the [`Point`] order. The envelope is maintained on
/// insertion; removal is only possible through [`insert_if`](Self::insert_if),
/// which restores the previous envelope when it backs out.
#[derive(Debug, Clone, Default)]
pub struct PointSet {
    points: BTreeSet<Point>,
    envelope: Option<Envelope>,
}

impl PointSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton(point: Point) -> Self {
        let envelope = Some(Envelope::of(&point));
        let mut points = BTreeSet::new();
        points.insert(point);
        Self { points, envelope }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Dimensionality of the stored points, `None` when empty.
    #[inline]
    pub fn dims(&self) -> Option<usize> {
        self.envelope.as_ref().map(Envelope::dims)
    }

    #[inline]
    pub fn envelope(&self) -> Option<&Envelope> {
        self.envelope.as_ref()
    }

    #[inline]
    pub fn contains(&self, point: &Point) -> bool {
        self.points.contains(point)
    }

    #[inline]
    pub fn first(&self) -> Option<&Point> {
        self.points.first()
    }

    #[inline]
    pub fn iter(&self) -> btree_set::Iter<'_, Point> {
        self.points.iter()
    }

    /// Insert a point; returns `false` if it was already present.
    pub fn insert(&mut self, point: Point) -> bool {
        if self.points.contains(&point) {
            return false;
        }
        match &mut self.envelope {
            Some(env) => env.include(&point),
            None => self.envelope = Some(Envelope::of(&point)),
        }
        self.points.insert(point)
    }

    /// Tentatively insert `point` and keep it only if `keep` accepts the
    /// enlarged set.
    ///
    /// Returns whether the point is a member afterwards. A point that is
    /// already present stays and `keep` is not consulted.
    pub fn insert_if(&mut self, point: Point, keep: impl FnOnce(&PointSet) -> bool) -> bool {
        if self.points.contains(&point) {
            return true;
        }
        let saved = self.envelope.clone();
        self.insert(point.clone());
        if keep(self) {
            return true;
        }
        self.points.remove(&point);
        self.envelope = saved;
        false
    }

    /// New set holding the points of both.
    pub fn union(&self, other: &PointSet) -> PointSet {
        let (mut out, extra) = if self.len() >= other.len() { (self.clone(), other) } else { (other.clone(), self) };
        for p in extra.iter() {
            out.insert(p.clone());
        }
        out
    }

    /// Split by a predicate into `(matching, rest)`.
    pub fn partition(&self, mut pred: impl FnMut(&Point) -> bool) -> (PointSet, PointSet) {
        let mut yes = PointSet::new();
        let mut no = PointSet::new();
        for p in self.iter() {
            if pred(p) {
                yes.insert(p.clone());
            } else {
                no.insert(p.clone());
            }
        }
        (yes, no)
    }
}

impl PartialEq for PointSet {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl FromIterator<Point> for PointSet {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        let mut set = PointSet::new();
        for p in iter {
            set.insert(p);
        }
        set
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a Point;
    type IntoIter = btree_set::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(points: &[[f32; 3]]) -> PointSet {
        points.iter().map(|&p| Point::from(p)).collect()
    }

    #[test]
    fn envelope_tracks_extremes() {
        let s = set(&[[1.0, 5.0, 0.0], [3.0, -1.0, 2.0], [2.0, 2.0, 2.0]]);
        let env = s.envelope().unwrap();
        assert_eq!(env.axis(0), Interval { lo: 1.0, hi: 3.0 });
        assert_eq!(env.axis(1), Interval { lo: -1.0, hi: 5.0 });
        // pair (0, 1): sums 6, 2, 4 / diffs -4, 4, 0
        assert_eq!(env.pair_sum(0), Interval { lo: 2.0, hi: 6.0 });
        assert_eq!(env.pair_diff(0), Interval { lo: -4.0, hi: 4.0 });
        // pair (1, 2) is index 2
        assert_eq!(env.pair_sum(2), Interval { lo: 1.0, hi: 5.0 });
    }

    #[test]
    fn pair_index_order() {
        let pairs: Vec<_> = pair_index(3).collect();
        assert_eq!(pairs, vec![(0, 0, 1), (1, 0, 2), (2, 1, 2)]);
        assert_eq!(n_pairs(3), 3);
        assert_eq!(n_pairs(1), 0);
        assert_eq!(n_pairs(0), 0);
    }

    #[test]
    fn duplicates_ignored() {
        let mut s = PointSet::new();
        assert!(s.insert(Point::from([1.0, 1.0, 1.0])));
        assert!(!s.insert(Point::from([1.0, 1.0, 1.0])));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn insert_if_backs_out_and_restores_envelope() {
        let mut s = set(&[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]);
        let before = s.envelope().cloned();

        let kept = s.insert_if(Point::from([9.0, 9.0, 9.0]), |_| false);
        assert!(!kept);
        assert_eq!(s.len(), 2);
        assert_eq!(s.envelope().cloned(), before);

        let kept = s.insert_if(Point::from([2.0, 2.0, 2.0]), |g| g.len() == 3);
        assert!(kept);
        assert_eq!(s.envelope().unwrap().axis(0).hi, 2.0);
    }

    #[test]
    fn union_and_partition() {
        let a = set(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        let b = set(&[[1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]);
        let u = a.union(&b);
        assert_eq!(u.len(), 3);
        assert_eq!(u.envelope().unwrap().axis(0), Interval { lo: 0.0, hi: 2.0 });

        let (lo, hi) = u.partition(|p| p[0] < 1.5);
        assert_eq!(lo.len(), 2);
        assert_eq!(hi.len(), 1);
        assert_eq!(hi.first(), Some(&Point::from([2.0, 0.0, 0.0])));
    }
}
