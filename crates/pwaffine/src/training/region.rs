//! Growing one affine piece from a seed point.

use crate::data::{Dataset, Point};
use crate::oracle::SeparationOracle;
use crate::repr::AffineFunction;

/// Fits an affine function around the first uncovered sample and expands it
/// greedily to every uncovered sample it predicts within the threshold.
pub struct RegionLearner<'a, O: SeparationOracle + ?Sized> {
    oracle: &'a O,
    threshold: f32,
}

impl<'a, O: SeparationOracle + ?Sized> RegionLearner<'a, O> {
    pub fn new(oracle: &'a O, threshold: f32) -> Self {
        Self { oracle, threshold }
    }

    /// Whether `f` predicts `y` at `x` within the threshold.
    #[inline]
    pub fn covers(&self, f: &AffineFunction, x: &Point, y: f32) -> bool {
        (f.evaluate(x) - y).abs() < self.threshold
    }

    /// Learn one piece from the samples not yet marked in `covered`.
    ///
    /// `covered` is indexed like `data`. Returns `None` when every sample is
    /// covered. The returned function always covers at least one uncovered
    /// sample.
    pub fn learn(&self, data: &Dataset, covered: &[bool]) -> Option<AffineFunction> {
        let n = data.n_features();
        let uncovered: Vec<usize> = (0..data.len()).filter(|&i| !covered[i]).collect();
        let &seed = uncovered.first()?;
        let seed_x = &data.sample(seed).x;

        // seed plus its n + 2 nearest uncovered neighbours
        let mut by_distance: Vec<(f64, usize)> = uncovered[1..]
            .iter()
            .map(|&i| (seed_x.distance(&data.sample(i).x), i))
            .collect();
        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));
        let mut fit_set: Vec<usize> = std::iter::once(seed)
            .chain(by_distance.iter().take(n + 2).map(|&(_, i)| i))
            .collect();
        fit_set.sort_unstable();

        let Some(mut f) = self.fit(data, &fit_set) else {
            return Some(self.constant_at(data, seed));
        };
        loop {
            let coverage: Vec<usize> = uncovered
                .iter()
                .copied()
                .filter(|&i| {
                    let s = data.sample(i);
                    self.covers(&f, &s.x, s.y)
                })
                .collect();
            if coverage.len() <= fit_set.len() {
                if coverage.is_empty() {
                    log::debug!("fit around sample {seed} covers nothing, using its label");
                    return Some(self.constant_at(data, seed));
                }
                return Some(f);
            }
            log::trace!("expanding fit from {} to {} samples", fit_set.len(), coverage.len());
            match self.fit(data, &coverage) {
                Some(next) => {
                    f = next;
                    fit_set = coverage;
                }
                None => return Some(f),
            }
        }
    }

    fn fit(&self, data: &Dataset, indices: &[usize]) -> Option<AffineFunction> {
        let samples: Vec<(&Point, f32)> = indices
            .iter()
            .map(|&i| {
                let s = data.sample(i);
                (&s.x, s.y)
            })
            .collect();
        self.oracle
            .fit_affine(&samples, data.n_features())
            .filter(AffineFunction::is_finite)
    }

    fn constant_at(&self, data: &Dataset, i: usize) -> AffineFunction {
        AffineFunction::constant(data.n_features(), data.sample(i).y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::LinearOracle;
    use approx::assert_abs_diff_eq;

    fn line_data() -> Dataset {
        // y = 2x on [0, 9], y = 40 - x on [10, 19]
        Dataset::from_rows((0..20).map(|i| {
            let x = i as f32;
            let y = if i < 10 { 2.0 * x } else { 40.0 - x };
            (vec![x], y)
        }))
        .unwrap()
    }

    #[test]
    fn learns_first_piece() {
        let data = line_data();
        let oracle = LinearOracle::default();
        let learner = RegionLearner::new(&oracle, 0.1);
        let f = learner.learn(&data, &vec![false; data.len()]).unwrap();
        assert_abs_diff_eq!(f.weights()[0], 2.0, epsilon = 1e-4);
        assert_abs_diff_eq!(f.constant_term(), 0.0, epsilon = 1e-3);
        let covered = data.iter().filter(|s| learner.covers(&f, &s.x, s.y)).count();
        assert_eq!(covered, 10);
    }

    #[test]
    fn skips_covered_samples() {
        let data = line_data();
        let oracle = LinearOracle::default();
        let learner = RegionLearner::new(&oracle, 0.1);
        let covered: Vec<bool> = (0..data.len()).map(|i| i < 10).collect();
        let f = learner.learn(&data, &covered).unwrap();
        assert_abs_diff_eq!(f.weights()[0], -1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(f.constant_term(), 40.0, epsilon = 1e-3);
    }

    #[test]
    fn nothing_left_to_cover() {
        let data = line_data();
        let oracle = LinearOracle::default();
        let learner = RegionLearner::new(&oracle, 0.1);
        assert!(learner.learn(&data, &vec![true; data.len()]).is_none());
    }

    #[test]
    fn noisy_neighbourhood_falls_back_to_seed_label() {
        // alternating labels: no fit through a neighbourhood covers anything
        let data = Dataset::from_rows((0..6).map(|i| (vec![i as f32], if i % 2 == 0 { 0.0 } else { 100.0 }))).unwrap();
        let oracle = LinearOracle::default();
        let learner = RegionLearner::new(&oracle, 0.1);
        let f = learner.learn(&data, &vec![false; data.len()]).unwrap();
        assert!(learner.covers(&f, &data.sample(0).x, data.sample(0).y));
    }
}
