//! Region learner integration tests.
//!
//! Runs the discovery loop the assembler uses: learn a function, mark what
//! it covers, repeat until every sample is covered.

use approx::assert_abs_diff_eq;
use rstest::rstest;

use pwaffine::data::Dataset;
use pwaffine::oracle::{LinearOracle, SeparationOracle};
use pwaffine::repr::AffineFunction;
use pwaffine::testing::{labelled_by, piecewise_line};
use pwaffine::training::RegionLearner;

fn discover(learner: &RegionLearner<'_, LinearOracle>, data: &Dataset) -> Vec<AffineFunction> {
    let mut covered = vec![false; data.len()];
    let mut functions = Vec::new();
    while let Some(f) = learner.learn(data, &covered) {
        let mut newly = 0;
        for (i, s) in data.iter().enumerate() {
            if !covered[i] && learner.covers(&f, &s.x, s.y) {
                covered[i] = true;
                newly += 1;
            }
        }
        assert!(newly > 0, "learned function covers no uncovered sample");
        functions.push(f);
        assert!(functions.len() <= data.len());
    }
    assert!(covered.iter().all(|&c| c));
    functions
}

#[test]
fn one_function_per_line_piece() {
    let pieces = [(1.0, 0.0), (-2.0, 50.0), (0.5, 5.0)];
    let data = piecewise_line(10, &pieces);
    let oracle = LinearOracle::default();
    let learner = RegionLearner::new(&oracle, 0.1);

    let functions = discover(&learner, &data);
    assert_eq!(functions.len(), pieces.len());
    for (f, &(slope, intercept)) in functions.iter().zip(&pieces) {
        assert_abs_diff_eq!(f.weights()[0], slope, epsilon = 1e-3);
        assert_abs_diff_eq!(f.constant_term(), intercept, epsilon = 1e-2);
    }
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(6)]
fn affine_data_needs_one_function(#[case] dims: usize) {
    let f = |x: &[f32]| x.iter().enumerate().map(|(i, v)| (i as f32 + 1.0) * v).sum::<f32>() - 2.0;
    let data = labelled_by(f, 150, dims, 21);
    let oracle = LinearOracle::default();
    let learner = RegionLearner::new(&oracle, 0.05);

    let functions = discover(&learner, &data);
    assert_eq!(functions.len(), 1);
    let learned = &functions[0];
    for i in 0..dims {
        assert_abs_diff_eq!(learned.weights()[i], i as f32 + 1.0, epsilon = 1e-3);
    }
    assert_abs_diff_eq!(learned.constant_term(), -2.0, epsilon = 1e-2);
}

#[test]
fn learned_function_is_a_fixed_point_of_refitting() {
    let data = piecewise_line(15, &[(3.0, 1.0), (-1.0, 80.0)]);
    let oracle = LinearOracle::default();
    let learner = RegionLearner::new(&oracle, 0.1);

    let f = learner.learn(&data, &vec![false; data.len()]).unwrap();
    let coverage: Vec<_> = data
        .iter()
        .filter(|s| learner.covers(&f, &s.x, s.y))
        .map(|s| (&s.x, s.y))
        .collect();
    let refit = oracle.fit_affine(&coverage, 1).unwrap();

    let recovered = data.iter().filter(|s| learner.covers(&refit, &s.x, s.y)).count();
    assert_eq!(recovered, coverage.len());
    assert_abs_diff_eq!(refit.weights()[0], f.weights()[0], epsilon = 1e-3);
}

#[test]
fn learning_is_deterministic() {
    let data = piecewise_line(8, &[(1.0, 0.0), (0.0, 3.0), (2.0, -20.0)]);
    let oracle = LinearOracle::default();
    let learner = RegionLearner::new(&oracle, 0.2);
    assert_eq!(discover(&learner, &data), discover(&learner, &data));
}
