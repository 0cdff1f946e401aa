//! File round trips for trained models.

use pwaffine::baseline::GaussianNaiveBayes;
use pwaffine::model::{OracleParams, PwaConfig, PwaModel};
use pwaffine::persist::{JsonWriteOptions, SerializableModel};
use pwaffine::repr::PiecewiseModel;
use pwaffine::testing::{checkerboard, piecewise_line};

fn trained_checkerboard() -> PwaModel {
    let config = PwaConfig::builder()
        .threshold(0.1)
        .oracle(OracleParams::axis_aligned())
        .build()
        .unwrap();
    PwaModel::train(&checkerboard(12), config).unwrap()
}

#[test]
fn trained_model_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let model = trained_checkerboard();

    model.save_json(&path, &JsonWriteOptions::pretty()).unwrap();
    let loaded = PwaModel::load_json(&path).unwrap();

    assert_eq!(loaded.model(), model.model());
    assert_eq!(loaded.meta(), model.meta());
    for s in checkerboard(12).iter() {
        assert_eq!(loaded.evaluate(&s.x), model.evaluate(&s.x));
    }
}

#[test]
fn lp_guards_survive_the_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("line.json");
    let data = piecewise_line(10, &[(1.0, 0.0), (-2.0, 50.0)]);
    let model = PwaModel::train(&data, PwaConfig::builder().threshold(0.2).build().unwrap()).unwrap();

    model.save_json(&path, &JsonWriteOptions::compact()).unwrap();
    let loaded = PiecewiseModel::load_json(&path).unwrap();

    assert_eq!(&loaded, model.model());
    for s in data.iter() {
        assert_eq!(loaded.evaluate(&s.x), model.evaluate(&s.x));
    }
}

#[test]
fn feature_names_are_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("named.json");
    let model = trained_checkerboard().with_feature_names(vec!["row".into(), "col".into()]);

    model.save_json(&path, &JsonWriteOptions::default()).unwrap();
    let loaded = PwaModel::load_json(&path).unwrap();
    assert_eq!(loaded.meta().feature_name(1), "col");
}

#[test]
fn naive_bayes_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nb.json");
    let data = piecewise_line(6, &[(0.0, 1.0), (0.0, 3.0)]);
    let nb = GaussianNaiveBayes::fit(&data).unwrap();

    nb.save_json(&path, &JsonWriteOptions::pretty()).unwrap();
    let loaded = GaussianNaiveBayes::load_json(&path).unwrap();

    assert_eq!(loaded.classes(), nb.classes());
    assert_eq!(loaded.priors(), nb.priors());
    assert_eq!(loaded.means(), nb.means());
    assert_eq!(loaded.variances(), nb.variances());
}

#[test]
fn naive_bayes_file_is_not_a_piecewise_model() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nb.json");
    let nb = GaussianNaiveBayes::fit(&checkerboard(4)).unwrap();
    nb.save_json(&path, &JsonWriteOptions::compact()).unwrap();

    assert!(PwaModel::load_json(&path).is_err());
}
