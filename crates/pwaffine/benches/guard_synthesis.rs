//! Component benchmarks: guard synthesis and end-to-end training.
//!
//! Run with:
//! ```bash
//! cargo bench --bench guard_synthesis
//! ```

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

use pwaffine::data::PointSet;
use pwaffine::model::{GuardParams, OracleParams, PwaConfig, PwaModel};
use pwaffine::oracle::LinearOracle;
use pwaffine::testing::{checkerboard, linearly_separable};
use pwaffine::training::GuardSynthesizer;

fn fast_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .warm_up_time(Duration::from_secs(1))
        .measurement_time(Duration::from_secs(5))
        .sample_size(10)
}

/// Positive and negative checkerboard cells.
fn checkerboard_sets(n: usize) -> (PointSet, PointSet) {
    let data = checkerboard(n);
    let pos = data.iter().filter(|s| s.y > 0.0).map(|s| s.x.clone()).collect();
    let neg = data.iter().filter(|s| s.y < 0.0).map(|s| s.x.clone()).collect();
    (pos, neg)
}

fn bench_checkerboard_guard(c: &mut Criterion) {
    let mut group = c.benchmark_group("guard/checkerboard");
    let params = GuardParams::default();

    for (name, oracle_params) in [
        ("axis_aligned", OracleParams::axis_aligned()),
        ("all_separators", OracleParams::default()),
    ] {
        let oracle = LinearOracle::new(oracle_params);
        for n in [10usize, 30] {
            let (pos, neg) = checkerboard_sets(n);
            group.throughput(Throughput::Elements((n * n) as u64));
            group.bench_with_input(BenchmarkId::new(name, n), &n, |b, _| {
                let synthesizer = GuardSynthesizer::new(&oracle, &params);
                b.iter(|| {
                    let mut rng = StdRng::seed_from_u64(42);
                    black_box(synthesizer.synthesize(&pos, &neg, 2, &mut rng))
                })
            });
        }
    }
    group.finish();
}

fn bench_separable_guard(c: &mut Criterion) {
    let mut group = c.benchmark_group("guard/separable");
    let params = GuardParams::default();
    let oracle = LinearOracle::default();

    for dims in [2usize, 5, 10] {
        let (pos, neg, _) = linearly_separable(400, dims, 0.05, 7);
        group.bench_with_input(BenchmarkId::from_parameter(dims), &dims, |b, &dims| {
            let synthesizer = GuardSynthesizer::new(&oracle, &params);
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(42);
                black_box(synthesizer.synthesize(&pos, &neg, dims, &mut rng))
            })
        });
    }
    group.finish();
}

fn bench_train(c: &mut Criterion) {
    let mut group = c.benchmark_group("train/checkerboard");
    for n in [10usize, 20] {
        let data = checkerboard(n);
        let config = PwaConfig::builder()
            .threshold(0.1)
            .oracle(OracleParams::axis_aligned())
            .build()
            .expect("valid config");
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| black_box(PwaModel::train(&data, config.clone())))
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = fast_criterion();
    targets = bench_checkerboard_guard, bench_separable_guard, bench_train
}
criterion_main!(benches);
