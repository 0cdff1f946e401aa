//! Learn a piecewise constant model of a 2D checkerboard.
//!
//! The grid `1..=n` squared is labelled `1` on two opposite quadrants and
//! `-1` on the others. The learned model needs two functions and a guard
//! that carves out one diagonal pair of quadrants.
//!
//! Run with:
//! ```bash
//! cargo run --example checkerboard
//! ```

use pwaffine::inference::infer;
use pwaffine::model::{OracleParams, PwaConfig, PwaModel};
use pwaffine::persist::{JsonWriteOptions, SerializableModel};
use pwaffine::testing::checkerboard;
use pwaffine::Parallelism;

fn main() {
    // =========================================================================
    // 1. Prepare Data
    // =========================================================================
    let n = 40;
    let data = checkerboard(n);
    println!("Checkerboard: {} samples, {} features\n", data.len(), data.n_features());

    // =========================================================================
    // 2. Configure and Train
    // =========================================================================
    let config = PwaConfig::builder()
        .threshold(0.1)
        .oracle(OracleParams::axis_aligned())
        .build()
        .expect("Invalid configuration");

    let (model, report) = PwaModel::train_with_report(&data, config).expect("Training failed");
    println!("Discovered {} functions, {} regions", report.n_functions(), model.model().n_regions());
    println!("Exact: {}\n", report.is_exact());

    // =========================================================================
    // 3. Inspect
    // =========================================================================
    println!("{}", model.display_raw());
    println!("{}", model.summary());

    // =========================================================================
    // 4. Evaluate
    // =========================================================================
    let result = infer(&model, &data, Some(0.1), Parallelism::Sequential);
    println!("RMSE: {:.4}", result.rmse);
    if let Some(precision) = result.precision {
        println!("Precision: {precision:.4}");
    }

    for x in [[1.0, 1.0], [n as f32, 1.0], [n as f32 / 2.0 + 0.5, n as f32 / 2.0 + 0.5]] {
        println!("f({:?}) = {}", x, model.evaluate(&x));
    }

    // =========================================================================
    // 5. Save
    // =========================================================================
    let json = model
        .to_json_string(&JsonWriteOptions::compact())
        .expect("Serialization failed");
    println!("\nSerialized model: {} bytes", json.len());
}
