//! Fuzz target for the JSON model reader.
//!
//! Arbitrary bytes must either load as a valid model or produce a
//! `ReadError`. A model that loads must evaluate without panicking.
//!
//! Run with:
//! ```sh
//! cargo +nightly fuzz run fuzz_json_read
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

use pwaffine::persist::SerializableModel;
use pwaffine::PwaModel;

fuzz_target!(|data: &[u8]| {
    if let Ok(model) = PwaModel::read_json_from(Cursor::new(data)) {
        let x = vec![0.5; model.meta().n_features];
        let _ = model.evaluate(&x);
    }
});
