#![no_main]

use kinema::math::polar::fuzzing::{ArbitraryMatrix3, fuzz_test_polar_decomposition};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|matrix: ArbitraryMatrix3| {
    fuzz_test_polar_decomposition(matrix);
});
