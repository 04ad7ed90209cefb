#![no_main]

use kinema::spatial::{
    SpatialInertia, SpatialTransform, inertia::fuzzing::fuzz_test_spatial_inertia_transform,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (SpatialInertia, SpatialTransform)| {
    fuzz_test_spatial_inertia_transform(input);
});
