//! Fuzz target for the CPU-modeled decoders.
//!
//! Arbitrary bytes must decode or fail with an error, never panic or hang.

#![no_main]

use libfuzzer_sys::fuzz_target;
use retropack::decode::{elias_lz, pletter};
use retropack::Variant;

fuzz_target!(|data: &[u8]| {
    let _ = pletter::unpack(data, false);
    let _ = pletter::unpack(data, true);
    let _ = elias_lz::unpack(data, Variant::Mini);
    let _ = elias_lz::unpack(data, Variant::Full);
});
