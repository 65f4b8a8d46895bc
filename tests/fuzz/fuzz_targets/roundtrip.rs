//! Fuzz target for codec round trips.
//!
//! Every in-crate codec must reproduce its input exactly.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use retropack::{Codec, CodecId, Registry};

/// Structured input for round-trip fuzzing.
#[derive(Arbitrary, Debug)]
struct RoundtripInput {
    /// Codec id, reduced to the built-in range.
    codec: u8,
    /// Raw data to compress
    data: Vec<u8>,
}

fuzz_target!(|input: RoundtripInput| {
    if input.data.len() > retropack::MAX_INPUT_LEN {
        return;
    }

    let registry = Registry::builtin();
    let id = input.codec % (CodecId::EliasFull.as_u8() + 1);
    let codec: &dyn Codec = registry.get(id).expect("built-in codec");

    let packed = codec.compress(&input.data).expect("compress");
    let unpacked = codec.uncompress(&packed).expect("uncompress");
    assert_eq!(unpacked, input.data, "{} round trip mismatch", codec.name());
});
