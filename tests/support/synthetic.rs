//! Synthetic test data generation.
//!
//! Generates deterministic byte patterns shaped like the data the codecs
//! see in practice: tile patterns, sprite masks, text and noise. All
//! functions produce reproducible output suitable for regression testing.

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Uniform random bytes.
pub fn noise(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.gen()).collect()
}

/// Repeated English text.
pub fn text(len: usize) -> Vec<u8> {
    let pattern = b"The quick brown fox jumps over the lazy dog. ";
    pattern.iter().copied().cycle().take(len).collect()
}

/// Tile rows drawn from a small set of row patterns, with the occasional
/// random row.
pub fn tiles(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let rows = [0x00, 0xFF, 0x18, 0x3C, 0x7E, 0x81];
    (0..len)
        .map(|_| {
            if rng.gen_bool(0.1) {
                rng.gen()
            } else {
                rows[rng.gen_range(0..rows.len())]
            }
        })
        .collect()
}

/// Long runs of one value broken by short bursts, like sprite masks.
pub fn runs(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        let value = if rng.gen_bool(0.7) { 0 } else { rng.gen() };
        let run = rng.gen_range(1..600);
        out.extend(std::iter::repeat(value).take(run));
    }
    out.truncate(len);
    out
}

/// A random block repeated after gaps of random filler, to force long
/// offsets.
pub fn far_repeats(block: usize, gap: usize, copies: usize, seed: u64) -> Vec<u8> {
    let head = noise(block, seed);
    let mut out = Vec::new();
    for i in 0..copies {
        out.extend_from_slice(&head);
        out.extend(noise(gap, seed.wrapping_add(i as u64 + 1)));
    }
    out
}
