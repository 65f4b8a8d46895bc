//! Elias-gamma LZ encoder for the two sibling stream layouts.
//!
//! Both layouts share one shape: the first byte raw, then a selector flag per
//! symbol (`0` literal, `1` match), match lengths as an Elias gamma code of
//! `len - 1` and a one-byte offset. They differ in reach:
//!
//! | layout | offsets    | lengths    | end marker (gamma of)  |
//! |--------|------------|------------|------------------------|
//! | mini   | 1..=256    | 2..=256    | 256 (18 bits)          |
//! | full   | 1..=2176   | 2..=65536  | 65536 (34 bits)        |
//!
//! In the full layout, bit 7 of the offset byte selects four extra offset
//! bits: `offset = byte + 1` when clear, otherwise
//! `((bits << 7) | (byte & 0x7F)) + 129`.
//!
//! The parse is the same backward dynamic program the primary codec uses,
//! with one short and (for the full layout) one long offset window.

use tracing::debug;

use super::check_input_len;
use super::index::{Match, MatchIndex};
use super::suffix_min::{length_tiers, SuffixMin};
use crate::bits::{nested_code_bits, BitWriter};
use crate::codec::{Codec, CodecId};
use crate::decode;
use crate::error::{Error, Result};

const LITERAL_BITS: u32 = 9;

/// Selector flag plus the offset byte.
const MATCH_BASE_BITS: u32 = 9;

/// Extra offset bits in the full layout.
const FULL_EXTRA_BITS: u32 = 4;

/// Stream layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// One-byte offsets, short matches. Smallest decoder.
    Mini,
    /// Offsets up to 2176 and lengths up to 65536.
    Full,
}

impl Variant {
    /// Offset window of the one-byte form.
    pub const fn short_window(self) -> usize {
        match self {
            Variant::Mini => 256,
            Variant::Full => 128,
        }
    }

    /// Largest offset the layout can express.
    pub const fn max_offset(self) -> usize {
        match self {
            Variant::Mini => 256,
            Variant::Full => 2176,
        }
    }

    /// Longest match the layout can express.
    pub const fn max_length(self) -> usize {
        match self {
            Variant::Mini => 256,
            Variant::Full => 65536,
        }
    }

    /// Gamma value that terminates the stream.
    pub const fn end_marker(self) -> u32 {
        self.max_length() as u32
    }

    const fn codec_id(self) -> CodecId {
        match self {
            Variant::Mini => CodecId::EliasMini,
            Variant::Full => CodecId::EliasFull,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Step {
    cost: u32,
    length: u32,
    offset: u32,
}

/// Optimal-parse encoder for one sibling layout.
#[derive(Debug, Clone, Copy)]
pub struct EliasLzCodec {
    variant: Variant,
}

impl EliasLzCodec {
    /// Encoder for `variant`.
    pub fn new(variant: Variant) -> Self {
        Self { variant }
    }

    /// Layout this codec writes.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Backward cost pass. Entry `i` holds the cheapest way to encode
    /// `data[i..]`; a length of 1 is a literal.
    fn parse(&self, data: &[u8]) -> Vec<Step> {
        let n = data.len();
        let windows = [self.variant.short_window(), self.variant.max_offset()];
        let found = MatchIndex::new(data).longest_matches(data, &windows);
        let max_length = self.variant.max_length();
        let mut steps = vec![Step::default(); n + 1];
        let mut suffix = SuffixMin::new(n + 1);
        suffix.set(n, 0);

        for i in (1..n).rev() {
            let mut best = Step {
                cost: LITERAL_BITS + steps[i + 1].cost,
                length: 1,
                offset: 0,
            };

            let mut consider = |base: u32, candidate: Match| {
                let longest = (candidate.length as usize).min(max_length);
                for (lo, hi) in length_tiers(longest) {
                    let end = suffix.argmin(i + lo, i + hi);
                    let j = end - i;
                    let cost = base + nested_code_bits(j as u32 - 1) + suffix.cost(end);
                    if cost < best.cost {
                        best = Step {
                            cost,
                            length: j as u32,
                            offset: candidate.offset,
                        };
                    }
                }
            };

            let [short, long] = found[i];
            consider(MATCH_BASE_BITS, short);
            if long.offset as usize > self.variant.short_window() {
                consider(MATCH_BASE_BITS + FULL_EXTRA_BITS, long);
            }

            steps[i] = best;
            suffix.set(i, best.cost);
        }

        steps
    }

    fn emit(&self, data: &[u8], steps: &[Step]) -> Result<Vec<u8>> {
        let n = data.len();
        let mut writer = BitWriter::with_capacity(n + n / 8 + 8);
        writer.write_byte(data[0]);

        let mut i = 1;
        while i < n {
            let step = steps[i];
            if step.length == 1 {
                writer.write_bit(false);
                writer.write_byte(data[i]);
            } else {
                writer.write_bit(true);
                writer.write_elias_gamma(step.length - 1);
                self.write_offset(&mut writer, step.offset)?;
            }
            i += step.length as usize;
        }

        writer.write_bit(true);
        writer.write_elias_gamma(self.variant.end_marker());
        Ok(writer.finish())
    }

    fn write_offset(&self, writer: &mut BitWriter, offset: u32) -> Result<()> {
        let offset = offset as usize;
        if offset == 0 || offset > self.variant.max_offset() {
            return Err(Error::UnsupportedMode(self.variant.codec_id().as_u8()));
        }
        if offset <= self.variant.short_window() {
            writer.write_byte((offset - 1) as u8);
        } else {
            let j = (offset - 129) as u32;
            writer.write_byte(0x80 | (j & 0x7F) as u8);
            writer.write_bits(j >> 7, FULL_EXTRA_BITS as u8);
        }
        Ok(())
    }
}

impl Codec for EliasLzCodec {
    fn id(&self) -> CodecId {
        self.variant.codec_id()
    }

    fn name(&self) -> &'static str {
        match self.variant {
            Variant::Mini => "elias-mini",
            Variant::Full => "elias-full",
        }
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        check_input_len(data)?;
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let steps = self.parse(data);
        let stream = self.emit(data, &steps)?;
        debug!(
            variant = self.name(),
            input = data.len(),
            output = stream.len(),
            bits = steps[1].cost,
            "elias lz compress"
        );
        Ok(stream)
    }

    fn uncompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        decode::elias_lz::unpack(data, self.variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_byte_mini() {
        let stream = EliasLzCodec::new(Variant::Mini).compress(b"Z").unwrap();
        // 1, then gamma(256): 8 zeros, 1, 8 zeros.
        assert_eq!(stream, vec![b'Z', 0x80, 0x40, 0x00]);
    }

    #[test]
    fn test_single_byte_full() {
        let stream = EliasLzCodec::new(Variant::Full).compress(b"Z").unwrap();
        // 1, 16 zeros, 1, 16 zeros: 34 bits over five flag bytes.
        assert_eq!(stream, vec![b'Z', 0x80, 0x00, 0x40, 0x00, 0x00]);
    }

    #[test]
    fn test_repeat_becomes_match() {
        let codec = EliasLzCodec::new(Variant::Mini);
        let data = b"abcabcabcabc";
        let steps = codec.parse(data);
        // a literal "bc" then one overlapping match of 9 at offset 3.
        assert_eq!(steps[1].length, 1);
        assert_eq!(steps[3].length, 9);
        assert_eq!(steps[3].offset, 3);
    }

    #[test]
    fn test_mini_caps_match_length() {
        let codec = EliasLzCodec::new(Variant::Mini);
        let data = vec![0u8; 1000];
        let steps = codec.parse(&data);
        let mut i = 1;
        while i < data.len() {
            assert!(steps[i].length as usize <= Variant::Mini.max_length());
            i += steps[i].length as usize;
        }
    }

    #[test]
    fn test_full_uses_long_offsets() {
        let codec = EliasLzCodec::new(Variant::Full);
        let mut data: Vec<u8> = (0..32u8).map(|i| i.wrapping_mul(29)).collect();
        data.extend((0..1000u32).map(|i| (i.wrapping_mul(2654435761) >> 11) as u8));
        let head = data[..32].to_vec();
        data.extend_from_slice(&head);
        let steps = codec.parse(&data);
        assert_eq!(steps[1032].offset, 1032);
        assert_eq!(steps[1032].length, 32);
    }

    /// Costs of the parse when every match length is tried one by one.
    fn exhaustive_costs(variant: Variant, data: &[u8]) -> Vec<u32> {
        let n = data.len();
        let windows = [variant.short_window(), variant.max_offset()];
        let found = MatchIndex::new(data).longest_matches(data, &windows);
        let mut costs = vec![0u32; n + 1];
        for i in (1..n).rev() {
            let mut best = LITERAL_BITS + costs[i + 1];
            let [short, long] = found[i];
            let mut candidates = vec![(MATCH_BASE_BITS, short)];
            if long.offset as usize > variant.short_window() {
                candidates.push((MATCH_BASE_BITS + FULL_EXTRA_BITS, long));
            }
            for (base, candidate) in candidates {
                let longest = (candidate.length as usize).min(variant.max_length());
                for j in 2..=longest {
                    best = best.min(base + nested_code_bits(j as u32 - 1) + costs[i + j]);
                }
            }
            costs[i] = best;
        }
        costs
    }

    #[test]
    fn test_tiered_parse_is_optimal() {
        let mut data = vec![0u8; 900];
        data.extend(b"abcabd".repeat(120));
        data.extend((0..1500u32).map(|i| (i.wrapping_mul(2654435761) >> 13) as u8 & 7));
        let head = data[..400].to_vec();
        data.extend_from_slice(&head);

        for variant in [Variant::Mini, Variant::Full] {
            let steps = EliasLzCodec::new(variant).parse(&data);
            let costs: Vec<u32> = steps.iter().map(|step| step.cost).collect();
            assert_eq!(costs, exhaustive_costs(variant, &data), "{:?}", variant);
        }
    }

    #[test]
    fn test_long_run_keeps_longest_tied_length() {
        let data = vec![7u8; 5000];
        let steps = EliasLzCodec::new(Variant::Full).parse(&data);
        // One match from position 1 covers the rest of the run.
        assert_eq!(steps[1].length as usize, data.len() - 1);
        assert_eq!(steps[1].offset, 1);
    }

    #[test]
    fn test_offset_out_of_range() {
        let codec = EliasLzCodec::new(Variant::Mini);
        let mut writer = BitWriter::new();
        assert!(codec.write_offset(&mut writer, 257).is_err());
        assert!(codec.write_offset(&mut writer, 256).is_ok());
    }
}
