//! Optimal-parse LZ compressor producing Pletter streams.
//!
//! The parse runs in three passes:
//!
//! 1. [`MatchIndex`] chains every position to earlier positions with the same
//!    two leading bytes.
//! 2. For each of seven offset windows ("modes") the longest match at every
//!    position is recorded. A wider mode starts from the narrower mode's best
//!    match and keeps walking the chain, so match lengths never shrink as the
//!    window grows.
//! 3. A backward dynamic program computes, per position, the cheapest bit cost
//!    to the end of input. It runs once for each long-offset mode (1..=6) and
//!    the cheapest mode is kept. Match lengths with the same code length are
//!    settled by one range-minimum query, so a pass is `O(n log n)` even on
//!    long runs.
//!
//! # Stream layout
//!
//! ```text
//! [len lo][len hi]          optional length prefix
//! 3 flag bits               mode - 1
//! byte                      first input byte
//! then per symbol:
//!   0, byte                 literal
//!   1, nested(len-1), byte  match, offset 1..=128: byte = offset-1
//!   1, nested(len-1), byte, extra bits
//!                           match, offset > 128: j = offset-129,
//!                           byte = 0x80 | j&0x7F, extra bits = j>>7
//! 34 one bits               end marker
//! ```
//!
//! Flag bits share flag bytes interleaved with data bytes; see
//! [`crate::bits::BitWriter`].

use std::sync::LazyLock;

use tracing::{debug, trace};

use super::check_input_len;
use super::index::{Match, MatchIndex};
use super::suffix_min::{length_tiers, SuffixMin};
use crate::bits::{nested_code_bits, BitWriter};
use crate::codec::{Codec, CodecId};
use crate::decode;
use crate::error::{Error, Result};

/// Number of offset windows.
pub const MODE_COUNT: usize = 7;

/// Largest offset reachable in each mode.
pub const MODE_WINDOWS: [usize; MODE_COUNT] = [128, 256, 640, 1152, 2176, 4224, 8320];

/// Offsets up to this value use the one-byte short form.
const SHORT_WINDOW: u32 = MODE_WINDOWS[0] as u32;

/// Flag bit plus the data byte.
const LITERAL_BITS: u32 = 9;

const MODE_BITS: u8 = 3;

/// Length of the end-of-stream run of one bits.
pub const END_MARKER_BITS: u32 = 34;

/// Cost in bits of the nested length code for every 16-bit value.
static NESTED_COST: LazyLock<Vec<u8>> = LazyLock::new(|| {
    (0..=u16::MAX as u32)
        .map(|v| if v == 0 { 0 } else { nested_code_bits(v) as u8 })
        .collect()
});

/// Extra high offset bits sent after the offset byte in `mode`.
#[inline]
const fn extra_bits(mode: usize) -> u32 {
    if mode == 1 {
        0
    } else {
        mode as u32
    }
}

/// How the symbol at a position is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Symbol {
    /// Flag bit and the raw byte.
    #[default]
    Literal,
    /// Match with a one-byte offset (1..=128).
    Short,
    /// Match with an offset in the selected mode's window.
    Long,
}

/// Cheapest encoding from one position to the end of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CostEntry {
    /// Bits needed from this position to the end of input.
    pub cost: u32,
    /// Symbol emitted at this position.
    pub symbol: Symbol,
    /// Bytes covered by the symbol (1 for literals).
    pub length: u32,
    /// Match offset, 0 for literals.
    pub offset: u32,
}

/// Longest match per mode at one position.
type PositionMeta = [Match; MODE_COUNT];

/// Which long-offset mode the parse may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeSelection {
    /// Try modes 1 through 6 and keep the smallest stream.
    #[default]
    Auto,
    /// Parse with one mode (1..=6).
    Fixed(u8),
    /// Literals and short-offset matches only.
    ShortOnly,
}

/// The chosen parse for one input.
#[derive(Debug, Clone)]
pub struct Plan {
    mode: u8,
    costs: Vec<CostEntry>,
    length_prefix: bool,
}

impl Plan {
    /// Selected mode (1..=6).
    pub fn mode(&self) -> u8 {
        self.mode
    }

    /// One entry per position plus the terminal entry at `len`.
    ///
    /// Position 0 is always sent raw and carries no decision.
    pub fn costs(&self) -> &[CostEntry] {
        &self.costs
    }

    /// Bits spent on symbols after the first byte.
    pub fn parse_bits(&self) -> u32 {
        parse_cost(&self.costs)
    }

    /// Total bits of the emitted stream before padding to whole bytes.
    pub fn stream_bits(&self) -> u32 {
        if self.costs.len() <= 1 {
            return 0;
        }
        let prefix = if self.length_prefix { 16 } else { 0 };
        prefix + MODE_BITS as u32 + 8 + self.parse_bits() + END_MARKER_BITS
    }

    /// Symbols along the chosen path, with their positions.
    pub fn steps(&self) -> impl Iterator<Item = (usize, CostEntry)> + '_ {
        let end = self.costs.len().saturating_sub(1);
        let mut pos = 1;
        std::iter::from_fn(move || {
            if pos >= end {
                return None;
            }
            let entry = self.costs[pos];
            let at = pos;
            pos += entry.length as usize;
            Some((at, entry))
        })
    }
}

/// Optimal-parse codec writing the Pletter stream format.
#[derive(Debug, Clone, Default)]
pub struct PletterCodec {
    selection: ModeSelection,
    length_prefix: bool,
}

impl PletterCodec {
    /// Codec with automatic mode selection and no length prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict or fix the mode used by the parse.
    pub fn with_selection(mut self, selection: ModeSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Prefix streams with the 16-bit little-endian input length.
    pub fn with_length_prefix(mut self, enabled: bool) -> Self {
        self.length_prefix = enabled;
        self
    }

    /// Run the index, metadata and cost passes without emitting.
    pub fn plan(&self, data: &[u8]) -> Result<Plan> {
        check_input_len(data)?;
        let n = data.len();
        if n == 0 {
            return Ok(Plan {
                mode: 1,
                costs: vec![CostEntry::default()],
                length_prefix: self.length_prefix,
            });
        }

        let meta = MatchIndex::new(data).longest_matches(data, &MODE_WINDOWS);

        let (mode, costs) = match self.selection {
            ModeSelection::Auto => {
                let mut best: Option<(usize, Vec<CostEntry>)> = None;
                for mode in 1..MODE_COUNT {
                    let costs = cost_pass(&meta, n, Some(mode));
                    trace!(mode, bits = parse_cost(&costs), "cost pass");
                    let better = match &best {
                        Some((_, current)) => parse_cost(&costs) < parse_cost(current),
                        None => true,
                    };
                    if better {
                        best = Some((mode, costs));
                    }
                }
                best.ok_or(Error::UnsupportedMode(0))?
            }
            ModeSelection::Fixed(mode) => {
                if !(1..MODE_COUNT as u8).contains(&mode) {
                    return Err(Error::UnsupportedMode(mode));
                }
                let mode = mode as usize;
                (mode, cost_pass(&meta, n, Some(mode)))
            }
            ModeSelection::ShortOnly => (1, cost_pass(&meta, n, None)),
        };

        Ok(Plan {
            mode: mode as u8,
            costs,
            length_prefix: self.length_prefix,
        })
    }
}

impl Codec for PletterCodec {
    fn id(&self) -> CodecId {
        CodecId::Pletter
    }

    fn name(&self) -> &'static str {
        "pletter"
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let plan = self.plan(data)?;
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let stream = emit(data, &plan)?;
        debug!(
            input = data.len(),
            output = stream.len(),
            mode = plan.mode,
            bits = plan.stream_bits(),
            "pletter compress"
        );
        Ok(stream)
    }

    fn uncompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        decode::pletter::unpack(data, self.length_prefix)
    }
}

#[inline]
fn parse_cost(costs: &[CostEntry]) -> u32 {
    costs.get(1).map_or(0, |entry| entry.cost)
}

/// Backward cost pass. `mode` of `None` disables long-offset matches.
fn cost_pass(meta: &[PositionMeta], n: usize, mode: Option<usize>) -> Vec<CostEntry> {
    let nested = &*NESTED_COST;
    let mut costs = vec![CostEntry::default(); n + 1];
    let mut suffix = SuffixMin::new(n + 1);
    suffix.set(n, 0);

    for i in (1..n).rev() {
        let mut best = CostEntry {
            cost: LITERAL_BITS + costs[i + 1].cost,
            symbol: Symbol::Literal,
            length: 1,
            offset: 0,
        };

        let mut consider = |symbol: Symbol, base: u32, found: Match| {
            // Every prefix of at least two bytes is a candidate. Longer
            // tiers come first and only a strictly cheaper one replaces
            // them, so ties keep the longest length.
            for (lo, hi) in length_tiers(found.length as usize) {
                let end = suffix.argmin(i + lo, i + hi);
                let j = end - i;
                let cost = base + nested[j - 1] as u32 + suffix.cost(end);
                if cost < best.cost {
                    best = CostEntry {
                        cost,
                        symbol,
                        length: j as u32,
                        offset: found.offset,
                    };
                }
            }
        };

        let short = meta[i][0];
        consider(Symbol::Short, LITERAL_BITS, short);
        if let Some(mode) = mode {
            consider(Symbol::Long, LITERAL_BITS + extra_bits(mode), meta[i][mode]);
        }

        costs[i] = best;
        suffix.set(i, best.cost);
    }

    costs
}

fn emit(data: &[u8], plan: &Plan) -> Result<Vec<u8>> {
    let n = data.len();
    let mode = plan.mode as usize;
    let extra = extra_bits(mode);
    let mut writer = BitWriter::with_capacity(n + n / 8 + 8);

    if plan.length_prefix {
        let [lo, hi] = (n as u16).to_le_bytes();
        writer.write_byte(lo);
        writer.write_byte(hi);
    }
    writer.write_bits(mode as u32 - 1, MODE_BITS);
    writer.write_byte(data[0]);

    for (pos, step) in plan.steps() {
        match step.symbol {
            Symbol::Literal => {
                writer.write_bit(false);
                writer.write_byte(data[pos]);
            }
            Symbol::Short => {
                debug_assert!((1..=SHORT_WINDOW).contains(&step.offset));
                writer.write_bit(true);
                writer.write_nested(step.length - 1);
                writer.write_byte((step.offset - 1) as u8);
            }
            Symbol::Long => {
                let j = step
                    .offset
                    .checked_sub(SHORT_WINDOW + 1)
                    .filter(|j| j >> (7 + extra) == 0)
                    .ok_or(Error::UnsupportedMode(plan.mode))?;
                writer.write_bit(true);
                writer.write_nested(step.length - 1);
                writer.write_byte(0x80 | (j & 0x7F) as u8);
                if extra > 0 {
                    writer.write_bits(j >> 7, extra as u8);
                }
            }
        }
    }

    for _ in 0..END_MARKER_BITS {
        writer.write_bit(true);
    }
    Ok(writer.finish())
}
