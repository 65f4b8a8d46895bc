//! Pletter stream decoder.
//!
//! Mirrors the Z80 unpack routine: the main register set keeps the stream
//! pointer (HL) and output pointer (DE), the alternate set accumulates match
//! lengths in HL' with DE' fixed at 1, and the mode decides how many high
//! offset bits follow a long offset byte.

use tracing::debug;

use super::machine::Machine;
use crate::cpu::{Flag, Pair, Reg};
use crate::error::{Error, Result};

/// Highest valid value of the 3 mode bits.
const MAX_MODE_BITS: u8 = 5;

/// Decode a Pletter stream.
///
/// With `length_prefix` the stream starts with the decoded length as a
/// little-endian `u16`, which is checked against the result.
pub fn unpack(stream: &[u8], length_prefix: bool) -> Result<Vec<u8>> {
    let (expected, body) = if length_prefix {
        match stream {
            [] => return Ok(Vec::new()),
            [lo, hi, body @ ..] => (Some(u16::from_le_bytes([*lo, *hi]) as usize), body),
            _ => return Err(Error::malformed("truncated length prefix")),
        }
    } else {
        (None, stream)
    };

    let output = if body.is_empty() {
        Vec::new()
    } else {
        run(body)?
    };

    if let Some(expected) = expected {
        if expected != output.len() {
            return Err(Error::malformed(format!(
                "length prefix says {} bytes, stream holds {}",
                expected,
                output.len()
            )));
        }
    }
    Ok(output)
}

fn run(stream: &[u8]) -> Result<Vec<u8>> {
    let mut m = Machine::load(stream)?;

    // Mode bits: shift three bits out of the first flag byte into E', leaving
    // a sentinel bit in A, then double E' to index the mode table.
    m.fetch(Reg::A)?;
    m.exx();
    m.set_pair(Pair::DE, 0);
    m.add_a(Reg::A);
    m.inc(Reg::A);
    m.rl(Reg::E);
    m.add_a(Reg::A);
    m.rl(Reg::E);
    m.add_a(Reg::A);
    m.rl(Reg::E);
    m.rl(Reg::E);
    let mode_bits = m.reg(Reg::E) >> 1;
    if mode_bits > MAX_MODE_BITS {
        return Err(Error::malformed(format!("invalid mode bits {}", mode_bits)));
    }
    let mode = mode_bits + 1;
    m.set_reg(Reg::E, 1);
    m.exx();

    m.copy_literal()?;
    loop {
        m.next_bit()?;
        if !m.carry() {
            m.copy_literal()?;
            continue;
        }

        if !read_length(&mut m)? {
            // End marker: the routine returns from the alternate set.
            m.exx();
            break;
        }

        m.fetch(Reg::C)?;
        m.set_reg(Reg::B, 0);
        m.bit(7, Reg::C);
        if !m.flag(Flag::Zero) && mode > 1 {
            read_high_offset_bits(&mut m, mode)?;
        }

        m.inc_pair(Pair::BC);
        m.push(Pair::HL)?;
        m.exx();
        m.push(Pair::HL)?;
        m.exx();
        let (d, e) = (m.reg(Reg::D), m.reg(Reg::E));
        m.set_reg(Reg::H, d);
        m.set_reg(Reg::L, e);
        m.sbc_hl(Pair::BC);
        m.check_borrow()?;
        m.pop(Pair::BC)?;
        m.copy_match()?;
        m.pop(Pair::HL)?;
    }

    // The routine stops one bit short of the 34-bit marker. That last one
    // bit and the zero padding after it are either still in A, above the
    // sentinel, or alone in a final flag byte when A has run dry.
    let buffer = m.reg(Reg::A);
    match m.remaining() {
        [] if buffer & 0x80 != 0 && buffer.count_ones() == 2 => {}
        [0x80] if buffer == 0x80 => {}
        [] | [0x80] => return Err(Error::malformed("bad end marker padding")),
        rest => {
            return Err(Error::malformed(format!(
                "{} bytes after end marker",
                rest.len()
            )))
        }
    }

    let output = m.into_output();
    debug!(mode, input = stream.len(), output = output.len(), "pletter unpack");
    Ok(output)
}

/// Nested length code into HL'. Returns `false` when the accumulator
/// carries out of 16 bits, which is the end marker.
///
/// Leaves the main set active on success and the alternate set on the end
/// marker.
fn read_length(m: &mut Machine<'_>) -> Result<bool> {
    m.exx();
    let (d, e) = (m.reg(Reg::D), m.reg(Reg::E));
    m.set_reg(Reg::H, d);
    m.set_reg(Reg::L, e);

    m.next_bit_alt()?;
    while m.carry() {
        m.next_bit_alt()?;
        m.adc_hl(Pair::HL);
        if m.carry() {
            return Ok(false);
        }
        m.next_bit_alt()?;
    }

    m.inc_pair(Pair::HL);
    m.exx();
    Ok(true)
}

/// `mode - 1` bits rotated into B, then one bit that carries bit 7 of C
/// over into B.
fn read_high_offset_bits(m: &mut Machine<'_>, mode: u8) -> Result<()> {
    for _ in 1..mode {
        m.next_bit()?;
        m.rl(Reg::B);
    }
    m.next_bit()?;
    if m.carry() {
        m.or_a(Reg::A);
        m.inc(Reg::B);
        m.res(7, Reg::C);
    }
    Ok(())
}
