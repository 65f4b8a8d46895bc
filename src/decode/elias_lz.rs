//! Decoder for the Elias-gamma LZ layouts.
//!
//! Lengths are read the way the runtime routine does it: D counts the
//! leading zero bits, then the gamma value is rotated into BC one bit at a
//! time. The full layout's end marker is a value whose leading bit carries
//! out of B; the mini layout stops at 256 and tests B instead.

use tracing::debug;

use super::machine::Machine;
use crate::compress::elias_lz::Variant;
use crate::cpu::{Flag, Pair, Reg};
use crate::error::{Error, Result};

/// Largest D the size loop may reach (leading zeros plus one).
const fn max_code_width(variant: Variant) -> u8 {
    match variant {
        Variant::Mini => 9,
        Variant::Full => 17,
    }
}

/// Decode a stream written in the given layout.
pub fn unpack(stream: &[u8], variant: Variant) -> Result<Vec<u8>> {
    if stream.is_empty() {
        return Ok(Vec::new());
    }
    let mut m = Machine::load(stream)?;

    m.set_reg(Reg::A, 0x80);
    m.copy_literal()?;
    loop {
        m.next_bit()?;
        if !m.carry() {
            m.copy_literal()?;
            continue;
        }

        m.push(Pair::DE)?;
        if !read_length(&mut m, variant)? {
            m.pop(Pair::DE)?;
            break;
        }

        m.fetch(Reg::E)?;
        match variant {
            Variant::Mini => {
                m.inc_pair(Pair::DE);
                m.ex_sp_hl()?;
                m.push(Pair::HL)?;
                m.or_a(Reg::A);
            }
            Variant::Full => {
                m.sll(Reg::E);
                if m.carry() {
                    read_high_offset_bits(&mut m)?;
                }
                m.rr(Reg::E);
                m.ex_sp_hl()?;
                m.push(Pair::HL)?;
            }
        }
        m.sbc_hl(Pair::DE);
        m.check_borrow()?;
        m.pop(Pair::DE)?;
        m.copy_match()?;
        m.pop(Pair::HL)?;
    }

    if !m.remaining().is_empty() {
        return Err(Error::malformed(format!(
            "{} bytes after end marker",
            m.remaining().len()
        )));
    }

    let output = m.into_output();
    debug!(
        ?variant,
        input = stream.len(),
        output = output.len(),
        "elias lz unpack"
    );
    Ok(output)
}

/// Gamma-coded `length - 1` into BC, then BC incremented. Returns `false`
/// on the end marker. D is zero afterwards.
fn read_length(m: &mut Machine<'_>, variant: Variant) -> Result<bool> {
    m.set_pair(Pair::BC, 0);
    m.set_reg(Reg::D, 0);

    loop {
        m.inc(Reg::D);
        if m.reg(Reg::D) > max_code_width(variant) {
            return Err(Error::malformed("length code too long"));
        }
        m.next_bit()?;
        if m.carry() {
            break;
        }
    }

    loop {
        if !m.carry() {
            m.next_bit()?;
        }
        m.rl(Reg::C);
        m.rl(Reg::B);
        if m.carry() {
            return Ok(false);
        }
        m.dec(Reg::D);
        if m.flag(Flag::Zero) {
            break;
        }
    }

    if variant == Variant::Mini {
        m.inc(Reg::B);
        m.dec(Reg::B);
        if !m.flag(Flag::Zero) {
            return match m.pair(Pair::BC) {
                0x100 => Ok(false),
                value => Err(Error::malformed(format!("length code {} out of range", value))),
            };
        }
    }

    m.inc_pair(Pair::BC);
    Ok(true)
}

/// Four bits shifted into D behind a marker bit, then folded with the
/// offset byte so that DE = offset - 1 and carry is set.
fn read_high_offset_bits(m: &mut Machine<'_>) -> Result<()> {
    m.set_reg(Reg::D, 0x10);
    loop {
        m.next_bit()?;
        m.rl(Reg::D);
        if m.carry() {
            break;
        }
    }
    m.inc(Reg::D);
    m.srl(Reg::D);
    Ok(())
}
