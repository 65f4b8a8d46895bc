//! Guarded CPU wrapper shared by the decoders.

use std::ops::{Deref, DerefMut};

use crate::cpu::{CpuState, Flag, Pair, Reg, MEMORY_SIZE};
use crate::error::{Error, Result};

/// A [`CpuState`] with a compressed stream loaded at the top of memory.
///
/// Register conventions follow the unpack routines: HL walks the stream, DE
/// is the output pointer and A holds the flag-bit buffer.
pub(crate) struct Machine<'a> {
    cpu: CpuState,
    stream: &'a [u8],
    stream_start: u16,
}

impl<'a> Machine<'a> {
    /// Load a non-empty `stream` so that its last byte sits at `0xFFFF`.
    pub fn load(stream: &'a [u8]) -> Result<Self> {
        if stream.is_empty() || stream.len() >= MEMORY_SIZE {
            return Err(Error::malformed(format!(
                "stream of {} bytes does not fit the address space",
                stream.len()
            )));
        }
        let stream_start = (MEMORY_SIZE - stream.len()) as u16;
        let mut cpu = CpuState::new();
        cpu.load(stream_start, stream)?;
        cpu.set_pair(Pair::HL, stream_start);
        cpu.set_pair(Pair::DE, 0);
        Ok(Self {
            cpu,
            stream,
            stream_start,
        })
    }

    /// HL must still point into the stream. Reading the byte at `0xFFFF`
    /// wraps HL to 0, which also fails this check.
    fn check_source(&self) -> Result<()> {
        if self.pair(Pair::HL) < self.stream_start {
            return Err(Error::malformed("truncated stream"));
        }
        Ok(())
    }

    fn check_room(&self, count: usize) -> Result<()> {
        if self.pair(Pair::DE) as usize + count > self.stream_start as usize {
            return Err(Error::malformed("output overruns the compressed stream"));
        }
        Ok(())
    }

    /// `ld r,(hl); inc hl`
    pub fn fetch(&mut self, dst: Reg) -> Result<()> {
        self.check_source()?;
        self.ld_indirect(dst, Pair::HL);
        self.inc_pair(Pair::HL);
        Ok(())
    }

    /// `add a,a`, refilling A from the stream once the buffer runs dry.
    /// Leaves the next flag bit in carry.
    pub fn next_bit(&mut self) -> Result<()> {
        self.add_a(Reg::A);
        if self.flag(Flag::Zero) {
            self.fetch(Reg::A)?;
            self.rla();
        }
        Ok(())
    }

    /// [`Machine::next_bit`] for code running on the alternate register set:
    /// the refill switches back to reach the stream pointer.
    pub fn next_bit_alt(&mut self) -> Result<()> {
        self.add_a(Reg::A);
        if self.flag(Flag::Zero) {
            self.exx();
            let fetched = self.fetch(Reg::A);
            self.exx();
            fetched?;
            self.rla();
        }
        Ok(())
    }

    /// `ldi` of one literal byte from the stream to the output.
    pub fn copy_literal(&mut self) -> Result<()> {
        self.check_source()?;
        self.check_room(1)?;
        self.ldi();
        Ok(())
    }

    /// Reject a back reference whose `sbc hl,rr` borrowed: the source would
    /// lie before the start of the output.
    pub fn check_borrow(&self) -> Result<()> {
        if self.carry() {
            return Err(Error::malformed("offset points before the output start"));
        }
        Ok(())
    }

    /// `ldir` of a back reference. BC of zero copies 65536 bytes.
    pub fn copy_match(&mut self) -> Result<()> {
        let count = match self.pair(Pair::BC) {
            0 => MEMORY_SIZE,
            n => n as usize,
        };
        self.check_room(count)?;
        self.ldir();
        Ok(())
    }

    /// Unread stream bytes, based on the main-set HL.
    pub fn remaining(&self) -> &'a [u8] {
        // HL wraps to 0 after the byte at 0xFFFF.
        let consumed = match self.pair(Pair::HL).checked_sub(self.stream_start) {
            Some(offset) => offset as usize,
            None => self.stream.len(),
        };
        &self.stream[consumed..]
    }

    /// Bytes written so far.
    pub fn into_output(self) -> Vec<u8> {
        self.cpu.memory(0, self.pair(Pair::DE)).to_vec()
    }
}

impl Deref for Machine<'_> {
    type Target = CpuState;

    fn deref(&self) -> &CpuState {
        &self.cpu
    }
}

impl DerefMut for Machine<'_> {
    fn deref_mut(&mut self) -> &mut CpuState {
        &mut self.cpu
    }
}
