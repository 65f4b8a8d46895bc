//! Block copies, the stack and register exchanges.

use super::{CpuState, Flag, Pair, Reg, STACK_DEPTH};
use crate::error::{Error, Result};

impl CpuState {
    fn block_step(&mut self, forward: bool) {
        let hl = self.pair(Pair::HL);
        let de = self.pair(Pair::DE);
        self.write(de, self.read(hl));

        let step = |v: u16| if forward { v.wrapping_add(1) } else { v.wrapping_sub(1) };
        self.set_pair(Pair::HL, step(hl));
        self.set_pair(Pair::DE, step(de));

        let bc = self.pair(Pair::BC).wrapping_sub(1);
        self.set_pair(Pair::BC, bc);
        self.set_flag(Flag::ParityOverflow, bc != 0);
    }

    /// `ldi`: copy (HL) to (DE), advance both, count BC down.
    /// P/V reports whether BC is still non-zero.
    pub fn ldi(&mut self) {
        self.block_step(true);
    }

    /// `ldd`: like `ldi` but both pointers move down.
    pub fn ldd(&mut self) {
        self.block_step(false);
    }

    /// `ldir`: repeat `ldi` until BC reaches zero.
    ///
    /// Like the hardware, a starting BC of zero copies 65536 bytes. Bytes are
    /// copied one at a time, so overlapping ranges replicate the pattern.
    pub fn ldir(&mut self) {
        loop {
            self.ldi();
            if self.pair(Pair::BC) == 0 {
                break;
            }
        }
    }

    /// `lddr`: repeat `ldd` until BC reaches zero.
    pub fn lddr(&mut self) {
        loop {
            self.ldd();
            if self.pair(Pair::BC) == 0 {
                break;
            }
        }
    }

    /// `push rr`
    pub fn push(&mut self, pair: Pair) -> Result<()> {
        if self.stack.len() == STACK_DEPTH {
            return Err(Error::malformed("stack overflow"));
        }
        self.stack.push(self.pair(pair));
        Ok(())
    }

    /// `pop rr`
    pub fn pop(&mut self, pair: Pair) -> Result<()> {
        let value = self
            .stack
            .pop()
            .ok_or_else(|| Error::malformed("stack underflow"))?;
        self.set_pair(pair, value);
        Ok(())
    }

    /// `ex (sp),hl`
    pub fn ex_sp_hl(&mut self) -> Result<()> {
        let hl = self.pair(Pair::HL);
        let top = self
            .stack
            .last_mut()
            .ok_or_else(|| Error::malformed("stack underflow"))?;
        let value = std::mem::replace(top, hl);
        self.set_pair(Pair::HL, value);
        Ok(())
    }

    /// `ex de,hl`
    pub fn ex_de_hl(&mut self) {
        let de = self.pair(Pair::DE);
        let hl = self.pair(Pair::HL);
        self.set_pair(Pair::DE, hl);
        self.set_pair(Pair::HL, de);
    }

    /// `exx`: swap BC, DE and HL with the alternate set.
    pub fn exx(&mut self) {
        let start = Reg::B as usize;
        self.regs[start..].swap_with_slice(&mut self.shadow[start..]);
    }

    /// `ex af,af'`
    pub fn ex_af(&mut self) {
        let end = Reg::F as usize + 1;
        self.regs[..end].swap_with_slice(&mut self.shadow[..end]);
    }
}
