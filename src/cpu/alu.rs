//! Arithmetic, logic, rotate and bit instructions.

use super::{CpuState, Flag, Pair, Reg};

impl CpuState {
    /// `inc r`. Carry is unaffected.
    pub fn inc(&mut self, reg: Reg) {
        let result = self.reg(reg).wrapping_add(1);
        self.set_reg(reg, result);
        self.set_szv(result, result == 0x80);
    }

    /// `dec r`. Carry is unaffected.
    pub fn dec(&mut self, reg: Reg) {
        let result = self.reg(reg).wrapping_sub(1);
        self.set_reg(reg, result);
        self.set_szv(result, result == 0x7F);
    }

    /// Increment a register pair, updating S, Z and P/V from the 16-bit
    /// result. Carry is unaffected.
    pub fn inc_pair(&mut self, pair: Pair) {
        let result = self.pair(pair).wrapping_add(1);
        self.set_pair(pair, result);
        self.set_flag(Flag::Sign, result & 0x8000 != 0);
        self.set_flag(Flag::Zero, result == 0);
        self.set_flag(Flag::ParityOverflow, result == 0x8000);
    }

    /// Decrement a register pair, updating S, Z and P/V from the 16-bit
    /// result. Carry is unaffected.
    pub fn dec_pair(&mut self, pair: Pair) {
        let result = self.pair(pair).wrapping_sub(1);
        self.set_pair(pair, result);
        self.set_flag(Flag::Sign, result & 0x8000 != 0);
        self.set_flag(Flag::Zero, result == 0);
        self.set_flag(Flag::ParityOverflow, result == 0x7FFF);
    }

    fn add8(&mut self, operand: u8, carry_in: bool) -> u8 {
        let a = self.reg(Reg::A);
        let sum = a as u16 + operand as u16 + carry_in as u16;
        let result = sum as u8;
        let overflow = (a ^ result) & (operand ^ result) & 0x80 != 0;
        self.set_all(result & 0x80 != 0, result == 0, overflow, sum > 0xFF);
        result
    }

    fn sub8(&mut self, operand: u8, carry_in: bool) -> u8 {
        let a = self.reg(Reg::A);
        let diff = a as i16 - operand as i16 - carry_in as i16;
        let result = diff as u8;
        let overflow = (a ^ operand) & (a ^ result) & 0x80 != 0;
        self.set_all(result & 0x80 != 0, result == 0, overflow, diff < 0);
        result
    }

    /// `add a,r`
    pub fn add_a(&mut self, src: Reg) {
        let result = self.add8(self.reg(src), false);
        self.set_reg(Reg::A, result);
    }

    /// `adc a,r`
    pub fn adc_a(&mut self, src: Reg) {
        let result = self.add8(self.reg(src), self.carry());
        self.set_reg(Reg::A, result);
    }

    /// `sub r`
    pub fn sub_a(&mut self, src: Reg) {
        let result = self.sub8(self.reg(src), false);
        self.set_reg(Reg::A, result);
    }

    /// `sbc a,r`
    pub fn sbc_a(&mut self, src: Reg) {
        let result = self.sub8(self.reg(src), self.carry());
        self.set_reg(Reg::A, result);
    }

    /// `cp r`: subtract without storing the result.
    pub fn cp(&mut self, src: Reg) {
        self.sub8(self.reg(src), false);
    }

    /// `and r`
    pub fn and_a(&mut self, src: Reg) {
        let result = self.reg(Reg::A) & self.reg(src);
        self.set_reg(Reg::A, result);
        self.set_logic(result, false);
    }

    /// `or r`. `or a` is the usual way to clear carry.
    pub fn or_a(&mut self, src: Reg) {
        let result = self.reg(Reg::A) | self.reg(src);
        self.set_reg(Reg::A, result);
        self.set_logic(result, false);
    }

    /// `xor r`
    pub fn xor_a(&mut self, src: Reg) {
        let result = self.reg(Reg::A) ^ self.reg(src);
        self.set_reg(Reg::A, result);
        self.set_logic(result, false);
    }

    /// `rla`: rotate A left through carry. Only carry changes.
    pub fn rla(&mut self) {
        let a = self.reg(Reg::A);
        self.set_reg(Reg::A, (a << 1) | self.carry() as u8);
        self.set_flag(Flag::Carry, a & 0x80 != 0);
    }

    /// `rra`: rotate A right through carry. Only carry changes.
    pub fn rra(&mut self) {
        let a = self.reg(Reg::A);
        self.set_reg(Reg::A, (a >> 1) | ((self.carry() as u8) << 7));
        self.set_flag(Flag::Carry, a & 0x01 != 0);
    }

    fn shift(&mut self, reg: Reg, result: u8, carry: bool) {
        self.set_reg(reg, result);
        self.set_logic(result, carry);
    }

    /// `rlc r`
    pub fn rlc(&mut self, reg: Reg) {
        let v = self.reg(reg);
        self.shift(reg, v.rotate_left(1), v & 0x80 != 0);
    }

    /// `rrc r`
    pub fn rrc(&mut self, reg: Reg) {
        let v = self.reg(reg);
        self.shift(reg, v.rotate_right(1), v & 0x01 != 0);
    }

    /// `rl r`: rotate left through carry.
    pub fn rl(&mut self, reg: Reg) {
        let v = self.reg(reg);
        let result = (v << 1) | self.carry() as u8;
        self.shift(reg, result, v & 0x80 != 0);
    }

    /// `rr r`: rotate right through carry.
    pub fn rr(&mut self, reg: Reg) {
        let v = self.reg(reg);
        let result = (v >> 1) | ((self.carry() as u8) << 7);
        self.shift(reg, result, v & 0x01 != 0);
    }

    /// `sla r`
    pub fn sla(&mut self, reg: Reg) {
        let v = self.reg(reg);
        self.shift(reg, v << 1, v & 0x80 != 0);
    }

    /// `sll r`: shift left, setting bit 0.
    pub fn sll(&mut self, reg: Reg) {
        let v = self.reg(reg);
        self.shift(reg, (v << 1) | 1, v & 0x80 != 0);
    }

    /// `srl r`
    pub fn srl(&mut self, reg: Reg) {
        let v = self.reg(reg);
        self.shift(reg, v >> 1, v & 0x01 != 0);
    }

    /// `bit n,r`: Z is set when the bit is clear. Carry is unaffected.
    pub fn bit(&mut self, n: u8, reg: Reg) {
        debug_assert!(n < 8);
        let set = self.reg(reg) & (1 << n) != 0;
        self.set_flag(Flag::Zero, !set);
        self.set_flag(Flag::ParityOverflow, !set);
        self.set_flag(Flag::Sign, n == 7 && set);
    }

    /// `res n,r`
    pub fn res(&mut self, n: u8, reg: Reg) {
        debug_assert!(n < 8);
        self.set_reg(reg, self.reg(reg) & !(1 << n));
    }

    /// `set n,r`
    pub fn set(&mut self, n: u8, reg: Reg) {
        debug_assert!(n < 8);
        self.set_reg(reg, self.reg(reg) | (1 << n));
    }

    /// `add hl,rr`: only carry changes.
    pub fn add_hl(&mut self, src: Pair) {
        let sum = self.pair(Pair::HL) as u32 + self.pair(src) as u32;
        self.set_pair(Pair::HL, sum as u16);
        self.set_flag(Flag::Carry, sum > 0xFFFF);
    }

    /// `adc hl,rr`
    pub fn adc_hl(&mut self, src: Pair) {
        let hl = self.pair(Pair::HL);
        let operand = self.pair(src);
        let sum = hl as u32 + operand as u32 + self.carry() as u32;
        let result = sum as u16;
        let overflow = (hl ^ result) & (operand ^ result) & 0x8000 != 0;
        self.set_pair(Pair::HL, result);
        self.set_all(result & 0x8000 != 0, result == 0, overflow, sum > 0xFFFF);
    }

    /// `sbc hl,rr`
    pub fn sbc_hl(&mut self, src: Pair) {
        let hl = self.pair(Pair::HL);
        let operand = self.pair(src);
        let diff = hl as i32 - operand as i32 - self.carry() as i32;
        let result = diff as u16;
        let overflow = (hl ^ operand) & (hl ^ result) & 0x8000 != 0;
        self.set_pair(Pair::HL, result);
        self.set_all(result & 0x8000 != 0, result == 0, overflow, diff < 0);
    }
}

#[cfg(test)]
mod tests {
    use super::super::{CpuState, Flag, Pair, Reg};

    #[test]
    fn test_inc_overflow_and_wrap() {
        let mut cpu = CpuState::new();
        cpu.set_reg(Reg::B, 0x7F);
        cpu.inc(Reg::B);
        assert_eq!(cpu.reg(Reg::B), 0x80);
        assert!(cpu.flag(Flag::ParityOverflow));
        assert!(cpu.flag(Flag::Sign));

        cpu.set_reg(Reg::B, 0xFF);
        cpu.set_flag(Flag::Carry, true);
        cpu.inc(Reg::B);
        assert_eq!(cpu.reg(Reg::B), 0);
        assert!(cpu.flag(Flag::Zero));
        assert!(cpu.carry(), "inc leaves carry alone");
    }

    #[test]
    fn test_dec_overflow() {
        let mut cpu = CpuState::new();
        cpu.set_reg(Reg::D, 0x80);
        cpu.dec(Reg::D);
        assert_eq!(cpu.reg(Reg::D), 0x7F);
        assert!(cpu.flag(Flag::ParityOverflow));
        assert!(!cpu.flag(Flag::Sign));
    }

    #[test]
    fn test_inc_pair_wraps_to_zero() {
        let mut cpu = CpuState::new();
        cpu.set_pair(Pair::BC, 0xFFFF);
        cpu.inc_pair(Pair::BC);
        assert_eq!(cpu.pair(Pair::BC), 0x0000);
        assert!(cpu.flag(Flag::Zero));
        assert!(!cpu.carry());
        assert!(!cpu.flag(Flag::ParityOverflow));
        assert!(!cpu.flag(Flag::Sign));
    }

    #[test]
    fn test_add_a_a_shifts_into_carry() {
        let mut cpu = CpuState::new();
        cpu.set_reg(Reg::A, 0x80);
        cpu.add_a(Reg::A);
        assert_eq!(cpu.reg(Reg::A), 0);
        assert!(cpu.carry());
        assert!(cpu.flag(Flag::Zero));
        assert!(cpu.flag(Flag::ParityOverflow), "-128 + -128 overflows");
    }

    #[test]
    fn test_sub_borrow_and_overflow() {
        let mut cpu = CpuState::new();
        cpu.set_reg(Reg::A, 0x80);
        cpu.set_reg(Reg::B, 0x01);
        cpu.sub_a(Reg::B);
        assert_eq!(cpu.reg(Reg::A), 0x7F);
        assert!(!cpu.carry());
        assert!(cpu.flag(Flag::ParityOverflow));

        cpu.set_reg(Reg::A, 0x00);
        cpu.sub_a(Reg::B);
        assert_eq!(cpu.reg(Reg::A), 0xFF);
        assert!(cpu.carry());
        assert!(cpu.flag(Flag::Sign));
    }

    #[test]
    fn test_logic_parity_and_cleared_carry() {
        let mut cpu = CpuState::new();
        cpu.set_flag(Flag::Carry, true);
        cpu.set_reg(Reg::A, 0b0000_0011);
        cpu.or_a(Reg::A);
        assert!(!cpu.carry());
        assert!(cpu.flag(Flag::ParityOverflow), "two bits set is even parity");

        cpu.set_reg(Reg::A, 0b0000_0111);
        cpu.and_a(Reg::A);
        assert!(!cpu.flag(Flag::ParityOverflow));

        cpu.xor_a(Reg::A);
        assert_eq!(cpu.reg(Reg::A), 0);
        assert!(cpu.flag(Flag::Zero));
        assert!(cpu.flag(Flag::ParityOverflow));
    }

    #[test]
    fn test_rotates_through_carry() {
        let mut cpu = CpuState::new();
        cpu.set_reg(Reg::C, 0b1000_0001);
        cpu.set_flag(Flag::Carry, false);
        cpu.rl(Reg::C);
        assert_eq!(cpu.reg(Reg::C), 0b0000_0010);
        assert!(cpu.carry());

        cpu.rr(Reg::C);
        assert_eq!(cpu.reg(Reg::C), 0b1000_0001);
        assert!(!cpu.carry());

        cpu.rlc(Reg::C);
        assert_eq!(cpu.reg(Reg::C), 0b0000_0011);
        assert!(cpu.carry());

        cpu.rrc(Reg::C);
        assert_eq!(cpu.reg(Reg::C), 0b1000_0001);
        assert!(cpu.carry());
    }

    #[test]
    fn test_rla_only_touches_carry() {
        let mut cpu = CpuState::new();
        cpu.set_flag(Flag::Zero, true);
        cpu.set_flag(Flag::Carry, true);
        cpu.set_reg(Reg::A, 0x40);
        cpu.rla();
        assert_eq!(cpu.reg(Reg::A), 0x81);
        assert!(!cpu.carry());
        assert!(cpu.flag(Flag::Zero));

        cpu.rra();
        assert_eq!(cpu.reg(Reg::A), 0x40);
        assert!(cpu.carry());
    }

    #[test]
    fn test_shifts() {
        let mut cpu = CpuState::new();
        cpu.set_reg(Reg::E, 0x81);
        cpu.sla(Reg::E);
        assert_eq!(cpu.reg(Reg::E), 0x02);
        assert!(cpu.carry());

        cpu.set_reg(Reg::E, 0x81);
        cpu.sll(Reg::E);
        assert_eq!(cpu.reg(Reg::E), 0x03);
        assert!(cpu.carry());

        cpu.srl(Reg::E);
        assert_eq!(cpu.reg(Reg::E), 0x01);
        assert!(cpu.carry());

        cpu.srl(Reg::E);
        assert_eq!(cpu.reg(Reg::E), 0x00);
        assert!(cpu.flag(Flag::Zero));
    }

    #[test]
    fn test_bit_res_set() {
        let mut cpu = CpuState::new();
        cpu.set_reg(Reg::C, 0x80);
        cpu.set_flag(Flag::Carry, true);
        cpu.bit(7, Reg::C);
        assert!(!cpu.flag(Flag::Zero));
        assert!(cpu.flag(Flag::Sign));
        assert!(cpu.carry());

        cpu.res(7, Reg::C);
        assert_eq!(cpu.reg(Reg::C), 0);
        cpu.bit(7, Reg::C);
        assert!(cpu.flag(Flag::Zero));

        cpu.set(3, Reg::C);
        assert_eq!(cpu.reg(Reg::C), 0x08);
    }

    #[test]
    fn test_add_hl_only_sets_carry() {
        let mut cpu = CpuState::new();
        cpu.set_flag(Flag::Zero, true);
        cpu.set_pair(Pair::HL, 0xFFFF);
        cpu.set_pair(Pair::DE, 0x0002);
        cpu.add_hl(Pair::DE);
        assert_eq!(cpu.pair(Pair::HL), 0x0001);
        assert!(cpu.carry());
        assert!(cpu.flag(Flag::Zero));
    }

    #[test]
    fn test_adc_hl_doubles_with_carry_in() {
        let mut cpu = CpuState::new();
        cpu.set_pair(Pair::HL, 0x4000);
        cpu.set_flag(Flag::Carry, true);
        cpu.adc_hl(Pair::HL);
        assert_eq!(cpu.pair(Pair::HL), 0x8001);
        assert!(!cpu.carry());
        assert!(cpu.flag(Flag::ParityOverflow));
        assert!(cpu.flag(Flag::Sign));

        cpu.set_pair(Pair::HL, 0x8000);
        cpu.set_flag(Flag::Carry, false);
        cpu.adc_hl(Pair::HL);
        assert_eq!(cpu.pair(Pair::HL), 0);
        assert!(cpu.carry());
        assert!(cpu.flag(Flag::Zero));
    }

    #[test]
    fn test_sbc_hl_borrow() {
        let mut cpu = CpuState::new();
        cpu.set_pair(Pair::HL, 0x0010);
        cpu.set_pair(Pair::BC, 0x0011);
        cpu.set_flag(Flag::Carry, false);
        cpu.sbc_hl(Pair::BC);
        assert_eq!(cpu.pair(Pair::HL), 0xFFFF);
        assert!(cpu.carry());
        assert!(cpu.flag(Flag::Sign));
        assert!(!cpu.flag(Flag::ParityOverflow));
    }
}
