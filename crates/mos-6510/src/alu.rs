//! ALU operations shared by the documented and undocumented opcodes.

use crate::Mos6510;
use crate::flags::{C, D, N, V, Z};

/// Constant ORed into A by ANE and LXA. The real value depends on the chip
/// and temperature; `$EE` is what most C64 test suites expect.
const MAGIC: u8 = 0xEE;

impl Mos6510 {
    pub(crate) fn do_lda(&mut self, val: u8) {
        self.regs.a = val;
        self.regs.p.update_nz(val);
    }

    pub(crate) fn do_ldx(&mut self, val: u8) {
        self.regs.x = val;
        self.regs.p.update_nz(val);
    }

    pub(crate) fn do_ldy(&mut self, val: u8) {
        self.regs.y = val;
        self.regs.p.update_nz(val);
    }

    pub(crate) fn do_ora(&mut self, val: u8) {
        self.regs.a |= val;
        self.regs.p.update_nz(self.regs.a);
    }

    pub(crate) fn do_and(&mut self, val: u8) {
        self.regs.a &= val;
        self.regs.p.update_nz(self.regs.a);
    }

    pub(crate) fn do_eor(&mut self, val: u8) {
        self.regs.a ^= val;
        self.regs.p.update_nz(self.regs.a);
    }

    pub(crate) fn do_bit(&mut self, val: u8) {
        self.regs.p.set_if(Z, self.regs.a & val == 0);
        self.regs.p.set_if(N, val & 0x80 != 0);
        self.regs.p.set_if(V, val & 0x40 != 0);
    }

    fn compare(&mut self, reg: u8, val: u8) {
        self.regs.p.set_if(C, reg >= val);
        self.regs.p.update_nz(reg.wrapping_sub(val));
    }

    pub(crate) fn do_cmp(&mut self, val: u8) {
        self.compare(self.regs.a, val);
    }

    pub(crate) fn do_cpx(&mut self, val: u8) {
        self.compare(self.regs.x, val);
    }

    pub(crate) fn do_cpy(&mut self, val: u8) {
        self.compare(self.regs.y, val);
    }

    // ------------------------------------------------------------------
    // Addition and subtraction
    // ------------------------------------------------------------------

    pub(crate) fn do_adc(&mut self, val: u8) {
        if self.regs.p.is_set(D) {
            self.do_adc_decimal(val);
        } else {
            self.do_adc_binary(val);
        }
    }

    fn do_adc_binary(&mut self, val: u8) {
        let a = self.regs.a;
        let sum = u16::from(a) + u16::from(val) + u16::from(self.regs.p.carry());
        let result = sum as u8;

        self.regs.p.set_if(C, sum > 0xFF);
        self.regs.p.set_if(V, (a ^ result) & (val ^ result) & 0x80 != 0);
        self.regs.a = result;
        self.regs.p.update_nz(result);
    }

    /// NMOS decimal add. Z and V come from the binary sum, N from the high
    /// nibble before its final correction.
    fn do_adc_decimal(&mut self, val: u8) {
        let a = self.regs.a;
        let carry = self.regs.p.carry();

        let mut lo = (a & 0x0F) + (val & 0x0F) + carry;
        if lo > 9 {
            lo += 6;
        }
        let mut hi = (a >> 4) + (val >> 4) + u8::from(lo > 0x0F);

        let binary = a.wrapping_add(val).wrapping_add(carry);
        self.regs.p.set_if(Z, binary == 0);
        self.regs.p.set_if(N, hi & 0x08 != 0);
        self.regs.p.set_if(V, (a ^ binary) & (val ^ binary) & 0x80 != 0);

        if hi > 9 {
            hi += 6;
        }
        self.regs.p.set_if(C, hi > 0x0F);
        self.regs.a = (hi << 4) | (lo & 0x0F);
    }

    pub(crate) fn do_sbc(&mut self, val: u8) {
        if self.regs.p.is_set(D) {
            self.do_sbc_decimal(val);
        } else {
            self.do_adc_binary(!val);
        }
    }

    /// NMOS decimal subtract. All flags come from the binary difference.
    fn do_sbc_decimal(&mut self, val: u8) {
        let a = self.regs.a;
        let borrow = i16::from(1 - self.regs.p.carry());

        let binary = i16::from(a) - i16::from(val) - borrow;
        self.regs.p.set_if(C, binary >= 0);
        self.regs.p.update_nz(binary as u8);
        self.regs.p.set_if(
            V,
            (i16::from(a) ^ binary) & (i16::from(a) ^ i16::from(val)) & 0x80 != 0,
        );

        let mut lo = i16::from(a & 0x0F) - i16::from(val & 0x0F) - borrow;
        let mut hi = i16::from(a >> 4) - i16::from(val >> 4);
        if lo < 0 {
            lo -= 6;
            hi -= 1;
        }
        if hi < 0 {
            hi -= 6;
        }
        self.regs.a = ((hi << 4) as u8) | ((lo & 0x0F) as u8);
    }

    // ------------------------------------------------------------------
    // Shifts and increments
    // ------------------------------------------------------------------

    pub(crate) fn do_asl(&mut self, val: u8) -> u8 {
        let result = val << 1;
        self.regs.p.set_if(C, val & 0x80 != 0);
        self.regs.p.update_nz(result);
        result
    }

    pub(crate) fn do_lsr(&mut self, val: u8) -> u8 {
        let result = val >> 1;
        self.regs.p.set_if(C, val & 0x01 != 0);
        self.regs.p.update_nz(result);
        result
    }

    pub(crate) fn do_rol(&mut self, val: u8) -> u8 {
        let result = (val << 1) | self.regs.p.carry();
        self.regs.p.set_if(C, val & 0x80 != 0);
        self.regs.p.update_nz(result);
        result
    }

    pub(crate) fn do_ror(&mut self, val: u8) -> u8 {
        let result = (val >> 1) | (self.regs.p.carry() << 7);
        self.regs.p.set_if(C, val & 0x01 != 0);
        self.regs.p.update_nz(result);
        result
    }

    pub(crate) fn do_inc(&mut self, val: u8) -> u8 {
        let result = val.wrapping_add(1);
        self.regs.p.update_nz(result);
        result
    }

    pub(crate) fn do_dec(&mut self, val: u8) -> u8 {
        let result = val.wrapping_sub(1);
        self.regs.p.update_nz(result);
        result
    }

    // ------------------------------------------------------------------
    // Undocumented combinations
    // ------------------------------------------------------------------

    pub(crate) fn do_slo(&mut self, val: u8) -> u8 {
        let result = self.do_asl(val);
        self.do_ora(result);
        result
    }

    pub(crate) fn do_rla(&mut self, val: u8) -> u8 {
        let result = self.do_rol(val);
        self.do_and(result);
        result
    }

    pub(crate) fn do_sre(&mut self, val: u8) -> u8 {
        let result = self.do_lsr(val);
        self.do_eor(result);
        result
    }

    pub(crate) fn do_rra(&mut self, val: u8) -> u8 {
        let result = self.do_ror(val);
        self.do_adc(result);
        result
    }

    pub(crate) fn do_dcp(&mut self, val: u8) -> u8 {
        let result = val.wrapping_sub(1);
        self.do_cmp(result);
        result
    }

    pub(crate) fn do_isc(&mut self, val: u8) -> u8 {
        let result = val.wrapping_add(1);
        self.do_sbc(result);
        result
    }

    pub(crate) fn do_lax(&mut self, val: u8) {
        self.regs.a = val;
        self.regs.x = val;
        self.regs.p.update_nz(val);
    }

    pub(crate) fn do_las(&mut self, val: u8) {
        let result = val & self.regs.s;
        self.regs.a = result;
        self.regs.x = result;
        self.regs.s = result;
        self.regs.p.update_nz(result);
    }

    pub(crate) fn do_anc(&mut self, val: u8) {
        self.do_and(val);
        self.regs.p.set_if(C, self.regs.a & 0x80 != 0);
    }

    pub(crate) fn do_alr(&mut self, val: u8) {
        self.regs.a &= val;
        self.regs.a = self.do_lsr(self.regs.a);
    }

    /// AND then ROR, with C and V taken from bits 6 and 5 of the result.
    /// In decimal mode the nibbles are corrected like an ADC would.
    pub(crate) fn do_arr(&mut self, val: u8) {
        let t = self.regs.a & val;
        let carry_in = self.regs.p.carry();
        let mut result = (t >> 1) | (carry_in << 7);

        if !self.regs.p.is_set(D) {
            self.regs.p.update_nz(result);
            self.regs.p.set_if(C, result & 0x40 != 0);
            self.regs.p.set_if(V, (result ^ (result << 1)) & 0x40 != 0);
            self.regs.a = result;
            return;
        }

        self.regs.p.set_if(N, carry_in != 0);
        self.regs.p.set_if(Z, result == 0);
        self.regs.p.set_if(V, (t ^ result) & 0x40 != 0);
        let lo = t & 0x0F;
        let hi = t >> 4;
        if lo + (lo & 0x01) > 5 {
            result = (result & 0xF0) | (result.wrapping_add(6) & 0x0F);
        }
        let carry_out = hi + (hi & 0x01) > 5;
        self.regs.p.set_if(C, carry_out);
        if carry_out {
            result = result.wrapping_add(0x60);
        }
        self.regs.a = result;
    }

    pub(crate) fn do_ane(&mut self, val: u8) {
        self.regs.a = (self.regs.a | MAGIC) & self.regs.x & val;
        self.regs.p.update_nz(self.regs.a);
    }

    pub(crate) fn do_lxa(&mut self, val: u8) {
        let result = (self.regs.a | MAGIC) & val;
        self.regs.a = result;
        self.regs.x = result;
        self.regs.p.update_nz(result);
    }

    pub(crate) fn do_sbx(&mut self, val: u8) {
        let t = self.regs.a & self.regs.x;
        self.regs.p.set_if(C, t >= val);
        self.regs.x = t.wrapping_sub(val);
        self.regs.p.update_nz(self.regs.x);
    }
}
