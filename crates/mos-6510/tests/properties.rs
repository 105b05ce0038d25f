//! Property tests for arithmetic and cycle accounting.

use emu_core::{Cpu, SimpleBus};
use mos_6510::{Mos6510, Status, flags};
use proptest::prelude::*;

fn bcd(n: u8) -> u8 {
    ((n / 10) << 4) | (n % 10)
}

/// Execute `ADC #imm` (or `SBC #imm`) with the given A and P.
fn run_immediate(opcode: u8, a: u8, operand: u8, p: u8) -> (u8, Status, u64) {
    let mut bus = SimpleBus::new();
    bus.load(0x0200, &[opcode, operand]);
    let mut cpu = Mos6510::new();
    cpu.regs.pc = 0x0200;
    cpu.regs.a = a;
    cpu.regs.p = Status::from_byte(p);
    let start = cpu.total_cycles();
    cpu.tick(&mut bus);
    while !cpu.is_at_boundary() {
        cpu.tick(&mut bus);
    }
    (cpu.regs.a, cpu.regs.p, cpu.total_cycles() - start)
}

proptest! {
    #[test]
    fn decimal_add_matches_bcd_arithmetic(x in 0u8..100, y in 0u8..100, carry in any::<bool>()) {
        let p = flags::D | if carry { flags::C } else { 0 };
        let (a, status, cycles) = run_immediate(0x69, bcd(x), bcd(y), p);
        let sum = u16::from(x) + u16::from(y) + u16::from(carry);
        prop_assert_eq!(a, bcd((sum % 100) as u8));
        prop_assert_eq!(status.is_set(flags::C), sum >= 100);
        prop_assert_eq!(cycles, 2);
    }

    #[test]
    fn decimal_subtract_matches_bcd_arithmetic(x in 0u8..100, y in 0u8..100, carry in any::<bool>()) {
        let p = flags::D | if carry { flags::C } else { 0 };
        let (a, status, _) = run_immediate(0xE9, bcd(x), bcd(y), p);
        let diff = i16::from(x) - i16::from(y) - i16::from(!carry);
        prop_assert_eq!(a, bcd(diff.rem_euclid(100) as u8));
        prop_assert_eq!(status.is_set(flags::C), diff >= 0);
    }

    #[test]
    fn binary_add_matches_integer_arithmetic(a in any::<u8>(), b in any::<u8>(), carry in any::<bool>()) {
        let p = if carry { flags::C } else { 0 };
        let (result, status, _) = run_immediate(0x69, a, b, p);
        let sum = u16::from(a) + u16::from(b) + u16::from(carry);
        prop_assert_eq!(result, sum as u8);
        prop_assert_eq!(status.is_set(flags::C), sum > 0xFF);
        let signed = i16::from(a as i8) + i16::from(b as i8) + i16::from(carry);
        prop_assert_eq!(status.is_set(flags::V), !(-128..=127).contains(&signed));
    }

    #[test]
    fn zero_page_x_never_leaves_page_zero(base in any::<u8>(), x in any::<u8>(), value in any::<u8>()) {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0xB5, base]);
        bus.load(u16::from(base.wrapping_add(x)), &[value]);
        let mut cpu = Mos6510::new();
        cpu.regs.pc = 0x0200;
        cpu.regs.x = x;
        cpu.tick(&mut bus);
        prop_assert_eq!(cpu.regs.a, value);
    }
}
