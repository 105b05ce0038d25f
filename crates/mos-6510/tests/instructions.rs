//! Instruction behaviour and cycle totals driven through the public API.

use emu_core::{Cpu, SimpleBus};
use mos_6510::{IRQ_VECTOR, JamPolicy, Mos6510, RESET_VECTOR, flags};

/// Reset into a program at $0200 and drain the reset cycles.
fn boot(program: &[u8]) -> (Mos6510, SimpleBus) {
    boot_with(program, JamPolicy::Halt)
}

fn boot_with(program: &[u8], policy: JamPolicy) -> (Mos6510, SimpleBus) {
    let mut bus = SimpleBus::new();
    bus.set_vector(RESET_VECTOR, 0x0200);
    bus.load(0x0200, program);
    let mut cpu = Mos6510::new();
    cpu.set_jam_policy(policy);
    cpu.reset(&mut bus);
    while !cpu.is_at_boundary() {
        cpu.tick(&mut bus);
    }
    (cpu, bus)
}

/// Run one instruction and return the cycles it took.
fn step(cpu: &mut Mos6510, bus: &mut SimpleBus) -> u64 {
    let start = cpu.total_cycles();
    cpu.tick(bus);
    while !cpu.is_at_boundary() {
        cpu.tick(bus);
    }
    cpu.total_cycles() - start
}

#[test]
fn countdown_loop_cycle_total() {
    let program = [
        0xA2, 0x05, // LDX #$05
        0xCA, // loop: DEX
        0xD0, 0xFD, // BNE loop
    ];
    let (mut cpu, mut bus) = boot(&program);
    let total: u64 = (0..11).map(|_| step(&mut cpu, &mut bus)).sum();
    assert_eq!(total, 2 + 5 * 2 + 4 * 3 + 2);
    assert_eq!(cpu.regs.x, 0);
    assert_eq!(cpu.regs.pc, 0x0205);
}

#[test]
fn page_crossing_reads_cost_one_more() {
    let program = [
        0xA2, 0x01, // LDX #$01
        0xBD, 0xFE, 0x10, // LDA $10FE,X
        0xBD, 0xFF, 0x10, // LDA $10FF,X
        0x9D, 0x00, 0x20, // STA $2000,X
    ];
    let (mut cpu, mut bus) = boot(&program);
    bus.load(0x10FF, &[0x11]);
    bus.load(0x1100, &[0x22]);
    assert_eq!(step(&mut cpu, &mut bus), 2);
    assert_eq!(step(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.regs.a, 0x11);
    assert_eq!(step(&mut cpu, &mut bus), 5);
    assert_eq!(cpu.regs.a, 0x22);
    assert_eq!(step(&mut cpu, &mut bus), 5);
    assert_eq!(bus.peek(0x2001), 0x22);
}

#[test]
fn stack_pha_pla() {
    let program = [
        0xA9, 0x42, // LDA #$42
        0x48, // PHA
        0xA9, 0x00, // LDA #$00
        0x68, // PLA
    ];
    let (mut cpu, mut bus) = boot(&program);
    for _ in 0..4 {
        step(&mut cpu, &mut bus);
    }
    assert_eq!(cpu.regs.a, 0x42);
    assert_eq!(cpu.regs.s, 0xFD);
    assert_eq!(bus.peek(0x01FD), 0x42);
}

#[test]
fn php_pushes_break_and_plp_discards_it() {
    let program = [
        0x38, // SEC
        0x08, // PHP
        0x18, // CLC
        0x28, // PLP
    ];
    let (mut cpu, mut bus) = boot(&program);
    for _ in 0..4 {
        step(&mut cpu, &mut bus);
    }
    assert_eq!(bus.peek(0x01FD), flags::C | flags::I | flags::U | flags::B);
    assert!(cpu.regs.p.is_set(flags::C));
    assert!(!cpu.regs.p.is_set(flags::B));
}

#[test]
fn brk_and_rti() {
    let program = [
        0x58, // CLI
        0x00, 0xFF, // BRK + padding
        0xEA, // NOP
    ];
    let (mut cpu, mut bus) = boot(&program);
    bus.set_vector(IRQ_VECTOR, 0x0300);
    bus.load(0x0300, &[0x40]); // RTI

    step(&mut cpu, &mut bus);
    assert_eq!(step(&mut cpu, &mut bus), 7);
    assert_eq!(cpu.regs.pc, 0x0300);
    assert_eq!(cpu.regs.s, 0xFA);
    assert!(cpu.regs.p.is_set(flags::I));
    assert_eq!(bus.peek(0x01FD), 0x02);
    assert_eq!(bus.peek(0x01FC), 0x03);
    assert_eq!(bus.peek(0x01FB), flags::U | flags::B);

    assert_eq!(step(&mut cpu, &mut bus), 6);
    assert_eq!(cpu.regs.pc, 0x0203);
    assert_eq!(cpu.regs.s, 0xFD);
    assert!(!cpu.regs.p.is_set(flags::I));
}

#[test]
fn jsr_and_rts() {
    let program = [0x20, 0x00, 0x03, 0xEA];
    let (mut cpu, mut bus) = boot(&program);
    bus.load(0x0300, &[0x60]);
    assert_eq!(step(&mut cpu, &mut bus), 6);
    assert_eq!(cpu.regs.pc, 0x0300);
    assert_eq!(bus.peek(0x01FD), 0x02);
    assert_eq!(bus.peek(0x01FC), 0x02);
    assert_eq!(step(&mut cpu, &mut bus), 6);
    assert_eq!(cpu.regs.pc, 0x0203);
}

#[test]
fn undocumented_store_and_combined_ops() {
    let program = [
        0xA9, 0xF0, // LDA #$F0
        0xA2, 0x3C, // LDX #$3C
        0x87, 0x10, // SAX $10
        0xA7, 0x10, // LAX $10
        0x07, 0x10, // SLO $10
        0xC7, 0x11, // DCP $11
    ];
    let (mut cpu, mut bus) = boot(&program);
    bus.load(0x0011, &[0x71]);
    for _ in 0..3 {
        step(&mut cpu, &mut bus);
    }
    assert_eq!(bus.peek(0x0010), 0x30);

    step(&mut cpu, &mut bus);
    assert_eq!((cpu.regs.a, cpu.regs.x), (0x30, 0x30));

    assert_eq!(step(&mut cpu, &mut bus), 5);
    assert_eq!(bus.peek(0x0010), 0x60);
    assert_eq!(cpu.regs.a, 0x70);
    assert!(!cpu.regs.p.is_set(flags::C));

    step(&mut cpu, &mut bus);
    assert_eq!(bus.peek(0x0011), 0x70);
    assert!(cpu.regs.p.is_set(flags::Z));
    assert!(cpu.regs.p.is_set(flags::C));
}

#[test]
fn multi_byte_nops_skip_operands() {
    let program = [
        0x04, 0x10, // NOP zp
        0x0C, 0x00, 0x10, // NOP abs
        0x1C, 0xFF, 0x10, // NOP abs,X (X=1 crosses)
        0x80, 0x99, // NOP #imm
        0x1A, // NOP
    ];
    let (mut cpu, mut bus) = boot(&program);
    cpu.regs.x = 1;
    let cycles: Vec<u64> = (0..5).map(|_| step(&mut cpu, &mut bus)).collect();
    assert_eq!(cycles, [3, 4, 5, 2, 2]);
    assert_eq!(cpu.regs.pc, 0x020B);
}

#[test]
fn jam_halts_until_reset() {
    let (mut cpu, mut bus) = boot(&[0x02, 0xEA]);
    step(&mut cpu, &mut bus);
    assert!(cpu.is_halted());
    for _ in 0..100 {
        cpu.tick(&mut bus);
    }
    assert_eq!(cpu.regs.pc, 0x0201);
    cpu.reset(&mut bus);
    assert!(!cpu.is_halted());
    assert_eq!(cpu.regs.pc, 0x0200);
}

#[test]
fn jam_freeze_refetches_forever() {
    let (mut cpu, mut bus) = boot_with(&[0x12, 0xA9, 0x01], JamPolicy::Freeze);
    for _ in 0..10 {
        step(&mut cpu, &mut bus);
        assert_eq!(cpu.regs.pc, 0x0200);
    }
    assert!(!cpu.is_halted());
    assert_eq!(cpu.regs.a, 0);
}

#[test]
fn jam_ignore_acts_as_nop() {
    let (mut cpu, mut bus) = boot_with(&[0xF2, 0xA9, 0x07], JamPolicy::Ignore);
    assert_eq!(step(&mut cpu, &mut bus), 2);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.a, 0x07);
    assert_eq!(cpu.regs.pc, 0x0203);
}

#[test]
fn reset_keeps_cycle_counter_and_data_registers() {
    let (mut cpu, mut bus) = boot(&[0xA9, 0x33]);
    step(&mut cpu, &mut bus);
    let before = cpu.total_cycles();
    cpu.reset(&mut bus);
    assert_eq!(cpu.total_cycles(), before);
    assert_eq!(cpu.regs.a, 0x33);
    assert_eq!(cpu.regs.pc, 0x0200);
}
