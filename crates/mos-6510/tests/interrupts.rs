//! IRQ and NMI servicing at instruction boundaries.

use emu_core::{Cpu, SimpleBus};
use mos_6510::{IRQ_VECTOR, Mos6510, NMI_VECTOR, RESET_VECTOR, flags};

const HANDLER: u16 = 0x0400;
const NMI_HANDLER: u16 = 0x0500;

fn boot(program: &[u8]) -> (Mos6510, SimpleBus) {
    let mut bus = SimpleBus::new();
    bus.set_vector(RESET_VECTOR, 0x0200);
    bus.set_vector(IRQ_VECTOR, HANDLER);
    bus.set_vector(NMI_VECTOR, NMI_HANDLER);
    bus.load(0x0200, program);
    bus.load(HANDLER, &[0xEA; 16]);
    bus.load(NMI_HANDLER, &[0xEA; 16]);
    let mut cpu = Mos6510::new();
    cpu.reset(&mut bus);
    while !cpu.is_at_boundary() {
        cpu.tick(&mut bus);
    }
    (cpu, bus)
}

fn step(cpu: &mut Mos6510, bus: &mut SimpleBus) -> u64 {
    let start = cpu.total_cycles();
    cpu.tick(bus);
    while !cpu.is_at_boundary() {
        cpu.tick(bus);
    }
    cpu.total_cycles() - start
}

#[test]
fn irq_taken_at_next_boundary() {
    let (mut cpu, mut bus) = boot(&[0xEA; 8]);
    cpu.regs.p.clear(flags::I);
    cpu.set_irq(true);
    assert_eq!(step(&mut cpu, &mut bus), 7);
    assert_eq!(cpu.regs.pc, HANDLER);
    assert!(cpu.regs.p.is_set(flags::I));
    // PC and P with B clear
    assert_eq!(bus.peek(0x01FD), 0x02);
    assert_eq!(bus.peek(0x01FC), 0x00);
    assert_eq!(bus.peek(0x01FB), flags::U);
}

#[test]
fn irq_masked_by_i_flag() {
    let (mut cpu, mut bus) = boot(&[0xEA; 8]);
    cpu.set_irq(true);
    for _ in 0..4 {
        step(&mut cpu, &mut bus);
    }
    assert_eq!(cpu.regs.pc, 0x0204);
}

#[test]
fn releasing_the_line_before_the_boundary_cancels_irq() {
    let (mut cpu, mut bus) = boot(&[0xA9, 0x01, 0xEA]);
    cpu.regs.p.clear(flags::I);
    cpu.tick(&mut bus); // LDA fetched, one cycle still owed
    cpu.set_irq(true);
    cpu.set_irq(false);
    cpu.tick(&mut bus);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x0203);
}

#[test]
fn cli_lets_one_instruction_through_first() {
    let (mut cpu, mut bus) = boot(&[0x58, 0xEA, 0xEA, 0xEA]);
    cpu.set_irq(true);
    step(&mut cpu, &mut bus); // CLI
    assert!(cpu.irq_suppressed());
    assert_eq!(step(&mut cpu, &mut bus), 2); // NOP still runs
    assert_eq!(cpu.regs.pc, 0x0202);
    assert_eq!(step(&mut cpu, &mut bus), 7);
    assert_eq!(cpu.regs.pc, HANDLER);
}

#[test]
fn rti_into_asserted_irq_runs_one_instruction() {
    let (mut cpu, mut bus) = boot(&[0xEA; 8]);
    bus.load(HANDLER, &[0x40]);
    cpu.regs.p.clear(flags::I);
    cpu.set_irq(true);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, HANDLER);
    step(&mut cpu, &mut bus); // RTI
    assert_eq!(cpu.regs.pc, 0x0200);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x0201);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, HANDLER);
}

#[test]
fn nmi_pulse_is_serviced_once() {
    let (mut cpu, mut bus) = boot(&[0xA9, 0x01, 0xEA, 0xEA]);
    cpu.tick(&mut bus);
    cpu.set_nmi(true);
    cpu.set_nmi(false);
    cpu.tick(&mut bus);
    assert_eq!(step(&mut cpu, &mut bus), 7);
    assert_eq!(cpu.regs.pc, NMI_HANDLER);
    for _ in 0..4 {
        step(&mut cpu, &mut bus);
    }
    assert_eq!(cpu.regs.pc, NMI_HANDLER + 4);
}

#[test]
fn held_nmi_line_does_not_retrigger() {
    let (mut cpu, mut bus) = boot(&[0xEA; 8]);
    cpu.set_nmi(true);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, NMI_HANDLER);
    for _ in 0..3 {
        cpu.set_nmi(true);
        step(&mut cpu, &mut bus);
    }
    assert_eq!(cpu.regs.pc, NMI_HANDLER + 3);
}

#[test]
fn nmi_ignores_i_and_beats_irq() {
    let (mut cpu, mut bus) = boot(&[0xEA; 8]);
    cpu.regs.p.clear(flags::I);
    cpu.set_irq(true);
    cpu.trigger_nmi();
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, NMI_HANDLER);
}

#[test]
fn rdy_hold_defers_interrupt_free_fetches() {
    let (mut cpu, mut bus) = boot(&[0xA9, 0x05, 0xEA]);
    cpu.tick(&mut bus);
    cpu.set_rdy(true);
    // The in-flight LDA still completes
    cpu.tick(&mut bus);
    assert!(cpu.is_at_boundary());
    for _ in 0..20 {
        cpu.tick(&mut bus);
    }
    assert_eq!(cpu.regs.pc, 0x0202);
    cpu.set_rdy(false);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x0203);
}

#[test]
fn cli_delay_survives_rdy_hold() {
    // CLI; NOP; NOP
    let (mut cpu, mut bus) = boot(&[0x58, 0xEA, 0xEA]);
    cpu.set_irq(true);
    step(&mut cpu, &mut bus);
    assert!(cpu.irq_suppressed());

    cpu.set_rdy(true);
    for _ in 0..10 {
        cpu.tick(&mut bus);
    }
    assert_eq!(cpu.regs.pc, 0x0201);
    assert!(cpu.irq_suppressed());

    cpu.set_rdy(false);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, 0x0202);
    step(&mut cpu, &mut bus);
    assert_eq!(cpu.regs.pc, HANDLER);
}

#[test]
fn halted_engine_ignores_interrupts() {
    let (mut cpu, mut bus) = boot(&[0x02]);
    step(&mut cpu, &mut bus);
    assert!(cpu.is_halted());
    cpu.trigger_nmi();
    cpu.regs.p.clear(flags::I);
    cpu.set_irq(true);
    for _ in 0..20 {
        cpu.tick(&mut bus);
    }
    assert_eq!(cpu.regs.pc, 0x0201);
}
