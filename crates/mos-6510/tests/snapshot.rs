//! Engine save states.

use emu_core::{Cpu, SimpleBus, SnapshotReader, SnapshotWriter, VideoStandard};
use mos_6510::{CORE_TAG, CpuState, EXTENDED_TAG, JamPolicy, Mos6510, RESET_VECTOR};

fn running_cpu() -> (Mos6510, SimpleBus) {
    let mut bus = SimpleBus::new();
    bus.set_vector(RESET_VECTOR, 0x0200);
    bus.load(0x0200, &[0xA9, 0x42, 0xA2, 0x17, 0x58, 0xEA, 0xEA]);
    let mut cpu = Mos6510::with_config(VideoStandard::Ntsc, JamPolicy::Freeze);
    cpu.reset(&mut bus);
    for _ in 0..15 {
        cpu.tick(&mut bus);
    }
    while !cpu.is_at_boundary() {
        cpu.tick(&mut bus);
    }
    cpu.set_irq(true);
    (cpu, bus)
}

fn save(cpu: &Mos6510) -> Vec<u8> {
    let mut out = SnapshotWriter::new();
    cpu.save_state(&mut out);
    out.into_bytes()
}

#[test]
fn save_load_save_is_byte_identical() {
    let (cpu, _) = running_cpu();
    let first = save(&cpu);

    let mut other = Mos6510::new();
    assert!(other.load_state(&mut SnapshotReader::new(&first)));
    assert_eq!(save(&other), first);
    assert_eq!(other.state(), cpu.state());
    assert_eq!(other.jam_policy(), JamPolicy::Freeze);
    assert_eq!(other.video_standard(), VideoStandard::Ntsc);
}

#[test]
fn version_one_extension_loads_with_pins_released() {
    let (cpu, _) = running_cpu();
    let state = cpu.state();
    let mut out = SnapshotWriter::new();
    out.chunk(CORE_TAG, 1, |c| {
        c.put_u16(state.regs.pc);
        c.put_u8(state.regs.a);
        c.put_u8(state.regs.x);
        c.put_u8(state.regs.y);
        c.put_u8(state.regs.s);
        c.put_u8(state.regs.p.bits());
    });
    out.chunk(EXTENDED_TAG, 1, |c| {
        c.put_u8(state.jam_policy.to_byte());
        c.put_bool(state.halted);
        c.put_bool(state.nmi_latch);
        c.put_bool(state.irq_suppress_one);
        c.put_i32(state.budget);
        c.put_u64(state.total_cycles);
        c.put_u8(state.video.to_byte());
    });
    let bytes = out.into_bytes();

    let loaded = CpuState::read(&mut SnapshotReader::new(&bytes)).expect("v1 loads");
    assert_eq!(loaded.regs, state.regs);
    assert!(!loaded.irq_level);
    assert!(!loaded.nmi_level);
    assert_eq!(loaded.total_cycles, state.total_cycles);
}

#[test]
fn truncated_state_leaves_engine_untouched() {
    let (cpu, _) = running_cpu();
    let bytes = save(&cpu);

    let (mut target, _) = running_cpu();
    target.regs.a = 0x99;
    let before = target.state();
    for cut in [0, 5, 12, bytes.len() - 1] {
        assert!(!target.load_state(&mut SnapshotReader::new(&bytes[..cut])));
        assert_eq!(target.state(), before);
    }
}

#[test]
fn chunks_out_of_order_are_rejected() {
    let (cpu, _) = running_cpu();
    let bytes = save(&cpu);
    let core_len = 9 + 7;
    let mut swapped = bytes[core_len..].to_vec();
    swapped.extend_from_slice(&bytes[..core_len]);
    let mut target = Mos6510::new();
    assert!(target.try_load_state(&mut SnapshotReader::new(&swapped)).is_err());
}

#[test]
#[should_panic(expected = "mid-instruction")]
fn state_mid_instruction_panics() {
    let mut bus = SimpleBus::new();
    bus.load(0x0000, &[0xEA]);
    let mut cpu = Mos6510::new();
    cpu.tick(&mut bus);
    let _ = cpu.state();
}
