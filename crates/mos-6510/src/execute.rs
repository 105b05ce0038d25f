//! Instruction execution.
//!
//! Every bus cycle the real part performs is issued here in order,
//! including the dummy reads of indexed addressing and the dummy write of
//! read-modify-write instructions, since reading or writing a chip register
//! twice is visible to software.

use emu_core::Bus;

use crate::flags::{C, D, I, N, V, Z};
use crate::opcodes::{Mnemonic as M, Mode, OPCODES, Opcode};
use crate::state::Event;
use crate::{Mos6510, Status};

/// How the operand is going to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    /// Stores and read-modify-write always pay the index fix-up cycle.
    Write,
}

/// A resolved effective address.
#[derive(Debug, Clone, Copy)]
struct Target {
    addr: u16,
    /// Address before indexing (the unstable stores AND with its high byte).
    base: u16,
    crossed: bool,
}

impl Target {
    const fn direct(addr: u16) -> Self {
        Self {
            addr,
            base: addr,
            crossed: false,
        }
    }
}

impl Mos6510 {
    /// Run the instruction whose opcode was fetched from `at`. Returns the
    /// cycles owed beyond the table's base count.
    pub(crate) fn execute<B: Bus>(&mut self, bus: &mut B, at: u16, opcode: u8) -> i32 {
        let op = &OPCODES[opcode as usize];
        let p = self.regs.p;

        match op.mnemonic {
            // Loads, logic, arithmetic and compares
            M::Lda => self.read_op(bus, op, Self::do_lda),
            M::Ldx => self.read_op(bus, op, Self::do_ldx),
            M::Ldy => self.read_op(bus, op, Self::do_ldy),
            M::Lax => self.read_op(bus, op, Self::do_lax),
            M::Las => self.read_op(bus, op, Self::do_las),
            M::Ora => self.read_op(bus, op, Self::do_ora),
            M::And => self.read_op(bus, op, Self::do_and),
            M::Eor => self.read_op(bus, op, Self::do_eor),
            M::Adc => self.read_op(bus, op, Self::do_adc),
            M::Sbc | M::Usbc => self.read_op(bus, op, Self::do_sbc),
            M::Cmp => self.read_op(bus, op, Self::do_cmp),
            M::Cpx => self.read_op(bus, op, Self::do_cpx),
            M::Cpy => self.read_op(bus, op, Self::do_cpy),
            M::Bit => self.read_op(bus, op, Self::do_bit),
            M::Anc => self.read_op(bus, op, Self::do_anc),
            M::Alr => self.read_op(bus, op, Self::do_alr),
            M::Arr => self.read_op(bus, op, Self::do_arr),
            M::Ane => self.read_op(bus, op, Self::do_ane),
            M::Lxa => self.read_op(bus, op, Self::do_lxa),
            M::Sbx => self.read_op(bus, op, Self::do_sbx),
            M::Nop if op.mode == Mode::Imp => self.implied(bus),
            M::Nop => self.read_op(bus, op, |_, _| {}),

            // Stores
            M::Sta => self.write_op(bus, op, |cpu| cpu.regs.a),
            M::Stx => self.write_op(bus, op, |cpu| cpu.regs.x),
            M::Sty => self.write_op(bus, op, |cpu| cpu.regs.y),
            M::Sax => self.write_op(bus, op, |cpu| cpu.regs.a & cpu.regs.x),
            M::Sha | M::Shx | M::Shy | M::Tas => self.unstable_store(bus, op),

            // Shifts and read-modify-write
            M::Asl if op.mode == Mode::Acc => self.accumulator(bus, Self::do_asl),
            M::Lsr if op.mode == Mode::Acc => self.accumulator(bus, Self::do_lsr),
            M::Rol if op.mode == Mode::Acc => self.accumulator(bus, Self::do_rol),
            M::Ror if op.mode == Mode::Acc => self.accumulator(bus, Self::do_ror),
            M::Asl => self.modify_op(bus, op, Self::do_asl),
            M::Lsr => self.modify_op(bus, op, Self::do_lsr),
            M::Rol => self.modify_op(bus, op, Self::do_rol),
            M::Ror => self.modify_op(bus, op, Self::do_ror),
            M::Inc => self.modify_op(bus, op, Self::do_inc),
            M::Dec => self.modify_op(bus, op, Self::do_dec),
            M::Slo => self.modify_op(bus, op, Self::do_slo),
            M::Rla => self.modify_op(bus, op, Self::do_rla),
            M::Sre => self.modify_op(bus, op, Self::do_sre),
            M::Rra => self.modify_op(bus, op, Self::do_rra),
            M::Dcp => self.modify_op(bus, op, Self::do_dcp),
            M::Isc => self.modify_op(bus, op, Self::do_isc),

            // Branches
            M::Bpl => self.branch(bus, !p.is_set(N)),
            M::Bmi => self.branch(bus, p.is_set(N)),
            M::Bvc => self.branch(bus, !p.is_set(V)),
            M::Bvs => self.branch(bus, p.is_set(V)),
            M::Bcc => self.branch(bus, !p.is_set(C)),
            M::Bcs => self.branch(bus, p.is_set(C)),
            M::Bne => self.branch(bus, !p.is_set(Z)),
            M::Beq => self.branch(bus, p.is_set(Z)),

            // Flow control and stack
            M::Brk => self.op_brk(bus),
            M::Rti => self.op_rti(bus),
            M::Rts => self.op_rts(bus),
            M::Jsr => self.op_jsr(bus),
            M::Jmp if op.mode == Mode::Ind => self.op_jmp_ind(bus),
            M::Jmp => {
                self.regs.pc = self.fetch_word(bus);
                0
            }
            M::Pha => {
                bus.read(self.regs.pc);
                self.push(bus, self.regs.a);
                0
            }
            M::Php => {
                bus.read(self.regs.pc);
                self.push(bus, self.regs.p.pushed_by_software());
                0
            }
            M::Pla => {
                let value = self.pull(bus);
                self.do_lda(value);
                0
            }
            M::Plp => {
                let value = self.pull(bus);
                self.regs.p = Status::from_byte(value);
                self.transition(Event::MaskWritten);
                0
            }

            // Flags
            M::Clc => self.flag(bus, C, false),
            M::Sec => self.flag(bus, C, true),
            M::Cld => self.flag(bus, D, false),
            M::Sed => self.flag(bus, D, true),
            M::Clv => self.flag(bus, V, false),
            M::Sei => self.flag(bus, I, true),
            M::Cli => {
                self.flag(bus, I, false);
                self.transition(Event::MaskWritten);
                0
            }

            // Transfers and index arithmetic
            M::Tax => self.transfer(bus, |cpu| cpu.regs.x = cpu.regs.a, |cpu| cpu.regs.x),
            M::Tay => self.transfer(bus, |cpu| cpu.regs.y = cpu.regs.a, |cpu| cpu.regs.y),
            M::Txa => self.transfer(bus, |cpu| cpu.regs.a = cpu.regs.x, |cpu| cpu.regs.a),
            M::Tya => self.transfer(bus, |cpu| cpu.regs.a = cpu.regs.y, |cpu| cpu.regs.a),
            M::Tsx => self.transfer(bus, |cpu| cpu.regs.x = cpu.regs.s, |cpu| cpu.regs.x),
            M::Txs => {
                bus.read(self.regs.pc);
                self.regs.s = self.regs.x;
                0
            }
            M::Inx => self.transfer(bus, |cpu| cpu.regs.x = cpu.regs.x.wrapping_add(1), |cpu| cpu.regs.x),
            M::Iny => self.transfer(bus, |cpu| cpu.regs.y = cpu.regs.y.wrapping_add(1), |cpu| cpu.regs.y),
            M::Dex => self.transfer(bus, |cpu| cpu.regs.x = cpu.regs.x.wrapping_sub(1), |cpu| cpu.regs.x),
            M::Dey => self.transfer(bus, |cpu| cpu.regs.y = cpu.regs.y.wrapping_sub(1), |cpu| cpu.regs.y),

            M::Jam => {
                if self.jam_policy == crate::JamPolicy::Ignore {
                    bus.read(self.regs.pc);
                }
                self.transition(Event::Jam { at, opcode });
                0
            }
        }
    }

    // ========================================================================
    // Bus helpers
    // ========================================================================

    pub(crate) fn fetch_byte<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    fn fetch_word<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch_byte(bus);
        let hi = self.fetch_byte(bus);
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn read_word<B: Bus>(&mut self, bus: &mut B, addr: u16) -> u16 {
        let lo = bus.read(addr);
        let hi = bus.read(addr.wrapping_add(1));
        u16::from_le_bytes([lo, hi])
    }

    /// Pointer read from zero page; the high byte wraps to `$00`.
    fn read_zp_word<B: Bus>(bus: &mut B, ptr: u8) -> u16 {
        let lo = bus.read(u16::from(ptr));
        let hi = bus.read(u16::from(ptr.wrapping_add(1)));
        u16::from_le_bytes([lo, hi])
    }

    pub(crate) fn push<B: Bus>(&mut self, bus: &mut B, value: u8) {
        let addr = self.regs.push();
        bus.write(addr, value);
    }

    fn pop<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let addr = self.regs.pop();
        bus.read(addr)
    }

    /// PLA/PLP: dummy fetch, dummy stack read, pull.
    fn pull<B: Bus>(&mut self, bus: &mut B) -> u8 {
        bus.read(self.regs.pc);
        bus.read(self.regs.stack_addr());
        self.pop(bus)
    }

    // ========================================================================
    // Addressing
    // ========================================================================

    fn resolve<B: Bus>(&mut self, bus: &mut B, mode: Mode, access: Access) -> Target {
        match mode {
            Mode::Imm => {
                let addr = self.regs.pc;
                self.regs.pc = self.regs.pc.wrapping_add(1);
                Target::direct(addr)
            }
            Mode::Zp => Target::direct(u16::from(self.fetch_byte(bus))),
            Mode::Zpx | Mode::Zpy => {
                let base = self.fetch_byte(bus);
                bus.read(u16::from(base));
                let index = if mode == Mode::Zpx { self.regs.x } else { self.regs.y };
                Target::direct(u16::from(base.wrapping_add(index)))
            }
            Mode::Abs => Target::direct(self.fetch_word(bus)),
            Mode::Abx => {
                let base = self.fetch_word(bus);
                self.indexed(bus, base, self.regs.x, access)
            }
            Mode::Aby => {
                let base = self.fetch_word(bus);
                self.indexed(bus, base, self.regs.y, access)
            }
            Mode::Izx => {
                let ptr = self.fetch_byte(bus);
                bus.read(u16::from(ptr));
                Target::direct(Self::read_zp_word(bus, ptr.wrapping_add(self.regs.x)))
            }
            Mode::Izy => {
                let ptr = self.fetch_byte(bus);
                let base = Self::read_zp_word(bus, ptr);
                self.indexed(bus, base, self.regs.y, access)
            }
            Mode::Imp | Mode::Acc | Mode::Ind | Mode::Rel => Target::direct(self.regs.pc),
        }
    }

    /// Indexing with the 6502's carry-late high byte: the first read goes to
    /// the un-fixed address whenever the page changes, and always for stores.
    fn indexed<B: Bus>(&mut self, bus: &mut B, base: u16, index: u8, access: Access) -> Target {
        let addr = base.wrapping_add(u16::from(index));
        let crossed = (base ^ addr) & 0xFF00 != 0;
        if crossed || access == Access::Write {
            bus.read((base & 0xFF00) | (addr & 0x00FF));
        }
        Target {
            addr,
            base,
            crossed,
        }
    }

    fn read_op<B: Bus>(&mut self, bus: &mut B, op: &Opcode, f: fn(&mut Self, u8)) -> i32 {
        let target = self.resolve(bus, op.mode, Access::Read);
        let value = bus.read(target.addr);
        f(self, value);
        i32::from(op.page_penalty && target.crossed)
    }

    fn write_op<B: Bus>(&mut self, bus: &mut B, op: &Opcode, f: fn(&Self) -> u8) -> i32 {
        let target = self.resolve(bus, op.mode, Access::Write);
        bus.write(target.addr, f(self));
        0
    }

    fn modify_op<B: Bus>(&mut self, bus: &mut B, op: &Opcode, f: fn(&mut Self, u8) -> u8) -> i32 {
        let target = self.resolve(bus, op.mode, Access::Write);
        let value = bus.read(target.addr);
        bus.write(target.addr, value);
        let result = f(self, value);
        bus.write(target.addr, result);
        0
    }

    fn accumulator<B: Bus>(&mut self, bus: &mut B, f: fn(&mut Self, u8) -> u8) -> i32 {
        bus.read(self.regs.pc);
        self.regs.a = f(self, self.regs.a);
        0
    }

    fn implied<B: Bus>(&mut self, bus: &mut B) -> i32 {
        bus.read(self.regs.pc);
        0
    }

    fn flag<B: Bus>(&mut self, bus: &mut B, flag: u8, set: bool) -> i32 {
        bus.read(self.regs.pc);
        self.regs.p.set_if(flag, set);
        0
    }

    fn transfer<B: Bus>(&mut self, bus: &mut B, apply: fn(&mut Self), result: fn(&Self) -> u8) -> i32 {
        bus.read(self.regs.pc);
        apply(self);
        let value = result(self);
        self.regs.p.update_nz(value);
        0
    }

    /// SHA, SHX, SHY and TAS store the register ANDed with the base high
    /// byte plus one. When indexing crosses a page that same value replaces
    /// the high byte of the target address.
    fn unstable_store<B: Bus>(&mut self, bus: &mut B, op: &Opcode) -> i32 {
        let target = self.resolve(bus, op.mode, Access::Write);
        let source = match op.mnemonic {
            M::Shx => self.regs.x,
            M::Shy => self.regs.y,
            M::Tas => {
                self.regs.s = self.regs.a & self.regs.x;
                self.regs.s
            }
            _ => self.regs.a & self.regs.x,
        };
        let high = (target.base >> 8) as u8;
        let value = source & high.wrapping_add(1);
        let addr = if target.crossed {
            (u16::from(value) << 8) | (target.addr & 0x00FF)
        } else {
            target.addr
        };
        bus.write(addr, value);
        0
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    /// Returns 0 when not taken, 1 when taken, 2 when taken across a page.
    fn branch<B: Bus>(&mut self, bus: &mut B, taken: bool) -> i32 {
        let offset = self.fetch_byte(bus) as i8;
        bus.read(self.regs.pc);
        if !taken {
            return 0;
        }
        let from = self.regs.pc;
        let target = from.wrapping_add_signed(i16::from(offset));
        self.regs.pc = target;
        if (from ^ target) & 0xFF00 == 0 {
            return 1;
        }
        bus.read((from & 0xFF00) | (target & 0x00FF));
        2
    }

    fn op_brk<B: Bus>(&mut self, bus: &mut B) -> i32 {
        // Padding byte
        self.fetch_byte(bus);
        let [lo, hi] = self.regs.pc.to_le_bytes();
        self.push(bus, hi);
        self.push(bus, lo);
        self.push(bus, self.regs.p.pushed_by_software());
        self.regs.p.set(I);
        self.regs.pc = self.read_word(bus, crate::IRQ_VECTOR);
        0
    }

    fn op_rti<B: Bus>(&mut self, bus: &mut B) -> i32 {
        let status = self.pull(bus);
        self.regs.p = Status::from_byte(status);
        let lo = self.pop(bus);
        let hi = self.pop(bus);
        self.regs.pc = u16::from_le_bytes([lo, hi]);
        self.transition(Event::MaskWritten);
        0
    }

    fn op_rts<B: Bus>(&mut self, bus: &mut B) -> i32 {
        let lo = self.pull(bus);
        let hi = self.pop(bus);
        self.regs.pc = u16::from_le_bytes([lo, hi]);
        bus.read(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        0
    }

    /// Pushes the address of its own last byte; RTS adds the one back.
    fn op_jsr<B: Bus>(&mut self, bus: &mut B) -> i32 {
        let lo = self.fetch_byte(bus);
        bus.read(self.regs.stack_addr());
        let [ret_lo, ret_hi] = self.regs.pc.to_le_bytes();
        self.push(bus, ret_hi);
        self.push(bus, ret_lo);
        let hi = self.fetch_byte(bus);
        self.regs.pc = u16::from_le_bytes([lo, hi]);
        0
    }

    /// The pointer's high byte is fetched without carrying into the page, so
    /// `JMP ($10FF)` reads `$10FF` and `$1000`.
    fn op_jmp_ind<B: Bus>(&mut self, bus: &mut B) -> i32 {
        let ptr = self.fetch_word(bus);
        let lo = bus.read(ptr);
        let hi = bus.read((ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF));
        self.regs.pc = u16::from_le_bytes([lo, hi]);
        0
    }
}
