//! Opcode descriptor table.
//!
//! One entry per opcode byte, undocumented ones included. The executor
//! dispatches on the mnemonic and resolves operands from the addressing
//! mode. `cycles` is the documented base count; it already includes the
//! index-fixup cycle for indexed stores and read-modify-write forms, which
//! always pay it. Entries with `page_penalty` add one cycle when indexing
//! crosses a page.

use std::fmt;

use Mnemonic as M;
use Mode::{Abs, Abx, Aby, Acc, Imm, Imp, Ind, Izx, Izy, Rel, Zp, Zpx, Zpy};

/// Addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Implied, no operand.
    Imp,
    /// Accumulator.
    Acc,
    /// `#$nn`
    Imm,
    /// `$nn`
    Zp,
    /// `$nn,X`
    Zpx,
    /// `$nn,Y`
    Zpy,
    /// `$nnnn`
    Abs,
    /// `$nnnn,X`
    Abx,
    /// `$nnnn,Y`
    Aby,
    /// `($nnnn)`, JMP only.
    Ind,
    /// `($nn,X)`
    Izx,
    /// `($nn),Y`
    Izy,
    /// Branch offset.
    Rel,
}

impl Mode {
    /// Operand bytes following the opcode.
    #[must_use]
    pub const fn operand_len(self) -> u8 {
        match self {
            Self::Imp | Self::Acc => 0,
            Self::Imm | Self::Zp | Self::Zpx | Self::Zpy | Self::Izx | Self::Izy | Self::Rel => 1,
            Self::Abs | Self::Abx | Self::Aby | Self::Ind => 2,
        }
    }
}

/// Instruction mnemonic. Undocumented opcodes use the names common in
/// C64 tooling (SLO, LAX, SHA, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Adc,
    And,
    Asl,
    Bcc,
    Bcs,
    Beq,
    Bit,
    Bmi,
    Bne,
    Bpl,
    Brk,
    Bvc,
    Bvs,
    Clc,
    Cld,
    Cli,
    Clv,
    Cmp,
    Cpx,
    Cpy,
    Dec,
    Dex,
    Dey,
    Eor,
    Inc,
    Inx,
    Iny,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Lsr,
    Nop,
    Ora,
    Pha,
    Php,
    Pla,
    Plp,
    Rol,
    Ror,
    Rti,
    Rts,
    Sbc,
    Sec,
    Sed,
    Sei,
    Sta,
    Stx,
    Sty,
    Tax,
    Tay,
    Tsx,
    Txa,
    Txs,
    Tya,
    // Undocumented
    Alr,
    Anc,
    Ane,
    Arr,
    Dcp,
    Isc,
    Jam,
    Las,
    Lax,
    Lxa,
    Rla,
    Rra,
    Sax,
    Sbx,
    Sha,
    Shx,
    Shy,
    Slo,
    Sre,
    Tas,
    Usbc,
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = format!("{self:?}").to_ascii_uppercase();
        f.write_str(&name)
    }
}

/// One opcode's static properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opcode {
    pub mnemonic: Mnemonic,
    pub mode: Mode,
    pub cycles: u8,
    pub page_penalty: bool,
}

impl Opcode {
    /// Instruction length in bytes.
    #[must_use]
    pub const fn byte_len(&self) -> u8 {
        1 + self.mode.operand_len()
    }
}

const fn op(mnemonic: Mnemonic, mode: Mode, cycles: u8) -> Opcode {
    Opcode {
        mnemonic,
        mode,
        cycles,
        page_penalty: false,
    }
}

const fn page(mnemonic: Mnemonic, mode: Mode, cycles: u8) -> Opcode {
    Opcode {
        mnemonic,
        mode,
        cycles,
        page_penalty: true,
    }
}

/// Descriptor for every opcode byte.
pub static OPCODES: [Opcode; 256] = [
    // $0x
    op(M::Brk, Imp, 7),
    op(M::Ora, Izx, 6),
    op(M::Jam, Imp, 2),
    op(M::Slo, Izx, 8),
    op(M::Nop, Zp, 3),
    op(M::Ora, Zp, 3),
    op(M::Asl, Zp, 5),
    op(M::Slo, Zp, 5),
    op(M::Php, Imp, 3),
    op(M::Ora, Imm, 2),
    op(M::Asl, Acc, 2),
    op(M::Anc, Imm, 2),
    op(M::Nop, Abs, 4),
    op(M::Ora, Abs, 4),
    op(M::Asl, Abs, 6),
    op(M::Slo, Abs, 6),
    // $1x
    op(M::Bpl, Rel, 2),
    page(M::Ora, Izy, 5),
    op(M::Jam, Imp, 2),
    op(M::Slo, Izy, 8),
    op(M::Nop, Zpx, 4),
    op(M::Ora, Zpx, 4),
    op(M::Asl, Zpx, 6),
    op(M::Slo, Zpx, 6),
    op(M::Clc, Imp, 2),
    page(M::Ora, Aby, 4),
    op(M::Nop, Imp, 2),
    op(M::Slo, Aby, 7),
    page(M::Nop, Abx, 4),
    page(M::Ora, Abx, 4),
    op(M::Asl, Abx, 7),
    op(M::Slo, Abx, 7),
    // $2x
    op(M::Jsr, Abs, 6),
    op(M::And, Izx, 6),
    op(M::Jam, Imp, 2),
    op(M::Rla, Izx, 8),
    op(M::Bit, Zp, 3),
    op(M::And, Zp, 3),
    op(M::Rol, Zp, 5),
    op(M::Rla, Zp, 5),
    op(M::Plp, Imp, 4),
    op(M::And, Imm, 2),
    op(M::Rol, Acc, 2),
    op(M::Anc, Imm, 2),
    op(M::Bit, Abs, 4),
    op(M::And, Abs, 4),
    op(M::Rol, Abs, 6),
    op(M::Rla, Abs, 6),
    // $3x
    op(M::Bmi, Rel, 2),
    page(M::And, Izy, 5),
    op(M::Jam, Imp, 2),
    op(M::Rla, Izy, 8),
    op(M::Nop, Zpx, 4),
    op(M::And, Zpx, 4),
    op(M::Rol, Zpx, 6),
    op(M::Rla, Zpx, 6),
    op(M::Sec, Imp, 2),
    page(M::And, Aby, 4),
    op(M::Nop, Imp, 2),
    op(M::Rla, Aby, 7),
    page(M::Nop, Abx, 4),
    page(M::And, Abx, 4),
    op(M::Rol, Abx, 7),
    op(M::Rla, Abx, 7),
    // $4x
    op(M::Rti, Imp, 6),
    op(M::Eor, Izx, 6),
    op(M::Jam, Imp, 2),
    op(M::Sre, Izx, 8),
    op(M::Nop, Zp, 3),
    op(M::Eor, Zp, 3),
    op(M::Lsr, Zp, 5),
    op(M::Sre, Zp, 5),
    op(M::Pha, Imp, 3),
    op(M::Eor, Imm, 2),
    op(M::Lsr, Acc, 2),
    op(M::Alr, Imm, 2),
    op(M::Jmp, Abs, 3),
    op(M::Eor, Abs, 4),
    op(M::Lsr, Abs, 6),
    op(M::Sre, Abs, 6),
    // $5x
    op(M::Bvc, Rel, 2),
    page(M::Eor, Izy, 5),
    op(M::Jam, Imp, 2),
    op(M::Sre, Izy, 8),
    op(M::Nop, Zpx, 4),
    op(M::Eor, Zpx, 4),
    op(M::Lsr, Zpx, 6),
    op(M::Sre, Zpx, 6),
    op(M::Cli, Imp, 2),
    page(M::Eor, Aby, 4),
    op(M::Nop, Imp, 2),
    op(M::Sre, Aby, 7),
    page(M::Nop, Abx, 4),
    page(M::Eor, Abx, 4),
    op(M::Lsr, Abx, 7),
    op(M::Sre, Abx, 7),
    // $6x
    op(M::Rts, Imp, 6),
    op(M::Adc, Izx, 6),
    op(M::Jam, Imp, 2),
    op(M::Rra, Izx, 8),
    op(M::Nop, Zp, 3),
    op(M::Adc, Zp, 3),
    op(M::Ror, Zp, 5),
    op(M::Rra, Zp, 5),
    op(M::Pla, Imp, 4),
    op(M::Adc, Imm, 2),
    op(M::Ror, Acc, 2),
    op(M::Arr, Imm, 2),
    op(M::Jmp, Ind, 5),
    op(M::Adc, Abs, 4),
    op(M::Ror, Abs, 6),
    op(M::Rra, Abs, 6),
    // $7x
    op(M::Bvs, Rel, 2),
    page(M::Adc, Izy, 5),
    op(M::Jam, Imp, 2),
    op(M::Rra, Izy, 8),
    op(M::Nop, Zpx, 4),
    op(M::Adc, Zpx, 4),
    op(M::Ror, Zpx, 6),
    op(M::Rra, Zpx, 6),
    op(M::Sei, Imp, 2),
    page(M::Adc, Aby, 4),
    op(M::Nop, Imp, 2),
    op(M::Rra, Aby, 7),
    page(M::Nop, Abx, 4),
    page(M::Adc, Abx, 4),
    op(M::Ror, Abx, 7),
    op(M::Rra, Abx, 7),
    // $8x
    op(M::Nop, Imm, 2),
    op(M::Sta, Izx, 6),
    op(M::Nop, Imm, 2),
    op(M::Sax, Izx, 6),
    op(M::Sty, Zp, 3),
    op(M::Sta, Zp, 3),
    op(M::Stx, Zp, 3),
    op(M::Sax, Zp, 3),
    op(M::Dey, Imp, 2),
    op(M::Nop, Imm, 2),
    op(M::Txa, Imp, 2),
    op(M::Ane, Imm, 2),
    op(M::Sty, Abs, 4),
    op(M::Sta, Abs, 4),
    op(M::Stx, Abs, 4),
    op(M::Sax, Abs, 4),
    // $9x
    op(M::Bcc, Rel, 2),
    op(M::Sta, Izy, 6),
    op(M::Jam, Imp, 2),
    op(M::Sha, Izy, 6),
    op(M::Sty, Zpx, 4),
    op(M::Sta, Zpx, 4),
    op(M::Stx, Zpy, 4),
    op(M::Sax, Zpy, 4),
    op(M::Tya, Imp, 2),
    op(M::Sta, Aby, 5),
    op(M::Txs, Imp, 2),
    op(M::Tas, Aby, 5),
    op(M::Shy, Abx, 5),
    op(M::Sta, Abx, 5),
    op(M::Shx, Aby, 5),
    op(M::Sha, Aby, 5),
    // $Ax
    op(M::Ldy, Imm, 2),
    op(M::Lda, Izx, 6),
    op(M::Ldx, Imm, 2),
    op(M::Lax, Izx, 6),
    op(M::Ldy, Zp, 3),
    op(M::Lda, Zp, 3),
    op(M::Ldx, Zp, 3),
    op(M::Lax, Zp, 3),
    op(M::Tay, Imp, 2),
    op(M::Lda, Imm, 2),
    op(M::Tax, Imp, 2),
    op(M::Lxa, Imm, 2),
    op(M::Ldy, Abs, 4),
    op(M::Lda, Abs, 4),
    op(M::Ldx, Abs, 4),
    op(M::Lax, Abs, 4),
    // $Bx
    op(M::Bcs, Rel, 2),
    page(M::Lda, Izy, 5),
    op(M::Jam, Imp, 2),
    page(M::Lax, Izy, 5),
    op(M::Ldy, Zpx, 4),
    op(M::Lda, Zpx, 4),
    op(M::Ldx, Zpy, 4),
    op(M::Lax, Zpy, 4),
    op(M::Clv, Imp, 2),
    page(M::Lda, Aby, 4),
    op(M::Tsx, Imp, 2),
    page(M::Las, Aby, 4),
    page(M::Ldy, Abx, 4),
    page(M::Lda, Abx, 4),
    page(M::Ldx, Aby, 4),
    page(M::Lax, Aby, 4),
    // $Cx
    op(M::Cpy, Imm, 2),
    op(M::Cmp, Izx, 6),
    op(M::Nop, Imm, 2),
    op(M::Dcp, Izx, 8),
    op(M::Cpy, Zp, 3),
    op(M::Cmp, Zp, 3),
    op(M::Dec, Zp, 5),
    op(M::Dcp, Zp, 5),
    op(M::Iny, Imp, 2),
    op(M::Cmp, Imm, 2),
    op(M::Dex, Imp, 2),
    op(M::Sbx, Imm, 2),
    op(M::Cpy, Abs, 4),
    op(M::Cmp, Abs, 4),
    op(M::Dec, Abs, 6),
    op(M::Dcp, Abs, 6),
    // $Dx
    op(M::Bne, Rel, 2),
    page(M::Cmp, Izy, 5),
    op(M::Jam, Imp, 2),
    op(M::Dcp, Izy, 8),
    op(M::Nop, Zpx, 4),
    op(M::Cmp, Zpx, 4),
    op(M::Dec, Zpx, 6),
    op(M::Dcp, Zpx, 6),
    op(M::Cld, Imp, 2),
    page(M::Cmp, Aby, 4),
    op(M::Nop, Imp, 2),
    op(M::Dcp, Aby, 7),
    page(M::Nop, Abx, 4),
    page(M::Cmp, Abx, 4),
    op(M::Dec, Abx, 7),
    op(M::Dcp, Abx, 7),
    // $Ex
    op(M::Cpx, Imm, 2),
    op(M::Sbc, Izx, 6),
    op(M::Nop, Imm, 2),
    op(M::Isc, Izx, 8),
    op(M::Cpx, Zp, 3),
    op(M::Sbc, Zp, 3),
    op(M::Inc, Zp, 5),
    op(M::Isc, Zp, 5),
    op(M::Inx, Imp, 2),
    op(M::Sbc, Imm, 2),
    op(M::Nop, Imp, 2),
    op(M::Usbc, Imm, 2),
    op(M::Cpx, Abs, 4),
    op(M::Sbc, Abs, 4),
    op(M::Inc, Abs, 6),
    op(M::Isc, Abs, 6),
    // $Fx
    op(M::Beq, Rel, 2),
    page(M::Sbc, Izy, 5),
    op(M::Jam, Imp, 2),
    op(M::Isc, Izy, 8),
    op(M::Nop, Zpx, 4),
    op(M::Sbc, Zpx, 4),
    op(M::Inc, Zpx, 6),
    op(M::Isc, Zpx, 6),
    op(M::Sed, Imp, 2),
    page(M::Sbc, Aby, 4),
    op(M::Nop, Imp, 2),
    op(M::Isc, Aby, 7),
    page(M::Nop, Abx, 4),
    page(M::Sbc, Abx, 4),
    op(M::Inc, Abx, 7),
    op(M::Isc, Abx, 7),
];
