use crate::decoder::Op;
use crate::isa::fc32::Opcode;

/// How the fields of a word are interpreted for a given opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    /// No operands.
    None,
    /// dest, src1, src2 registers.
    RegRegReg,
    /// dest, src1 registers, imm8.
    RegRegImm,
    /// dest, src1 registers.
    RegReg,
    /// dest register, imm8.
    RegImm,
    /// value/dest register, base register, imm8 byte offset.
    Mem,
    /// Unsigned 26-bit absolute target.
    Abs26,
    /// Signed 26-bit displacement from the branch's own address.
    Rel26,
    /// Compare: a in the dest field, b register in src1.
    CmpReg,
    /// Compare: a in the dest field, b is imm8.
    CmpImm,
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub opcode: Opcode,
    pub op: Op,
    pub mnemonic: &'static str,
    pub mode: AddrMode,
}

const fn desc(opcode: Opcode, op: Op, mnemonic: &'static str, mode: AddrMode) -> InstrDesc {
    InstrDesc { opcode, op, mnemonic, mode }
}

/// Indexed by opcode value.
pub const TABLE: &[InstrDesc] = &[
    desc(Opcode::Halt, Op::Halt, "halt", AddrMode::None),
    desc(Opcode::AddReg, Op::Add, "add", AddrMode::RegRegReg),
    desc(Opcode::AddImm, Op::Add, "add", AddrMode::RegRegImm),
    desc(Opcode::MovReg, Op::Mov, "mov", AddrMode::RegReg),
    desc(Opcode::MovImm, Op::Mov, "mov", AddrMode::RegImm),
    desc(Opcode::SubReg, Op::Sub, "sub", AddrMode::RegRegReg),
    desc(Opcode::SubImm, Op::Sub, "sub", AddrMode::RegRegImm),
    desc(Opcode::Jmp, Op::Jmp, "jmp", AddrMode::Abs26),
    desc(Opcode::Store, Op::Store, "store", AddrMode::Mem),
    desc(Opcode::Load, Op::Load, "load", AddrMode::Mem),
    desc(Opcode::Beq, Op::Beq, "beq", AddrMode::Rel26),
    desc(Opcode::Bne, Op::Bne, "bne", AddrMode::Rel26),
    desc(Opcode::Bec, Op::Bec, "bec", AddrMode::Rel26),
    desc(Opcode::CmpReg, Op::Cmp, "cmp", AddrMode::CmpReg),
    desc(Opcode::CmpImm, Op::Cmp, "cmp", AddrMode::CmpImm),
    desc(Opcode::LshReg, Op::Lsh, "lsh", AddrMode::RegRegReg),
    desc(Opcode::LshImm, Op::Lsh, "lsh", AddrMode::RegRegImm),
];

pub fn lookup(opcode: Opcode) -> &'static InstrDesc {
    &TABLE[opcode.bits() as usize]
}
