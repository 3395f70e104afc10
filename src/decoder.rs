use serde::{Deserialize, Serialize};

use crate::instructions::{self, AddrMode};
use crate::isa::fc32::{Opcode, Word};

/// Semantic operation, independent of register/immediate form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Halt,
    Add,
    Sub,
    Mov,
    Lsh,
    Cmp,
    Load,
    Store,
    Jmp,
    Beq,
    Bne,
    Bec,
}

/// Second operand of an ALU/compare op, resolved by addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operand {
    Reg(u8),
    Imm(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    pub op: Op,
    pub opcode: Opcode,
    pub raw: u32,
    pub rd: u8,  // dest, store value, or compare lhs
    pub rs1: u8, // src1 or memory base
    pub rs2: u8,
    pub imm: u32, // imm8, absolute target, or sign-extended displacement
}

impl Decoded {
    pub fn mode(&self) -> AddrMode {
        instructions::lookup(self.opcode).mode
    }

    pub fn mnemonic(&self) -> &'static str {
        instructions::lookup(self.opcode).mnemonic
    }

    /// The operand an ALU op combines with `rs1` (or moves into `rd`).
    pub fn operand2(&self) -> Operand {
        match self.mode() {
            AddrMode::RegRegReg => Operand::Reg(self.rs2),
            AddrMode::RegReg | AddrMode::CmpReg => Operand::Reg(self.rs1),
            _ => Operand::Imm(self.imm),
        }
    }

    /// Branch displacement in bytes (only meaningful for `Rel26`).
    pub fn disp(&self) -> i32 {
        self.imm as i32
    }
}

/// Decode a raw word. `None` for opcode values outside the table.
pub fn decode(raw: u32) -> Option<Decoded> {
    let w = Word(raw);
    let opcode = Opcode::from_bits(w.opcode())?;
    let desc = instructions::lookup(opcode);
    let mut d = Decoded {
        op: desc.op,
        opcode,
        raw,
        rd: 0,
        rs1: 0,
        rs2: 0,
        imm: 0,
    };
    match desc.mode {
        AddrMode::None => {}
        AddrMode::RegRegReg => {
            d.rd = w.dest_or_src();
            d.rs1 = w.src1();
            d.rs2 = w.src2();
        }
        AddrMode::RegRegImm | AddrMode::Mem => {
            d.rd = w.dest_or_src();
            d.rs1 = w.src1();
            d.imm = w.imm8() as u32;
        }
        AddrMode::RegReg | AddrMode::CmpReg => {
            d.rd = w.dest_or_src();
            d.rs1 = w.src1();
        }
        AddrMode::RegImm | AddrMode::CmpImm => {
            d.rd = w.dest_or_src();
            d.imm = w.imm8() as u32;
        }
        AddrMode::Abs26 => d.imm = w.disp26(),
        AddrMode::Rel26 => d.imm = w.disp26_signed() as u32,
    }
    Some(d)
}
