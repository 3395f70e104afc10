//! Encoder from typed instruction descriptors to FC32 words.
//!
//! Programs are built as `Vec<Instr>` (in code or deserialized from JSON)
//! and encoded ahead of execution; nothing here touches a running core.

use serde::{Deserialize, Serialize};

use crate::isa::fc32::{
    pack_branch, pack_rri, pack_rrr, Opcode, DISP26_BITS, DISP26_MASK, IMM8_MASK, NUM_REGS,
};

/// Register or literal operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Src {
    Reg(u8),
    Imm(u32),
}

/// One instruction, by operation and operand values.
///
/// `Jmp::target` is an absolute byte address; `disp` of the conditional
/// branches is a byte offset from the branch instruction's own address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Instr {
    Halt,
    Add { rd: u8, rs1: u8, src: Src },
    Sub { rd: u8, rs1: u8, src: Src },
    Lsh { rd: u8, rs1: u8, src: Src },
    Mov { rd: u8, src: Src },
    Cmp { a: u8, b: Src },
    Load { rd: u8, base: u8, offset: u32 },
    Store { rs: u8, base: u8, offset: u32 },
    Jmp { target: u32 },
    Beq { disp: i32 },
    Bne { disp: i32 },
    Bec { disp: i32 },
}

/// What to do with a literal that does not fit its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    /// Fail with an [`EncodeError`].
    #[default]
    Reject,
    /// Mask to the field width, like a fixed-width encoding silently would.
    Truncate,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("register r{0} does not exist (r0..r7)")]
    InvalidRegister(u8),
    #[error("immediate {0:#x} does not fit in 8 bits")]
    ImmediateOutOfRange(u32),
    #[error("branch displacement {0} does not fit in 26 signed bits")]
    DisplacementOutOfRange(i32),
    #[error("jump target {0:#x} does not fit in 26 bits")]
    TargetOutOfRange(u32),
    #[error("branch offset {0} is not word aligned")]
    Misaligned(i64),
    #[error("program image of {0} bytes is not a whole number of words")]
    ImageLength(usize),
    #[error("instruction {index}: {source}")]
    At {
        index: usize,
        #[source]
        source: Box<EncodeError>,
    },
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Assembler {
    pub overflow: Overflow,
}

impl Assembler {
    pub fn new(overflow: Overflow) -> Self {
        Self { overflow }
    }

    pub fn encode(&self, inst: &Instr) -> Result<u32, EncodeError> {
        use Instr::*;
        Ok(match *inst {
            Halt => pack_branch(Opcode::Halt, 0),
            Add { rd, rs1, src } => self.alu(Opcode::AddReg, Opcode::AddImm, rd, rs1, src)?,
            Sub { rd, rs1, src } => self.alu(Opcode::SubReg, Opcode::SubImm, rd, rs1, src)?,
            Lsh { rd, rs1, src } => self.alu(Opcode::LshReg, Opcode::LshImm, rd, rs1, src)?,
            Mov { rd, src: Src::Reg(rs) } => pack_rrr(Opcode::MovReg, reg(rd)?, reg(rs)?, 0),
            Mov { rd, src: Src::Imm(v) } => pack_rri(Opcode::MovImm, reg(rd)?, 0, self.imm8(v)?),
            Cmp { a, b: Src::Reg(rb) } => pack_rrr(Opcode::CmpReg, reg(a)?, reg(rb)?, 0),
            Cmp { a, b: Src::Imm(v) } => pack_rri(Opcode::CmpImm, reg(a)?, 0, self.imm8(v)?),
            Load { rd, base, offset } => {
                pack_rri(Opcode::Load, reg(rd)?, reg(base)?, self.imm8(offset)?)
            }
            Store { rs, base, offset } => {
                pack_rri(Opcode::Store, reg(rs)?, reg(base)?, self.imm8(offset)?)
            }
            Jmp { target } => pack_branch(Opcode::Jmp, self.target26(target)?),
            Beq { disp } => pack_branch(Opcode::Beq, self.disp26(disp)?),
            Bne { disp } => pack_branch(Opcode::Bne, self.disp26(disp)?),
            Bec { disp } => pack_branch(Opcode::Bec, self.disp26(disp)?),
        })
    }

    /// Encode a whole program; errors carry the index of the offending
    /// instruction.
    pub fn assemble(&self, insts: &[Instr]) -> Result<Program, EncodeError> {
        let words = insts
            .iter()
            .enumerate()
            .map(|(index, inst)| {
                self.encode(inst).map_err(|e| EncodeError::At {
                    index,
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Program { words })
    }

    fn alu(
        &self,
        reg_form: Opcode,
        imm_form: Opcode,
        rd: u8,
        rs1: u8,
        src: Src,
    ) -> Result<u32, EncodeError> {
        Ok(match src {
            Src::Reg(rs2) => pack_rrr(reg_form, reg(rd)?, reg(rs1)?, reg(rs2)?),
            Src::Imm(v) => pack_rri(imm_form, reg(rd)?, reg(rs1)?, self.imm8(v)?),
        })
    }

    fn imm8(&self, v: u32) -> Result<u8, EncodeError> {
        match self.overflow {
            Overflow::Reject if v > IMM8_MASK => Err(EncodeError::ImmediateOutOfRange(v)),
            _ => Ok((v & IMM8_MASK) as u8),
        }
    }

    fn disp26(&self, disp: i32) -> Result<u32, EncodeError> {
        if self.overflow == Overflow::Reject {
            let limit = 1i32 << (DISP26_BITS - 1);
            if disp < -limit || disp >= limit {
                return Err(EncodeError::DisplacementOutOfRange(disp));
            }
            if disp % 4 != 0 {
                return Err(EncodeError::Misaligned(disp as i64));
            }
        }
        Ok(disp as u32 & DISP26_MASK)
    }

    fn target26(&self, target: u32) -> Result<u32, EncodeError> {
        if self.overflow == Overflow::Reject {
            if target > DISP26_MASK {
                return Err(EncodeError::TargetOutOfRange(target));
            }
            if target % 4 != 0 {
                return Err(EncodeError::Misaligned(target as i64));
            }
        }
        Ok(target & DISP26_MASK)
    }
}

fn reg(r: u8) -> Result<u8, EncodeError> {
    if (r as usize) < NUM_REGS {
        Ok(r)
    } else {
        Err(EncodeError::InvalidRegister(r))
    }
}

/// Encode one instruction, rejecting literals that do not fit.
pub fn encode(inst: &Instr) -> Result<u32, EncodeError> {
    Assembler::default().encode(inst)
}

/// Encode a program, rejecting literals that do not fit.
pub fn assemble(insts: &[Instr]) -> Result<Program, EncodeError> {
    Assembler::default().assemble(insts)
}

/// An encoded program image, loaded at address 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub words: Vec<u32>,
}

impl Program {
    pub fn len_bytes(&self) -> usize {
        self.words.len() * 4
    }

    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    pub fn from_le_bytes(bytes: &[u8]) -> Result<Self, EncodeError> {
        if bytes.len() % 4 != 0 {
            return Err(EncodeError::ImageLength(bytes.len()));
        }
        let words = bytes
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(Self { words })
    }
}

impl From<Vec<u32>> for Program {
    fn from(words: Vec<u32>) -> Self {
        Self { words }
    }
}

impl AsRef<[u32]> for Program {
    fn as_ref(&self) -> &[u32] {
        &self.words
    }
}
