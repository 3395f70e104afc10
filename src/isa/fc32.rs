use serde::{Deserialize, Serialize};

/// FC32 instruction word layout.
///
/// Every instruction is one 32-bit word. Fields, MSB first:
///
/// ```text
///  31      26 25    21 20    16 15    11 10             0
/// +----------+--------+--------+--------+----------------+
/// |  opcode  |  dest  |  src1  |  src2  |     unused     |   register form
/// +----------+--------+--------+--------+--------+-------+
/// |  opcode  |  dest  |  src1  |     unused      | imm8  |   immediate form
/// +----------+--------+--------+-----------------+-------+
/// |  opcode  |              disp26 / target26            |   branch form
/// +----------+-------------------------------------------+
/// ```
pub const OPCODE_SHIFT: u32 = 26;
pub const OPCODE_MASK: u32 = 0x3F;
pub const DEST_SHIFT: u32 = 21;
pub const SRC1_SHIFT: u32 = 16;
pub const SRC2_SHIFT: u32 = 11;
pub const REG_FIELD_MASK: u32 = 0x1F;
pub const IMM8_MASK: u32 = 0xFF;
pub const DISP26_BITS: u32 = 26;
pub const DISP26_MASK: u32 = (1 << DISP26_BITS) - 1;

/// Number of architectural general purpose registers.
pub const NUM_REGS: usize = 8;

/// Canonical opcode numbering.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Halt = 0x00,
    AddReg = 0x01,
    AddImm = 0x02,
    MovReg = 0x03,
    MovImm = 0x04,
    SubReg = 0x05,
    SubImm = 0x06,
    Jmp = 0x07,
    Store = 0x08,
    Load = 0x09,
    Beq = 0x0A,
    Bne = 0x0B,
    Bec = 0x0C,
    CmpReg = 0x0D,
    CmpImm = 0x0E,
    LshReg = 0x0F,
    LshImm = 0x10,
}

impl Opcode {
    pub const ALL: [Opcode; 17] = [
        Opcode::Halt,
        Opcode::AddReg,
        Opcode::AddImm,
        Opcode::MovReg,
        Opcode::MovImm,
        Opcode::SubReg,
        Opcode::SubImm,
        Opcode::Jmp,
        Opcode::Store,
        Opcode::Load,
        Opcode::Beq,
        Opcode::Bne,
        Opcode::Bec,
        Opcode::CmpReg,
        Opcode::CmpImm,
        Opcode::LshReg,
        Opcode::LshImm,
    ];

    pub fn from_bits(bits: u8) -> Option<Self> {
        Self::ALL.get(bits as usize).copied()
    }

    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// Raw field accessor over an encoded word. Pure shift-and-mask, no validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Word(pub u32);

impl Word {
    #[inline]
    pub fn opcode(self) -> u8 {
        ((self.0 >> OPCODE_SHIFT) & OPCODE_MASK) as u8
    }

    #[inline]
    pub fn dest_or_src(self) -> u8 {
        ((self.0 >> DEST_SHIFT) & REG_FIELD_MASK) as u8
    }

    #[inline]
    pub fn src1(self) -> u8 {
        ((self.0 >> SRC1_SHIFT) & REG_FIELD_MASK) as u8
    }

    #[inline]
    pub fn src2(self) -> u8 {
        ((self.0 >> SRC2_SHIFT) & REG_FIELD_MASK) as u8
    }

    #[inline]
    pub fn imm8(self) -> u8 {
        (self.0 & IMM8_MASK) as u8
    }

    /// Raw 26-bit branch field, unsigned.
    #[inline]
    pub fn disp26(self) -> u32 {
        self.0 & DISP26_MASK
    }

    /// Branch field sign-extended to a byte displacement.
    #[inline]
    pub fn disp26_signed(self) -> i32 {
        sign_extend(self.disp26(), DISP26_BITS)
    }
}

impl From<u32> for Word {
    fn from(raw: u32) -> Self {
        Word(raw)
    }
}

/// Sign-extend the low `bits` bits of `v`.
#[inline]
pub fn sign_extend(v: u32, bits: u32) -> i32 {
    let s = 32 - bits;
    ((v << s) as i32) >> s
}

#[inline]
pub fn pack_rrr(op: Opcode, dest: u8, src1: u8, src2: u8) -> u32 {
    ((op.bits() as u32) << OPCODE_SHIFT)
        | ((dest as u32 & REG_FIELD_MASK) << DEST_SHIFT)
        | ((src1 as u32 & REG_FIELD_MASK) << SRC1_SHIFT)
        | ((src2 as u32 & REG_FIELD_MASK) << SRC2_SHIFT)
}

#[inline]
pub fn pack_rri(op: Opcode, dest: u8, src1: u8, imm8: u8) -> u32 {
    ((op.bits() as u32) << OPCODE_SHIFT)
        | ((dest as u32 & REG_FIELD_MASK) << DEST_SHIFT)
        | ((src1 as u32 & REG_FIELD_MASK) << SRC1_SHIFT)
        | imm8 as u32
}

#[inline]
pub fn pack_branch(op: Opcode, field26: u32) -> u32 {
    ((op.bits() as u32) << OPCODE_SHIFT) | (field26 & DISP26_MASK)
}
