use crate::decoder::{decode, Decoded, Op, Operand};

pub fn fmt_decoded(d: &Decoded) -> String {
    let mn = d.mnemonic();
    match d.op {
        Op::Halt => mn.to_string(),
        Op::Add | Op::Sub | Op::Lsh => format!("{} r{}, r{}, {}", mn, d.rd, d.rs1, operand(d)),
        Op::Mov | Op::Cmp => format!("{} r{}, {}", mn, d.rd, operand(d)),
        Op::Load => format!("{} r{}, [r{}+{:#x}]", mn, d.rd, d.rs1, d.imm),
        Op::Store => format!("{} [r{}+{:#x}], r{}", mn, d.rs1, d.imm, d.rd),
        Op::Jmp => format!("{} {:#x}", mn, d.imm),
        Op::Beq | Op::Bne | Op::Bec => format!("{} {}", mn, signed_hex(d.disp())),
    }
}

fn operand(d: &Decoded) -> String {
    match d.operand2() {
        Operand::Reg(r) => format!("r{}", r),
        Operand::Imm(v) => format!("#{:#x}", v),
    }
}

fn signed_hex(v: i32) -> String {
    if v < 0 {
        format!("-{:#x}", v.unsigned_abs())
    } else {
        format!("+{:#x}", v)
    }
}

/// One line per word: address, raw encoding, and text (or `.word` for
/// values that do not decode).
pub fn listing(words: &[u32]) -> Vec<String> {
    words
        .iter()
        .enumerate()
        .map(|(i, &raw)| {
            let addr = i * 4;
            match decode(raw) {
                Some(d) => format!("{:08x}: {:08x}  {}", addr, raw, fmt_decoded(&d)),
                None => format!("{:08x}: {:08x}  .word {:#010x}", addr, raw, raw),
            }
        })
        .collect()
}
