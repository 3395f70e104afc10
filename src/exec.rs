use tracing::debug;

use crate::cpu::{Cpu, Flags, Trap};
use crate::decoder::{Decoded, Op, Operand};
use crate::memory::Bus;

#[inline]
fn operand<B: Bus>(cpu: &Cpu<B>, o: Operand) -> u32 {
    match o {
        Operand::Reg(r) => cpu.reg(r),
        Operand::Imm(v) => v,
    }
}

#[inline]
fn set_zn<B: Bus>(cpu: &mut Cpu<B>, res: u32) {
    cpu.flags.set(Flags::Z, res == 0);
    cpu.flags.set(Flags::N, (res as i32) < 0);
}

/// `reg[base] + offset`; overflowing the 32-bit address space is a fault.
fn effective_addr<B: Bus>(cpu: &Cpu<B>, d: &Decoded) -> Result<u32, Trap> {
    let base = cpu.reg(d.rs1);
    base.checked_add(d.imm).ok_or(Trap::AddressOverflow {
        pc: cpu.instruction_address(),
        base,
        offset: d.imm,
    })
}

fn branch<B: Bus>(cpu: &mut Cpu<B>, d: &Decoded, taken: bool) {
    if taken {
        cpu.pc = cpu.instruction_address().wrapping_add(d.disp() as u32);
    }
}

pub fn execute<B: Bus>(cpu: &mut Cpu<B>, d: &Decoded) -> Result<(), Trap> {
    match d.op {
        Op::Halt => {
            cpu.halt();
            debug!(pc = cpu.instruction_address(), "HALT");
        }
        Op::Add => {
            let res = cpu.reg(d.rs1).wrapping_add(operand(cpu, d.operand2()));
            cpu.set_reg(d.rd, res);
            set_zn(cpu, res);
        }
        Op::Sub => {
            let res = cpu.reg(d.rs1).wrapping_sub(operand(cpu, d.operand2()));
            cpu.set_reg(d.rd, res);
            set_zn(cpu, res);
        }
        Op::Mov => {
            let val = operand(cpu, d.operand2());
            cpu.set_reg(d.rd, val);
            set_zn(cpu, val);
        }
        Op::Lsh => {
            // Shift counts of 32 or more clear the register.
            let amount = operand(cpu, d.operand2());
            let res = cpu.reg(d.rs1).checked_shl(amount).unwrap_or(0);
            cpu.set_reg(d.rd, res);
            set_zn(cpu, res);
        }
        Op::Cmp => {
            let a = cpu.reg(d.rd) as i32;
            let b = operand(cpu, d.operand2()) as i32;
            cpu.flags.set(Flags::Z, a == b);
            cpu.flags.set(Flags::C, a > b);
        }
        Op::Load => {
            let addr = effective_addr(cpu, d)?;
            let val = cpu.read32(addr).map_err(|source| Trap::Memory {
                pc: cpu.instruction_address(),
                source,
            })?;
            cpu.set_reg(d.rd, val);
            set_zn(cpu, val);
        }
        Op::Store => {
            let addr = effective_addr(cpu, d)?;
            let val = cpu.reg(d.rd);
            let pc = cpu.instruction_address();
            // Stores leave the flags alone.
            cpu.write32(addr, val)
                .map_err(|source| Trap::Memory { pc, source })?;
        }
        Op::Jmp => {
            cpu.pc = d.imm;
        }
        Op::Beq => {
            let taken = cpu.flags.contains(Flags::Z);
            branch(cpu, d, taken);
        }
        Op::Bne => {
            let taken = !cpu.flags.contains(Flags::Z);
            branch(cpu, d, taken);
        }
        Op::Bec => {
            let taken = cpu.flags.contains(Flags::C);
            branch(cpu, d, taken);
        }
    }
    Ok(())
}
