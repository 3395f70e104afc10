pub mod assembler;
pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod exec;
pub mod instructions;
pub mod memory;
pub mod video;

pub mod isa {
    pub mod fc32; // 32-bit fixed-width fantasy console ISA
}

pub use assembler::{assemble, encode, Assembler, EncodeError, Instr, Overflow, Program, Src};
pub use cpu::{Cpu, CpuConfig, CpuState, Flags, Trap};
pub use memory::{Bus, LinearMemory, MemoryError};
