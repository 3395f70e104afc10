use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::decoder;
use crate::disasm::fmt_decoded;
use crate::exec;
use crate::isa::fc32::NUM_REGS;
use crate::memory::{Bus, LinearMemory, MemoryError, DEFAULT_MEMORY_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    pub memory_size: usize,
    /// Fault on opcodes outside the table instead of skipping them.
    pub strict_opcodes: bool,
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            strict_opcodes: false,
        }
    }
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags: u8 {
const Z = 1 << 0; // Zero
const N = 1 << 1; // Negative
const C = 1 << 2; // Carry
const V = 1 << 3; // Overflow (reserved, never written)
}
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Trap {
    #[error("Invalid instruction {raw:#010x} at {pc:#010x}")]
    InvalidInstruction { pc: u32, raw: u32 },
    #[error("Unaligned fetch at {pc:#010x}")]
    Unaligned { pc: u32 },
    #[error("Memory fault at {pc:#010x}: {source}")]
    Memory {
        pc: u32,
        #[source]
        source: MemoryError,
    },
    #[error("Effective address overflow at {pc:#010x}: {base:#010x} + {offset:#x}")]
    AddressOverflow { pc: u32, base: u32, offset: u32 },
}

/// Architectural state without memory, for inspection and dumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuState {
    pub pc: u32,
    pub regs: [u32; NUM_REGS],
    pub flags: Flags,
    pub halted: bool,
    pub cycles: u64,
}

/// Single-hart FC32 core. Owns its memory; all mutation goes through
/// [`Cpu::run_cycle`] or the explicit inspection accessors.
#[derive(Debug, Clone)]
pub struct Cpu<B: Bus = LinearMemory> {
    pub pc: u32,
    pub regs: [u32; NUM_REGS],
    pub flags: Flags,
    pub cfg: CpuConfig,
    mem: B,
    inst_addr: u32,
    halted: bool,
    cycles: u64,
}

impl Cpu<LinearMemory> {
    pub fn new(cfg: CpuConfig) -> Self {
        Self::with_bus(cfg, LinearMemory::new(cfg.memory_size))
    }
}

impl Default for Cpu<LinearMemory> {
    fn default() -> Self {
        Self::new(CpuConfig::default())
    }
}

impl<B: Bus> Cpu<B> {
    pub fn with_bus(cfg: CpuConfig, mem: B) -> Self {
        Self {
            pc: 0,
            regs: [0; NUM_REGS],
            flags: Flags::empty(),
            cfg,
            mem,
            inst_addr: 0,
            halted: false,
            cycles: 0,
        }
    }

    /// Write the program image as consecutive words from address 0.
    pub fn load_program(&mut self, words: &[u32]) -> Result<(), MemoryError> {
        for (i, w) in words.iter().enumerate() {
            self.mem.write_u32((i * 4) as u32, *w)?;
        }
        debug!(words = words.len(), "program loaded");
        Ok(())
    }

    pub fn halted(&self) -> bool {
        self.halted
    }

    pub(crate) fn halt(&mut self) {
        self.halted = true;
    }

    /// Instructions executed so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Address of the most recently fetched instruction; the base for
    /// relative branches.
    pub fn instruction_address(&self) -> u32 {
        self.inst_addr
    }

    pub fn mem(&self) -> &B {
        &self.mem
    }

    pub fn mem_mut(&mut self) -> &mut B {
        &mut self.mem
    }

    pub fn read32(&self, addr: u32) -> Result<u32, MemoryError> {
        self.mem.read_u32(addr)
    }

    pub fn write32(&mut self, addr: u32, val: u32) -> Result<(), MemoryError> {
        self.mem.write_u32(addr, val)
    }

    /// Register access by index. The register field is 5 bits wide but only
    /// r0..r7 exist: r8..r31 read as zero.
    #[inline]
    pub fn reg(&self, r: u8) -> u32 {
        self.regs.get(r as usize).copied().unwrap_or(0)
    }

    /// Writes to r8..r31 are discarded.
    #[inline]
    pub fn set_reg(&mut self, r: u8, val: u32) {
        if let Some(slot) = self.regs.get_mut(r as usize) {
            *slot = val;
        }
    }

    pub fn snapshot(&self) -> CpuState {
        CpuState {
            pc: self.pc,
            regs: self.regs,
            flags: self.flags,
            halted: self.halted,
            cycles: self.cycles,
        }
    }

    /// Fetch, decode and execute exactly one instruction. Does nothing once
    /// the core has halted.
    ///
    /// Besides memory faults, a fetch from a PC that is not 4-aligned is
    /// [`Trap::Unaligned`]. Assembled code cannot produce one under
    /// [`Overflow::Reject`](crate::Overflow::Reject); it takes a truncated
    /// branch target or a direct write to `pc`.
    pub fn run_cycle(&mut self) -> Result<(), Trap> {
        if self.halted {
            return Ok(());
        }
        let pc = self.pc;
        if pc % 4 != 0 {
            return Err(Trap::Unaligned { pc });
        }
        let raw = self
            .mem
            .read_u32(pc)
            .map_err(|source| Trap::Memory { pc, source })?;
        self.inst_addr = pc;
        self.pc = pc.wrapping_add(4);
        self.cycles += 1;

        match decoder::decode(raw) {
            Some(d) => {
                trace!(pc, raw, "{}", fmt_decoded(&d));
                exec::execute(self, &d)
            }
            None if self.cfg.strict_opcodes => Err(Trap::InvalidInstruction { pc, raw }),
            None => {
                warn!(pc, raw, "unknown opcode skipped");
                Ok(())
            }
        }
    }

    /// Run until HALT. There is no step limit: a program that never halts
    /// keeps this call busy forever. Returns the number of instructions
    /// executed by this call.
    pub fn run_until_halt(&mut self) -> Result<u64, Trap> {
        let start = self.cycles;
        while !self.halted {
            self.run_cycle()?;
        }
        let ran = self.cycles - start;
        debug!(cycles = ran, pc = self.inst_addr, "halted");
        Ok(ran)
    }
}
