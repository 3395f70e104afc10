use serde::{Deserialize, Serialize};

/// 16 MiB of flat, byte-addressable RAM.
pub const DEFAULT_MEMORY_SIZE: usize = 16 * 1024 * 1024;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("{width}-byte access at {addr:#010x} is outside memory of {size:#x} bytes")]
    OutOfBounds { addr: u32, width: u8, size: usize },
}

pub trait Bus {
    fn size(&self) -> usize;
    fn read_u8(&self, addr: u32) -> Result<u8, MemoryError>;
    fn read_u32(&self, addr: u32) -> Result<u32, MemoryError>;
    fn write_u8(&mut self, addr: u32, val: u8) -> Result<(), MemoryError>;
    fn write_u32(&mut self, addr: u32, val: u32) -> Result<(), MemoryError>;
}

/// Little-endian RAM. Unaligned 32-bit accesses are allowed and touch the
/// four bytes starting at `addr`; accesses never wrap past the end.
#[derive(Clone, Serialize, Deserialize)]
pub struct LinearMemory {
    mem: Vec<u8>,
}

impl LinearMemory {
    pub fn new(size: usize) -> Self {
        Self { mem: vec![0; size] }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.mem
    }

    /// Copy `bytes` into memory starting at `addr`.
    pub fn write_bytes(&mut self, addr: u32, bytes: &[u8]) -> Result<(), MemoryError> {
        let off = self.check(addr, bytes.len())?;
        self.mem[off..off + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn check(&self, addr: u32, width: usize) -> Result<usize, MemoryError> {
        let off = addr as usize;
        match off.checked_add(width) {
            Some(end) if end <= self.mem.len() => Ok(off),
            _ => Err(MemoryError::OutOfBounds {
                addr,
                width: width.min(u8::MAX as usize) as u8,
                size: self.mem.len(),
            }),
        }
    }
}

impl Default for LinearMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_SIZE)
    }
}

impl std::fmt::Debug for LinearMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearMemory")
            .field("size", &self.mem.len())
            .finish()
    }
}

impl Bus for LinearMemory {
    fn size(&self) -> usize {
        self.mem.len()
    }
    fn read_u8(&self, addr: u32) -> Result<u8, MemoryError> {
        let off = self.check(addr, 1)?;
        Ok(self.mem[off])
    }
    fn read_u32(&self, addr: u32) -> Result<u32, MemoryError> {
        let off = self.check(addr, 4)?;
        Ok(u32::from_le_bytes([
            self.mem[off],
            self.mem[off + 1],
            self.mem[off + 2],
            self.mem[off + 3],
        ]))
    }
    fn write_u8(&mut self, addr: u32, val: u8) -> Result<(), MemoryError> {
        let off = self.check(addr, 1)?;
        self.mem[off] = val;
        Ok(())
    }
    fn write_u32(&mut self, addr: u32, val: u32) -> Result<(), MemoryError> {
        let off = self.check(addr, 4)?;
        self.mem[off..off + 4].copy_from_slice(&val.to_le_bytes());
        Ok(())
    }
}
