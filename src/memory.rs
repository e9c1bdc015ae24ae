use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a memory access, carried by every address error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    Load,
    Store,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Load => f.write_str("load"),
            Access::Store => f.write_str("store"),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{access} address error at {addr:#010x}: {reason}")]
pub struct AddressError {
    pub access: Access,
    pub addr: u32,
    pub reason: &'static str,
}

impl AddressError {
    pub fn new(access: Access, addr: u32, reason: &'static str) -> Self {
        Self { access, addr, reason }
    }
}

/// Memory collaborator used by the execution engine.
///
/// Word and halfword accesses are checked for alignment by the implementation.
/// Doubleword alignment is checked by the engine before it issues the two
/// word accesses.
pub trait Bus {
    fn get_word(&mut self, addr: u32) -> Result<i32, AddressError>;
    fn get_half(&mut self, addr: u32) -> Result<u16, AddressError>;
    fn get_byte(&mut self, addr: u32) -> Result<u8, AddressError>;
    fn set_word(&mut self, addr: u32, val: i32) -> Result<(), AddressError>;
    fn set_half(&mut self, addr: u32, val: u16) -> Result<(), AddressError>;
    fn set_byte(&mut self, addr: u32, val: u8) -> Result<(), AddressError>;
}

pub fn doubleword_aligned(addr: u32) -> bool {
    addr % 8 == 0
}

/// Flat little-endian memory mapped at `base`.
#[derive(Clone, Serialize, Deserialize)]
pub struct LinearMemory {
    pub mem: Vec<u8>,
    pub base: u32,
}

impl LinearMemory {
    pub fn new(size: usize) -> Self {
        Self {
            mem: vec![0; size],
            base: 0,
        }
    }

    pub fn with_base(size: usize, base: u32) -> Self {
        Self {
            mem: vec![0; size],
            base,
        }
    }

    /// Copy `bytes` into memory starting at `addr`.
    pub fn load(&mut self, addr: u32, bytes: &[u8]) -> Result<(), AddressError> {
        let off = self.offset(addr, bytes.len(), 1, Access::Store)?;
        self.mem[off..off + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    fn offset(&self, addr: u32, len: usize, align: u32, access: Access) -> Result<usize, AddressError> {
        if addr % align != 0 {
            return Err(AddressError::new(access, addr, "address not aligned on boundary"));
        }
        let off = addr.wrapping_sub(self.base) as usize;
        if addr < self.base || off + len > self.mem.len() {
            return Err(AddressError::new(access, addr, "address out of range"));
        }
        Ok(off)
    }
}

impl Bus for LinearMemory {
    fn get_word(&mut self, addr: u32) -> Result<i32, AddressError> {
        let off = self.offset(addr, 4, 4, Access::Load)?;
        Ok(i32::from_le_bytes([
            self.mem[off],
            self.mem[off + 1],
            self.mem[off + 2],
            self.mem[off + 3],
        ]))
    }
    fn get_half(&mut self, addr: u32) -> Result<u16, AddressError> {
        let off = self.offset(addr, 2, 2, Access::Load)?;
        Ok(u16::from_le_bytes([self.mem[off], self.mem[off + 1]]))
    }
    fn get_byte(&mut self, addr: u32) -> Result<u8, AddressError> {
        let off = self.offset(addr, 1, 1, Access::Load)?;
        Ok(self.mem[off])
    }
    fn set_word(&mut self, addr: u32, val: i32) -> Result<(), AddressError> {
        let off = self.offset(addr, 4, 4, Access::Store)?;
        self.mem[off..off + 4].copy_from_slice(&val.to_le_bytes());
        Ok(())
    }
    fn set_half(&mut self, addr: u32, val: u16) -> Result<(), AddressError> {
        let off = self.offset(addr, 2, 2, Access::Store)?;
        self.mem[off..off + 2].copy_from_slice(&val.to_le_bytes());
        Ok(())
    }
    fn set_byte(&mut self, addr: u32, val: u8) -> Result<(), AddressError> {
        let off = self.offset(addr, 1, 1, Access::Store)?;
        self.mem[off] = val;
        Ok(())
    }
}
