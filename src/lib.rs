pub mod branch;
pub mod cpu;
pub mod decoder;
pub mod disasm;
pub mod exec;
pub mod float;
pub mod instructions;
pub mod memory;
pub mod syscall;

pub mod isa {
    pub mod legv8; // LEGv8 subset, 32-bit registers
}

pub use cpu::{Cpu, CpuConfig, Flags, Trap, TrapKind};
pub use decoder::{Decoded, Decoder, InstructionSet, OpcodeTable};
pub use exec::{Context, Executor, Legv8Executor};
pub use instructions::{Action, CatalogError, Descriptor, Format};
pub use memory::{AddressError, Bus, LinearMemory};
pub use syscall::{Syscall, SyscallRegistry, SyscallTable};
