use crate::branch::{DelaySlot, INSTRUCTION_LENGTH};
use crate::decoder::Decoder;
use crate::disasm::fmt_decoded;
use crate::exec::Executor;
use crate::memory::{AddressError, Bus};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Register receiving the return address of `BL`.
pub const LINK_REGISTER: usize = 30;
/// Hardwired zero register.
pub const ZERO_REGISTER: usize = 31;
/// Register holding the service number for `SVC`.
pub const SYSCALL_REGISTER: usize = 8;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CpuConfig {
    /// Defer taken branches and jumps by one delay-slot instruction.
    pub delayed_branching: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    pub pc: u32,
    pub flags: Flags,
    pub gpr: [i32; 32], // X0..X31, X31 reads as zero
    pub fpr: [u32; 32], // S0..S31; D<n> is the pair (S<n>, S<n+1>)
    pub delay: DelaySlot,
    pub halted: bool,
    pub cfg: CpuConfig,
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags: u8 {
const N = 1 << 3; // Negative
const Z = 1 << 2; // Zero
const C = 1 << 1; // Carry
const V = 1 << 0; // Overflow
}
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TrapKind {
    #[error("arithmetic overflow")]
    ArithmeticOverflow,
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error("{0}")]
    InvalidOperand(String),
    #[error("invalid or unimplemented syscall service: {0}")]
    InvalidSyscall(i32),
    #[error("no instruction matches word {word:#010x}")]
    DecodeMiss { word: u32 },
}

/// A trap together with the instruction that raised it.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{kind} at {pc:#010x} ({instruction})")]
pub struct Trap {
    pub pc: u32,
    pub instruction: String,
    pub kind: TrapKind,
}

impl Cpu {
    pub fn new(cfg: CpuConfig) -> Self {
        Self {
            pc: 0,
            flags: Flags::empty(),
            gpr: [0; 32],
            fpr: [0; 32],
            delay: DelaySlot::Empty,
            halted: false,
            cfg,
        }
    }

    pub fn reset(&mut self, reset_pc: u32) {
        self.pc = reset_pc;
        self.delay = DelaySlot::Empty;
        self.halted = false;
    }

    pub fn get_value(&self, index: usize) -> i32 {
        if index == ZERO_REGISTER {
            0
        } else {
            self.gpr[index]
        }
    }

    pub fn update_register(&mut self, index: usize, value: i32) {
        if index != ZERO_REGISTER {
            self.gpr[index] = value;
        }
    }

    pub fn program_counter(&self) -> u32 {
        self.pc
    }

    pub fn set_program_counter(&mut self, pc: u32) {
        self.pc = pc;
    }

    /// N and Z come from the sign and value of `result`.
    pub fn set_flags(&mut self, result: i32, overflow: bool, carry: bool) {
        self.flags.set(Flags::N, result < 0);
        self.flags.set(Flags::Z, result == 0);
        self.flags.set(Flags::C, carry);
        self.flags.set(Flags::V, overflow);
    }

    pub fn flag_n(&self) -> bool {
        self.flags.contains(Flags::N)
    }
    pub fn flag_z(&self) -> bool {
        self.flags.contains(Flags::Z)
    }
    pub fn flag_c(&self) -> bool {
        self.flags.contains(Flags::C)
    }
    pub fn flag_v(&self) -> bool {
        self.flags.contains(Flags::V)
    }

    pub fn fp_value(&self, index: usize) -> u32 {
        self.fpr[index]
    }

    pub fn update_fp(&mut self, index: usize, bits: u32) {
        self.fpr[index] = bits;
    }

    /// Fetch, decode and execute one instruction, then let a pending
    /// delayed branch take effect.
    pub fn step<B: Bus, D: Decoder, X: Executor>(
        &mut self,
        bus: &mut B,
        dec: &D,
        exec: &X,
    ) -> Result<(), Trap> {
        let pc = self.pc;
        let word = bus.get_word(pc).map_err(|e| Trap {
            pc,
            instruction: "<fetch>".into(),
            kind: e.into(),
        })? as u32;
        let Some(d) = dec.decode(word) else {
            debug!(pc = format_args!("{pc:#010x}"), word = format_args!("{word:#010x}"), "decode miss");
            return Err(Trap {
                pc,
                instruction: format!(".word {word:#010x}"),
                kind: TrapKind::DecodeMiss { word },
            });
        };
        trace!(pc = format_args!("{pc:#010x}"), insn = %fmt_decoded(&d, pc), "step");
        self.pc = pc.wrapping_add(INSTRUCTION_LENGTH);
        exec.exec(self, bus, &d).map_err(|kind| {
            debug!(pc = format_args!("{pc:#010x}"), %kind, "trap");
            Trap { pc, instruction: fmt_decoded(&d, pc), kind }
        })?;
        if let Some(target) = self.delay.advance() {
            self.pc = target;
        }
        Ok(())
    }
}
