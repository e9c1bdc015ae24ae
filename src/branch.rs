//! Control-flow unit: jump/branch target handling, link register and the
//! delayed-branch slot.
//!
//! Jumps take an absolute byte address, branches a word displacement relative
//! to the already-incremented program counter. The two must not be mixed.

use crate::cpu::{Cpu, Flags};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Length in bytes of every encoded instruction.
pub const INSTRUCTION_LENGTH: u32 = 4;

/// Condition predicates over N/Z/C/V, as used by `B.cond`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    Eq,
    Ne,
    /// Carry set, also spelled HS.
    Cs,
    /// Carry clear, also spelled LO.
    Cc,
    Mi,
    Pl,
    Vs,
    Vc,
    Hi,
    Ls,
    Ge,
    Lt,
    Gt,
    Le,
    Al,
}

impl Condition {
    pub fn holds(self, flags: Flags) -> bool {
        let n = flags.contains(Flags::N);
        let z = flags.contains(Flags::Z);
        let c = flags.contains(Flags::C);
        let v = flags.contains(Flags::V);
        match self {
            Condition::Eq => z,
            Condition::Ne => !z,
            Condition::Cs => c,
            Condition::Cc => !c,
            Condition::Mi => n,
            Condition::Pl => !n,
            Condition::Vs => v,
            Condition::Vc => !v,
            Condition::Hi => c && !z,
            Condition::Ls => !c || z,
            Condition::Ge => n == v,
            Condition::Gt => n == v && !z,
            Condition::Lt => n != v,
            Condition::Le => n != v || z,
            Condition::Al => true,
        }
    }
}

/// One-deep deferred write to the program counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DelaySlot {
    #[default]
    Empty,
    /// Set by the branch currently executing.
    Registered(u32),
    /// The delay-slot instruction is executing; jump once it completes.
    Triggered(u32),
}

impl DelaySlot {
    pub fn register(&mut self, target: u32) {
        *self = DelaySlot::Registered(target);
    }

    pub fn pending(&self) -> Option<u32> {
        match *self {
            DelaySlot::Empty => None,
            DelaySlot::Registered(t) | DelaySlot::Triggered(t) => Some(t),
        }
    }

    /// Called after each completed instruction. Returns the target to load
    /// into the program counter, if the delay slot has just finished.
    pub fn advance(&mut self) -> Option<u32> {
        match *self {
            DelaySlot::Empty => None,
            DelaySlot::Registered(t) => {
                *self = DelaySlot::Triggered(t);
                None
            }
            DelaySlot::Triggered(t) => {
                *self = DelaySlot::Empty;
                Some(t)
            }
        }
    }
}

pub fn jump(cpu: &mut Cpu, target: u32) {
    if cpu.cfg.delayed_branching {
        debug!(target = format_args!("{target:#010x}"), "delayed branch registered");
        cpu.delay.register(target);
    } else {
        cpu.set_program_counter(target);
    }
}

pub fn branch(cpu: &mut Cpu, displacement: i32) {
    let target = cpu
        .program_counter()
        .wrapping_add((displacement as u32).wrapping_shl(2));
    jump(cpu, target);
}

/// Store the return address, skipping the delay slot when delayed branching
/// is enabled.
pub fn link_return(cpu: &mut Cpu, register: usize) {
    let skip = if cpu.cfg.delayed_branching { INSTRUCTION_LENGTH } else { 0 };
    let ret = cpu.program_counter().wrapping_add(skip);
    cpu.update_register(register, ret as i32);
}

/// Target of a relative jump: `displacement` words from the jump's own
/// address, given the already-incremented `pc`.
pub fn relative_target(pc: u32, displacement: i32) -> u32 {
    pc.wrapping_add((displacement as u32).wrapping_shl(2))
        .wrapping_sub(INSTRUCTION_LENGTH)
}

/// Absolute target of a J-format jump: the field is a word address within
/// the current 256MB region.
pub fn region_target(pc: u32, field: i32) -> u32 {
    (pc & 0xF000_0000) | ((field as u32) << 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(n: bool, z: bool, c: bool, v: bool) -> Flags {
        let mut f = Flags::empty();
        f.set(Flags::N, n);
        f.set(Flags::Z, z);
        f.set(Flags::C, c);
        f.set(Flags::V, v);
        f
    }

    #[test]
    fn signed_conditions_follow_n_and_v() {
        let f = flags(true, false, false, true);
        assert!(Condition::Ge.holds(f));
        assert!(!Condition::Lt.holds(f));
        assert!(Condition::Mi.holds(f));
        assert!(Condition::Vs.holds(f));
        assert!(Condition::Gt.holds(f));
        assert!(!Condition::Le.holds(f));
    }

    #[test]
    fn unsigned_conditions() {
        assert!(Condition::Hi.holds(flags(false, false, true, false)));
        assert!(!Condition::Hi.holds(flags(false, true, true, false)));
        assert!(Condition::Ls.holds(flags(false, true, true, false)));
        assert!(Condition::Ls.holds(flags(false, false, false, false)));
        assert!(Condition::Al.holds(Flags::empty()));
    }

    #[test]
    fn slot_fires_after_one_more_instruction() {
        let mut s = DelaySlot::default();
        s.register(0x40);
        assert_eq!(s.advance(), None);
        assert_eq!(s.pending(), Some(0x40));
        assert_eq!(s.advance(), Some(0x40));
        assert_eq!(s, DelaySlot::Empty);
    }

    #[test]
    fn relative_target_counts_from_the_jump() {
        assert_eq!(relative_target(0x104, 2), 0x108);
        assert_eq!(relative_target(0x104, -1), 0xFC);
        assert_eq!(relative_target(0x104, 0), 0x100);
    }

    #[test]
    fn region_target_keeps_top_nibble() {
        assert_eq!(region_target(0x4000_1000, 0x10), 0x4000_0040);
    }
}
