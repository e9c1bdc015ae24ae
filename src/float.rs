//! Floating-point register file operations.
//!
//! Singles live in one 32-bit register. A double `D<n>` spans the even/odd
//! pair (`S<n>` low word, `S<n+1>` high word), so every double operand must
//! name an even register. NaN results are stored in canonical form.

use crate::cpu::{Cpu, TrapKind};
use crate::exec::{effective, reg, sext};
use crate::instructions::Action;
use crate::memory::{doubleword_aligned, Access, AddressError, Bus};

pub const CANONICAL_NAN_F32: u32 = 0x7FC0_0000;
pub const CANONICAL_NAN_F64: u64 = 0x7FF8_0000_0000_0000;

const DOUBLE_PARITY: &str = "all registers must be even-numbered for double-precision operands";

fn single_bits(v: f32) -> u32 {
    if v.is_nan() {
        CANONICAL_NAN_F32
    } else {
        v.to_bits()
    }
}

fn double_bits(v: f64) -> u64 {
    if v.is_nan() {
        CANONICAL_NAN_F64
    } else {
        v.to_bits()
    }
}

pub fn get_single(cpu: &Cpu, r: usize) -> f32 {
    f32::from_bits(cpu.fp_value(r))
}

pub fn set_single(cpu: &mut Cpu, r: usize, v: f32) {
    cpu.update_fp(r, single_bits(v));
}

pub fn get_double(cpu: &Cpu, r: usize) -> f64 {
    let hi = cpu.fp_value(r + 1) as u64;
    let lo = cpu.fp_value(r) as u64;
    f64::from_bits(hi << 32 | lo)
}

pub fn set_double(cpu: &mut Cpu, r: usize, v: f64) {
    let bits = double_bits(v);
    cpu.update_fp(r + 1, (bits >> 32) as u32);
    cpu.update_fp(r, bits as u32);
}

/// Reject a double operation if any of `regs` is odd.
fn check_pairs(regs: &[usize]) -> Result<(), TrapKind> {
    if regs.iter().any(|r| r % 2 != 0) {
        return Err(TrapKind::InvalidOperand(DOUBLE_PARITY.into()));
    }
    Ok(())
}

/// Flags after a compare. The three relations are tested independently, as
/// a later match overwrites an earlier one.
fn compare_flags(cpu: &mut Cpu, unordered: bool, eq: bool, lt: bool, gt: bool) {
    if unordered {
        cpu.set_flags(1, false, true);
        return;
    }
    if eq {
        cpu.set_flags(0, true, false);
    }
    if lt {
        cpu.set_flags(-1, false, false);
    }
    if gt {
        cpu.set_flags(1, true, false);
    }
}

/// `S[d] = op(S[n], S[m])`
fn single_op(cpu: &mut Cpu, ops: &[i32], op: impl Fn(f32, f32) -> f32) {
    let (d, n, m) = (reg(ops, 0), reg(ops, 1), reg(ops, 2));
    let v = op(get_single(cpu, n), get_single(cpu, m));
    set_single(cpu, d, v);
}

/// `D[d] = op(D[n], D[m])`, all three naming even registers.
fn double_op(cpu: &mut Cpu, ops: &[i32], op: impl Fn(f64, f64) -> f64) -> Result<(), TrapKind> {
    let (d, n, m) = (reg(ops, 0), reg(ops, 1), reg(ops, 2));
    check_pairs(&[d, n, m])?;
    let v = op(get_double(cpu, n), get_double(cpu, m));
    set_double(cpu, d, v);
    Ok(())
}

pub fn execute(action: Action, ops: &[i32], cpu: &mut Cpu, bus: &mut dyn Bus) -> Result<(), TrapKind> {
    match action {
        Action::Fadds => single_op(cpu, ops, |a, b| a + b),
        Action::Fsubs => single_op(cpu, ops, |a, b| a - b),
        Action::Fmuls => single_op(cpu, ops, |a, b| a * b),
        Action::Fdivs => single_op(cpu, ops, |a, b| a / b),
        Action::Faddd => double_op(cpu, ops, |a, b| a + b)?,
        Action::Fsubd => double_op(cpu, ops, |a, b| a - b)?,
        Action::Fmuld => double_op(cpu, ops, |a, b| a * b)?,
        Action::Fdivd => double_op(cpu, ops, |a, b| a / b)?,
        Action::Fcmps => {
            let (a, b) = (get_single(cpu, reg(ops, 0)), get_single(cpu, reg(ops, 1)));
            compare_flags(cpu, a.is_nan() || b.is_nan(), a == b, a < b, a > b);
        }
        Action::Fcmpd => {
            let (n, m) = (reg(ops, 0), reg(ops, 1));
            check_pairs(&[n, m])?;
            let (a, b) = (get_double(cpu, n), get_double(cpu, m));
            compare_flags(cpu, a.is_nan() || b.is_nan(), a == b, a < b, a > b);
        }
        Action::Ldurs => {
            let addr = effective(cpu, reg(ops, 1), sext(ops[2], 16));
            let w = bus.get_word(addr)?;
            cpu.update_fp(reg(ops, 0), w as u32);
        }
        Action::Sturs => {
            let addr = effective(cpu, reg(ops, 1), sext(ops[2], 16));
            bus.set_word(addr, cpu.fp_value(reg(ops, 0)) as i32)?;
        }
        Action::Ldurd => {
            let d = reg(ops, 0);
            check_pairs(&[d])?;
            let addr = effective(cpu, reg(ops, 1), sext(ops[2], 16));
            if !doubleword_aligned(addr) {
                return Err(AddressError::new(Access::Load, addr, "address not aligned on doubleword boundary").into());
            }
            let lo = bus.get_word(addr)?;
            cpu.update_fp(d, lo as u32);
            let hi = bus.get_word(addr.wrapping_add(4))?;
            cpu.update_fp(d + 1, hi as u32);
        }
        Action::Sturd => {
            let d = reg(ops, 0);
            check_pairs(&[d])?;
            let addr = effective(cpu, reg(ops, 1), sext(ops[2], 16));
            if !doubleword_aligned(addr) {
                return Err(AddressError::new(Access::Store, addr, "address not aligned on doubleword boundary").into());
            }
            bus.set_word(addr, cpu.fp_value(d) as i32)?;
            bus.set_word(addr.wrapping_add(4), cpu.fp_value(d + 1) as i32)?;
        }
        other => {
            return Err(TrapKind::InvalidOperand(format!("{other:?} is not a floating-point operation")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::CpuConfig;

    #[test]
    fn double_pair_layout() {
        let mut cpu = Cpu::new(CpuConfig::default());
        set_double(&mut cpu, 2, 1.5);
        let bits = 1.5f64.to_bits();
        assert_eq!(cpu.fp_value(2), bits as u32);
        assert_eq!(cpu.fp_value(3), (bits >> 32) as u32);
        assert_eq!(get_double(&cpu, 2), 1.5);
    }

    #[test]
    fn non_float_action_is_rejected() {
        let mut cpu = Cpu::new(CpuConfig::default());
        let mut mem = crate::memory::LinearMemory::new(16);
        set_single(&mut cpu, 1, 6.0);
        set_single(&mut cpu, 2, 3.0);
        let err = execute(Action::Add, &[0, 1, 2], &mut cpu, &mut mem).unwrap_err();
        assert!(matches!(err, TrapKind::InvalidOperand(_)));
        assert_eq!(cpu.fp_value(0), 0);
        execute(Action::Fdivs, &[0, 1, 2], &mut cpu, &mut mem).unwrap();
        assert_eq!(get_single(&cpu, 0), 2.0);
        execute(Action::Fsubs, &[0, 1, 2], &mut cpu, &mut mem).unwrap();
        assert_eq!(get_single(&cpu, 0), 3.0);
    }

    #[test]
    fn nan_is_canonicalised() {
        let mut cpu = Cpu::new(CpuConfig::default());
        set_single(&mut cpu, 0, f32::from_bits(0xFFC0_1234));
        assert_eq!(cpu.fp_value(0), CANONICAL_NAN_F32);
        set_double(&mut cpu, 4, f64::from_bits(0xFFF8_0000_0000_0001));
        assert_eq!(cpu.fp_value(5), 0x7FF8_0000);
        assert_eq!(cpu.fp_value(4), 0);
    }
}
