use crate::branch::{self, region_target, relative_target};
use crate::cpu::{Cpu, TrapKind, LINK_REGISTER, SYSCALL_REGISTER};
use crate::decoder::Decoded;
use crate::float;
use crate::instructions::Action;
use crate::memory::Bus;
use crate::syscall::{self, SyscallRegistry, SyscallTable};

/// Machine state handed to every semantic action and syscall service.
pub struct Context<'a> {
    pub cpu: &'a mut Cpu,
    pub bus: &'a mut dyn Bus,
}

pub trait Executor {
    fn exec(&self, cpu: &mut Cpu, bus: &mut dyn Bus, d: &Decoded) -> Result<(), TrapKind>;
}

pub struct Legv8Executor<R = SyscallTable> {
    pub syscalls: R,
}

impl<R: SyscallRegistry> Legv8Executor<R> {
    pub fn new(syscalls: R) -> Self {
        Self { syscalls }
    }
}

impl Default for Legv8Executor {
    fn default() -> Self {
        Self::new(SyscallTable::new())
    }
}

impl<R: SyscallRegistry> Executor for Legv8Executor<R> {
    fn exec(&self, cpu: &mut Cpu, bus: &mut dyn Bus, d: &Decoded) -> Result<(), TrapKind> {
        let mut ctx = Context { cpu, bus };
        execute(d.desc.action, &d.operands, &mut ctx, &self.syscalls)
    }
}

/// Sign-extend the low `bits` of `v`.
#[inline]
pub fn sext(v: i32, bits: u32) -> i32 {
    let s = 32 - bits;
    (v << s) >> s
}

#[inline]
pub(crate) fn reg(ops: &[i32], i: usize) -> usize {
    ops[i] as usize
}

/// Effective address `X[base] + offset`.
#[inline]
pub(crate) fn effective(cpu: &Cpu, base: usize, offset: i32) -> u32 {
    cpu.get_value(base).wrapping_add(offset) as u32
}

fn add_overflows(a: i32, b: i32, sum: i32) -> bool {
    (a >= 0 && b >= 0 && sum < 0) || (a < 0 && b < 0 && sum >= 0)
}

fn sub_overflows(a: i32, b: i32, dif: i32) -> bool {
    (a >= 0 && b < 0 && dif < 0) || (a < 0 && b >= 0 && dif >= 0)
}

/// Sum as computed by the flag-setting forms: returns the truncated result,
/// the carry out of bit 31 and whether truncation changed the signed value.
pub fn add_with_flags(a: i64, b: i64) -> (i32, bool, bool) {
    let sum = a + b;
    let carry = ((a as u32 as u64) + (b as u32 as u64)) >> 32 != 0;
    let overflow = sum as i32 as i64 != sum;
    (sum as i32, carry, overflow)
}

fn set_with_flags(cpu: &mut Cpu, d: usize, a: i64, b: i64) {
    let (result, carry, overflow) = add_with_flags(a, b);
    cpu.set_flags(result, overflow, carry);
    cpu.update_register(d, result);
}

/// N and Z from `result`; C and V keep their previous values.
fn set_logical(cpu: &mut Cpu, d: usize, result: i32) {
    cpu.update_register(d, result);
    let (v, c) = (cpu.flag_v(), cpu.flag_c());
    cpu.set_flags(result, v, c);
}

fn move_wide(cpu: &mut Cpu, ops: &[i32], keep: bool) -> Result<(), TrapKind> {
    let (d, imm, lane) = (reg(ops, 0), ops[1] & 0xFFFF, ops[2]);
    if !(0..=3).contains(&lane) {
        return Err(TrapKind::InvalidOperand("invalid value for LSL".into()));
    }
    // Only the low bit selects a halfword: lanes 2 and 3 alias 0 and 1.
    let shift = (lane & 1) * 16;
    let placed = imm << shift;
    let value = if keep {
        (cpu.get_value(d) & !(0xFFFF << shift)) | placed
    } else {
        placed
    };
    cpu.update_register(d, value);
    Ok(())
}

/// Run one semantic action. Effects applied before a trap are kept.
pub fn execute(
    action: Action,
    ops: &[i32],
    ctx: &mut Context<'_>,
    syscalls: &dyn SyscallRegistry,
) -> Result<(), TrapKind> {
    let cpu = &mut *ctx.cpu;
    let bus = &mut *ctx.bus;
    match action {
        Action::Nop => {}

        Action::Add => {
            let (a, b) = (cpu.get_value(reg(ops, 1)), cpu.get_value(reg(ops, 2)));
            let sum = a.wrapping_add(b);
            if add_overflows(a, b, sum) {
                return Err(TrapKind::ArithmeticOverflow);
            }
            cpu.update_register(reg(ops, 0), sum);
        }
        Action::Sub => {
            let (a, b) = (cpu.get_value(reg(ops, 1)), cpu.get_value(reg(ops, 2)));
            let dif = a.wrapping_sub(b);
            if sub_overflows(a, b, dif) {
                return Err(TrapKind::ArithmeticOverflow);
            }
            cpu.update_register(reg(ops, 0), dif);
        }
        Action::Addi => {
            let (a, b) = (cpu.get_value(reg(ops, 1)), sext(ops[2], 16));
            let sum = a.wrapping_add(b);
            if add_overflows(a, b, sum) {
                return Err(TrapKind::ArithmeticOverflow);
            }
            cpu.update_register(reg(ops, 0), sum);
        }
        Action::Subi => {
            let (a, b) = (cpu.get_value(reg(ops, 1)), sext(ops[2], 16));
            let dif = a.wrapping_sub(b);
            if sub_overflows(a, b, dif) {
                return Err(TrapKind::ArithmeticOverflow);
            }
            cpu.update_register(reg(ops, 0), dif);
        }
        Action::Adds => {
            let (a, b) = (cpu.get_value(reg(ops, 1)), cpu.get_value(reg(ops, 2)));
            set_with_flags(cpu, reg(ops, 0), a as i64, b as i64);
        }
        Action::Subs => {
            let (a, b) = (cpu.get_value(reg(ops, 1)), cpu.get_value(reg(ops, 2)));
            set_with_flags(cpu, reg(ops, 0), a as i64, -(b as i64));
        }
        Action::Addis => {
            let a = cpu.get_value(reg(ops, 1));
            set_with_flags(cpu, reg(ops, 0), a as i64, sext(ops[2], 16) as i64);
        }
        Action::Subis => {
            // the immediate is negated before sign extension
            let a = cpu.get_value(reg(ops, 1));
            set_with_flags(cpu, reg(ops, 0), a as i64, sext(ops[2].wrapping_neg(), 16) as i64);
        }

        Action::Mul => {
            let p = cpu.get_value(reg(ops, 1)) as i64 * cpu.get_value(reg(ops, 2)) as i64;
            cpu.update_register(reg(ops, 0), p as i32);
        }
        Action::Smulh => {
            let p = cpu.get_value(reg(ops, 1)) as i64 * cpu.get_value(reg(ops, 2)) as i64;
            cpu.update_register(reg(ops, 0), (p >> 32) as i32);
        }
        Action::Umulh => {
            let a = cpu.get_value(reg(ops, 1)) as u32 as u64;
            let b = cpu.get_value(reg(ops, 2)) as u32 as u64;
            cpu.update_register(reg(ops, 0), ((a * b) >> 32) as i32);
        }
        Action::Sdiv => {
            let (a, b) = (cpu.get_value(reg(ops, 1)), cpu.get_value(reg(ops, 2)));
            if b != 0 {
                cpu.update_register(reg(ops, 0), a.wrapping_div(b));
            }
        }
        Action::Udiv => {
            let (a, b) = (cpu.get_value(reg(ops, 1)) as u32, cpu.get_value(reg(ops, 2)) as u32);
            if b != 0 {
                cpu.update_register(reg(ops, 0), (a / b) as i32);
            }
        }

        Action::And => {
            let v = cpu.get_value(reg(ops, 1)) & cpu.get_value(reg(ops, 2));
            cpu.update_register(reg(ops, 0), v);
        }
        Action::Ands => {
            let v = cpu.get_value(reg(ops, 1)) & cpu.get_value(reg(ops, 2));
            set_logical(cpu, reg(ops, 0), v);
        }
        Action::Andi => {
            let v = cpu.get_value(reg(ops, 1)) & (ops[2] & 0xFFFF);
            cpu.update_register(reg(ops, 0), v);
        }
        Action::Andis => {
            let v = cpu.get_value(reg(ops, 1)) & (ops[2] & 0xFFFF);
            set_logical(cpu, reg(ops, 0), v);
        }
        Action::Orr => {
            let v = cpu.get_value(reg(ops, 1)) | cpu.get_value(reg(ops, 2));
            cpu.update_register(reg(ops, 0), v);
        }
        Action::Orri => {
            let v = cpu.get_value(reg(ops, 1)) | (ops[2] & 0xFFFF);
            cpu.update_register(reg(ops, 0), v);
        }
        Action::Eor => {
            let v = cpu.get_value(reg(ops, 1)) ^ cpu.get_value(reg(ops, 2));
            cpu.update_register(reg(ops, 0), v);
        }
        Action::Eori => {
            let v = cpu.get_value(reg(ops, 1)) ^ (ops[2] & 0xFFFF);
            cpu.update_register(reg(ops, 0), v);
        }
        Action::Lsl => {
            let v = cpu.get_value(reg(ops, 1)).wrapping_shl(ops[2] as u32);
            cpu.update_register(reg(ops, 0), v);
        }
        Action::Lsr => {
            let v = (cpu.get_value(reg(ops, 1)) as u32).wrapping_shr(ops[2] as u32);
            cpu.update_register(reg(ops, 0), v as i32);
        }

        Action::B => {
            let target = region_target(cpu.program_counter(), ops[0]);
            branch::jump(cpu, target);
        }
        Action::BRel => {
            let target = relative_target(cpu.program_counter(), sext(ops[0], 26));
            branch::jump(cpu, target);
        }
        Action::Bl => {
            branch::link_return(cpu, LINK_REGISTER);
            let target = region_target(cpu.program_counter(), ops[0]);
            branch::jump(cpu, target);
        }
        Action::Br => {
            let target = cpu.get_value(reg(ops, 0)) as u32;
            branch::jump(cpu, target);
        }
        Action::Cbnz => {
            if cpu.get_value(reg(ops, 0)) != 0 {
                branch::branch(cpu, sext(ops[1], 16));
            }
        }
        Action::Cbz => {
            if cpu.get_value(reg(ops, 0)) == 0 {
                branch::branch(cpu, sext(ops[1], 16));
            }
        }
        Action::CbnzRel => {
            if cpu.get_value(reg(ops, 0)) != 0 {
                let target = relative_target(cpu.program_counter(), sext(ops[1], 16));
                branch::jump(cpu, target);
            }
        }
        Action::CbzRel => {
            if cpu.get_value(reg(ops, 0)) == 0 {
                let target = relative_target(cpu.program_counter(), sext(ops[1], 16));
                branch::jump(cpu, target);
            }
        }
        Action::BCond(cond) => {
            if cond.holds(cpu.flags) {
                let target = region_target(cpu.program_counter(), ops[0]);
                branch::jump(cpu, target);
            }
        }
        Action::Svc => {
            let number = cpu.get_value(SYSCALL_REGISTER);
            let mut ctx = Context { cpu, bus };
            syscall::dispatch(number, &mut ctx, syscalls)?;
        }

        Action::Ldur | Action::Ldxr => {
            let addr = effective(cpu, reg(ops, 1), sext(ops[2], 16));
            let v = bus.get_word(addr)?;
            cpu.update_register(reg(ops, 0), v);
        }
        Action::Stur => {
            let addr = effective(cpu, reg(ops, 1), sext(ops[2], 16));
            bus.set_word(addr, cpu.get_value(reg(ops, 0)))?;
        }
        Action::Stxr => {
            let (t, s, n) = (reg(ops, 0), reg(ops, 1), reg(ops, 2));
            bus.set_word(cpu.get_value(n) as u32, cpu.get_value(t))?;
            // a single processor never loses the reservation
            cpu.update_register(s, 0);
        }
        Action::Ldurb => {
            let addr = effective(cpu, reg(ops, 1), sext(ops[2], 16));
            let v = bus.get_byte(addr)?;
            cpu.update_register(reg(ops, 0), v as i32);
        }
        Action::Ldurh => {
            let addr = effective(cpu, reg(ops, 1), sext(ops[2], 16));
            let v = bus.get_half(addr)?;
            cpu.update_register(reg(ops, 0), v as i32);
        }
        Action::Sturb => {
            let addr = effective(cpu, reg(ops, 1), sext(ops[2], 16));
            bus.set_byte(addr, cpu.get_value(reg(ops, 0)) as u8)?;
        }
        Action::Sturh => {
            let addr = effective(cpu, reg(ops, 1), sext(ops[2], 16));
            bus.set_half(addr, cpu.get_value(reg(ops, 0)) as u16)?;
        }
        Action::Lda => cpu.update_register(reg(ops, 0), ops[1]),
        Action::Movz => move_wide(cpu, ops, false)?,
        Action::Movk => move_wide(cpu, ops, true)?,

        Action::Fadds
        | Action::Fsubs
        | Action::Fmuls
        | Action::Fdivs
        | Action::Faddd
        | Action::Fsubd
        | Action::Fmuld
        | Action::Fdivd
        | Action::Fcmps
        | Action::Fcmpd
        | Action::Ldurs
        | Action::Ldurd
        | Action::Sturs
        | Action::Sturd => float::execute(action, ops, cpu, bus)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sext_widths() {
        assert_eq!(sext(0xFFFF, 16), -1);
        assert_eq!(sext(0x7FFF, 16), 0x7FFF);
        assert_eq!(sext(0x200_0000, 26), -0x200_0000);
        assert_eq!(sext(-100, 16), -100);
    }

    #[test]
    fn carry_and_overflow_of_flag_setting_add() {
        assert_eq!(add_with_flags(-1, 1), (0, true, false));
        assert_eq!(add_with_flags(i32::MAX as i64, 1), (i32::MIN, false, true));
        assert_eq!(add_with_flags(i32::MIN as i64, -1), (i32::MAX, true, true));
        assert_eq!(add_with_flags(5, 0), (5, false, false));
    }
}
