mod common;

use common::{enc, Machine};
use legv8_sim::syscall::FnSyscall;
use legv8_sim::{Bus, Context, CpuConfig, Syscall, SyscallRegistry, SyscallTable, TrapKind};
use pretty_assertions::assert_eq;

fn svc() -> u32 {
    enc("SVC 0", &[0])
}

#[test]
fn unknown_service_traps() {
    let mut m = Machine::new();
    m.set_x(8, 99);
    let trap = m.exec1(svc()).unwrap_err();
    assert_eq!(trap.kind, TrapKind::InvalidSyscall(99));
    assert_eq!(trap.kind.to_string(), "invalid or unimplemented syscall service: 99");
}

#[test]
fn service_selected_by_x8() {
    let mut t = SyscallTable::new();
    t.register(Box::new(FnSyscall::new(5, "answer", |ctx: &mut Context<'_>| {
        ctx.cpu.update_register(0, 42);
        Ok(())
    })))
    .register(Box::new(FnSyscall::new(6, "other", |ctx: &mut Context<'_>| {
        ctx.cpu.update_register(0, -1);
        Ok(())
    })));
    let mut m = Machine::with_syscalls(CpuConfig::default(), 0x100, t);
    m.set_x(8, 5);
    m.exec1(svc()).unwrap();
    assert_eq!(m.x(0), 42);
}

#[test]
fn service_can_touch_memory_and_fail() {
    let mut t = SyscallTable::new();
    t.register(Box::new(FnSyscall::new(2, "store", |ctx: &mut Context<'_>| {
        let addr = ctx.cpu.get_value(1) as u32;
        ctx.bus.set_byte(addr, b'A')?;
        Ok(())
    })));
    let mut m = Machine::with_syscalls(CpuConfig::default(), 0x100, t);
    m.set_x(8, 2);
    m.set_x(1, 0x80);
    m.exec1(svc()).unwrap();
    assert_eq!(m.mem.mem[0x80], b'A');

    m.set_x(1, 0x1000);
    let trap = m.exec1(svc()).unwrap_err();
    assert!(matches!(trap.kind, TrapKind::Address(_)));
}

#[test]
fn later_registration_replaces_earlier() {
    let mut t = SyscallTable::new();
    t.register(Box::new(FnSyscall::new(1, "first", |_: &mut Context<'_>| Ok(()))));
    t.register(Box::new(FnSyscall::new(1, "second", |_: &mut Context<'_>| Ok(()))));
    assert_eq!(t.len(), 1);
    assert_eq!(t.find_syscall(1).map(|s| s.name()), Some("second"));
    assert!(t.find_syscall(2).is_none());
}
