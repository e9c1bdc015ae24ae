use crate::cpu::TrapKind;
use crate::exec::Context;
use std::collections::HashMap;
use tracing::trace;

/// A service reachable through `SVC`, selected by the value of X8.
pub trait Syscall {
    fn number(&self) -> i32;
    fn name(&self) -> &str;
    fn simulate(&self, ctx: &mut Context<'_>) -> Result<(), TrapKind>;
}

pub trait SyscallRegistry {
    fn find_syscall(&self, number: i32) -> Option<&dyn Syscall>;
}

#[derive(Default)]
pub struct SyscallTable {
    services: HashMap<i32, Box<dyn Syscall>>,
}

impl SyscallTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a service, replacing any previous one with the same number.
    pub fn register(&mut self, service: Box<dyn Syscall>) -> &mut Self {
        self.services.insert(service.number(), service);
        self
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl SyscallRegistry for SyscallTable {
    fn find_syscall(&self, number: i32) -> Option<&dyn Syscall> {
        self.services.get(&number).map(|s| &**s)
    }
}

/// A service built from a closure; handy for embedding and tests.
pub struct FnSyscall<F> {
    number: i32,
    name: String,
    f: F,
}

impl<F> FnSyscall<F>
where
    F: Fn(&mut Context<'_>) -> Result<(), TrapKind>,
{
    pub fn new(number: i32, name: impl Into<String>, f: F) -> Self {
        Self {
            number,
            name: name.into(),
            f,
        }
    }
}

impl<F> Syscall for FnSyscall<F>
where
    F: Fn(&mut Context<'_>) -> Result<(), TrapKind>,
{
    fn number(&self) -> i32 {
        self.number
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn simulate(&self, ctx: &mut Context<'_>) -> Result<(), TrapKind> {
        (self.f)(ctx)
    }
}

pub fn dispatch(number: i32, ctx: &mut Context<'_>, registry: &dyn SyscallRegistry) -> Result<(), TrapKind> {
    let Some(service) = registry.find_syscall(number) else {
        return Err(TrapKind::InvalidSyscall(number));
    };
    trace!(number, name = service.name(), "syscall");
    service.simulate(ctx)
}
