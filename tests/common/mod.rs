#![allow(dead_code)]

use legv8_sim::isa::legv8::CATALOG;
use legv8_sim::syscall::FnSyscall;
use legv8_sim::{
    Bus, Context, Cpu, CpuConfig, InstructionSet, Legv8Executor, LinearMemory, SyscallTable, Trap,
};

/// Encode through the catalog entry whose example syntax is `syntax`.
pub fn enc(syntax: &str, ops: &[i32]) -> u32 {
    let desc = CATALOG
        .iter()
        .find(|d| d.syntax == syntax)
        .unwrap_or_else(|| panic!("no catalog entry {syntax:?}"));
    desc.encoding().unwrap().encode(ops)
}

pub struct Machine {
    pub cpu: Cpu,
    pub mem: LinearMemory,
    pub set: InstructionSet,
    pub exec: Legv8Executor,
}

impl Machine {
    pub fn new() -> Self {
        Self::with(CpuConfig::default(), 0x1000)
    }

    pub fn delayed() -> Self {
        Self::with(CpuConfig { delayed_branching: true }, 0x1000)
    }

    pub fn with(cfg: CpuConfig, mem_size: usize) -> Self {
        Self::with_syscalls(cfg, mem_size, SyscallTable::new())
    }

    pub fn with_syscalls(cfg: CpuConfig, mem_size: usize, syscalls: SyscallTable) -> Self {
        Self {
            cpu: Cpu::new(cfg),
            mem: LinearMemory::new(mem_size),
            set: InstructionSet::new().unwrap(),
            exec: Legv8Executor::new(syscalls),
        }
    }

    /// Place `words` at `addr` and point the PC at the first one.
    pub fn load(&mut self, addr: u32, words: &[u32]) {
        for (i, w) in words.iter().enumerate() {
            self.mem.set_word(addr + 4 * i as u32, *w as i32).unwrap();
        }
        self.cpu.reset(addr);
    }

    pub fn step(&mut self) -> Result<(), Trap> {
        self.cpu.step(&mut self.mem, &self.set, &self.exec)
    }

    /// Load a single instruction at 0 and execute it.
    pub fn exec1(&mut self, word: u32) -> Result<(), Trap> {
        self.load(0, &[word]);
        self.step()
    }

    pub fn x(&self, r: usize) -> i32 {
        self.cpu.get_value(r)
    }

    pub fn set_x(&mut self, r: usize, v: i32) {
        self.cpu.update_register(r, v);
    }
}

/// A table holding only the exit service (10), which halts the CPU.
pub fn exit_services() -> SyscallTable {
    let mut t = SyscallTable::new();
    t.register(Box::new(FnSyscall::new(10, "exit", |ctx: &mut Context<'_>| {
        ctx.cpu.halted = true;
        Ok(())
    })));
    t
}
