use anyhow::{Context as _, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use legv8_sim::syscall::FnSyscall;
use legv8_sim::{Context, Cpu, CpuConfig, InstructionSet, Legv8Executor, LinearMemory, SyscallTable};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a raw LEGv8 image on the legv8-sim core")]
struct Opts {
    /// JSON run configuration; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_parser = parse_u32)]
    entry: Option<u32>,
    /// Load address of the image and base of memory
    #[arg(short, long, value_parser = parse_u32)]
    base: Option<u32>,
    #[arg(long)]
    delayed_branching: bool,
    #[arg(long)]
    max_steps: Option<u64>,
    #[arg(value_name = "BINFILE")]
    input: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct RunConfig {
    cpu: CpuConfig,
    memory_size: usize,
    load_address: u32,
    entry: Option<u32>,
    max_steps: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            cpu: CpuConfig::default(),
            memory_size: 16 * 1024 * 1024,
            load_address: 0,
            entry: None,
            max_steps: 10_000_000,
        }
    }
}

fn parse_u32(s: &str) -> Result<u32, String> {
    let r = if let Some(h) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(h, 16)
    } else {
        s.parse()
    };
    r.map_err(|e| e.to_string())
}

fn services() -> SyscallTable {
    let mut t = SyscallTable::new();
    t.register(Box::new(FnSyscall::new(1, "print_int", |ctx: &mut Context<'_>| {
        print!("{}", ctx.cpu.get_value(0));
        Ok(())
    })))
    .register(Box::new(FnSyscall::new(11, "print_char", |ctx: &mut Context<'_>| {
        print!("{}", ctx.cpu.get_value(0) as u8 as char);
        Ok(())
    })))
    .register(Box::new(FnSyscall::new(10, "exit", |ctx: &mut Context<'_>| {
        ctx.cpu.halted = true;
        Ok(())
    })));
    t
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let mut cfg = match &opts.config {
        Some(p) => {
            let text = std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            serde_json::from_str::<RunConfig>(&text).with_context(|| format!("parsing {}", p.display()))?
        }
        None => RunConfig::default(),
    };
    if let Some(b) = opts.base {
        cfg.load_address = b;
    }
    if opts.entry.is_some() {
        cfg.entry = opts.entry;
    }
    if let Some(n) = opts.max_steps {
        cfg.max_steps = n;
    }
    cfg.cpu.delayed_branching |= opts.delayed_branching;

    let bytes = std::fs::read(&opts.input).with_context(|| format!("reading {}", opts.input.display()))?;
    let mut mem = LinearMemory::with_base(cfg.memory_size, cfg.load_address);
    mem.load(cfg.load_address, &bytes)?;

    let mut cpu = Cpu::new(cfg.cpu);
    cpu.reset(cfg.entry.unwrap_or(cfg.load_address));

    let set = InstructionSet::new()?;
    let exec = Legv8Executor::new(services());

    let mut steps = 0u64;
    while !cpu.halted && steps < cfg.max_steps {
        if let Err(trap) = cpu.step(&mut mem, &set, &exec) {
            eprintln!("TRAP: {trap}");
            break;
        }
        steps += 1;
    }
    std::io::stdout().flush()?;
    info!(steps, halted = cpu.halted, "run finished");

    for (i, v) in cpu.gpr.iter().enumerate() {
        eprint!("X{i:<2} = {:#010x}{}", *v as u32, if i % 4 == 3 { "\n" } else { "  " });
    }
    eprintln!("PC  = {:#010x}  flags = {:?}", cpu.pc, cpu.flags);
    Ok(())
}
