use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use legv8_disasm::{disassemble, load_raw_bin, opcode_rows, render_text};
use legv8_sim::InstructionSet;

#[derive(Parser, Debug)]
#[command(author, version, about = "LEGv8 disassembler CLI", long_about = None)]
struct Cli {
    /// Load address for the binary in target address space
    #[arg(long, default_value = "0", value_parser = parse_u32)]
    base: u32,
    /// Skip N bytes at start of file before loading
    #[arg(long, default_value_t = 0usize)]
    skip: usize,
    /// Limit bytes loaded (default: to EOF after --skip)
    #[arg(long)]
    len: Option<usize>,
    #[arg(value_name = "BINFILE")]
    input: PathBuf,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List loaded segments
    Sections,
    /// Disassemble a range [start, end) in bytes
    Range {
        #[arg(value_parser = parse_u32)]
        start: u32,
        /// End address, exclusive
        #[arg(value_parser = parse_u32)]
        end: u32,
        /// Show instruction bytes
        #[arg(long)]
        show_bytes: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Dump the opcode match table in probe order
    Opcodes,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_u32(s: &str) -> Result<u32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u32::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u32>()?)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let set = InstructionSet::new()?;

    match cli.cmd {
        Command::Sections => {
            let img = load_raw_bin(&cli.input, cli.base, cli.skip, cli.len)?;
            println!("{:<10} {:<10} {:<10} {:<6}", "name", "start", "end", "perms");
            for s in &img.segments {
                println!("{:<10} {:#010x} {:#010x} {:<6}", s.name, s.base, s.end(), s.perms);
            }
        }
        Command::Range { start, end, show_bytes, format, out } => {
            anyhow::ensure!(end >= start, "end must be >= start");
            let img = load_raw_bin(&cli.input, cli.base, cli.skip, cli.len)?;
            let lines = disassemble(&img, &set, start, end);
            let buf = match format {
                OutputFormat::Text => render_text(&lines, show_bytes),
                OutputFormat::Json => serde_json::to_string_pretty(&lines)? + "\n",
            };
            match out {
                Some(path) => std::fs::write(path, buf)?,
                None => print!("{buf}"),
            }
        }
        Command::Opcodes => {
            for row in opcode_rows(set.table()) {
                println!(
                    "{:2}  mask {:#010x}  match {:#010x}  {}",
                    row.specificity, row.mask, row.match_bits, row.syntax
                );
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_u32_hex_and_dec() {
        assert_eq!(parse_u32("0x10").unwrap(), 0x10);
        assert_eq!(parse_u32("16").unwrap(), 16);
        assert!(parse_u32("zz").is_err());
    }
}
