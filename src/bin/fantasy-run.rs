use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fantasy_cpu::disasm::listing;
use fantasy_cpu::video::Framebuffer;
use fantasy_cpu::{Assembler, Cpu, CpuConfig, Instr, Overflow, Program};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Run an FC32 program on the fantasy-cpu interpreter"
)]
struct Opts {
    /// Program: JSON array of instructions, or raw words with --raw
    #[arg(value_name = "PROGRAM")]
    input: PathBuf,
    /// Treat the input as little-endian 32-bit words
    #[arg(long)]
    raw: bool,
    /// Mask out-of-range literals instead of rejecting them
    #[arg(long)]
    truncate: bool,
    /// CPU configuration (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Stop after this many instructions even if the program has not halted
    #[arg(long)]
    max_cycles: Option<u64>,
    /// Print the program listing and exit
    #[arg(long)]
    disasm: bool,
    /// Write the video region as a PPM image after the run
    #[arg(long, value_name = "FILE")]
    frame: Option<PathBuf>,
}

fn load_program(opts: &Opts) -> Result<Program> {
    let bytes = std::fs::read(&opts.input)
        .with_context(|| format!("reading {}", opts.input.display()))?;
    if opts.raw {
        return Ok(Program::from_le_bytes(&bytes)?);
    }
    let insts: Vec<Instr> = serde_json::from_slice(&bytes).context("parsing program JSON")?;
    let overflow = if opts.truncate {
        Overflow::Truncate
    } else {
        Overflow::Reject
    };
    Ok(Assembler::new(overflow).assemble(&insts)?)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let program = load_program(&opts)?;

    if opts.disasm {
        for line in listing(&program.words) {
            println!("{line}");
        }
        return Ok(());
    }

    let cfg = match &opts.config {
        Some(path) => serde_json::from_slice(&std::fs::read(path)?)
            .with_context(|| format!("parsing config {}", path.display()))?,
        None => CpuConfig::default(),
    };
    let mut cpu = Cpu::new(cfg);
    cpu.load_program(&program.words)?;
    info!(bytes = program.len_bytes(), "loaded program");

    match opts.max_cycles {
        Some(limit) => {
            while !cpu.halted() && cpu.cycles() < limit {
                cpu.run_cycle()?;
            }
            if !cpu.halted() {
                info!(limit, "cycle limit reached before HALT");
            }
        }
        None => {
            cpu.run_until_halt()?;
        }
    }

    println!("{}", serde_json::to_string_pretty(&cpu.snapshot())?);

    if let Some(path) = &opts.frame {
        let ppm = Framebuffer::new(cpu.mem()).to_ppm()?;
        std::fs::write(path, ppm).with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(())
}
