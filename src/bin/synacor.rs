//! Run a program image.
//!
//! Usage: `synacor <IMAGE> [--trace] [--trace-op OP]... [--on-eof fail|halt]`

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use emulator::config::{Config, EndOfInput, Trace};
use emulator::console::Terminal;
use emulator::opcode::Opcode;
use emulator::vm::Vm;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OnEof {
  /// Stop with an error
  Fail,
  /// Stop as if the program had halted
  Halt,
}

#[derive(Parser, Debug)]
#[command(name = "synacor")]
#[command(about = "Run a 16 bit cell program image")]
struct Args {
  /// Path to the little-endian program image
  image: PathBuf,

  /// Trace every instruction before it executes
  #[arg(long)]
  trace: bool,

  /// Trace only these instructions, by mnemonic or number
  #[arg(long = "trace-op", value_name = "OP")]
  trace_ops: Vec<Opcode>,

  /// What `in` does once stdin is exhausted
  #[arg(long = "on-eof", value_enum, default_value_t = OnEof::Fail)]
  on_eof: OnEof,
}

impl Args {
  fn config(&self) -> Config {
    let trace = if self.trace {
      Trace::All
    } else if !self.trace_ops.is_empty() {
      Trace::Only(self.trace_ops.clone())
    } else {
      Trace::Off
    };
    let end_of_input = match self.on_eof {
      OnEof::Fail => EndOfInput::Fail,
      OnEof::Halt => EndOfInput::Halt,
    };
    Config::default()
      .with_trace(trace)
      .with_end_of_input(end_of_input)
  }
}

fn init_logging(verbose: bool) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    EnvFilter::new(if verbose { "warn,emulator=debug" } else { "warn" })
  });

  fmt()
    .with_env_filter(filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .init();
}

fn main() {
  let args = Args::parse();
  let config = args.config();
  init_logging(!config.trace.is_off());

  let image = match fs::read(&args.image) {
    Ok(bytes) => bytes,
    Err(e) => {
      error!("Failed to read {}: {}", args.image.display(), e);
      process::exit(1);
    }
  };
  if image.len() % 2 != 0 {
    info!("image has an odd length, padding the last cell");
  }

  let mut vm = Vm::load(&image, config);
  match vm.run(&mut Terminal::stdio()) {
    Ok(halt) => info!(?halt, cycles = vm.cycles(), "done"),
    Err(fault) => {
      error!("{}", fault);
      process::exit(2);
    }
  }
}
