//! A virtual machine for a tiny 22 instruction set over 16 bit cells.
//!
//! Programs are little-endian cell images. Cells `0..=32767` are literals,
//! `32768..=32775` name one of eight registers, anything above is invalid.
//! Execution starts at cell zero and runs until `halt`, until `pop`/`ret` find
//! the stack empty, or until a fault.
//!
//! ```no_run
//! use emulator::config::Config;
//! use emulator::console::Terminal;
//! use emulator::vm::Vm;
//!
//! let image = std::fs::read("challenge.bin")?;
//! let mut vm = Vm::load(&image, Config::default());
//! vm.run(&mut Terminal::stdio())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cell;
pub mod config;
pub mod console;
pub mod error;
pub mod instruction;
pub mod machine;
pub mod opcode;
pub mod program;
pub mod vm;
