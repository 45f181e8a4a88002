use std::io;

/// What kind of operand a decoder expected to find in a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
  /// A literal or a register reference
  Value,
  /// A register reference only, used for destinations
  Register,
}

/// An error that occurred while decoding or executing instructions
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error("invalid operand cell {cell}, expected a {expected:?}")]
  InvalidOperand { cell: u16, expected: Expected },

  #[error("unknown opcode {0}")]
  UnknownOpcode(u16),

  #[error("unknown mnemonic `{0}`")]
  UnknownMnemonic(String),

  #[error("cell {address} is outside the program (length {len})")]
  OutOfBounds { address: usize, len: usize },

  #[error("`{opcode}` needs {needed} operands but the program ends after {available}")]
  TruncatedInstruction {
    opcode: crate::opcode::Opcode,
    needed: usize,
    available: usize,
  },

  #[error("division by zero")]
  DivisionByZero,

  #[error("cannot output {0}, it is not a character")]
  InvalidCharacter(u16),

  #[error("input character {0:?} does not fit in a cell")]
  UnrepresentableInput(char),

  #[error("input exhausted")]
  InputExhausted,

  #[error("machine is halted")]
  MachineHalted,

  #[error(transparent)]
  Io(#[from] io::Error),
}

/// A fatal [`Error`], located at the instruction that raised it
#[derive(thiserror::Error, Debug)]
#[error("fault at cell {ip}: {error}")]
pub struct Fault {
  /// Cell index of the failing instruction's opcode
  pub ip: usize,
  #[source]
  pub error: Error,
}

impl Fault {
  pub fn new(ip: usize, error: Error) -> Self {
    Self { ip, error }
  }
}
