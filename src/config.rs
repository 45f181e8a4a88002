use crate::opcode::Opcode;

/// Which instructions get a trace event before they execute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Trace {
  #[default]
  Off,
  All,
  Only(Vec<Opcode>),
}

impl Trace {
  pub fn covers(&self, opcode: Opcode) -> bool {
    match self {
      Self::Off => false,
      Self::All => true,
      Self::Only(ops) => ops.contains(&opcode),
    }
  }

  pub fn is_off(&self) -> bool {
    match self {
      Self::Off => true,
      Self::All => false,
      Self::Only(ops) => ops.is_empty(),
    }
  }
}

/// What `in` does once the console has no more characters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EndOfInput {
  /// Fault with [`Error::InputExhausted`](crate::error::Error::InputExhausted)
  #[default]
  Fail,
  /// Halt normally, as if the program had executed `halt`
  Halt,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
  pub trace: Trace,
  pub end_of_input: EndOfInput,
}

impl Config {
  pub fn with_trace(mut self, trace: Trace) -> Self {
    self.trace = trace;
    self
  }

  pub fn with_end_of_input(mut self, end_of_input: EndOfInput) -> Self {
    self.end_of_input = end_of_input;
    self
  }
}
