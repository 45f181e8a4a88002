use crate::cell::{Operand, Register, REGISTER_COUNT};

/// The register file, every register starts out as zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Registers([u16; REGISTER_COUNT]);

impl Registers {
  pub fn get(&self, r: Register) -> u16 {
    self.0[r.index()]
  }

  pub fn set(&mut self, r: Register, value: u16) {
    self.0[r.index()] = value;
  }

  pub fn as_array(&self) -> &[u16; REGISTER_COUNT] {
    &self.0
  }
}

/// Shared by `push`/`pop` data and `call`/`ret` return addresses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack(Vec<u16>);

impl Stack {
  pub fn push(&mut self, value: u16) {
    self.0.push(value);
  }

  pub fn pop(&mut self) -> Option<u16> {
    self.0.pop()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn as_slice(&self) -> &[u16] {
    &self.0
  }
}

/// Everything the machine owns besides the program itself
#[derive(Debug, Clone, Default)]
pub struct Machine {
  pub registers: Registers,
  pub stack: Stack,
}

impl Machine {
  pub fn new() -> Self {
    Self::default()
  }

  /// Literals are used as-is, register references yield the register's value
  pub fn resolve(&self, operand: Operand) -> u16 {
    match operand {
      Operand::Literal(value) => value,
      Operand::Register(r) => self.registers.get(r),
    }
  }
}
