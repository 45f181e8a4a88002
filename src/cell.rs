//! Cells are the 16 bit words everything in the machine is made of.

use std::fmt;

use crate::error::{Error, Expected};

/// A single little-endian word of the program image
pub type Cell = u16;

/// Cells below this are literal values, and arithmetic wraps around it
pub const MODULUS: u16 = 32768;

/// Mask for the 15 bits a literal can occupy
pub const VALUE_MASK: u16 = MODULUS - 1;

pub const REGISTER_COUNT: usize = 8;

/// Decodes bytes pairwise into cells.
///
/// A trailing odd byte becomes the low half of a final cell whose high half is
/// zero.
pub fn decode_cells(bytes: &[u8]) -> Vec<Cell> {
  bytes
    .chunks(2)
    .map(|pair| match *pair {
      [lo, hi] => u16::from_le_bytes([lo, hi]),
      [lo] => lo as u16,
      _ => unreachable!(),
    })
    .collect()
}

/// One of the eight registers, named by cells `32768..=32775`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register(u8);

impl Register {
  pub fn new(index: usize) -> Option<Self> {
    (index < REGISTER_COUNT).then_some(Self(index as u8))
  }

  pub fn decode(cell: Cell) -> Result<Self, Error> {
    match cell.checked_sub(MODULUS) {
      Some(index) => Self::new(index as usize).ok_or(Error::InvalidOperand {
        cell,
        expected: Expected::Register,
      }),
      None => Err(Error::InvalidOperand {
        cell,
        expected: Expected::Register,
      }),
    }
  }

  pub fn index(self) -> usize {
    self.0 as usize
  }
}

impl fmt::Display for Register {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "r{}", self.0)
  }
}

/// A source operand: either used as-is, or substituted with a register's
/// current value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
  Literal(u16),
  Register(Register),
}

impl Operand {
  pub fn decode(cell: Cell) -> Result<Self, Error> {
    if cell < MODULUS {
      return Ok(Self::Literal(cell));
    }
    Register::decode(cell)
      .map(Self::Register)
      .map_err(|_| Error::InvalidOperand {
        cell,
        expected: Expected::Value,
      })
  }
}

impl fmt::Display for Operand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Literal(value) => write!(f, "{value}"),
      Self::Register(r) => write!(f, "{r}"),
    }
  }
}
