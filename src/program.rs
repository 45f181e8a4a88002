use crate::cell::{decode_cells, Cell};
use crate::error::Error;
use crate::opcode::{Opcode, MAX_ARITY};

/// The raw cells of one instruction, as read by [`Program::fetch_operation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fetched {
  /// Where the opcode cell was read from
  pub at: usize,
  pub opcode: Opcode,
  cells: [Cell; MAX_ARITY],
}

impl Fetched {
  pub fn operands(&self) -> &[Cell] {
    &self.cells[..self.opcode.arity()]
  }
}

/// The instruction store: the program's cells plus the instruction pointer.
///
/// The same buffer backs both sequential fetches and the random access used by
/// `rmem`/`wmem`, so writes are visible to the next fetch.
#[derive(Debug, Clone, Default)]
pub struct Program {
  cells: Vec<Cell>,
  // cell offset of the next fetch
  ip: usize,
}

impl Program {
  pub fn load(bytes: &[u8]) -> Self {
    Self::from_cells(decode_cells(bytes))
  }

  pub fn from_cells(cells: Vec<Cell>) -> Self {
    Self { cells, ip: 0 }
  }

  pub fn ip(&self) -> usize {
    self.ip
  }

  pub fn len(&self) -> usize {
    self.cells.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cells.is_empty()
  }

  pub fn cells(&self) -> &[Cell] {
    &self.cells
  }

  /// Reads the opcode at the instruction pointer and its operand cells, leaving
  /// the pointer just past them.
  pub fn fetch_operation(&mut self) -> Result<Fetched, Error> {
    let at = self.ip;
    let opcode = Opcode::try_from(self.read_cell(at)?)?;
    let needed = opcode.arity();
    let operands = self
      .cells
      .get(at + 1..at + 1 + needed)
      .ok_or(Error::TruncatedInstruction {
        opcode,
        needed,
        available: self.cells.len() - (at + 1),
      })?;
    let mut cells = [0; MAX_ARITY];
    cells[..needed].copy_from_slice(operands);
    self.ip = at + 1 + needed;
    Ok(Fetched { at, opcode, cells })
  }

  /// Moves the instruction pointer; bounds are checked by the next fetch
  pub fn jump_to(&mut self, position: usize) {
    self.ip = position;
  }

  pub fn read_cell(&self, position: usize) -> Result<Cell, Error> {
    self.cells.get(position).copied().ok_or(Error::OutOfBounds {
      address: position,
      len: self.cells.len(),
    })
  }

  pub fn write_cell(&mut self, position: usize, value: Cell) -> Result<(), Error> {
    let len = self.cells.len();
    let slot = self.cells.get_mut(position).ok_or(Error::OutOfBounds {
      address: position,
      len,
    })?;
    *slot = value;
    Ok(())
  }
}

impl From<Vec<u8>> for Program {
  fn from(bytes: Vec<u8>) -> Self {
    Self::load(&bytes)
  }
}

impl From<Vec<Cell>> for Program {
  fn from(cells: Vec<Cell>) -> Self {
    Self::from_cells(cells)
  }
}
