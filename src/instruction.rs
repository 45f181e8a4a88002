use crate::cell::{Cell, Operand, Register};
use crate::error::Error;
use crate::opcode::Opcode;

/// A fully decoded instruction, with every operand already validated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
  Halt,
  Set { dst: Register, value: Operand },
  Push { value: Operand },
  Pop { dst: Register },
  Eq { dst: Register, a: Operand, b: Operand },
  Gt { dst: Register, a: Operand, b: Operand },
  Jmp { target: Operand },
  Jt { cond: Operand, target: Operand },
  Jf { cond: Operand, target: Operand },
  Add { dst: Register, a: Operand, b: Operand },
  Mult { dst: Register, a: Operand, b: Operand },
  Mod { dst: Register, a: Operand, b: Operand },
  And { dst: Register, a: Operand, b: Operand },
  Or { dst: Register, a: Operand, b: Operand },
  Not { dst: Register, value: Operand },
  Rmem { dst: Register, addr: Operand },
  Wmem { addr: Operand, value: Operand },
  Call { target: Operand },
  Ret,
  Out { value: Operand },
  In { dst: Register },
  Noop,
}

/// Hands out operand cells in order, like a tiny cursor
struct Operands<'a> {
  opcode: Opcode,
  cells: &'a [Cell],
  next: usize,
}

impl<'a> Operands<'a> {
  fn eat(&mut self) -> Result<Cell, Error> {
    let cell = self
      .cells
      .get(self.next)
      .copied()
      .ok_or(Error::TruncatedInstruction {
        opcode: self.opcode,
        needed: self.opcode.arity(),
        available: self.cells.len(),
      })?;
    self.next += 1;
    Ok(cell)
  }

  fn register(&mut self) -> Result<Register, Error> {
    Register::decode(self.eat()?)
  }

  fn value(&mut self) -> Result<Operand, Error> {
    Operand::decode(self.eat()?)
  }
}

impl Instruction {
  /// Decodes the operand cells of `opcode`.
  ///
  /// Destinations must be register references; everything else may be a
  /// literal or a register.
  pub fn decode(opcode: Opcode, cells: &[Cell]) -> Result<Self, Error> {
    let mut ops = Operands {
      opcode,
      cells,
      next: 0,
    };
    let instruction = match opcode {
      Opcode::Halt => Self::Halt,
      Opcode::Set => Self::Set {
        dst: ops.register()?,
        value: ops.value()?,
      },
      Opcode::Push => Self::Push { value: ops.value()? },
      Opcode::Pop => Self::Pop {
        dst: ops.register()?,
      },
      Opcode::Eq => Self::Eq {
        dst: ops.register()?,
        a: ops.value()?,
        b: ops.value()?,
      },
      Opcode::Gt => Self::Gt {
        dst: ops.register()?,
        a: ops.value()?,
        b: ops.value()?,
      },
      Opcode::Jmp => Self::Jmp {
        target: ops.value()?,
      },
      Opcode::Jt => Self::Jt {
        cond: ops.value()?,
        target: ops.value()?,
      },
      Opcode::Jf => Self::Jf {
        cond: ops.value()?,
        target: ops.value()?,
      },
      Opcode::Add => Self::Add {
        dst: ops.register()?,
        a: ops.value()?,
        b: ops.value()?,
      },
      Opcode::Mult => Self::Mult {
        dst: ops.register()?,
        a: ops.value()?,
        b: ops.value()?,
      },
      Opcode::Mod => Self::Mod {
        dst: ops.register()?,
        a: ops.value()?,
        b: ops.value()?,
      },
      Opcode::And => Self::And {
        dst: ops.register()?,
        a: ops.value()?,
        b: ops.value()?,
      },
      Opcode::Or => Self::Or {
        dst: ops.register()?,
        a: ops.value()?,
        b: ops.value()?,
      },
      Opcode::Not => Self::Not {
        dst: ops.register()?,
        value: ops.value()?,
      },
      Opcode::Rmem => Self::Rmem {
        dst: ops.register()?,
        addr: ops.value()?,
      },
      Opcode::Wmem => Self::Wmem {
        addr: ops.value()?,
        value: ops.value()?,
      },
      Opcode::Call => Self::Call {
        target: ops.value()?,
      },
      Opcode::Ret => Self::Ret,
      Opcode::Out => Self::Out { value: ops.value()? },
      Opcode::In => Self::In {
        dst: ops.register()?,
      },
      Opcode::Noop => Self::Noop,
    };
    Ok(instruction)
  }
}
