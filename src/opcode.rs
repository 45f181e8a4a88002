use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// The largest number of operand cells any opcode consumes.
pub const MAX_ARITY: usize = 3;

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
  /// Stops execution.
  ///
  /// | Operation | Semantics/RTL      | Assembly |
  /// |-----------|--------------------|----------|
  /// | Halt      | `(stop execution)` | `halt`   |
  Halt = 0,

  /// | Operation | Semantics/RTL | Assembly    |
  /// |-----------|---------------|-------------|
  /// | Set       | `r[a] ← b`    | `set a b`   |
  Set = 1,

  /// | Operation | Semantics/RTL | Assembly |
  /// |-----------|---------------|----------|
  /// | Push      | `s ← s ++ a`  | `push a` |
  Push = 2,

  /// Popping an empty stack halts the machine.
  ///
  /// | Operation | Semantics/RTL   | Assembly |
  /// |-----------|-----------------|----------|
  /// | Pop       | `r[a] ← pop(s)` | `pop a`  |
  Pop = 3,

  /// | Operation | Semantics/RTL             | Assembly   |
  /// |-----------|---------------------------|------------|
  /// | Equal     | `r[a] ← (b == c ? 1 : 0)` | `eq a b c` |
  Eq = 4,

  /// | Operation    | Semantics/RTL            | Assembly   |
  /// |--------------|--------------------------|------------|
  /// | Greater Than | `r[a] ← (b > c ? 1 : 0)` | `gt a b c` |
  Gt = 5,

  /// | Operation | Semantics/RTL | Assembly |
  /// |-----------|---------------|----------|
  /// | Jump      | `ip ← a`      | `jmp a`  |
  Jmp = 6,

  /// | Operation    | Semantics/RTL       | Assembly |
  /// |--------------|---------------------|----------|
  /// | Jump If True | `if a ≠ 0 : ip ← b` | `jt a b` |
  Jt = 7,

  /// | Operation     | Semantics/RTL       | Assembly |
  /// |---------------|---------------------|----------|
  /// | Jump If False | `if a = 0 : ip ← b` | `jf a b` |
  Jf = 8,

  /// | Operation | Semantics/RTL              | Assembly    |
  /// |-----------|----------------------------|-------------|
  /// | Add       | `r[a] ← (b + c) mod 32768` | `add a b c` |
  Add = 9,

  /// | Operation | Semantics/RTL              | Assembly     |
  /// |-----------|----------------------------|--------------|
  /// | Multiply  | `r[a] ← (b × c) mod 32768` | `mult a b c` |
  Mult = 10,

  /// A zero divisor is a fault.
  ///
  /// | Operation | Semantics/RTL      | Assembly    |
  /// |-----------|--------------------|-------------|
  /// | Modulo    | `r[a] ← b mod c`   | `mod a b c` |
  Mod = 11,

  /// | Operation   | Semantics/RTL  | Assembly    |
  /// |-------------|----------------|-------------|
  /// | Logical AND | `r[a] ← b & c` | `and a b c` |
  And = 12,

  /// | Operation  | Semantics/RTL   | Assembly   |
  /// |------------|-----------------|------------|
  /// | Logical OR | `r[a] ← b \| c` | `or a b c` |
  Or = 13,

  /// Complements within the 15 bit value space.
  ///
  /// | Operation   | Semantics/RTL       | Assembly  |
  /// |-------------|---------------------|-----------|
  /// | Logical NOT | `r[a] ← b ^ 0x7FFF` | `not a b` |
  Not = 14,

  /// | Operation   | Semantics/RTL | Assembly   |
  /// |-------------|---------------|------------|
  /// | Read Memory | `r[a] ← m[b]` | `rmem a b` |
  Rmem = 15,

  /// Writes land in the instruction store itself, so programs may rewrite
  /// their own code.
  ///
  /// | Operation    | Semantics/RTL | Assembly   |
  /// |--------------|---------------|------------|
  /// | Write Memory | `m[a] ← b`    | `wmem a b` |
  Wmem = 16,

  /// | Operation | Semantics/RTL              | Assembly |
  /// |-----------|----------------------------|----------|
  /// | Call      | `s ← s ++ ip ; ip ← a`     | `call a` |
  Call = 17,

  /// Returning with an empty stack halts the machine.
  ///
  /// | Operation | Semantics/RTL  | Assembly |
  /// |-----------|----------------|----------|
  /// | Return    | `ip ← pop(s)`  | `ret`    |
  Ret = 18,

  /// | Operation | Semantics/RTL      | Assembly |
  /// |-----------|--------------------|----------|
  /// | Output    | `putchar(a)`       | `out a`  |
  Out = 19,

  /// Blocks until a character is available or input runs out.
  ///
  /// | Operation | Semantics/RTL      | Assembly |
  /// |-----------|--------------------|----------|
  /// | Input     | `r[a] ← getchar()` | `in a`   |
  In = 20,

  /// | Operation | Semantics/RTL    | Assembly |
  /// |-----------|------------------|----------|
  /// | No-op     | `(do nothing)`   | `noop`   |
  Noop = 21,
}

impl Opcode {
  pub const ALL: [Opcode; 22] = [
    Self::Halt,
    Self::Set,
    Self::Push,
    Self::Pop,
    Self::Eq,
    Self::Gt,
    Self::Jmp,
    Self::Jt,
    Self::Jf,
    Self::Add,
    Self::Mult,
    Self::Mod,
    Self::And,
    Self::Or,
    Self::Not,
    Self::Rmem,
    Self::Wmem,
    Self::Call,
    Self::Ret,
    Self::Out,
    Self::In,
    Self::Noop,
  ];

  /// Number of operand cells following the opcode cell
  pub const fn arity(self) -> usize {
    match self {
      Self::Halt | Self::Ret | Self::Noop => 0,
      Self::Push | Self::Pop | Self::Jmp | Self::Call | Self::Out | Self::In => 1,
      Self::Set | Self::Jt | Self::Jf | Self::Not | Self::Rmem | Self::Wmem => 2,
      Self::Eq
      | Self::Gt
      | Self::Add
      | Self::Mult
      | Self::Mod
      | Self::And
      | Self::Or => 3,
    }
  }

  pub const fn mnemonic(self) -> &'static str {
    match self {
      Self::Halt => "halt",
      Self::Set => "set",
      Self::Push => "push",
      Self::Pop => "pop",
      Self::Eq => "eq",
      Self::Gt => "gt",
      Self::Jmp => "jmp",
      Self::Jt => "jt",
      Self::Jf => "jf",
      Self::Add => "add",
      Self::Mult => "mult",
      Self::Mod => "mod",
      Self::And => "and",
      Self::Or => "or",
      Self::Not => "not",
      Self::Rmem => "rmem",
      Self::Wmem => "wmem",
      Self::Call => "call",
      Self::Ret => "ret",
      Self::Out => "out",
      Self::In => "in",
      Self::Noop => "noop",
    }
  }
}

impl TryFrom<u16> for Opcode {
  type Error = Error;

  fn try_from(cell: u16) -> Result<Self, Self::Error> {
    Self::ALL
      .get(cell as usize)
      .copied()
      .ok_or(Error::UnknownOpcode(cell))
  }
}

impl FromStr for Opcode {
  type Err = Error;

  /// Accepts either a mnemonic (`call`) or the opcode number (`17`)
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let s = s.trim();
    if let Ok(cell) = s.parse::<u16>() {
      return Self::try_from(cell);
    }
    Self::ALL
      .into_iter()
      .find(|op| op.mnemonic().eq_ignore_ascii_case(s))
      .ok_or_else(|| Error::UnknownMnemonic(s.to_owned()))
  }
}

impl fmt::Display for Opcode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.mnemonic())
  }
}
