use tracing::debug;

use crate::cell::{Operand, Register, MODULUS, VALUE_MASK};
use crate::config::{Config, EndOfInput};
use crate::console::Console;
use crate::error::{Error, Fault};
use crate::instruction::Instruction;
use crate::machine::Machine;
use crate::program::Program;

/// Why a machine stopped without faulting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Halt {
  /// The program executed `halt`
  Instruction,
  /// `pop` or `ret` found the stack empty
  EmptyStack,
  /// `in` ran out of input under [`EndOfInput::Halt`]
  EndOfInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
  Running,
  Halted(Halt),
  Faulted,
}

/// What the machine should do once an instruction retires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
  Continue,
  Halt(Halt),
}

/// A virtual machine over a flat, self-modifiable array of 16 bit cells.
///
/// The program doubles as the machine's memory: `rmem`/`wmem` address the very
/// cells instructions are fetched from.
#[derive(Debug)]
pub struct Vm {
  program: Program,
  machine: Machine,
  config: Config,
  state: State,
  cycles: u64,
}

impl Vm {
  pub fn new(program: Program) -> Self {
    Self::with_config(program, Config::default())
  }

  pub fn with_config(program: Program, config: Config) -> Self {
    Self {
      program,
      machine: Machine::new(),
      config,
      state: State::Running,
      cycles: 0,
    }
  }

  /// Decode a program image and get ready to run it from cell zero
  pub fn load(bytes: &[u8], config: Config) -> Self {
    Self::with_config(Program::load(bytes), config)
  }

  pub fn program(&self) -> &Program {
    &self.program
  }

  pub fn machine(&self) -> &Machine {
    &self.machine
  }

  pub fn state(&self) -> State {
    self.state
  }

  pub fn ip(&self) -> usize {
    self.program.ip()
  }

  /// Number of fetch cycles performed so far
  pub fn cycles(&self) -> u64 {
    self.cycles
  }

  /// Execute a single instruction, returning the state it left the machine in
  pub fn step<C>(&mut self, console: &mut C) -> Result<State, Fault>
  where
    C: Console,
  {
    let at = self.program.ip();
    if self.state != State::Running {
      return Err(Fault::new(at, Error::MachineHalted));
    }
    match self.execute(console) {
      Ok(Flow::Continue) => {}
      Ok(Flow::Halt(halt)) => {
        debug!(ip = at, cycles = self.cycles, ?halt, "machine halted");
        self.state = State::Halted(halt);
      }
      Err(error) => {
        debug!(ip = at, cycles = self.cycles, %error, "machine faulted");
        self.state = State::Faulted;
        return Err(Fault::new(at, error));
      }
    }
    Ok(self.state)
  }

  /// Run until the machine halts or faults
  pub fn run<C>(&mut self, console: &mut C) -> Result<Halt, Fault>
  where
    C: Console,
  {
    loop {
      if let State::Halted(halt) = self.step(console)? {
        return Ok(halt);
      }
    }
  }

  fn execute<C>(&mut self, console: &mut C) -> Result<Flow, Error>
  where
    C: Console,
  {
    self.cycles += 1;
    let fetched = self.program.fetch_operation()?;
    let instruction = Instruction::decode(fetched.opcode, fetched.operands())?;
    if self.config.trace.covers(fetched.opcode) {
      debug!(
        ip = fetched.at,
        opcode = %fetched.opcode,
        operands = ?fetched.operands(),
        registers = ?self.machine.registers.as_array(),
        stack = ?self.machine.stack.as_slice(),
        "exec"
      );
    }
    let mut task = Task::new(self, console);
    task.run(instruction)
  }
}

struct Task<'vm, 'io, C> {
  vm: &'vm mut Vm,
  console: &'io mut C,
}

impl<'vm, 'io, C> Task<'vm, 'io, C>
where
  C: Console,
{
  fn new(vm: &'vm mut Vm, console: &'io mut C) -> Self {
    Self { vm, console }
  }

  #[inline]
  fn get(&self, operand: Operand) -> u16 {
    self.vm.machine.resolve(operand)
  }

  #[inline]
  fn put(&mut self, dst: Register, value: u16) {
    self.vm.machine.registers.set(dst, value);
  }

  fn run(&mut self, instruction: Instruction) -> Result<Flow, Error> {
    use Instruction as I;
    match instruction {
      I::Halt => Ok(Flow::Halt(Halt::Instruction)),
      I::Set { dst, value } => set(self, dst, value),
      I::Push { value } => push(self, value),
      I::Pop { dst } => pop(self, dst),
      I::Eq { dst, a, b } => binary(self, dst, a, b, |a, b| Ok((a == b) as u16)),
      I::Gt { dst, a, b } => binary(self, dst, a, b, |a, b| Ok((a > b) as u16)),
      I::Jmp { target } => jump_if(self, true, target),
      I::Jt { cond, target } => {
        let taken = self.get(cond) != 0;
        jump_if(self, taken, target)
      }
      I::Jf { cond, target } => {
        let taken = self.get(cond) == 0;
        jump_if(self, taken, target)
      }
      I::Add { dst, a, b } => binary(self, dst, a, b, |a, b| {
        Ok(((a as u32 + b as u32) % MODULUS as u32) as u16)
      }),
      I::Mult { dst, a, b } => binary(self, dst, a, b, |a, b| {
        Ok(((a as u32 * b as u32) % MODULUS as u32) as u16)
      }),
      I::Mod { dst, a, b } => binary(self, dst, a, b, |a, b| {
        a.checked_rem(b).ok_or(Error::DivisionByZero)
      }),
      I::And { dst, a, b } => binary(self, dst, a, b, |a, b| Ok(a & b)),
      I::Or { dst, a, b } => binary(self, dst, a, b, |a, b| Ok(a | b)),
      I::Not { dst, value } => not(self, dst, value),
      I::Rmem { dst, addr } => rmem(self, dst, addr),
      I::Wmem { addr, value } => wmem(self, addr, value),
      I::Call { target } => call(self, target),
      I::Ret => ret(self),
      I::Out { value } => out(self, value),
      I::In { dst } => input(self, dst),
      I::Noop => Ok(Flow::Continue),
    }
  }
}

// r[a] ← b
fn set<C>(task: &mut Task<'_, '_, C>, dst: Register, value: Operand) -> Result<Flow, Error>
where
  C: Console,
{
  let value = task.get(value);
  task.put(dst, value);
  Ok(Flow::Continue)
}

// s ← s ++ a
fn push<C>(task: &mut Task<'_, '_, C>, value: Operand) -> Result<Flow, Error>
where
  C: Console,
{
  let value = task.get(value);
  task.vm.machine.stack.push(value);
  Ok(Flow::Continue)
}

// r[a] ← pop(s)
fn pop<C>(task: &mut Task<'_, '_, C>, dst: Register) -> Result<Flow, Error>
where
  C: Console,
{
  match task.vm.machine.stack.pop() {
    Some(value) => {
      task.put(dst, value);
      Ok(Flow::Continue)
    }
    None => Ok(Flow::Halt(Halt::EmptyStack)),
  }
}

// r[a] ← b ∘ c
fn binary<C, F>(
  task: &mut Task<'_, '_, C>,
  dst: Register,
  a: Operand,
  b: Operand,
  op: F,
) -> Result<Flow, Error>
where
  C: Console,
  F: FnOnce(u16, u16) -> Result<u16, Error>,
{
  let value = op(task.get(a), task.get(b))?;
  task.put(dst, value);
  Ok(Flow::Continue)
}

// r[a] ← b ^ 0x7FFF
fn not<C>(task: &mut Task<'_, '_, C>, dst: Register, value: Operand) -> Result<Flow, Error>
where
  C: Console,
{
  let value = task.get(value) ^ VALUE_MASK;
  task.put(dst, value);
  Ok(Flow::Continue)
}

// if taken : ip ← target
fn jump_if<C>(task: &mut Task<'_, '_, C>, taken: bool, target: Operand) -> Result<Flow, Error>
where
  C: Console,
{
  if taken {
    let target = task.get(target) as usize;
    task.vm.program.jump_to(target);
  }
  Ok(Flow::Continue)
}

// r[a] ← m[b]
fn rmem<C>(task: &mut Task<'_, '_, C>, dst: Register, addr: Operand) -> Result<Flow, Error>
where
  C: Console,
{
  let addr = task.get(addr) as usize;
  let value = task.vm.program.read_cell(addr)?;
  task.put(dst, value);
  Ok(Flow::Continue)
}

// m[a] ← b
fn wmem<C>(task: &mut Task<'_, '_, C>, addr: Operand, value: Operand) -> Result<Flow, Error>
where
  C: Console,
{
  let addr = task.get(addr) as usize;
  let value = task.get(value);
  task.vm.program.write_cell(addr, value)?;
  Ok(Flow::Continue)
}

// s ← s ++ ip ; ip ← a
fn call<C>(task: &mut Task<'_, '_, C>, target: Operand) -> Result<Flow, Error>
where
  C: Console,
{
  let program = &task.vm.program;
  // the instruction pointer already sits past this instruction
  let next = program.ip();
  let next = u16::try_from(next).map_err(|_| Error::OutOfBounds {
    address: next,
    len: program.len(),
  })?;
  task.vm.machine.stack.push(next);
  jump_if(task, true, target)
}

// ip ← pop(s)
fn ret<C>(task: &mut Task<'_, '_, C>) -> Result<Flow, Error>
where
  C: Console,
{
  match task.vm.machine.stack.pop() {
    Some(addr) => {
      task.vm.program.jump_to(addr as usize);
      Ok(Flow::Continue)
    }
    None => Ok(Flow::Halt(Halt::EmptyStack)),
  }
}

// putchar(a)
fn out<C>(task: &mut Task<'_, '_, C>, value: Operand) -> Result<Flow, Error>
where
  C: Console,
{
  let value = task.get(value);
  let c = char::from_u32(value as u32).ok_or(Error::InvalidCharacter(value))?;
  task.console.write_char(c)?;
  Ok(Flow::Continue)
}

// r[a] ← getchar()
fn input<C>(task: &mut Task<'_, '_, C>, dst: Register) -> Result<Flow, Error>
where
  C: Console,
{
  let Some(c) = task.console.read_char()? else {
    return match task.vm.config.end_of_input {
      EndOfInput::Fail => Err(Error::InputExhausted),
      EndOfInput::Halt => Ok(Flow::Halt(Halt::EndOfInput)),
    };
  };
  let value = u16::try_from(c as u32)
    .ok()
    .filter(|&value| value < MODULUS)
    .ok_or(Error::UnrepresentableInput(c))?;
  task.put(dst, value);
  Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
  use super::*;

  use crate::cell::REGISTER_COUNT;
  use crate::config::Trace;
  use crate::console::Terminal;

  const R0: u16 = 32768;
  const R1: u16 = 32769;
  const R2: u16 = 32770;

  type TestConsole<'a> = Terminal<&'a [u8], Vec<u8>>;

  fn console(input: &str) -> TestConsole<'_> {
    Terminal::new(input.as_bytes(), Vec::new())
  }

  fn reg(vm: &Vm, cell: u16) -> u16 {
    let r = Register::decode(cell).unwrap();
    vm.machine().registers.get(r)
  }

  /// Runs `cells` to completion, returning the machine, outcome and output
  fn run_with(cells: Vec<u16>, input: &str, config: Config) -> (Vm, Result<Halt, Fault>, String) {
    let mut vm = Vm::with_config(cells.into(), config);
    let mut term = console(input);
    let outcome = vm.run(&mut term);
    let output = String::from_utf8(term.into_output()).unwrap();
    (vm, outcome, output)
  }

  fn run(cells: Vec<u16>) -> (Vm, Result<Halt, Fault>, String) {
    run_with(cells, "", Config::default())
  }

  mod vm {
    use super::*;

    #[test]
    fn new() {
      let vm = Vm::new(Program::from_cells(vec![0]));
      assert_eq!(vm.ip(), 0);
      assert_eq!(vm.state(), State::Running);
      assert_eq!(vm.cycles(), 0);
      assert_eq!(vm.machine().registers.as_array(), &[0; REGISTER_COUNT]);
      assert!(vm.machine().stack.is_empty());
    }

    #[test]
    fn load_bytes() {
      // add r0 4 4 ; halt
      #[rustfmt::skip]
      let bytes = [
        0x09, 0x00, 0x00, 0x80, 0x04, 0x00, 0x04, 0x00,
        0x00, 0x00,
      ];
      let mut vm = Vm::load(&bytes, Config::default());
      let mut term = console("");
      assert_eq!(vm.run(&mut term).unwrap(), Halt::Instruction);
      assert_eq!(reg(&vm, R0), 8);
    }

    #[test]
    fn step_halt() {
      let mut vm = Vm::new(Program::from_cells(vec![0, 21]));
      let mut term = console("");
      assert_eq!(vm.step(&mut term).unwrap(), State::Halted(Halt::Instruction));
      assert_eq!(vm.ip(), 1);
      // cant progress
      let fault = vm.step(&mut term).unwrap_err();
      assert!(matches!(fault.error, Error::MachineHalted));
      assert_eq!(vm.ip(), 1);
      assert_eq!(vm.cycles(), 1);
    }

    #[test]
    fn step_set() {
      #[rustfmt::skip]
      let (vm, outcome, _) = run(vec![
        1, R0, 42,
        1, R1, R0,
        0,
      ]);
      assert_eq!(outcome.unwrap(), Halt::Instruction);
      assert_eq!(reg(&vm, R0), 42);
      assert_eq!(reg(&vm, R1), 42);
    }

    #[test]
    fn step_push_pop() {
      #[rustfmt::skip]
      let (vm, outcome, _) = run(vec![
        1, R0, 7,
        2, R0,
        2, 1234,
        3, R1,
        3, R2,
        0,
      ]);
      assert_eq!(outcome.unwrap(), Halt::Instruction);
      assert_eq!(reg(&vm, R1), 1234);
      assert_eq!(reg(&vm, R2), 7);
      assert!(vm.machine().stack.is_empty());
    }

    #[test]
    fn push_then_pop_leaves_stack_unchanged() {
      for value in [0, 1, 255, 32767] {
        #[rustfmt::skip]
        let (vm, _, _) = run(vec![
          2, 9,
          2, value,
          3, R0,
          0,
        ]);
        assert_eq!(reg(&vm, R0), value);
        assert_eq!(vm.machine().stack.as_slice(), &[9]);
      }
    }

    #[test]
    fn pop_empty_stack_halts() {
      let (vm, outcome, _) = run(vec![3, R0, 19, 65]);
      assert_eq!(outcome.unwrap(), Halt::EmptyStack);
      assert_eq!(vm.state(), State::Halted(Halt::EmptyStack));
      assert_eq!(reg(&vm, R0), 0);
    }

    #[test]
    fn step_eq_gt() {
      #[rustfmt::skip]
      let (vm, _, _) = run(vec![
        4, R0, 5, 5,
        4, R1, 5, 6,
        5, R2, 6, 5,
        5, 32771, 5, 5,
        0,
      ]);
      assert_eq!(reg(&vm, R0), 1);
      assert_eq!(reg(&vm, R1), 0);
      assert_eq!(reg(&vm, R2), 1);
      assert_eq!(reg(&vm, 32771), 0);
    }

    #[test]
    fn step_jmp() {
      let mut vm = Vm::new(Program::from_cells(vec![6, 4, 19, 65, 0]));
      let mut term = console("");
      assert_eq!(vm.step(&mut term).unwrap(), State::Running);
      assert_eq!(vm.ip(), 4);
      assert_eq!(vm.step(&mut term).unwrap(), State::Halted(Halt::Instruction));
      assert!(term.output().is_empty());
    }

    #[test]
    fn step_jt_jf() {
      // jt 1 -> taken, jt 0 -> not, jf 0 -> taken, jf 1 -> not
      for (op, cond, taken) in [(7, 1, true), (7, 0, false), (8, 0, true), (8, 1, false)] {
        let mut vm = Vm::new(Program::from_cells(vec![op, cond, 10, 0]));
        let mut term = console("");
        vm.step(&mut term).unwrap();
        assert_eq!(vm.ip(), if taken { 10 } else { 3 }, "op {op} cond {cond}");
      }
    }

    #[test]
    fn step_jt_reads_register() {
      #[rustfmt::skip]
      let (_, outcome, output) = run(vec![
        1, R0, 1,
        7, R0, 8,
        19, 78,
        19, 89,
        0,
      ]);
      assert_eq!(outcome.unwrap(), Halt::Instruction);
      assert_eq!(output, "Y");
    }

    #[test]
    fn step_add() {
      let (vm, _, _) = run(vec![9, R0, 4, 4, 0]);
      assert_eq!(reg(&vm, R0), 8);
    }

    #[test]
    fn add_wraps() {
      let (vm, _, _) = run(vec![9, R0, 32758, 15, 0]);
      assert_eq!(reg(&vm, R0), 5);
    }

    #[test]
    fn step_mult() {
      #[rustfmt::skip]
      let (vm, _, _) = run(vec![
        10, R0, 6, 7,
        10, R1, 32767, 32767,
        0,
      ]);
      assert_eq!(reg(&vm, R0), 42);
      // (2^15 - 1)^2 mod 2^15 = 1
      assert_eq!(reg(&vm, R1), 1);
    }

    #[test]
    fn arithmetic_stays_in_range() {
      for (a, b) in [(32767, 32767), (16384, 16384), (12345, 29999), (1, 32767)] {
        let (vm, _, _) = run(vec![9, R0, a, b, 10, R1, a, b, 0]);
        assert!(reg(&vm, R0) < MODULUS);
        assert!(reg(&vm, R1) < MODULUS);
      }
    }

    #[test]
    fn step_mod() {
      let (vm, _, _) = run(vec![11, R0, 17, 5, 0]);
      assert_eq!(reg(&vm, R0), 2);
    }

    #[test]
    fn mod_by_zero_faults() {
      #[rustfmt::skip]
      let (vm, outcome, _) = run(vec![
        21,
        11, R0, 17, R1,
        0,
      ]);
      let fault = outcome.unwrap_err();
      assert!(matches!(fault.error, Error::DivisionByZero));
      assert_eq!(fault.ip, 1);
      assert_eq!(vm.state(), State::Faulted);
      assert_eq!(reg(&vm, R0), 0);
    }

    #[test]
    fn step_and_or() {
      #[rustfmt::skip]
      let (vm, _, _) = run(vec![
        12, R0, 0b1100, 0b1010,
        13, R1, 0b1100, 0b1010,
        0,
      ]);
      assert_eq!(reg(&vm, R0), 0b1000);
      assert_eq!(reg(&vm, R1), 0b1110);
    }

    #[test]
    fn step_not() {
      let (vm, _, _) = run(vec![14, R0, 0, 14, R1, 0b1010, 0]);
      assert_eq!(reg(&vm, R0), 0x7FFF);
      assert_eq!(reg(&vm, R1), 0x7FFF ^ 0b1010);
    }

    #[test]
    fn not_is_an_involution() {
      for value in [0, 1, 0x1234, 0x7FFE, 0x7FFF] {
        let (vm, _, _) = run(vec![14, R0, value, 14, R1, R0, 0]);
        assert_eq!(reg(&vm, R1), value);
      }
    }

    #[test]
    fn step_rmem() {
      let (vm, _, _) = run(vec![15, R0, 4, 0, 999]);
      assert_eq!(reg(&vm, R0), 999);
    }

    #[test]
    fn rmem_out_of_bounds() {
      let (_, outcome, _) = run(vec![15, R0, 100, 0]);
      let fault = outcome.unwrap_err();
      assert!(matches!(fault.error, Error::OutOfBounds { address: 100, len: 4 }));
      assert_eq!(fault.ip, 0);
    }

    #[test]
    fn wmem_then_rmem() {
      #[rustfmt::skip]
      let (vm, _, _) = run(vec![
        16, 8, 4321,
        15, R0, 8,
        0,
        0, 0,
      ]);
      assert_eq!(reg(&vm, R0), 4321);
      assert_eq!(vm.program().cells()[8], 4321);
    }

    #[test]
    fn wmem_rewrites_later_code() {
      // out 'A' becomes out 'B' before it is fetched
      let (vm, outcome, output) = run(vec![16, 4, 66, 19, 65, 0]);
      assert_eq!(outcome.unwrap(), Halt::Instruction);
      assert_eq!(output, "B");
      assert_eq!(vm.program().cells(), &[16, 4, 66, 19, 66, 0]);
    }

    #[test]
    fn wmem_into_current_instruction_is_not_retroactive() {
      // overwrites its own address operand, the decoded address still wins
      let (vm, outcome, _) = run(vec![16, 1, 5, 0]);
      assert_eq!(outcome.unwrap(), Halt::Instruction);
      assert_eq!(vm.program().cells(), &[16, 5, 5, 0]);
    }

    #[test]
    fn wmem_can_plant_a_halt() {
      // turns the jmp back to 0 into a halt
      let (vm, outcome, _) = run(vec![16, 3, 0, 6, 0]);
      assert_eq!(outcome.unwrap(), Halt::Instruction);
      assert_eq!(vm.cycles(), 2);
    }

    #[test]
    fn call_then_ret() {
      #[rustfmt::skip]
      let (vm, outcome, output) = run(vec![
        17, 5,
        19, 65,
        0,
        18,
      ]);
      assert_eq!(outcome.unwrap(), Halt::Instruction);
      assert_eq!(output, "A");
      assert!(vm.machine().stack.is_empty());
      assert_eq!(vm.ip(), 5);
    }

    #[test]
    fn call_pushes_return_address() {
      let mut vm = Vm::new(Program::from_cells(vec![21, 17, 10]));
      let mut term = console("");
      vm.step(&mut term).unwrap();
      vm.step(&mut term).unwrap();
      assert_eq!(vm.machine().stack.as_slice(), &[3]);
      assert_eq!(vm.ip(), 10);
    }

    #[test]
    fn ret_with_empty_stack_halts() {
      let (vm, outcome, output) = run(vec![18, 19, 65]);
      assert_eq!(outcome.unwrap(), Halt::EmptyStack);
      assert!(output.is_empty());
      assert_eq!(vm.cycles(), 1);
    }

    #[test]
    fn step_out() {
      let (_, outcome, output) = run(vec![19, 65, 0]);
      assert_eq!(outcome.unwrap(), Halt::Instruction);
      assert_eq!(output, "A");
    }

    #[test]
    fn step_in() {
      #[rustfmt::skip]
      let (vm, outcome, _) = run_with(vec![
        20, R0,
        20, R1,
        0,
      ], "hi", Config::default());
      assert_eq!(outcome.unwrap(), Halt::Instruction);
      assert_eq!(reg(&vm, R0), 'h' as u16);
      assert_eq!(reg(&vm, R1), 'i' as u16);
    }

    #[test]
    fn echo() {
      #[rustfmt::skip]
      let (_, outcome, output) = run_with(vec![
        20, R0,
        19, R0,
        6, 0,
      ], "echo\n", Config::default().with_end_of_input(EndOfInput::Halt));
      assert_eq!(outcome.unwrap(), Halt::EndOfInput);
      assert_eq!(output, "echo\n");
    }

    #[test]
    fn exhausted_input_faults_by_default() {
      let (_, outcome, _) = run(vec![21, 20, R0, 0]);
      let fault = outcome.unwrap_err();
      assert!(matches!(fault.error, Error::InputExhausted));
      assert_eq!(fault.ip, 1);
    }

    #[test]
    fn input_outside_cell_range() {
      let (_, outcome, _) = run_with(vec![20, R0, 0], "😀", Config::default());
      assert!(matches!(
        outcome.unwrap_err().error,
        Error::UnrepresentableInput('😀')
      ));
    }

    #[test]
    fn noops_then_halt() {
      let n = 16;
      let mut cells = vec![21; n];
      cells.push(0);
      let (vm, outcome, output) = run(cells);
      assert_eq!(outcome.unwrap(), Halt::Instruction);
      assert_eq!(vm.cycles(), n as u64 + 1);
      assert_eq!(vm.machine().registers.as_array(), &[0; REGISTER_COUNT]);
      assert!(vm.machine().stack.is_empty());
      assert!(output.is_empty());
    }

    #[test]
    fn countdown_loop() {
      #[rustfmt::skip]
      let (vm, outcome, output) = run(vec![
        1, R0, 3,               // set r0 3
        19, 120,                // out 'x'
        9, R0, R0, 32767,       // r0 ← r0 - 1
        7, R0, 3,               // jt r0 3
        0,
      ]);
      assert_eq!(outcome.unwrap(), Halt::Instruction);
      assert_eq!(output, "xxx");
      assert_eq!(reg(&vm, R0), 0);
    }

    #[test]
    fn unknown_opcode_faults() {
      let (vm, outcome, _) = run(vec![21, 21, 99]);
      let fault = outcome.unwrap_err();
      assert!(matches!(fault.error, Error::UnknownOpcode(99)));
      assert_eq!(fault.ip, 2);
      assert_eq!(vm.state(), State::Faulted);
    }

    #[test]
    fn invalid_operand_faults() {
      let (_, outcome, output) = run(vec![19, 32776, 0]);
      assert!(matches!(
        outcome.unwrap_err().error,
        Error::InvalidOperand { cell: 32776, .. }
      ));
      assert!(output.is_empty());
    }

    #[test]
    fn running_off_the_end_faults() {
      let (_, outcome, _) = run(vec![21]);
      let fault = outcome.unwrap_err();
      assert!(matches!(fault.error, Error::OutOfBounds { address: 1, len: 1 }));
      assert_eq!(fault.ip, 1);
    }

    #[test]
    fn jump_out_of_bounds_faults_on_fetch() {
      let mut vm = Vm::new(Program::from_cells(vec![6, 500]));
      let mut term = console("");
      assert_eq!(vm.step(&mut term).unwrap(), State::Running);
      let fault = vm.step(&mut term).unwrap_err();
      assert!(matches!(fault.error, Error::OutOfBounds { address: 500, .. }));
      assert_eq!(fault.ip, 500);
    }

    #[test]
    fn truncated_instruction_faults() {
      let (_, outcome, _) = run(vec![21, 9, R0, 1]);
      let fault = outcome.unwrap_err();
      assert!(matches!(fault.error, Error::TruncatedInstruction { needed: 3, available: 2, .. }));
      assert_eq!(fault.ip, 1);
    }

    #[test]
    fn tracing_does_not_change_execution() {
      #[rustfmt::skip]
      let cells = vec![
        1, R0, 3,
        19, 120,
        9, R0, R0, 32767,
        7, R0, 3,
        0,
      ];
      let (plain, _, plain_output) = run(cells.clone());
      let (traced, _, traced_output) =
        run_with(cells, "", Config::default().with_trace(Trace::All));
      assert_eq!(plain_output, traced_output);
      assert_eq!(plain.cycles(), traced.cycles());
      assert_eq!(plain.machine().registers, traced.machine().registers);
    }
  }
}
