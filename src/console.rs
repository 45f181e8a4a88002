//! Character I/O for the `in` and `out` instructions.

use std::io::{self, BufRead, StdinLock, Stdout, Write};
use std::str;

/// Where the machine reads and writes characters
pub trait Console {
  /// Blocks for the next character, `None` once input is exhausted
  fn read_char(&mut self) -> io::Result<Option<char>>;

  fn write_char(&mut self, c: char) -> io::Result<()>;
}

/// A [`Console`] over any reader and writer, speaking UTF-8.
///
/// Output is flushed after every character.
#[derive(Debug)]
pub struct Terminal<R, W> {
  input: R,
  output: W,
}

impl<R, W> Terminal<R, W> {
  pub fn new(input: R, output: W) -> Self {
    Self { input, output }
  }

  pub fn output(&self) -> &W {
    &self.output
  }

  pub fn into_output(self) -> W {
    self.output
  }
}

impl Terminal<StdinLock<'static>, Stdout> {
  pub fn stdio() -> Self {
    Self::new(io::stdin().lock(), io::stdout())
  }
}

fn utf8_width(first: u8) -> Option<usize> {
  match first {
    0x00..=0x7F => Some(1),
    0xC0..=0xDF => Some(2),
    0xE0..=0xEF => Some(3),
    0xF0..=0xF7 => Some(4),
    _ => None,
  }
}

fn invalid_data<E>(error: E) -> io::Error
where
  E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
  io::Error::new(io::ErrorKind::InvalidData, error)
}

impl<R, W> Console for Terminal<R, W>
where
  R: BufRead,
  W: Write,
{
  fn read_char(&mut self) -> io::Result<Option<char>> {
    let first = match self.input.fill_buf()?.first() {
      Some(&byte) => byte,
      None => return Ok(None),
    };
    self.input.consume(1);

    let width = utf8_width(first).ok_or_else(|| invalid_data("input is not utf-8"))?;
    let mut buf = [first, 0, 0, 0];
    self.input.read_exact(&mut buf[1..width])?;
    let decoded = str::from_utf8(&buf[..width]).map_err(invalid_data)?;
    Ok(decoded.chars().next())
  }

  fn write_char(&mut self, c: char) -> io::Result<()> {
    let mut buf = [0; 4];
    self.output.write_all(c.encode_utf8(&mut buf).as_bytes())?;
    self.output.flush()
  }
}
