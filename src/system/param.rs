//! Device parameters exposed under `/dev`.
//!
//! A parameter is a named slot in the caller's memory. The shell only borrows
//! it: values sit behind [`Cell`]s so the application keeps reading and
//! writing them between polls while the shell holds the table.
//!
//! ```rust
//! use core::cell::Cell;
//! use paramshell::system::param::{Parameter, Value};
//!
//! let speed = Cell::new(1200);
//! let gain = Cell::new(0.5);
//! let mut label = [0u8; 12];
//! let label = Cell::from_mut(&mut label[..]).as_slice_of_cells();
//!
//! fn apply_speed(_id: u8) { /* push the new value to the motor driver */ }
//!
//! let table = [
//!     Parameter::int("speed", &speed).writable().on_write(apply_speed),
//!     Parameter::double("gain", &gain),
//!     Parameter::text("label", label).writable().with_id(7),
//! ];
//! assert_eq!(table[2].value.storage_size(), 12);
//! ```

use core::cell::Cell;
use core::fmt::{self, Write};

/// Largest piece handed to a sink or source by [`Value::write_to`] and
/// [`Value::read_from`].
pub const CHUNK_SIZE: usize = 16;

/// Hook called with the parameter id, before a read or after a write.
pub type HookFn = fn(id: u8);

/// Whether the operator may change a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    /// `cat` only.
    #[default]
    ReadOnly,
    /// `cat` and `echo <value> > <name>`.
    ReadWrite,
}

/// Typed storage of a parameter.
#[derive(Debug, Clone, Copy)]
pub enum Value<'a> {
    /// Signed integer.
    Int(&'a Cell<i32>),
    /// Double precision float.
    Double(&'a Cell<f64>),
    /// Fixed-length text slot, zero terminated when shorter than the slot.
    Text(&'a [Cell<u8>]),
}

impl Value<'_> {
    /// Bytes the value occupies in persistent storage and in `ll` output.
    pub fn storage_size(&self) -> usize {
        match self {
            Value::Int(_) => size_of::<i32>(),
            Value::Double(_) => size_of::<f64>(),
            Value::Text(slot) => slot.len(),
        }
    }

    /// Parse `input` and store it.
    ///
    /// Numbers are parsed best effort: garbage reads as zero. Text longer
    /// than the slot allows (terminator included) is ignored.
    pub fn assign(&self, input: &str) {
        match self {
            Value::Int(cell) => cell.set(parse_int(input)),
            Value::Double(cell) => cell.set(parse_float(input)),
            Value::Text(slot) => {
                let bytes = input.as_bytes();
                if bytes.len() < slot.len() {
                    for (cell, &b) in slot.iter().zip(bytes) {
                        cell.set(b);
                    }
                    slot[bytes.len()].set(0);
                }
            }
        }
    }

    /// Serialize the value, handing `sink` the offset within the value and
    /// the bytes found there.
    ///
    /// Numbers are little-endian and come in one piece; text slots come in
    /// pieces of at most [`CHUNK_SIZE`] bytes. Stops at the first error.
    pub fn write_to<E>(&self, mut sink: impl FnMut(usize, &[u8]) -> Result<(), E>) -> Result<(), E> {
        match self {
            Value::Int(cell) => sink(0, &cell.get().to_le_bytes()),
            Value::Double(cell) => sink(0, &cell.get().to_le_bytes()),
            Value::Text(slot) => {
                let mut buf = [0u8; CHUNK_SIZE];
                for (i, cells) in slot.chunks(CHUNK_SIZE).enumerate() {
                    for (b, cell) in buf.iter_mut().zip(cells) {
                        *b = cell.get();
                    }
                    sink(i * CHUNK_SIZE, &buf[..cells.len()])?;
                }
                Ok(())
            }
        }
    }

    /// Inverse of [`write_to`](Self::write_to): `source` fills each piece.
    ///
    /// A number is only updated once all of its bytes were read. A failing
    /// text read keeps the pieces already loaded.
    pub fn read_from<E>(&self, mut source: impl FnMut(usize, &mut [u8]) -> Result<(), E>) -> Result<(), E> {
        match self {
            Value::Int(cell) => {
                let mut le = [0u8; 4];
                source(0, &mut le)?;
                cell.set(i32::from_le_bytes(le));
            }
            Value::Double(cell) => {
                let mut le = [0u8; 8];
                source(0, &mut le)?;
                cell.set(f64::from_le_bytes(le));
            }
            Value::Text(slot) => {
                let mut buf = [0u8; CHUNK_SIZE];
                for (i, cells) in slot.chunks(CHUNK_SIZE).enumerate() {
                    let chunk = &mut buf[..cells.len()];
                    source(i * CHUNK_SIZE, chunk)?;
                    for (cell, &b) in cells.iter().zip(chunk.iter()) {
                        cell.set(b);
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(cell) => write!(f, "{}", cell.get()),
            Value::Double(cell) => write!(f, "{:.8}", cell.get()),
            Value::Text(slot) => {
                // bytes of a character not yet complete
                let mut pending = [0u8; 4];
                let mut len = 0;
                for b in slot.iter().map(Cell::get).take_while(|&b| b != 0) {
                    pending[len] = b;
                    len += 1;
                    while len > 0 {
                        match core::str::from_utf8(&pending[..len]) {
                            Ok(s) => {
                                f.write_str(s)?;
                                len = 0;
                            }
                            Err(e) => match e.error_len() {
                                Some(bad) => {
                                    f.write_char(char::REPLACEMENT_CHARACTER)?;
                                    pending.copy_within(bad..len, 0);
                                    len -= bad;
                                }
                                None => break,
                            },
                        }
                    }
                }
                if len > 0 {
                    f.write_char(char::REPLACEMENT_CHARACTER)?;
                }
                Ok(())
            }
        }
    }
}

/// One entry of the caller's parameter table.
#[derive(Debug, Clone, Copy)]
pub struct Parameter<'a> {
    /// File name under `/dev`.
    pub name: &'static str,
    /// Storage and kind.
    pub value: Value<'a>,
    /// Operator access.
    pub access: Access,
    /// Called before the value is printed.
    pub pre_read: Option<HookFn>,
    /// Called after the operator changed the value.
    pub post_write: Option<HookFn>,
    /// Passed to both hooks.
    pub id: u8,
}

impl<'a> Parameter<'a> {
    /// Read-only parameter without hooks.
    pub const fn new(name: &'static str, value: Value<'a>) -> Self {
        Self {
            name,
            value,
            access: Access::ReadOnly,
            pre_read: None,
            post_write: None,
            id: 0,
        }
    }

    /// Integer parameter.
    pub const fn int(name: &'static str, cell: &'a Cell<i32>) -> Self {
        Self::new(name, Value::Int(cell))
    }

    /// Double parameter.
    pub const fn double(name: &'static str, cell: &'a Cell<f64>) -> Self {
        Self::new(name, Value::Double(cell))
    }

    /// Text parameter over a fixed slot.
    pub const fn text(name: &'static str, slot: &'a [Cell<u8>]) -> Self {
        Self::new(name, Value::Text(slot))
    }

    /// Allow `echo` to change the value.
    pub const fn writable(mut self) -> Self {
        self.access = Access::ReadWrite;
        self
    }

    /// Set the hook run before every print.
    pub const fn on_read(mut self, hook: HookFn) -> Self {
        self.pre_read = Some(hook);
        self
    }

    /// Set the hook run after every operator write.
    pub const fn on_write(mut self, hook: HookFn) -> Self {
        self.post_write = Some(hook);
        self
    }

    /// Set the id handed to the hooks.
    pub const fn with_id(mut self, id: u8) -> Self {
        self.id = id;
        self
    }

    /// `true` when the operator may write the value.
    pub fn is_writable(&self) -> bool {
        self.access == Access::ReadWrite
    }
}

/// `atoi`-style integer parsing.
///
/// Skips leading whitespace, accepts one sign, then reads digits until the
/// first non-digit. Returns 0 when no digit is found; saturates on overflow.
pub fn parse_int(input: &str) -> i32 {
    let bytes = input.trim_start().as_bytes();
    let (negative, digits) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };

    let mut value: i64 = 0;
    for &b in digits.iter().take_while(|b| b.is_ascii_digit()) {
        value = (value * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX) + 1);
    }
    if negative {
        value = -value;
    }
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Lenient decimal float parsing.
///
/// Reads an optional `-`, digits and at most one `.`, stopping at the first
/// other character. No exponent. Returns 0.0 when nothing parses.
pub fn parse_float(input: &str) -> f64 {
    let bytes = input.trim_start().as_bytes();
    let (negative, rest) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };

    let mut value = 0.0f64;
    let mut scale = 1.0f64;
    let mut fraction = false;
    for &b in rest {
        match b {
            b'0'..=b'9' => {
                value = value * 10.0 + f64::from(b - b'0');
                if fraction {
                    scale *= 10.0;
                }
            }
            b'.' if !fraction => fraction = true,
            _ => break,
        }
    }

    let value = value / scale;
    if negative { -value } else { value }
}
