//! Command history kept in a caller-supplied byte buffer.
//!
//! Lines are stored back to back, each followed by a zero byte:
//!
//! ```text
//!  0                                         write          capacity
//!  ┌──────────┬─┬─────────────┬─┬──────────┬─┬───────────────┐
//!  │ ls       │0│ cd /dev     │0│ cat temp │0│    (free)     │
//!  └──────────┴─┴─────────────┴─┴──────────┴─┴───────────────┘
//!    oldest                        newest
//! ```
//!
//! When a new line does not fit, whole lines are dropped from the front and
//! the rest is moved down to offset zero. A line is never split. The read
//! cursor holds the start offset of the line currently recalled.

use super::error::Error;

/// Append-only history ring over borrowed memory.
#[derive(Debug)]
pub struct History<'a> {
    buffer: &'a mut [u8],
    write: usize,
    cursor: Option<usize>,
}

impl<'a> History<'a> {
    /// Wrap `buffer` as an empty history. A zero-length buffer disables
    /// history entirely.
    pub fn new(buffer: &'a mut [u8]) -> Self {
        buffer.fill(0);
        Self {
            buffer,
            write: 0,
            cursor: None,
        }
    }

    /// Size of the backing buffer in bytes.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes in use, terminators included.
    pub fn used(&self) -> usize {
        self.write
    }

    /// `true` when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.write == 0
    }

    /// Stored lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.buffer[..self.write]
            .split_inclusive(|&b| b == 0)
            .map(|line| &line[..line.len() - 1])
    }

    /// Forget the recall position so the next
    /// [`recall_previous`](Self::recall_previous) starts at the newest line.
    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    /// Append `line`, evicting the oldest lines until it fits.
    ///
    /// Anything from the first zero byte of `line` on is ignored.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityExceeded`] when the line cannot fit even in an empty
    /// buffer. The stored history is left untouched in that case.
    pub fn record(&mut self, line: &[u8]) -> Result<(), Error> {
        let line = line.split(|&b| b == 0).next().unwrap_or(&[]);
        let needed = line.len() + 1;
        if needed > self.buffer.len() {
            return Err(Error::CapacityExceeded);
        }

        if self.write + needed > self.buffer.len() {
            let mut start = 0;
            while self.write - start + needed > self.buffer.len() {
                start += self.line_at(start).len() + 1;
            }
            trace!("history: evicting {} bytes", start);
            self.buffer.copy_within(start..self.write, 0);
            self.write -= start;
        }

        let end = self.write + line.len();
        self.buffer[self.write..end].copy_from_slice(line);
        self.buffer[end] = 0;
        self.write = end + 1;
        self.cursor = None;
        Ok(())
    }

    /// Step one line back in time.
    ///
    /// The first call after [`record`](Self::record) or
    /// [`reset_cursor`](Self::reset_cursor) returns the newest line. Returns
    /// `None` once the oldest line has been reached.
    pub fn recall_previous(&mut self) -> Option<&[u8]> {
        if self.write == 0 {
            return None;
        }
        let start = match self.cursor {
            None => self.start_of_line_ending_at(self.write - 1),
            Some(0) => return None,
            Some(current) => self.start_of_line_ending_at(current - 1),
        };
        self.cursor = Some(start);
        Some(self.line_at(start))
    }

    /// Step one line forward in time, towards the newest line.
    ///
    /// Returns `None` when nothing is being recalled or the newest line is
    /// already showing.
    pub fn recall_next(&mut self) -> Option<&[u8]> {
        let current = self.cursor?;
        let next = current + self.line_at(current).len() + 1;
        if next >= self.write {
            return None;
        }
        self.cursor = Some(next);
        Some(self.line_at(next))
    }

    fn line_at(&self, start: usize) -> &[u8] {
        let stored = &self.buffer[start..self.write];
        let len = stored.iter().position(|&b| b == 0).unwrap_or(stored.len());
        &stored[..len]
    }

    fn start_of_line_ending_at(&self, terminator: usize) -> usize {
        let mut start = terminator;
        while start > 0 && self.buffer[start - 1] != 0 {
            start -= 1;
        }
        start
    }
}
