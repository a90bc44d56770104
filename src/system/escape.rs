//! ANSI cursor-key recognition.
//!
//! Terminals send the arrow keys as `ESC [ A` through `ESC [ D`. The decoder
//! strips these sequences out of the input stream and reports which key was
//! pressed.

/// Escape character.
pub const ESC: u8 = 0x1B;
/// Control sequence introducer following [`ESC`].
pub const CSI: u8 = b'[';

/// Decoder state between bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// No sequence in progress.
    #[default]
    None,
    /// Saw `ESC`.
    Escape,
    /// Saw `ESC [`.
    Bracket,
}

/// Cursor key decoded from a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// `ESC [ A`
    Up,
    /// `ESC [ B`
    Down,
    /// `ESC [ C`
    Right,
    /// `ESC [ D`
    Left,
}

/// Result of feeding one byte to the [`Decoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// The byte is not part of a sequence.
    Pass,
    /// The byte was swallowed.
    Consumed,
    /// A complete cursor-key sequence ended with this byte.
    Key(Key),
}

/// ANSI escape-sequence decoder.
#[derive(Debug, Default)]
pub struct Decoder {
    state: State,
}

impl Decoder {
    /// Create an idle decoder.
    pub const fn new() -> Self {
        Self { state: State::None }
    }

    /// Current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Feed one byte.
    ///
    /// A bare `ESC` followed by anything other than `[` is dropped and the
    /// following byte passes through untouched. Any byte after `ESC [` ends
    /// the sequence; only `A`..`D` produce a key.
    pub fn feed(&mut self, byte: u8) -> Escape {
        if byte == ESC {
            self.state = State::Escape;
            return Escape::Consumed;
        }

        match self.state {
            State::None => Escape::Pass,
            State::Escape if byte == CSI => {
                self.state = State::Bracket;
                Escape::Consumed
            }
            State::Escape => {
                self.state = State::None;
                Escape::Pass
            }
            State::Bracket => {
                self.state = State::None;
                match byte {
                    b'A' => Escape::Key(Key::Up),
                    b'B' => Escape::Key(Key::Down),
                    b'C' => Escape::Key(Key::Right),
                    b'D' => Escape::Key(Key::Left),
                    _ => Escape::Consumed,
                }
            }
        }
    }
}
