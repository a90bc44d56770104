//! Telnet option negotiation.
//!
//! A telnet client opens the session with a burst of `IAC <verb> <option>`
//! triplets. [`Negotiator`] recognizes them inline in the byte stream, answers
//! them, and hides them from the line editor. It refuses every option the
//! peer offers to turn on, agrees to echo and suppress-go-ahead on our side,
//! and declines everything else.

/// Interpret As Command, starts every telnet command sequence.
pub const IAC: u8 = 255;
/// Sender will enable the option.
pub const WILL: u8 = 251;
/// Sender will not enable the option.
pub const WONT: u8 = 252;
/// Sender asks the receiver to enable the option.
pub const DO: u8 = 253;
/// Sender asks the receiver to disable the option.
pub const DONT: u8 = 254;

/// Option numbers the negotiator knows about.
pub mod option {
    /// Echo (RFC 857).
    pub const ECHO: u8 = 1;
    /// Suppress go-ahead (RFC 858).
    pub const SUPPRESS_GO_AHEAD: u8 = 3;
}

/// Negotiation state between bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Plain data.
    #[default]
    Normal,
    /// Saw `IAC`, waiting for the verb.
    Command,
    /// Saw `IAC WILL`, waiting for the option.
    Will,
    /// Saw `IAC WONT`, waiting for the option.
    Wont,
    /// Saw `IAC DO`, waiting for the option.
    Do,
    /// Saw `IAC DONT`, waiting for the option.
    Dont,
}

/// Bytes to send back to the peer, at most two triplets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    bytes: [u8; 6],
    len: usize,
    enable_echo: bool,
}

impl Reply {
    fn new(verb: u8, option: u8) -> Self {
        Self {
            bytes: [IAC, verb, option, 0, 0, 0],
            len: 3,
            enable_echo: false,
        }
    }

    fn and(mut self, verb: u8, option: u8) -> Self {
        self.bytes[self.len..self.len + 3].copy_from_slice(&[IAC, verb, option]);
        self.len += 3;
        self
    }

    /// Wire bytes of the reply.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Whether the shell should start echoing typed characters.
    pub fn enables_echo(&self) -> bool {
        self.enable_echo
    }
}

/// What happened to a byte fed to the [`Negotiator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Not telnet, hand the byte to the rest of the pipeline.
    Pass,
    /// Swallowed as part of a command sequence.
    Consumed,
    /// Swallowed, and the peer must be answered.
    Reply(Reply),
}

/// Inline telnet option negotiator.
///
/// # Examples
///
/// ```rust
/// use paramshell::system::telnet::{option, Action, Negotiator, DO, IAC, WILL};
///
/// let mut telnet = Negotiator::new();
/// assert_eq!(telnet.process(b'x'), Action::Pass);
/// assert_eq!(telnet.process(IAC), Action::Consumed);
/// assert_eq!(telnet.process(DO), Action::Consumed);
///
/// match telnet.process(option::ECHO) {
///     Action::Reply(reply) => {
///         assert_eq!(reply.as_bytes(), &[IAC, WILL, 1, IAC, DO, 1]);
///         assert!(reply.enables_echo());
///     }
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
#[derive(Debug, Default)]
pub struct Negotiator {
    state: State,
}

impl Negotiator {
    /// Create a negotiator in the [`State::Normal`] state.
    pub const fn new() -> Self {
        Self {
            state: State::Normal,
        }
    }

    /// Current state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Feed one received byte.
    pub fn process(&mut self, byte: u8) -> Action {
        let (next, action) = match self.state {
            State::Normal if byte == IAC => (State::Command, Action::Consumed),
            State::Normal => (State::Normal, Action::Pass),
            State::Command => {
                let next = match byte {
                    WILL => State::Will,
                    WONT => State::Wont,
                    DO => State::Do,
                    DONT => State::Dont,
                    _ => State::Normal,
                };
                (next, Action::Consumed)
            }
            State::Will | State::Wont => (State::Normal, Action::Reply(Reply::new(DONT, byte))),
            State::Do => {
                let reply = match byte {
                    option::ECHO => {
                        let mut reply = Reply::new(WILL, byte).and(DO, byte);
                        reply.enable_echo = true;
                        reply
                    }
                    option::SUPPRESS_GO_AHEAD => Reply::new(WILL, byte),
                    _ => Reply::new(WONT, byte),
                };
                (State::Normal, Action::Reply(reply))
            }
            State::Dont => (State::Normal, Action::Reply(Reply::new(WONT, byte))),
        };

        if let Action::Reply(reply) = &action {
            trace!("telnet reply, {} bytes", reply.as_bytes().len());
        }
        self.state = next;
        action
    }
}
