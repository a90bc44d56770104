//! Interactive parameter shell for embedded devices.
//!
//! The shell turns a polled byte stream into a small Linux-like console. An
//! operator connected over a UART or a telnet socket can browse the
//! synthetic tree (`ls`, `ll`, `cd`), read and change device parameters
//! (`cat`, `echo 5 > speed`), watch a value (`watch cat speed`) and persist
//! the whole parameter table (`savepar`, `loadpar`).
//!
//! # Architecture
//!
//! Every received byte runs through a fixed pipeline:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │     Telnet      │───▶│     Escape      │───▶│   Line Editor   │
//! │   Negotiator    │    │     Decoder     │    │ (BS, Tab, CR)   │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!          │                      │                      │
//!          ▼                      ▼                      ▼
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  IAC replies    │    │  History Ring   │    │   Dispatcher    │
//! │                 │    │   (Up / Down)   │    │ built-ins, /dev │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! # Usage Examples
//!
//! ```rust
//! use core::cell::Cell;
//! use paramshell::storage::MemoryStorage;
//! use paramshell::system::config::ShellConfig;
//! use paramshell::system::param::Parameter;
//! use paramshell::system::shell::Shell;
//! use paramshell::transport::Transport;
//!
//! #[derive(Default)]
//! struct Uart {
//!     rx: heapless::Deque<u8, 64>,
//!     tx: heapless::Vec<u8, 512>,
//! }
//!
//! impl Transport for Uart {
//!     type Error = ();
//!     fn available(&mut self) -> usize { self.rx.len() }
//!     fn read_byte(&mut self) -> Result<u8, ()> { self.rx.pop_front().ok_or(()) }
//!     fn write(&mut self, bytes: &[u8]) -> Result<(), ()> { self.tx.extend_from_slice(bytes) }
//! }
//!
//! fn uptime(out: &mut dyn core::fmt::Write, _args: &[&str]) {
//!     let _ = write!(out, "up 3 days\r\n");
//! }
//!
//! let speed = Cell::new(1200);
//! let params = [Parameter::int("speed", &speed).writable()];
//! let mut history = [0u8; 128];
//!
//! let mut shell = Shell::new(
//!     Uart::default(),
//!     MemoryStorage::<64>::new(),
//!     &params,
//!     &mut history,
//!     ShellConfig::new("pump").unwrap(),
//! );
//! shell.register_command("uptime", uptime).unwrap();
//! shell.start();
//!
//! shell.input(b"echo 1500 > /dev/speed\r");
//! assert_eq!(speed.get(), 1500);
//! ```

use core::fmt;

use heapless::Vec;

use super::completion;
use super::config::ShellConfig;
use super::error::Error;
use super::escape::{self, Escape, Key};
use super::history::History;
use super::param::Parameter;
use super::path::{self, Location, Match};
use super::telnet::{self, Action};
use crate::storage::Storage;
use crate::transport::Transport;

/// Write formatted text to the shell's transport.
///
/// Borrows only the `transport` field so the arguments may read other parts
/// of the shell.
macro_rules! out {
    ($shell:expr, $($arg:tt)*) => {{
        let _ = ::core::fmt::Write::write_fmt(
            &mut $crate::system::shell::Console::new(&mut $shell.transport),
            format_args!($($arg)*),
        );
    }};
}

mod builtins;

pub use builtins::Builtin;

/// Capacity of the line buffer. A line holds at most one byte less.
pub const LINE_BUFFER_SIZE: usize = 40;

/// Maximum number of arguments handed to a command.
pub const MAX_ARGS: usize = 10;

/// Capacity of the command table, built-ins included.
pub const MAX_COMMANDS: usize = 20;

/// ASCII NUL (0x00), sent by telnet clients after a bare CR.
pub const ASCII_NUL: u8 = 0x00;
/// ASCII bell character (0x07).
pub const ASCII_BELL: u8 = 0x07;
/// ASCII backspace character (0x08).
pub const ASCII_BACKSPACE: u8 = 0x08;
/// ASCII horizontal tab (0x09).
pub const ASCII_TAB: u8 = 0x09;
/// ASCII line feed character (0x0A).
pub const ASCII_LF: u8 = 0x0A;
/// ASCII carriage return character (0x0D).
pub const ASCII_CR: u8 = 0x0D;
/// ASCII delete character (0x7F).
pub const ASCII_DEL: u8 = 0x7F;

/// Moves the cursor one column left.
const CURSOR_LEFT: &str = "\x1B[1D";
/// Clears from the cursor to the end of the line.
const ERASE_TO_EOL: &str = "\x1B[K";

/// Handler of a caller-registered command.
///
/// `out` writes straight to the operator's terminal. `args` holds the words
/// after the command name.
///
/// # Examples
///
/// ```rust
/// use paramshell::system::shell::CommandFn;
///
/// let reboot: CommandFn = |out, args| {
///     let delay = args.first().copied().unwrap_or("0");
///     let _ = write!(out, "rebooting in {}s\r\n", delay);
/// };
/// ```
pub type CommandFn = fn(out: &mut dyn fmt::Write, args: &[&str]);

/// What runs when a command name matches.
#[derive(Debug, Clone, Copy)]
pub enum Handler {
    /// One of the shell's own commands.
    Builtin(Builtin),
    /// A command registered by the application.
    External(CommandFn),
}

/// Entry of the command table.
#[derive(Debug, Clone, Copy)]
pub struct Command {
    /// Name typed by the operator; also the file name under `/bin`.
    pub name: &'static str,
    /// Code to run.
    pub handler: Handler,
}

type LineBuffer = Vec<u8, LINE_BUFFER_SIZE>;
type Args<'l> = Vec<&'l str, MAX_ARGS>;

const _: () = assert!(Builtin::ALL.len() <= MAX_COMMANDS);

#[derive(Debug, Clone, Copy)]
struct Watch {
    index: usize,
    csv: bool,
    /// Time of the last print, taken on the first watch-mode `poll`.
    last: Option<u32>,
}

/// [`fmt::Write`] adapter over a [`Transport`].
struct Console<'t, T: Transport> {
    transport: &'t mut T,
}

impl<'t, T: Transport> Console<'t, T> {
    fn new(transport: &'t mut T) -> Self {
        Self { transport }
    }
}

impl<T: Transport> fmt::Write for Console<'_, T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.transport.write(s.as_bytes()).map_err(|_| {
            warn!("transport write failed");
            fmt::Error
        })
    }
}

/// `true` once `interval` ms have passed since `*last`; `*last` then moves
/// to `now`.
///
/// `now` is a wrapping millisecond counter. A `now` smaller than `*last` is
/// taken as elapsed, so a counter reset never stalls the caller.
///
/// ```rust
/// use paramshell::system::shell::is_timeout;
///
/// let mut last = 1000;
/// assert!(!is_timeout(&mut last, 1200, 500));
/// assert!(is_timeout(&mut last, 1500, 500));
/// assert_eq!(last, 1500);
/// assert!(is_timeout(&mut last, 20, 500));
/// ```
pub fn is_timeout(last: &mut u32, now: u32, interval: u32) -> bool {
    if now.wrapping_sub(*last) >= interval || *last > now {
        *last = now;
        true
    } else {
        false
    }
}

/// The shell.
///
/// Owns its transport and persistence device, borrows the caller's
/// parameter table and history memory. Drive it by calling
/// [`poll`](Self::poll) from the main loop, or push bytes yourself with
/// [`input`](Self::input).
pub struct Shell<'a, T: Transport, S: Storage> {
    transport: T,
    storage: S,
    params: &'a [Parameter<'a>],
    config: ShellConfig,

    commands: Vec<Command, MAX_COMMANDS>,
    line: LineBuffer,
    history: History<'a>,
    cwd: Location,

    telnet: telnet::Negotiator,
    escape: escape::Decoder,
    local_echo: bool,

    watch: Option<Watch>,
}

impl<'a, T: Transport, S: Storage> Shell<'a, T, S> {
    /// Create a shell.
    ///
    /// `history` is used as the history ring; pass an empty slice to disable
    /// history. Nothing is written to the transport until
    /// [`start`](Self::start) or the first dispatched line.
    pub fn new(
        transport: T,
        storage: S,
        params: &'a [Parameter<'a>],
        history: &'a mut [u8],
        config: ShellConfig,
    ) -> Self {
        let local_echo = config.local_echo;
        Self {
            transport,
            storage,
            params,
            config,
            commands: Vec::from_slice(&Builtin::ALL).unwrap_or_default(),
            line: LineBuffer::new(),
            history: History::new(history),
            cwd: Location::Root,
            telnet: telnet::Negotiator::new(),
            escape: escape::Decoder::new(),
            local_echo,
            watch: None,
        }
    }

    /// Show the first prompt.
    pub fn start(&mut self) {
        info!("shell started");
        self.show_prompt();
    }

    /// Add a command after the built-ins.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] for an empty name or one containing a space
    /// - [`Error::CapacityExceeded`] when all [`MAX_COMMANDS`] slots are taken
    pub fn register_command(&mut self, name: &'static str, handler: CommandFn) -> Result<(), Error> {
        if name.is_empty() || name.contains(' ') {
            return Err(Error::InvalidName);
        }
        self.commands
            .push(Command {
                name,
                handler: Handler::External(handler),
            })
            .map_err(|_| {
                warn!("command table full, dropping {}", name);
                Error::CapacityExceeded
            })
    }

    /// Do one slice of work: drain every available byte, or print one watch
    /// sample when due.
    ///
    /// `now_ms` is a free-running, wrapping millisecond counter. The first
    /// poll after a `watch` command starts its interval.
    pub fn poll(&mut self, now_ms: u32) {
        if let Some(mut watch) = self.watch {
            if self.transport.available() == 0 {
                let last = watch.last.get_or_insert(now_ms);
                if is_timeout(last, now_ms, self.config.watch_interval_ms) {
                    self.print_param(watch.index, watch.csv);
                }
                self.watch = Some(watch);
                return;
            }
            self.stop_watch();
        }

        while self.transport.available() > 0 {
            match self.transport.read_byte() {
                Ok(byte) => self.process_byte(byte),
                Err(_) => {
                    warn!("transport read failed");
                    break;
                }
            }
        }
    }

    /// Feed received bytes directly, bypassing [`Transport::read_byte`].
    ///
    /// Non-empty input ends watch mode, exactly like a byte arriving through
    /// [`poll`](Self::poll).
    pub fn input(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        if self.watch.is_some() {
            self.stop_watch();
        }
        for &byte in data {
            self.process_byte(byte);
        }
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// The persistence device.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The persistence device, mutably.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Active configuration.
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Working directory.
    pub fn current_dir(&self) -> Location {
        self.cwd
    }

    /// Text typed so far on the current line.
    pub fn line(&self) -> &[u8] {
        &self.line
    }

    /// The history ring.
    pub fn history(&self) -> &History<'a> {
        &self.history
    }

    /// Names of all commands, built-ins first.
    pub fn commands(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.commands.iter().map(|command| command.name)
    }

    /// Whether typed characters are echoed.
    pub fn local_echo(&self) -> bool {
        self.local_echo
    }

    /// Turn echo of typed characters on or off.
    pub fn set_local_echo(&mut self, enabled: bool) {
        self.local_echo = enabled;
    }

    /// Whether a `watch` is running.
    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    fn process_byte(&mut self, byte: u8) {
        match self.telnet.process(byte) {
            Action::Pass => {}
            Action::Consumed => return,
            Action::Reply(reply) => {
                if reply.enables_echo() {
                    self.local_echo = true;
                }
                self.output_bytes(reply.as_bytes());
                return;
            }
        }

        match self.escape.feed(byte) {
            Escape::Pass => self.edit(byte),
            Escape::Consumed => {}
            Escape::Key(key) => self.recall(key),
        }
    }

    fn edit(&mut self, byte: u8) {
        match byte {
            ASCII_DEL | ASCII_BACKSPACE => {
                if self.line.pop().is_some() {
                    self.output_bytes(&[byte]);
                    self.output(" ");
                    self.output(CURSOR_LEFT);
                } else {
                    self.output_bytes(&[ASCII_BELL]);
                }
            }
            ASCII_TAB => self.complete(),
            ASCII_CR => self.execute(),
            _ if self.line.len() >= LINE_BUFFER_SIZE - 1 => self.execute(),
            ASCII_LF | ASCII_NUL => {}
            _ => {
                if self.line.push(byte).is_ok() && self.local_echo {
                    self.output_bytes(&[byte]);
                }
            }
        }
    }

    fn recall(&mut self, key: Key) {
        let recalled = match key {
            Key::Up => self.history.recall_previous(),
            Key::Down => self.history.recall_next(),
            Key::Left | Key::Right => None,
        };
        let Some(text) = recalled else {
            return;
        };
        let keep = text.len().min(LINE_BUFFER_SIZE - 1);
        let Ok(line) = LineBuffer::from_slice(&text[..keep]) else {
            return;
        };

        let erase = [ASCII_BACKSPACE; LINE_BUFFER_SIZE];
        let old_len = self.line.len();
        self.output_bytes(&erase[..old_len]);
        self.output_bytes(&line);
        if line.len() < old_len {
            self.output(ERASE_TO_EOL);
        }
        self.line = line;
    }

    fn complete(&mut self) {
        let Ok(text) = core::str::from_utf8(&self.line) else {
            return;
        };

        let suffix = match text.rfind(' ') {
            Some(space) => {
                let partial = &text[space + 1..];
                if partial.is_empty() {
                    return;
                }
                let (params, cwd) = (self.params, self.cwd);
                let find = |start| path::resolve_parameter(params, partial, cwd, Match::Prefix, start);
                let names = core::iter::successors(find(0), |&index| find(index + 1))
                    .map(|index| params[index].name);
                completion::complete(path::file_name(partial), names)
            }
            None if text.is_empty() => return,
            None => completion::complete(text, self.commands.iter().map(|command| command.name)),
        };

        let Some(suffix) = suffix else {
            return;
        };
        if self.line.len() + suffix.len() < LINE_BUFFER_SIZE
            && self.line.extend_from_slice(suffix.as_bytes()).is_ok()
        {
            self.output(suffix);
        }
    }

    fn execute(&mut self) {
        self.output("\r\n");
        if self.line.is_empty() {
            self.show_prompt();
            return;
        }

        let line = core::mem::take(&mut self.line);
        if self.history.record(&line).is_err() {
            debug!("history: line not recorded");
        }
        self.history.reset_cursor();

        match core::str::from_utf8(&line) {
            Ok(text) => self.dispatch(text),
            Err(_) => self.report(SHELL_NAME, Error::NotFound),
        }
        self.show_prompt();
    }

    fn dispatch(&mut self, text: &str) {
        let (name, rest) = text.split_once(' ').unwrap_or((text, ""));
        let Some(command) = self.commands.iter().find(|command| command.name == name).copied() else {
            debug!("unknown command {}", name);
            self.report(SHELL_NAME, Error::NotFound);
            return;
        };

        let args = tokenize(rest);
        debug!("dispatch {} with {} args", command.name, args.len());
        match command.handler {
            Handler::Builtin(builtin) => self.run_builtin(builtin, &args),
            Handler::External(handler) => handler(&mut Console::new(&mut self.transport), &args),
        }
    }

    fn stop_watch(&mut self) {
        info!("watch mode off");
        self.watch = None;
    }

    fn show_prompt(&mut self) {
        out!(self, "root@{}:{}>", self.config.host_name, self.cwd);
    }

    fn report(&mut self, command: &str, error: Error) {
        out!(self, "{}: {}\r\n", command, error);
    }

    fn output(&mut self, text: &str) {
        self.output_bytes(text.as_bytes());
    }

    fn output_bytes(&mut self, bytes: &[u8]) {
        if self.transport.write(bytes).is_err() {
            warn!("transport write failed");
        }
    }
}

/// Name used in diagnostics for unknown commands.
const SHELL_NAME: &str = "/bin/sh";

/// Split the text after the command name at every space.
///
/// An empty remainder yields no arguments; tokens past [`MAX_ARGS`] are
/// dropped.
fn tokenize(rest: &str) -> Args<'_> {
    let mut args = Args::new();
    if rest.is_empty() {
        return args;
    }
    for token in rest.split(' ') {
        if args.push(token).is_err() {
            trace!("argument vector full");
            break;
        }
    }
    args
}

impl<T: Transport + fmt::Debug, S: Storage + fmt::Debug> fmt::Debug for Shell<'_, T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shell")
            .field("transport", &self.transport)
            .field("storage", &self.storage)
            .field("cwd", &self.cwd)
            .field("line", &self.line)
            .field("local_echo", &self.local_echo)
            .field("watching", &self.watch.is_some())
            .finish()
    }
}
