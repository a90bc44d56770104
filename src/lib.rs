//! # paramshell - embedded parameter shell
//!
//! A small Linux-like console for microcontroller firmware. An operator
//! connected over a serial line or a telnet socket browses a synthetic
//! directory tree, reads and changes device parameters, watches live values
//! and persists the parameter table. This library is designed for embedded
//! systems and supports `no_std` environments without an allocator.
//!
//! ## Features
//!
//! ### Shell
//! - **Line editing**: backspace, tab completion of commands and parameter names
//! - **History**: fixed ring recalled with the Up and Down arrows
//! - **Telnet**: answers option negotiation and switches to local echo
//! - **Built-ins**: `cat`, `cd`, `echo`, `ls`, `ll`, `watch`, `watchcsv`,
//!   `loadpar`, `savepar`, plus application commands
//!
//! ### Parameters
//! - Integer, double and fixed-size text values borrowed from the application
//! - Read-only or writable, with optional read and write hooks
//!
//! ### Storage Abstraction
//! - Byte-offset persistence interface for EEPROM, FRAM and friends
//! - Optional CRC-32 trailer on the saved parameter block
//!
//! ## Usage
//!
//! ```rust
//! use core::cell::Cell;
//! use paramshell::storage::MemoryStorage;
//! use paramshell::system::config::ShellConfig;
//! use paramshell::system::param::Parameter;
//! use paramshell::system::shell::Shell;
//! # use paramshell::transport::Transport;
//! # #[derive(Default)]
//! # struct Uart { tx: heapless::Vec<u8, 256> }
//! # impl Transport for Uart {
//! #     type Error = ();
//! #     fn available(&mut self) -> usize { 0 }
//! #     fn read_byte(&mut self) -> Result<u8, ()> { Err(()) }
//! #     fn write(&mut self, bytes: &[u8]) -> Result<(), ()> { self.tx.extend_from_slice(bytes) }
//! # }
//!
//! let temperature = Cell::new(21);
//! let params = [Parameter::int("temperature", &temperature)];
//! let mut history = [0u8; 64];
//!
//! let mut shell = Shell::new(
//!     Uart::default(),
//!     MemoryStorage::<32>::new(),
//!     &params,
//!     &mut history,
//!     ShellConfig::default(),
//! );
//! shell.start();
//! shell.input(b"cat /dev/temperature\r");
//!
//! let out = core::str::from_utf8(&shell.transport().tx).unwrap();
//! assert!(out.contains("21\r\n"));
//!
//! // in the firmware main loop:
//! // loop { shell.poll(millis()); }
//! ```
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Enable defmt logging support for embedded debugging

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

#[macro_use]
mod fmt;

/// Persistence layer for parameter values.
///
/// Provides the byte-offset interface `loadpar` and `savepar` write through,
/// plus a RAM-backed implementation for tests and hosts.
pub mod storage;

/// The shell and its building blocks.
///
/// Contains the line editor, command dispatcher, parameter model, history
/// ring and the telnet and escape sequence decoders.
pub mod system;

/// Byte stream the shell reads from and writes to.
pub mod transport;
