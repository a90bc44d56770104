//! Shell building blocks.
//!
//! The [`shell`] module ties everything together; the other modules are
//! small, independent state machines and helpers that can also be used on
//! their own.
//!
//! # Available Utilities
//!
//! - **[`shell`]**: polled shell engine, line editor and built-in commands
//! - **[`param`]**: parameter table entries borrowed from the application
//! - **[`path`]**: synthetic directory tree and parameter lookup
//! - **[`history`]**: ring of previously entered lines
//! - **[`completion`]**: longest-common-prefix tab completion
//! - **[`telnet`]**: option negotiation responder
//! - **[`escape`]**: arrow key decoder
//! - **[`config`]**: runtime settings
//! - **[`error`]**: error type shared by the modules above

pub mod completion;
pub mod config;
pub mod error;
pub mod escape;
pub mod history;
pub mod param;
pub mod path;
pub mod shell;
pub mod telnet;

pub use config::ShellConfig;
pub use error::Error;
pub use param::{Access, Parameter, Value};
pub use shell::{CommandFn, Shell};
