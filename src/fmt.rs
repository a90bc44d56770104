//! Internal logging macros.
//!
//! With the `defmt` feature enabled every macro forwards to the matching
//! `defmt` macro. Without it the arguments are still type-checked but no code
//! is emitted, so call sites never need their own `cfg` gates.

#![allow(unused_macros)]

#[cfg(feature = "defmt")]
macro_rules! trace {
    ($($arg:tt)+) => { ::defmt::trace!($($arg)+) };
}

#[cfg(feature = "defmt")]
macro_rules! debug {
    ($($arg:tt)+) => { ::defmt::debug!($($arg)+) };
}

#[cfg(feature = "defmt")]
macro_rules! info {
    ($($arg:tt)+) => { ::defmt::info!($($arg)+) };
}

#[cfg(feature = "defmt")]
macro_rules! warn {
    ($($arg:tt)+) => { ::defmt::warn!($($arg)+) };
}

#[cfg(not(feature = "defmt"))]
macro_rules! trace {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $( let _ = &$arg; )* }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $( let _ = &$arg; )* }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $( let _ = &$arg; )* }};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($fmt:literal $(, $arg:expr)* $(,)?) => {{ $( let _ = &$arg; )* }};
}
