//! Byte-stream transport abstraction.
//!
//! The shell talks to its operator through exactly one polled byte stream:
//! a UART, a USB CDC endpoint or an accepted telnet socket. [`Transport`] is
//! the whole contract. The shell never blocks on it; every poll drains the
//! bytes that are already [`available`](Transport::available).

#![deny(unsafe_code)]

/// Re-exports of common traits
pub mod prelude {
    pub use super::Transport;
}

/// A polled, byte-oriented duplex stream.
///
/// # Examples
///
/// ```rust
/// use paramshell::transport::Transport;
///
/// struct Loopback {
///     pending: heapless::Deque<u8, 64>,
/// }
///
/// impl Transport for Loopback {
///     type Error = ();
///
///     fn available(&mut self) -> usize {
///         self.pending.len()
///     }
///
///     fn read_byte(&mut self) -> Result<u8, Self::Error> {
///         self.pending.pop_front().ok_or(())
///     }
///
///     fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
///         for &b in bytes {
///             self.pending.push_back(b).map_err(|_| ())?;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Transport {
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Number of received bytes that can be read without blocking.
    fn available(&mut self) -> usize;

    /// Read one received byte.
    ///
    /// Only called after [`available`](Self::available) reported at least one
    /// byte.
    fn read_byte(&mut self) -> Result<u8, Self::Error>;

    /// Write all of `bytes` to the peer.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn available(&mut self) -> usize {
        (**self).available()
    }

    fn read_byte(&mut self) -> Result<u8, Self::Error> {
        (**self).read_byte()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write(bytes)
    }
}
