//! Common error types for storage operations

/// A common error type for storage operations.
///
/// Kept small and `Copy` so it can be returned from interrupt-free polling
/// paths on `no_std` targets.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An operation was attempted on an address that is out of bounds.
    OutOfBounds,
    /// An error occurred during a write operation.
    WriteError,
    /// An error occurred during a read operation.
    ReadError,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::OutOfBounds => f.write_str("address out of bounds"),
            Error::WriteError => f.write_str("write failed"),
            Error::ReadError => f.write_str("read failed"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::OutOfBounds => defmt::write!(f, "OutOfBounds"),
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::ReadError => defmt::write!(f, "ReadError"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
