//! Error type shared by the shell and its sub-systems.

/// Everything that can go wrong while the shell handles a line.
///
/// None of these are fatal. The dispatcher turns each one into a diagnostic
/// for the operator and keeps running.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// Unknown command, directory or parameter.
    NotFound,
    /// A write was attempted on a read-only parameter.
    ReadOnly,
    /// A fixed-size table or buffer is full.
    CapacityExceeded,
    /// A command name was empty or contained a space.
    InvalidName,
    /// The persistence device reported a failure.
    Storage,
    /// The stored parameter block failed its CRC check.
    ChecksumMismatch,
    /// A configuration document could not be parsed.
    InvalidConfig,
}

impl Error {
    /// Diagnostic text shown to the operator after `<command>: `.
    pub fn message(&self) -> &'static str {
        match self {
            Error::NotFound => "File or directory not found",
            Error::ReadOnly => "File readonly",
            Error::CapacityExceeded => "Out of memory",
            Error::InvalidName => "Invalid name",
            Error::Storage => "storage error",
            Error::ChecksumMismatch => "checksum mismatch",
            Error::InvalidConfig => "invalid configuration",
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::NotFound => defmt::write!(f, "NotFound"),
            Error::ReadOnly => defmt::write!(f, "ReadOnly"),
            Error::CapacityExceeded => defmt::write!(f, "CapacityExceeded"),
            Error::InvalidName => defmt::write!(f, "InvalidName"),
            Error::Storage => defmt::write!(f, "Storage"),
            Error::ChecksumMismatch => defmt::write!(f, "ChecksumMismatch"),
            Error::InvalidConfig => defmt::write!(f, "InvalidConfig"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
