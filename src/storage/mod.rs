//! # Persistence layer for parameter values
//!
//! The shell never decides where parameter values live between power cycles.
//! `loadpar` and `savepar` walk the parameter table and hand each value to a
//! storage device at a running byte offset. Any non-volatile memory that can
//! read and write at byte offsets (EEPROM, FRAM, a flash page emulating
//! EEPROM) fits behind these traits.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │ loadpar/savepar │───▶│  ReadStorage /  │───▶│  EEPROM, FRAM,  │
//! │  (table order)  │    │     Storage     │    │  MemoryStorage  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! # Usage Examples
//!
//! ```rust
//! use paramshell::storage::{MemoryStorage, ReadStorage, Storage};
//!
//! let mut eeprom = MemoryStorage::<64>::new();
//! eeprom.write(4, &42i32.to_le_bytes()).unwrap();
//!
//! let mut raw = [0u8; 4];
//! eeprom.read(4, &mut raw).unwrap();
//! assert_eq!(i32::from_le_bytes(raw), 42);
//! ```

#![allow(missing_docs)]
#![deny(unsafe_code)]

/// Common error types for storage operations
pub mod error;


use error::Error;

/// Re-exports of common traits for convenient importing
pub mod prelude {
    pub use super::{ReadStorage, Storage};
}

/// Value of a byte that has never been written, flash/EEPROM convention.
pub const ERASED_BYTE: u8 = 0xFF;

/// Trait for reading data from storage devices.
///
/// # Examples
///
/// ```rust,no_run
/// use paramshell::storage::ReadStorage;
///
/// fn read_magic<S: ReadStorage>(storage: &mut S) -> Result<u32, S::Error> {
///     let mut raw = [0u8; 4];
///     storage.read(0, &mut raw)?;
///     Ok(u32::from_le_bytes(raw))
/// }
/// ```
pub trait ReadStorage {
    /// Associated error type for read operations
    type Error: core::fmt::Debug;

    /// Read data from the storage device.
    ///
    /// Fills the whole of `bytes` starting at `offset`.
    ///
    /// # Errors
    ///
    /// - `OutOfBounds` if offset + buffer length exceeds device capacity
    /// - `ReadError` if the hardware read fails
    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error>;

    /// Total capacity of the storage device in bytes.
    fn capacity(&self) -> usize;
}

/// Trait for storage devices that support both read and write operations.
pub trait Storage: ReadStorage {
    /// Write data to the storage device.
    ///
    /// # Errors
    ///
    /// - `OutOfBounds` if offset + data length exceeds device capacity
    /// - `WriteError` if the hardware write fails
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error>;
}

impl<S: ReadStorage + ?Sized> ReadStorage for &mut S {
    type Error = S::Error;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read(offset, bytes)
    }

    fn capacity(&self) -> usize {
        (**self).capacity()
    }
}

impl<S: Storage + ?Sized> Storage for &mut S {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        (**self).write(offset, bytes)
    }
}

/// RAM-backed storage of `N` bytes.
///
/// Starts out erased (every byte [`ERASED_BYTE`]). Useful on hosts, in tests,
/// and on targets that shadow their EEPROM in RAM.
#[derive(Debug, Clone)]
pub struct MemoryStorage<const N: usize> {
    memory: [u8; N],
}

impl<const N: usize> MemoryStorage<N> {
    /// Create an erased device.
    pub const fn new() -> Self {
        Self {
            memory: [ERASED_BYTE; N],
        }
    }

    /// Raw view of the whole device.
    pub fn as_bytes(&self) -> &[u8] {
        &self.memory
    }

    fn range(&self, offset: u32, len: usize) -> Result<core::ops::Range<usize>, Error> {
        let start = offset as usize;
        let end = start.checked_add(len).ok_or(Error::OutOfBounds)?;
        if end > N {
            return Err(Error::OutOfBounds);
        }
        Ok(start..end)
    }
}

impl<const N: usize> Default for MemoryStorage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ReadStorage for MemoryStorage<N> {
    type Error = Error;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        bytes.copy_from_slice(&self.memory[range]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Storage for MemoryStorage<N> {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let range = self.range(offset, bytes.len())?;
        self.memory[range].copy_from_slice(bytes);
        Ok(())
    }
}
