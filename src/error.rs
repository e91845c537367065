// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

use crate::Checksum;

/// Represents errors that can occur when creating or attaching a table
///
/// Running out of capacity, inserting a duplicate key and looking up a
/// missing key are *not* errors; see [`crate::Insertion`].
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(std::io::Error),

    /// Load factor is not a finite number in `(0, 1]`
    InvalidLoadFactor(f64),

    /// The requested capacity does not fit into the slot index or byte range
    CapacityOverflow,

    /// Backing memory could not be allocated
    AllocationFailed {
        /// Number of bytes requested
        bytes: usize,
    },

    /// Attached buffer is smaller than the layout it declares
    BufferTooSmall {
        /// Bytes required by the header and record array
        needed: u64,

        /// Bytes supplied
        got: u64,
    },

    /// Attached buffer header is malformed
    InvalidHeader(&'static str),

    /// Unknown buffer format version
    InvalidVersion(u8),

    /// Attached buffer was built for another record value size
    ValueSizeMismatch {
        /// Value size of the attaching table
        expected: u32,

        /// Value size stored in the buffer header
        got: u32,
    },

    /// Buffer checksum does not match the expected snapshot
    ChecksumMismatch {
        /// Checksum computed over the buffer
        got: Checksum,

        /// Checksum the caller expected
        expected: Checksum,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RobinHoodTableError: {self:?}")
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Table result
pub type Result<T> = std::result::Result<T, Error>;
