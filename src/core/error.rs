use std::io;
use thiserror::Error;

/// Errors produced while converting or (de)serializing NTP values
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Overflow: {0}")]
    Overflow(String),

    #[error("Truncated buffer: needed {needed} bytes, got {available}")]
    Truncated {
        /// Bytes required to finish decoding
        needed: usize,
        /// Bytes actually present
        available: usize,
    },

    #[error("Output buffer too small: needed {needed} bytes, got {available}")]
    BufferTooSmall {
        /// Bytes required to finish encoding
        needed: usize,
        /// Capacity of the supplied buffer
        available: usize,
    },

    #[error("not enough data following header: {0} bytes")]
    NotEnoughData(usize),

    #[error("Malformed message: {0}")]
    Malformed(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new overflow error
    pub fn overflow(msg: impl Into<String>) -> Self {
        Error::Overflow(msg.into())
    }

    /// Creates a new malformed message error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Error::Malformed(msg.into())
    }

    /// Creates a new invalid value error
    pub fn invalid_value(msg: impl Into<String>) -> Self {
        Error::InvalidValue(msg.into())
    }

    /// Returns true for errors caused by input that ended too early
    pub fn is_truncation(&self) -> bool {
        matches!(self, Error::Truncated { .. } | Error::NotEnoughData(_))
    }
}
