//! Utility module
//!
//! Bounds checks and padding arithmetic shared by the decoders and encoders.

use crate::core::{Error, Result};

/// Fails with `Truncated` unless `buf` holds at least `needed` bytes
pub fn ensure_readable(buf: &[u8], needed: usize) -> Result<()> {
    if buf.len() < needed {
        return Err(Error::Truncated {
            needed,
            available: buf.len(),
        });
    }
    Ok(())
}

/// Fails with `BufferTooSmall` unless `buf` can take `needed` bytes
pub fn ensure_writable(buf: &[u8], needed: usize) -> Result<()> {
    if buf.len() < needed {
        return Err(Error::BufferTooSmall {
            needed,
            available: buf.len(),
        });
    }
    Ok(())
}

/// Number of zero bytes that follow a value of `len` bytes on the wire
pub fn padding_for(len: usize) -> usize {
    (4 - len % 4) % 4
}
