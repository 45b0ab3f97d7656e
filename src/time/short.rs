use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::util::{ensure_readable, ensure_writable};

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// 16.16 fixed-point duration, used for root delay and root dispersion
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |          Seconds              |           Fraction            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Short {
    /// Whole seconds
    pub seconds: u16,
    /// Fraction of a second in units of 2^-16
    pub fraction: u16,
}

impl Short {
    /// Packed size in bytes
    pub const PACKED_SIZE: usize = 4;

    /// Converts a duration, truncating below 2^-16 s.
    ///
    /// Fails with `Overflow` when the whole seconds exceed 65535 in
    /// magnitude. Negative durations are stored as the two's complement of
    /// the full 32-bit word; read them back with [`Short::to_signed_duration`].
    pub fn from_duration(d: Duration) -> Result<Self> {
        let ns = d
            .num_nanoseconds()
            .ok_or_else(|| Error::overflow(format!("short overflow: {}", d)))?;
        let secs = ns / NANOS_PER_SEC;
        if secs.abs() > i64::from(u16::MAX) {
            return Err(Error::overflow(format!("short overflow: {}", d)));
        }
        let frac = ((ns % NANOS_PER_SEC) << 16) / NANOS_PER_SEC;
        Ok(Short::from_bits(((secs << 16) + frac) as u32))
    }

    /// Reads the value as an unsigned duration
    pub fn to_duration(&self) -> Duration {
        Self::fixed_to_duration(i64::from(self.to_bits()))
    }

    /// Reads the value as a two's-complement duration
    pub fn to_signed_duration(&self) -> Duration {
        Self::fixed_to_duration(i64::from(self.to_bits() as i32))
    }

    fn fixed_to_duration(raw: i64) -> Duration {
        Duration::nanoseconds((raw * NANOS_PER_SEC) >> 16)
    }

    /// Returns the value as one 32-bit word
    pub fn to_bits(&self) -> u32 {
        u32::from(self.seconds) << 16 | u32::from(self.fraction)
    }

    /// Splits a 32-bit word into seconds and fraction
    pub fn from_bits(bits: u32) -> Self {
        Short {
            seconds: (bits >> 16) as u16,
            fraction: bits as u16,
        }
    }

    /// Writes big-endian seconds then fraction into the first 4 bytes of `out`
    pub fn pack(&self, out: &mut [u8]) -> Result<()> {
        ensure_writable(out, Self::PACKED_SIZE)?;
        out[..2].copy_from_slice(&self.seconds.to_be_bytes());
        out[2..4].copy_from_slice(&self.fraction.to_be_bytes());
        Ok(())
    }

    /// Reads a value from the first 4 bytes of `buf`
    pub fn unpack(buf: &[u8]) -> Result<Self> {
        ensure_readable(buf, Self::PACKED_SIZE)?;
        Ok(Short {
            seconds: u16::from_be_bytes([buf[0], buf[1]]),
            fraction: u16::from_be_bytes([buf[2], buf[3]]),
        })
    }
}

impl TryFrom<Duration> for Short {
    type Error = Error;

    fn try_from(d: Duration) -> Result<Self> {
        Short::from_duration(d)
    }
}

impl TryFrom<std::time::Duration> for Short {
    type Error = Error;

    fn try_from(d: std::time::Duration) -> Result<Self> {
        let d = Duration::from_std(d)
            .map_err(|e| Error::overflow(format!("short overflow: {}", e)))?;
        Short::from_duration(d)
    }
}
