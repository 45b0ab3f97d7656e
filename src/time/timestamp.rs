use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ntp_epoch;
use crate::core::{Error, Result};
use crate::util::{ensure_readable, ensure_writable};

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Mask of the fraction bits below nanosecond resolution
const JITTER_MASK: u32 = 0b11;

/// 32.32 fixed-point absolute time, seconds since the NTP epoch
/// (1900-01-01T00:00:00Z)
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                            Seconds                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                            Fraction                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Seconds since the NTP epoch
    pub seconds: u32,
    /// Fraction of a second in units of 2^-32
    pub fraction: u32,
}

impl Timestamp {
    /// Packed size in bytes
    pub const PACKED_SIZE: usize = 8;

    /// Converts a calendar time using the thread-local random generator for
    /// the low fraction bits. See [`Timestamp::from_calendar_time_with`].
    pub fn from_calendar_time(t: DateTime<Utc>) -> Result<Self> {
        Self::from_calendar_time_with(t, &mut rand::thread_rng())
    }

    /// Converts a calendar time.
    ///
    /// Nanosecond input only determines the upper 30 fraction bits, so the
    /// two low bits are filled from `rng` (RFC 2030 section 3). Times before
    /// the epoch wrap into the previous era. Fails with `Overflow` when the
    /// offset from the epoch exceeds 2^32 - 1 seconds in magnitude.
    pub fn from_calendar_time_with<R: Rng>(t: DateTime<Utc>, rng: &mut R) -> Result<Self> {
        let ns = t
            .signed_duration_since(ntp_epoch())
            .num_nanoseconds()
            .ok_or_else(|| Error::overflow(format!("timestamp overflow: {}", t)))?;
        // Whole seconds truncate toward zero for the range check
        if (ns / NANOS_PER_SEC).abs() > i64::from(u32::MAX) {
            return Err(Error::overflow(format!("timestamp overflow: {}", t)));
        }
        let secs = ns.div_euclid(NANOS_PER_SEC);
        let frac = ((ns.rem_euclid(NANOS_PER_SEC) as u64) << 32) / NANOS_PER_SEC as u64;
        let jitter = rng.gen_range(0..=JITTER_MASK);
        Ok(Timestamp {
            seconds: secs as u32,
            fraction: (frac as u32 & !JITTER_MASK) | jitter,
        })
    }

    /// Returns the current time
    pub fn now() -> Result<Self> {
        Self::from_calendar_time(Utc::now())
    }

    /// Converts back to a calendar time in era 0, truncating to the
    /// nanosecond
    pub fn to_calendar_time(&self) -> DateTime<Utc> {
        let nanos = (u64::from(self.fraction) * NANOS_PER_SEC as u64) >> 32;
        ntp_epoch() + Duration::seconds(i64::from(self.seconds)) + Duration::nanoseconds(nanos as i64)
    }

    /// Signed distance from `earlier` to `self`.
    ///
    /// Computed on the 64-bit fixed-point values with wrapping arithmetic,
    /// so it stays correct across an era boundary as long as the two stamps
    /// are within 68 years of each other.
    pub fn signed_duration_since(&self, earlier: Timestamp) -> Duration {
        let diff = self.to_bits().wrapping_sub(earlier.to_bits()) as i64;
        let nanos = (i128::from(diff) * i128::from(NANOS_PER_SEC)) >> 32;
        Duration::nanoseconds(nanos as i64)
    }

    /// Returns the value as one 64-bit word
    pub fn to_bits(&self) -> u64 {
        u64::from(self.seconds) << 32 | u64::from(self.fraction)
    }

    /// Splits a 64-bit word into seconds and fraction
    pub fn from_bits(bits: u64) -> Self {
        Timestamp {
            seconds: (bits >> 32) as u32,
            fraction: bits as u32,
        }
    }

    /// True for the all-zero timestamp, which the protocol uses for "unset"
    pub fn is_zero(&self) -> bool {
        self.seconds == 0 && self.fraction == 0
    }

    /// Writes big-endian seconds then fraction into the first 8 bytes of `out`
    pub fn pack(&self, out: &mut [u8]) -> Result<()> {
        ensure_writable(out, Self::PACKED_SIZE)?;
        out[..4].copy_from_slice(&self.seconds.to_be_bytes());
        out[4..8].copy_from_slice(&self.fraction.to_be_bytes());
        Ok(())
    }

    /// Reads a value from the first 8 bytes of `buf`
    pub fn unpack(buf: &[u8]) -> Result<Self> {
        ensure_readable(buf, Self::PACKED_SIZE)?;
        Ok(Timestamp {
            seconds: u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]),
            fraction: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
        })
    }
}

impl TryFrom<DateTime<Utc>> for Timestamp {
    type Error = Error;

    fn try_from(t: DateTime<Utc>) -> Result<Self> {
        Timestamp::from_calendar_time(t)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(ts: Timestamp) -> Self {
        ts.to_calendar_time()
    }
}
