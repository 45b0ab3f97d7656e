//! Fixed-point time formats of the NTP wire protocol
//!
//! - [`Exponent`]: signed power-of-two scale used for poll and precision
//! - [`Short`]: 16.16 fixed-point duration (root delay, root dispersion)
//! - [`Timestamp`]: 32.32 fixed-point absolute time since the NTP epoch
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use ntp_wire::time::{Exponent, Timestamp};
//!
//! let poll = Exponent::from_float(16.0).unwrap();
//! assert_eq!(poll, Exponent(4));
//!
//! let t = Utc.with_ymd_and_hms(2014, 10, 13, 14, 0, 0).unwrap();
//! let ts = Timestamp::from_calendar_time(t).unwrap();
//! assert_eq!(ts.seconds, 3_622_197_600);
//! assert_eq!(ts.to_calendar_time(), t);
//! ```

mod exponent;
mod short;
mod timestamp;

pub use self::exponent::Exponent;
pub use self::short::Short;
pub use self::timestamp::Timestamp;

use chrono::{DateTime, Duration, Utc};
use std::time::UNIX_EPOCH;

/// Seconds from the NTP epoch (1900) to the Unix epoch (1970)
pub const NTP_UNIX_OFFSET: i64 = 2_208_988_800;

/// Returns the NTP prime epoch, 1900-01-01T00:00:00Z
pub fn ntp_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::from(UNIX_EPOCH) - Duration::seconds(NTP_UNIX_OFFSET)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_ntp_epoch() {
        let epoch = ntp_epoch();
        assert_eq!((epoch.year(), epoch.month(), epoch.day()), (1900, 1, 1));
        assert_eq!((epoch.hour(), epoch.minute(), epoch.second()), (0, 0, 0));
        assert_eq!(epoch.timestamp(), -NTP_UNIX_OFFSET);
    }
}
