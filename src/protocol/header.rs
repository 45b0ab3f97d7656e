use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{Error, LeapIndicator, Mode, ReferenceId, Result, HEADER_SIZE};
use crate::time::{Exponent, Short, Timestamp};
use crate::util::{ensure_readable, ensure_writable};

/// The mandatory 48-byte message header
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |LI | VN  |Mode |    Stratum     |     Poll      |  Precision   |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         Root Delay                            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         Root Dispersion                       |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                          Reference ID                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// +                     Reference Timestamp (64)                  +
/// +                      Origin Timestamp (64)                    +
/// +                      Receive Timestamp (64)                   +
/// +                      Transmit Timestamp (64)                  +
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// `destination` (T4) is stamped locally on arrival and never travels on
/// the wire; pack and unpack leave it alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHeader {
    /// Leap second warning
    pub leap: LeapIndicator,
    /// Protocol version, 3 bits on the wire
    pub version: u8,
    /// Association mode
    pub mode: Mode,
    /// Distance from the reference clock; 0 is unspecified / kiss-o'-death
    pub stratum: u8,
    /// Maximum interval between successive messages
    pub poll: Exponent,
    /// Precision of the system clock
    pub precision: Exponent,
    /// Round-trip delay to the reference clock
    pub root_delay: Short,
    /// Dispersion to the reference clock
    pub root_dispersion: Short,
    /// Reference clock code or upstream server address
    pub reference_id: ReferenceId,
    /// Time the system clock was last set or corrected
    pub reference_time: Timestamp,
    /// T1: client time at request departure
    pub originate: Timestamp,
    /// T2: server time at request arrival
    pub receive: Timestamp,
    /// T3: server time at reply departure
    pub transmit: Timestamp,
    /// T4: client time at reply arrival, local only
    #[serde(default)]
    pub destination: Timestamp,
}

/// Round-trip delay and clock offset from one request/reply exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTrip {
    /// Time spent on the network: (T4 - T1) - (T3 - T2)
    pub delay: Duration,
    /// Server clock minus client clock: ((T2 - T1) + (T3 - T4)) / 2
    pub offset: Duration,
}

impl MessageHeader {
    /// Decodes the header from the first 48 bytes of `buf`.
    ///
    /// Field values are taken as-is beyond bit masking; only the length is
    /// checked.
    pub fn unpack(buf: &[u8]) -> Result<Self> {
        ensure_readable(buf, HEADER_SIZE)?;

        let flags = buf[0];
        let header = MessageHeader {
            leap: LeapIndicator::from_bits(flags >> 6),
            version: (flags >> 3) & 0b111,
            mode: Mode::from_bits(flags),
            stratum: buf[1],
            poll: Exponent(buf[2] as i8),
            precision: Exponent(buf[3] as i8),
            root_delay: Short::unpack(&buf[4..8])?,
            root_dispersion: Short::unpack(&buf[8..12])?,
            reference_id: ReferenceId([buf[12], buf[13], buf[14], buf[15]]),
            reference_time: Timestamp::unpack(&buf[16..24])?,
            originate: Timestamp::unpack(&buf[24..32])?,
            receive: Timestamp::unpack(&buf[32..40])?,
            transmit: Timestamp::unpack(&buf[40..48])?,
            destination: Timestamp::default(),
        };

        trace!(
            version = header.version,
            mode = ?header.mode,
            stratum = header.stratum,
            "unpacked header"
        );
        Ok(header)
    }

    /// Encodes the header into the first 48 bytes of `buf` and returns the
    /// number of bytes written.
    pub fn pack(&self, buf: &mut [u8]) -> Result<usize> {
        ensure_writable(buf, HEADER_SIZE)?;
        if self.version > 0b111 {
            return Err(Error::invalid_value(format!(
                "version {} does not fit in 3 bits",
                self.version
            )));
        }

        buf[0] = self.leap.bits() << 6 | self.version << 3 | self.mode.bits();
        buf[1] = self.stratum;
        buf[2] = self.poll.0 as u8;
        buf[3] = self.precision.0 as u8;
        self.root_delay.pack(&mut buf[4..8])?;
        self.root_dispersion.pack(&mut buf[8..12])?;
        buf[12..16].copy_from_slice(&self.reference_id.0);
        self.reference_time.pack(&mut buf[16..24])?;
        self.originate.pack(&mut buf[24..32])?;
        self.receive.pack(&mut buf[32..40])?;
        self.transmit.pack(&mut buf[40..48])?;

        Ok(HEADER_SIZE)
    }

    /// Delay and offset of a completed exchange, or `None` while any of
    /// T1 to T4 is still unset
    pub fn round_trip(&self) -> Option<RoundTrip> {
        let stamps = [self.originate, self.receive, self.transmit, self.destination];
        if stamps.iter().any(Timestamp::is_zero) {
            return None;
        }

        let server_hold = self.transmit.signed_duration_since(self.receive);
        let total = self.destination.signed_duration_since(self.originate);
        let outbound = self.receive.signed_duration_since(self.originate);
        let inbound = self.transmit.signed_duration_since(self.destination);

        Some(RoundTrip {
            delay: total - server_hold,
            offset: (outbound + inbound) / 2,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_header() -> MessageHeader {
        MessageHeader {
            leap: LeapIndicator::NoWarning,
            version: 4,
            mode: Mode::Client,
            stratum: 0,
            poll: Exponent(4),
            precision: Exponent(-6),
            ..Default::default()
        }
    }

    #[test]
    fn test_client_header_layout() {
        let header = client_header();
        let mut buf = [0xffu8; 48];
        assert_eq!(header.pack(&mut buf).unwrap(), 48);

        let mut expected = [0u8; 48];
        expected[0] = 0x23;
        expected[2] = 4;
        expected[3] = 0xfa;
        assert_eq!(buf, expected);

        assert_eq!(MessageHeader::unpack(&buf).unwrap(), header);
    }

    #[test]
    fn test_field_offsets() {
        let header = MessageHeader {
            leap: LeapIndicator::Unknown,
            version: 3,
            mode: Mode::Server,
            stratum: 2,
            poll: Exponent(10),
            precision: Exponent(-20),
            root_delay: Short { seconds: 1, fraction: 2 },
            root_dispersion: Short { seconds: 3, fraction: 4 },
            reference_id: ReferenceId([10, 0, 0, 1]),
            reference_time: Timestamp { seconds: 5, fraction: 6 },
            originate: Timestamp { seconds: 7, fraction: 8 },
            receive: Timestamp { seconds: 9, fraction: 10 },
            transmit: Timestamp { seconds: 11, fraction: 12 },
            destination: Timestamp::default(),
        };
        let mut buf = [0u8; 48];
        header.pack(&mut buf).unwrap();

        assert_eq!(buf[0], 0b11_011_100);
        assert_eq!(&buf[1..4], &[2, 10, 0xec]);
        assert_eq!(&buf[4..12], &[0, 1, 0, 2, 0, 3, 0, 4]);
        assert_eq!(&buf[12..16], &[10, 0, 0, 1]);
        assert_eq!(&buf[16..24], &[0, 0, 0, 5, 0, 0, 0, 6]);
        assert_eq!(&buf[40..48], &[0, 0, 0, 11, 0, 0, 0, 12]);

        assert_eq!(MessageHeader::unpack(&buf).unwrap(), header);
    }

    #[test]
    fn test_destination_not_packed() {
        let mut header = client_header();
        header.destination = Timestamp { seconds: 99, fraction: 1 };
        let mut buf = [0u8; 48];
        header.pack(&mut buf).unwrap();

        let decoded = MessageHeader::unpack(&buf).unwrap();
        assert!(decoded.destination.is_zero());
    }

    #[test]
    fn test_bounds() {
        assert!(matches!(
            MessageHeader::unpack(&[0u8; 47]),
            Err(Error::Truncated { needed: 48, available: 47 })
        ));
        assert!(matches!(
            client_header().pack(&mut [0u8; 20]),
            Err(Error::BufferTooSmall { needed: 48, available: 20 })
        ));

        let mut header = client_header();
        header.version = 8;
        assert!(matches!(header.pack(&mut [0u8; 48]), Err(Error::InvalidValue(_))));
    }

    #[test]
    fn test_round_trip() {
        let mut header = client_header();
        assert!(header.round_trip().is_none());

        // server clock runs 1s ahead, 100ms each way, 10ms hold
        header.originate = Timestamp { seconds: 1000, fraction: 0 };
        header.receive = Timestamp::from_bits((1001u64 << 32) + (1u64 << 32) / 10);
        header.transmit = Timestamp::from_bits((1001u64 << 32) + (11u64 << 32) / 100);
        header.destination = Timestamp::from_bits((1000u64 << 32) + (21u64 << 32) / 100);

        let rtt = header.round_trip().unwrap();
        assert!((rtt.delay - Duration::milliseconds(200)).num_nanoseconds().unwrap().abs() <= 5);
        assert!((rtt.offset - Duration::seconds(1)).num_nanoseconds().unwrap().abs() <= 5);
    }
}
