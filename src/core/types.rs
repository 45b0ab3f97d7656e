use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

/// Two-bit leap second warning carried in the first header byte
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeapIndicator {
    /// No leap second pending
    #[default]
    NoWarning,
    /// Last minute of the day has 61 seconds
    AddOne,
    /// Last minute of the day has 59 seconds
    SubOne,
    /// Clock unsynchronized
    Unknown,
}

impl LeapIndicator {
    /// Maps the low two bits of `bits` to a leap indicator
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => LeapIndicator::NoWarning,
            1 => LeapIndicator::AddOne,
            2 => LeapIndicator::SubOne,
            _ => LeapIndicator::Unknown,
        }
    }

    /// Returns the two-bit wire value
    pub fn bits(self) -> u8 {
        match self {
            LeapIndicator::NoWarning => 0,
            LeapIndicator::AddOne => 1,
            LeapIndicator::SubOne => 2,
            LeapIndicator::Unknown => 3,
        }
    }
}

/// Three-bit association mode
///
/// Every 3-bit value has a variant, so decoding a mode never fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Reserved (0)
    Reserved,
    /// Symmetric active (1)
    SymmetricActive,
    /// Symmetric passive (2)
    SymmetricPassive,
    /// Client (3)
    #[default]
    Client,
    /// Server (4)
    Server,
    /// Broadcast (5)
    Broadcast,
    /// NTP control message (6)
    Control,
    /// Reserved for private use (7)
    Private,
}

impl Mode {
    /// Maps the low three bits of `bits` to a mode
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => Mode::Reserved,
            1 => Mode::SymmetricActive,
            2 => Mode::SymmetricPassive,
            3 => Mode::Client,
            4 => Mode::Server,
            5 => Mode::Broadcast,
            6 => Mode::Control,
            _ => Mode::Private,
        }
    }

    /// Returns the three-bit wire value
    pub fn bits(self) -> u8 {
        match self {
            Mode::Reserved => 0,
            Mode::SymmetricActive => 1,
            Mode::SymmetricPassive => 2,
            Mode::Client => 3,
            Mode::Server => 4,
            Mode::Broadcast => 5,
            Mode::Control => 6,
            Mode::Private => 7,
        }
    }
}

/// Raw 4-byte reference identifier
///
/// For stratum 0 and 1 this is a left-justified ASCII code (kiss code or
/// reference clock name); for higher strata it is usually an IPv4 address.
/// The bytes are kept as-is and interpreted on demand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceId(
    #[serde(serialize_with = "super::serde::serialize_reference_id")]
    #[serde(deserialize_with = "super::serde::deserialize_reference_id")]
    pub [u8; 4],
);

impl ReferenceId {
    /// Builds an identifier from up to four ASCII characters, NUL padded
    pub fn from_ascii(code: &str) -> Option<Self> {
        let raw = code.as_bytes();
        if raw.len() > 4 || !code.is_ascii() {
            return None;
        }
        let mut bytes = [0u8; 4];
        bytes[..raw.len()].copy_from_slice(raw);
        Some(ReferenceId(bytes))
    }

    /// Builds an identifier from an IPv4 address
    pub fn from_ipv4(addr: Ipv4Addr) -> Self {
        ReferenceId(addr.octets())
    }

    /// Interprets the bytes as an IPv4 address
    pub fn as_ipv4(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.0)
    }

    /// Interprets the bytes as an ASCII code, if they are printable up to
    /// the first NUL and NUL after it
    pub fn as_ascii(&self) -> Option<&str> {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(4);
        if end == 0 || self.0[end..].iter().any(|&b| b != 0) {
            return None;
        }
        let code = &self.0[..end];
        if code.iter().all(|b| b.is_ascii_graphic()) {
            std::str::from_utf8(code).ok()
        } else {
            None
        }
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_ascii() {
            Some(code) => f.write_str(code),
            None => write!(f, "{}", self.as_ipv4()),
        }
    }
}

impl From<Ipv4Addr> for ReferenceId {
    fn from(addr: Ipv4Addr) -> Self {
        ReferenceId::from_ipv4(addr)
    }
}

/// Configuration for message decoding and encoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Largest datagram the codec accepts or produces
    pub max_message_size: usize,
    /// Lowest header version for which extension fields and the
    /// authentication trailer are present
    pub extension_version: u8,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            max_message_size: super::MAX_PACKET_SIZE,
            extension_version: super::EXTENSION_VERSION,
        }
    }
}
