//! Core types for the NTP wire codec
//!
//! This module contains the error type, protocol constants and the small wire
//! types shared by the time formats and the message codec.

pub mod error;
pub mod serde;
pub mod types;

pub use self::error::{Error, Result};
pub use self::types::{CodecConfig, LeapIndicator, Mode, ReferenceId};

/// Size of the mandatory message header in bytes
pub const HEADER_SIZE: usize = 48;

/// Size of the key identifier in the authentication trailer
pub const KEY_ID_SIZE: usize = 4;

/// Size of the message digest in the authentication trailer
pub const DIGEST_SIZE: usize = 16;

/// Size of the full authentication trailer
pub const TRAILER_SIZE: usize = KEY_ID_SIZE + DIGEST_SIZE;

/// Smallest extension field record: type and length bytes with no value
pub const MIN_EXTENSION_FIELD_SIZE: usize = 2;

/// Header version from which extension fields and the trailer exist
pub const EXTENSION_VERSION: u8 = 4;

/// Current protocol version
pub const PROTOCOL_VERSION: u8 = 4;

/// Maximum packet size in bytes
pub const MAX_PACKET_SIZE: usize = 1024;
