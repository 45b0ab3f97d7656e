//! NTP wire: Network Time Protocol wire format codec
//!
//! This library converts between calendar times / durations and the
//! protocol's fixed-point time formats, and packs and unpacks complete NTP
//! messages (header, NTPv4 extension fields, authentication trailer) as
//! described by RFC 5905 and RFC 2030. Sockets, clock filtering and digest
//! verification are left to the caller.
//!
//! ```
//! use ntp_wire::{Message, Mode, Timestamp, PROTOCOL_VERSION};
//!
//! let request = Message::client_request(PROTOCOL_VERSION, Timestamp::now().unwrap());
//! let bytes = request.to_bytes().unwrap();
//! assert_eq!(bytes.len(), 48);
//!
//! let decoded = Message::unpack(&bytes).unwrap();
//! assert_eq!(decoded.role(), Mode::Client);
//! ```
pub mod core;
pub mod protocol;
pub mod time;
mod util;

// Re-export commonly used items
pub use crate::core::{CodecConfig, Error, LeapIndicator, Mode, ReferenceId, Result, PROTOCOL_VERSION};
pub use crate::protocol::{Authenticator, ExtensionField, Message, MessageCodec, MessageHeader};
pub use crate::time::{Exponent, Short, Timestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
