//! Protocol implementation module
//!
//! This module defines the NTP message layout and its encoding/decoding:
//! the fixed header, the NTPv4 extension fields, the authentication trailer
//! and a datagram codec tying them to `tokio-util`.

pub mod codec;
pub mod extension;
pub mod header;
pub mod message;

pub use self::codec::MessageCodec;
pub use self::extension::{
    extension_fields_len, iter_extension_fields, pack_extension_fields, unpack_extension_fields,
    ExtensionField, ExtensionFieldIter, ExtensionFieldRef,
};
pub use self::header::{MessageHeader, RoundTrip};
pub use self::message::{Authenticator, Message};
