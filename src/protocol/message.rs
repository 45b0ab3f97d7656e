use serde::{Deserialize, Serialize};
use tracing::debug;

use super::extension::{extension_fields_len, pack_extension_fields, unpack_extension_fields, ExtensionField};
use super::header::MessageHeader;
use crate::core::{
    CodecConfig, Error, Mode, Result, DIGEST_SIZE, HEADER_SIZE, KEY_ID_SIZE,
    MIN_EXTENSION_FIELD_SIZE, TRAILER_SIZE,
};
use crate::time::Timestamp;
use crate::util::ensure_writable;

/// Symmetric-key authentication trailer
///
/// The digest is an MD5-sized hash over the key, the header and the
/// extension fields. It is carried verbatim; verification belongs to the
/// caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Authenticator {
    /// Key identifier shared by client and server
    pub key_id: u32,
    /// Message digest
    #[serde(serialize_with = "crate::core::serde::serialize_digest")]
    #[serde(deserialize_with = "crate::core::serde::deserialize_digest")]
    pub digest: [u8; DIGEST_SIZE],
}

/// A complete NTP message: header, extension fields and optional trailer
///
/// Extension fields and the trailer only exist on the wire for version 4
/// and later; for older versions they are neither decoded nor encoded.
/// The association mode in the header is the message's role, see
/// [`Message::role`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Mandatory header
    pub header: MessageHeader,
    /// Extension fields in wire order
    #[serde(default)]
    pub extension_fields: Vec<ExtensionField>,
    /// Key identifier and digest
    #[serde(default)]
    pub authenticator: Option<Authenticator>,
}

impl Message {
    /// Creates a message with only a header
    pub fn new(header: MessageHeader) -> Self {
        Message {
            header,
            ..Default::default()
        }
    }

    /// Creates a client request stamped with its transmit time
    pub fn client_request(version: u8, transmit: Timestamp) -> Self {
        Message::new(MessageHeader {
            version,
            mode: Mode::Client,
            transmit,
            ..Default::default()
        })
    }

    /// The role of this message, carried by the header mode
    pub fn role(&self) -> Mode {
        self.header.mode
    }

    /// Decodes a message using the default configuration
    pub fn unpack(buf: &[u8]) -> Result<Self> {
        Self::unpack_with(buf, &CodecConfig::default())
    }

    /// Decodes a message.
    ///
    /// Any bytes after the header of a version 4 message are read from the
    /// end: the last 16 are the digest, the 4 before them the key id, and
    /// whatever lies between the header and the key id is the extension
    /// field region.
    pub fn unpack_with(buf: &[u8], config: &CodecConfig) -> Result<Self> {
        let header = MessageHeader::unpack(buf)?;
        if header.version < config.extension_version {
            return Ok(Message::new(header));
        }

        let remain = buf.len() - HEADER_SIZE;
        if remain == 0 {
            return Ok(Message::new(header));
        }
        if remain < TRAILER_SIZE
            || (remain > TRAILER_SIZE && remain < TRAILER_SIZE + MIN_EXTENSION_FIELD_SIZE)
        {
            return Err(Error::NotEnoughData(remain));
        }

        let digest_start = buf.len() - DIGEST_SIZE;
        let key_start = digest_start - KEY_ID_SIZE;
        let mut digest = [0u8; DIGEST_SIZE];
        digest.copy_from_slice(&buf[digest_start..]);
        let key_id = u32::from_be_bytes([
            buf[key_start],
            buf[key_start + 1],
            buf[key_start + 2],
            buf[key_start + 3],
        ]);

        let extension_fields = unpack_extension_fields(&buf[HEADER_SIZE..key_start])?;
        debug!(
            key_id,
            extension_fields = extension_fields.len(),
            "unpacked authenticated message"
        );

        Ok(Message {
            header,
            extension_fields,
            authenticator: Some(Authenticator { key_id, digest }),
        })
    }

    /// Wire size of this message under the default configuration
    pub fn encoded_len(&self) -> usize {
        self.encoded_len_with(&CodecConfig::default())
    }

    /// Wire size of this message
    pub fn encoded_len_with(&self, config: &CodecConfig) -> usize {
        if self.header.version < config.extension_version {
            return HEADER_SIZE;
        }
        let trailer = if self.authenticator.is_some() { TRAILER_SIZE } else { 0 };
        HEADER_SIZE + extension_fields_len(&self.extension_fields) + trailer
    }

    /// Encodes the message using the default configuration
    pub fn pack(&self, buf: &mut [u8]) -> Result<usize> {
        self.pack_with(buf, &CodecConfig::default())
    }

    /// Encodes the message at the start of `buf` and returns the number of
    /// bytes written.
    ///
    /// Fails with `BufferTooSmall` before writing anything if `buf` cannot
    /// hold [`Message::encoded_len_with`] bytes. Extension fields without a
    /// trailer are rejected: a decoder would read their last 20 bytes as the
    /// trailer.
    pub fn pack_with(&self, buf: &mut [u8], config: &CodecConfig) -> Result<usize> {
        let extended = self.header.version >= config.extension_version;
        if extended && !self.extension_fields.is_empty() && self.authenticator.is_none() {
            return Err(Error::invalid_value(
                "extension fields cannot be sent without an authentication trailer",
            ));
        }
        ensure_writable(buf, self.encoded_len_with(config))?;

        let mut offset = self.header.pack(buf)?;
        if !extended {
            if !self.extension_fields.is_empty() || self.authenticator.is_some() {
                debug!(
                    version = self.header.version,
                    "dropping extension fields and trailer from pre-v4 message"
                );
            }
            return Ok(offset);
        }

        offset += pack_extension_fields(&self.extension_fields, &mut buf[offset..])?;
        if let Some(auth) = &self.authenticator {
            buf[offset..offset + KEY_ID_SIZE].copy_from_slice(&auth.key_id.to_be_bytes());
            offset += KEY_ID_SIZE;
            buf[offset..offset + DIGEST_SIZE].copy_from_slice(&auth.digest);
            offset += DIGEST_SIZE;
        }

        Ok(offset)
    }

    /// Encodes the message into a new buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.encoded_len()];
        self.pack(&mut buf)?;
        Ok(buf)
    }
}
