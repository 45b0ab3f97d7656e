use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::{debug, trace};

use super::message::Message;
use crate::core::{CodecConfig, Error};

/// Datagram codec for NTP messages, for use with `UdpFramed`
///
/// NTP carries no length prefix: a message is the whole datagram. `UdpFramed`
/// hands each datagram to `decode_eof`, which decodes it as one message.
/// `decode` never yields a message, so bytes from a stream transport stay
/// buffered until end of input.
#[derive(Debug, Clone, Default)]
pub struct MessageCodec {
    config: CodecConfig,
}

impl MessageCodec {
    /// Creates a codec with the default configuration
    pub fn new() -> Self {
        MessageCodec::default()
    }

    /// Creates a codec with an explicit configuration
    pub fn with_config(config: CodecConfig) -> Self {
        MessageCodec { config }
    }

    /// Returns the codec configuration
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    fn decode_datagram(&self, src: &mut BytesMut) -> Result<Message, Error> {
        let datagram = src.split_to(src.len());
        if datagram.len() > self.config.max_message_size {
            return Err(Error::malformed(format!(
                "datagram of {} bytes exceeds limit of {}",
                datagram.len(),
                self.config.max_message_size
            )));
        }
        let message = Message::unpack_with(&datagram, &self.config)?;
        trace!(bytes = datagram.len(), mode = ?message.role(), "decoded datagram");
        Ok(message)
    }
}

impl Decoder for MessageCodec {
    type Item = Message;
    type Error = Error;

    fn decode(&mut self, _src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Message boundaries are only known at the end of a datagram
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        self.decode_datagram(src).map(Some)
    }
}

impl Encoder<Message> for MessageCodec {
    type Error = Error;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let len = item.encoded_len_with(&self.config);
        if len > self.config.max_message_size {
            return Err(Error::malformed(format!(
                "message of {} bytes exceeds limit of {}",
                len, self.config.max_message_size
            )));
        }

        let start = dst.len();
        dst.resize(start + len, 0);
        if let Err(e) = item.pack_with(&mut dst[start..], &self.config) {
            dst.truncate(start);
            debug!(error = %e, "failed to encode message");
            return Err(e);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{HEADER_SIZE, PROTOCOL_VERSION};
    use crate::protocol::{Authenticator, ExtensionField};
    use crate::time::Timestamp;

    #[test]
    fn test_codec_client_request() {
        let mut codec = MessageCodec::new();
        let mut bytes = BytesMut::new();

        let transmit = Timestamp { seconds: 1, fraction: 2 };
        let message = Message::client_request(PROTOCOL_VERSION, transmit);

        // Encode
        codec.encode(message.clone(), &mut bytes).unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE);

        // Decode
        let decoded = codec.decode_eof(&mut bytes).unwrap().expect("full datagram");
        assert_eq!(decoded, message);
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_codec_authenticated() {
        let mut codec = MessageCodec::new();
        let mut bytes = BytesMut::new();

        let mut message = Message::client_request(PROTOCOL_VERSION, Timestamp::default());
        message.extension_fields.push(ExtensionField::new(3, vec![9, 9]));
        message.authenticator = Some(Authenticator { key_id: 7, digest: [1; 16] });

        codec.encode(message.clone(), &mut bytes).unwrap();
        assert_eq!(bytes.len(), 48 + 6 + 20);
        assert_eq!(codec.decode_eof(&mut bytes).unwrap(), Some(message));
    }

    #[test]
    fn test_codec_short_datagram() {
        let mut codec = MessageCodec::new();
        let mut bytes = BytesMut::from(&[0x23u8; 20][..]);
        assert!(codec.decode(&mut bytes).unwrap().is_none());
        assert_eq!(bytes.len(), 20);

        assert!(matches!(codec.decode_eof(&mut bytes), Err(Error::Truncated { .. })));
        assert!(codec.decode_eof(&mut bytes).unwrap().is_none());
    }

    #[test]
    fn test_codec_decode_keeps_concatenated_messages() {
        let mut codec = MessageCodec::new();
        let request = Message::client_request(3, Timestamp { seconds: 5, fraction: 0 });
        let mut reply = request.clone();
        reply.header.mode = crate::core::Mode::Server;

        let mut bytes = BytesMut::new();
        codec.encode(request, &mut bytes).unwrap();
        codec.encode(reply, &mut bytes).unwrap();
        assert_eq!(bytes.len(), 2 * HEADER_SIZE);

        // nothing is consumed or dropped before the datagram ends
        assert!(codec.decode(&mut bytes).unwrap().is_none());
        assert_eq!(bytes.len(), 2 * HEADER_SIZE);
    }

    #[test]
    fn test_codec_size_limit() {
        let mut codec = MessageCodec::with_config(CodecConfig {
            max_message_size: 60,
            ..Default::default()
        });

        let mut message = Message::client_request(PROTOCOL_VERSION, Timestamp::default());
        message.authenticator = Some(Authenticator::default());
        let mut bytes = BytesMut::new();
        assert!(matches!(codec.encode(message, &mut bytes), Err(Error::Malformed(_))));
        assert!(bytes.is_empty());

        let mut bytes = BytesMut::from(&[0u8; 64][..]);
        assert!(matches!(codec.decode_eof(&mut bytes), Err(Error::Malformed(_))));
    }

    #[test]
    fn test_codec_encode_failure_leaves_buffer() {
        let mut codec = MessageCodec::new();
        let mut bytes = BytesMut::from(&b"prefix"[..]);

        let mut message = Message::client_request(PROTOCOL_VERSION, Timestamp::default());
        message.extension_fields.push(ExtensionField::new(1, vec![1]));

        assert!(codec.encode(message, &mut bytes).is_err());
        assert_eq!(&bytes[..], b"prefix");
    }
}
