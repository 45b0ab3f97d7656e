use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::net::Ipv4Addr;

use super::types::ReferenceId;

/// Serializes reference identifier bytes as an ASCII code or dotted quad
pub fn serialize_reference_id<S>(bytes: &[u8; 4], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    ReferenceId(*bytes).to_string().serialize(serializer)
}

/// Deserializes reference identifier bytes from a dotted quad or an ASCII code
pub fn deserialize_reference_id<'de, D>(deserializer: D) -> Result<[u8; 4], D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    if let Ok(addr) = text.parse::<Ipv4Addr>() {
        return Ok(addr.octets());
    }
    ReferenceId::from_ascii(&text)
        .map(|id| id.0)
        .ok_or_else(|| D::Error::custom(format!("invalid reference id: {:?}", text)))
}

/// Serializes a message digest as lowercase hex
pub fn serialize_digest<S>(digest: &[u8; 16], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
    hex.serialize(serializer)
}

/// Deserializes a message digest from 32 hex characters
pub fn deserialize_digest<'de, D>(deserializer: D) -> Result<[u8; 16], D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    if text.len() != 32 || !text.is_ascii() {
        return Err(D::Error::custom("digest must be 32 hex characters"));
    }
    let mut digest = [0u8; 16];
    for (i, byte) in digest.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&text[2 * i..2 * i + 2], 16)
            .map_err(|e| D::Error::custom(format!("invalid digest: {}", e)))?;
    }
    Ok(digest)
}
