//! NTPv4 extension fields
//!
//! Each record is a type byte, a length byte, `length` value bytes and zero
//! padding up to the next multiple of four value bytes:
//!
//! ```text
//! +--------+--------+---------------------------+-----------+
//! |  type  | length |  value (length bytes)     |  padding  |
//! +--------+--------+---------------------------+-----------+
//! ```
//!
//! Records are kept in wire order.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{Error, Result};
use crate::util::{ensure_writable, padding_for};

/// Size of the type and length bytes in front of every value
const FIELD_HEADER_SIZE: usize = 2;

/// One extension field record
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExtensionField {
    /// Field type code
    pub field_type: u8,
    /// Field value, at most 255 bytes
    pub value: Vec<u8>,
}

impl ExtensionField {
    /// Creates a new extension field
    pub fn new(field_type: u8, value: impl Into<Vec<u8>>) -> Self {
        ExtensionField {
            field_type,
            value: value.into(),
        }
    }

    /// Length of the value in bytes
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// True when the value is empty
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Bytes this record occupies on the wire, padding included
    pub fn wire_len(&self) -> usize {
        FIELD_HEADER_SIZE + self.len() + padding_for(self.len())
    }
}

/// A borrowed view of an extension field inside a receive buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensionFieldRef<'a> {
    /// Field type code
    pub field_type: u8,
    /// Field value
    pub value: &'a [u8],
}

impl ExtensionFieldRef<'_> {
    /// Copies the value out into an owned field
    pub fn to_field(&self) -> ExtensionField {
        ExtensionField::new(self.field_type, self.value)
    }
}

/// Iterator over the extension fields of a region, without copying
///
/// Yields an error and then stops if a record runs past the region.
pub struct ExtensionFieldIter<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Iterator for ExtensionFieldIter<'a> {
    type Item = Result<ExtensionFieldRef<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.offset >= self.data.len() {
            return None;
        }

        let remaining = &self.data[self.offset..];
        if remaining.len() < FIELD_HEADER_SIZE {
            self.offset = self.data.len();
            return Some(Err(Error::malformed(format!(
                "extension field header needs {} bytes, {} left",
                FIELD_HEADER_SIZE,
                remaining.len()
            ))));
        }

        let field_type = remaining[0];
        let length = remaining[1] as usize;
        let value_end = FIELD_HEADER_SIZE + length;
        if value_end > remaining.len() {
            self.offset = self.data.len();
            return Some(Err(Error::malformed(format!(
                "extension field of type {} declares {} bytes, {} left",
                field_type,
                length,
                remaining.len() - FIELD_HEADER_SIZE
            ))));
        }

        let value = &remaining[FIELD_HEADER_SIZE..value_end];
        // trailing padding may be cut short by the end of the region
        self.offset = (self.offset + value_end + padding_for(length)).min(self.data.len());

        Some(Ok(ExtensionFieldRef { field_type, value }))
    }
}

/// Iterates over the extension fields in `data` without allocating
pub fn iter_extension_fields(data: &[u8]) -> ExtensionFieldIter<'_> {
    ExtensionFieldIter { data, offset: 0 }
}

/// Decodes every extension field in `data`, which must end exactly where
/// the fields end
pub fn unpack_extension_fields(data: &[u8]) -> Result<Vec<ExtensionField>> {
    let fields = iter_extension_fields(data)
        .map(|field| field.map(|f| f.to_field()))
        .collect::<Result<Vec<_>>>()?;
    trace!(count = fields.len(), bytes = data.len(), "unpacked extension fields");
    Ok(fields)
}

/// Total wire size of `fields`
pub fn extension_fields_len(fields: &[ExtensionField]) -> usize {
    fields.iter().map(ExtensionField::wire_len).sum()
}

/// Encodes `fields` in order at the start of `buf` and returns the number
/// of bytes written. Nothing is written if any field is invalid or `buf`
/// is too small.
pub fn pack_extension_fields(fields: &[ExtensionField], buf: &mut [u8]) -> Result<usize> {
    if let Some(field) = fields.iter().find(|f| f.len() > u8::MAX as usize) {
        return Err(Error::invalid_value(format!(
            "extension field of type {} has {} value bytes, at most 255 fit",
            field.field_type,
            field.len()
        )));
    }
    let total = extension_fields_len(fields);
    ensure_writable(buf, total)?;

    let mut offset = 0;
    for field in fields {
        let record = &mut buf[offset..offset + field.wire_len()];
        let (head, rest) = record.split_at_mut(FIELD_HEADER_SIZE);
        head[0] = field.field_type;
        head[1] = field.len() as u8;
        let (value, padding) = rest.split_at_mut(field.len());
        value.copy_from_slice(&field.value);
        padding.fill(0);
        offset += field.wire_len();
    }

    Ok(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_byte_value() {
        let wire = [0x01, 0x03, 0xaa, 0xbb, 0xcc, 0x00];
        let fields = unpack_extension_fields(&wire).unwrap();
        assert_eq!(fields, vec![ExtensionField::new(1, vec![0xaa, 0xbb, 0xcc])]);
        assert_eq!(fields[0].wire_len(), 6);

        let mut buf = [0xffu8; 6];
        assert_eq!(pack_extension_fields(&fields, &mut buf).unwrap(), 6);
        assert_eq!(buf, wire);
    }

    #[test]
    fn test_order_and_padding() {
        let fields = vec![
            ExtensionField::new(7, vec![]),
            ExtensionField::new(2, vec![1, 2, 3, 4]),
            ExtensionField::new(9, vec![5]),
        ];
        assert_eq!(extension_fields_len(&fields), 2 + 6 + 6);

        let mut buf = vec![0xffu8; 14];
        pack_extension_fields(&fields, &mut buf).unwrap();
        assert_eq!(
            buf,
            vec![7, 0, 2, 4, 1, 2, 3, 4, 9, 1, 5, 0, 0, 0]
        );
        assert_eq!(unpack_extension_fields(&buf).unwrap(), fields);
    }

    #[test]
    fn test_borrowed_iteration() {
        let wire = [0x05, 0x02, 0x10, 0x20, 0x00, 0x00];
        let fields: Vec<_> = iter_extension_fields(&wire).collect::<Result<_>>().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].field_type, 5);
        assert_eq!(fields[0].value, &[0x10, 0x20]);
    }

    #[test]
    fn test_missing_final_padding() {
        let fields = unpack_extension_fields(&[0x01, 0x01, 0xee]).unwrap();
        assert_eq!(fields, vec![ExtensionField::new(1, vec![0xee])]);
    }

    #[test]
    fn test_malformed() {
        // declared length runs past the region
        assert!(matches!(
            unpack_extension_fields(&[0x01, 0x08, 0xaa, 0xbb]),
            Err(Error::Malformed(_))
        ));
        // dangling type byte
        assert!(matches!(
            unpack_extension_fields(&[0x01, 0x00, 0x02]),
            Err(Error::Malformed(_))
        ));

        let mut iter = iter_extension_fields(&[0x01, 0x08]);
        assert!(iter.next().unwrap().is_err());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_pack_errors() {
        let too_long = vec![ExtensionField::new(1, vec![0u8; 256])];
        assert!(matches!(
            pack_extension_fields(&too_long, &mut [0u8; 512]),
            Err(Error::InvalidValue(_))
        ));

        let fields = vec![ExtensionField::new(1, vec![1, 2, 3])];
        let mut buf = [0xffu8; 5];
        assert!(matches!(
            pack_extension_fields(&fields, &mut buf),
            Err(Error::BufferTooSmall { needed: 6, available: 5 })
        ));
        assert_eq!(buf, [0xff; 5]);
    }
}
