//! Wire types and field tags.
//!
//! A tag is the varint `(field_number << 3) | wire_type` written before
//! every field. The wire type follows from the field's flags and its
//! resolved record; optional records must be unwrapped first.

use std::fmt;

use serde::Serialize;

use crate::codec::primitives::{VarintBuf, encode_uvarint};
use crate::error::TagError;
use crate::model::{FieldFlags, Record, ScalarKind, StructField};

/// Wire types of the amino binary format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    I64 = 1,
    LengthDelimited = 2,
    I32 = 5,
}

impl WireType {
    /// Creates a WireType from its wire representation.
    pub fn from_u8(v: u8) -> Option<WireType> {
        match v {
            0 => Some(WireType::Varint),
            1 => Some(WireType::I64),
            2 => Some(WireType::LengthDelimited),
            5 => Some(WireType::I32),
            _ => None,
        }
    }
}

/// Computes the wire type of a record under the given field flags.
pub fn wire_type_for(flags: FieldFlags, record: &Record) -> Result<WireType, TagError> {
    let scalar = match record {
        Record::Optional(_) => return Err(TagError::OptionalRecord),
        Record::Scalar(kind) => Some(*kind),
        Record::Bytes(_)
        | Record::Repeated(_)
        | Record::Struct(_)
        | Record::Any(_)
        | Record::Named(_) => None,
    };

    let wire_type = if flags.contains(FieldFlags::FIXED64) || scalar == Some(ScalarKind::Float64) {
        WireType::I64
    } else if flags.contains(FieldFlags::FIXED32) || scalar == Some(ScalarKind::Float32) {
        WireType::I32
    } else if scalar.is_some() {
        WireType::Varint
    } else {
        WireType::LengthDelimited
    };
    Ok(wire_type)
}

/// An encoded field tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    field_number: u32,
    wire_type: WireType,
    bytes: VarintBuf,
}

impl Tag {
    /// Encodes the tag for a field number and wire type.
    pub fn new(field_number: u32, wire_type: WireType) -> Self {
        let key = ((field_number as u64) << 3) | wire_type as u64;
        Self {
            field_number,
            wire_type,
            bytes: encode_uvarint(key),
        }
    }

    /// Computes the tag of a record under the given field number and flags.
    pub fn for_record(
        field_number: u32,
        flags: FieldFlags,
        record: &Record,
    ) -> Result<Self, TagError> {
        Ok(Self::new(field_number, wire_type_for(flags, record)?))
    }

    /// Field number encoded in this tag.
    pub fn field_number(&self) -> u32 {
        self.field_number
    }

    /// Wire type encoded in this tag.
    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    /// The tag bytes as written on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_bytes()
    }

    /// Number of bytes the tag takes on the wire.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tag({}, {:?}: {:02x?})",
            self.field_number,
            self.wire_type,
            self.as_bytes()
        )
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl StructField {
    /// Wire type of this field. Fails on optional records.
    pub fn wire_type(&self) -> Result<WireType, TagError> {
        wire_type_for(self.flags, &self.record)
    }

    /// Tag bytes of this field. Fails on optional records.
    pub fn tag(&self) -> Result<Tag, TagError> {
        Tag::for_record(self.bin_field_num, self.flags, &self.record)
    }

    /// Tag bytes of this field with one optional level unwrapped.
    pub fn present_tag(&self) -> Result<Tag, TagError> {
        Tag::for_record(self.bin_field_num, self.flags, self.record.unwrap_optional())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StructRecord;

    fn field(num: u32, record: Record) -> StructField {
        StructField::new("F", record, num)
    }

    #[test]
    fn test_wire_types() {
        let none = FieldFlags::empty();
        assert_eq!(
            wire_type_for(none, &Record::scalar(ScalarKind::Int64)),
            Ok(WireType::Varint)
        );
        assert_eq!(
            wire_type_for(none, &Record::scalar(ScalarKind::Bool)),
            Ok(WireType::Varint)
        );
        assert_eq!(
            wire_type_for(none, &Record::scalar(ScalarKind::Float64)),
            Ok(WireType::I64)
        );
        assert_eq!(
            wire_type_for(none, &Record::scalar(ScalarKind::Float32)),
            Ok(WireType::I32)
        );
        assert_eq!(
            wire_type_for(FieldFlags::FIXED64, &Record::scalar(ScalarKind::Uint64)),
            Ok(WireType::I64)
        );
        assert_eq!(
            wire_type_for(FieldFlags::FIXED32, &Record::scalar(ScalarKind::Int32)),
            Ok(WireType::I32)
        );
        assert_eq!(wire_type_for(none, &Record::bytes()), Ok(WireType::LengthDelimited));
        assert_eq!(
            wire_type_for(none, &Record::repeated(Record::scalar(ScalarKind::Int64))),
            Ok(WireType::LengthDelimited)
        );
        assert_eq!(
            wire_type_for(none, &Record::Struct(StructRecord::default())),
            Ok(WireType::LengthDelimited)
        );
    }

    #[test]
    fn test_optional_is_usage_error() {
        let f = field(8, Record::optional(Record::scalar(ScalarKind::Int64)));
        assert_eq!(f.tag(), Err(TagError::OptionalRecord));
        assert_eq!(f.wire_type(), Err(TagError::OptionalRecord));

        let tag = f.present_tag().unwrap();
        assert_eq!(tag.as_bytes(), &[0x40]);
        assert_eq!(tag.wire_type(), WireType::Varint);
    }

    #[test]
    fn test_single_byte_tags() {
        // Tags of a struct of strings and bools.
        assert_eq!(field(1, Record::string()).tag().unwrap().as_bytes(), &[10]);
        assert_eq!(field(2, Record::string()).tag().unwrap().as_bytes(), &[18]);
        assert_eq!(
            field(7, Record::scalar(ScalarKind::Bool)).tag().unwrap().as_bytes(),
            &[56]
        );
        assert_eq!(field(11, Record::string()).tag().unwrap().as_bytes(), &[90]);

        let fixed = field(3, Record::scalar(ScalarKind::Uint64)).with_flags(FieldFlags::FIXED64);
        assert_eq!(fixed.tag().unwrap().as_bytes(), &[0x19]);
    }

    #[test]
    fn test_multi_byte_tag() {
        let tag = Tag::new(16, WireType::Varint);
        assert_eq!(tag.as_bytes(), &[0x80, 0x01]);
        assert_eq!(tag.to_string(), "80 01");

        let tag = Tag::new(crate::limits::MAX_FIELD_NUMBER, WireType::I32);
        assert_eq!(tag.len(), 5);
        assert_eq!(tag.field_number(), crate::limits::MAX_FIELD_NUMBER);
    }

    #[test]
    fn test_wire_type_from_u8() {
        for wt in [
            WireType::Varint,
            WireType::I64,
            WireType::LengthDelimited,
            WireType::I32,
        ] {
            assert_eq!(WireType::from_u8(wt as u8), Some(wt));
        }
        assert_eq!(WireType::from_u8(3), None);
    }
}
