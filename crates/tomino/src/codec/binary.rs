//! Reference binary encoder.
//!
//! Encodes a [`Value`] against a validated [`StructRecord`] in the amino
//! binary format. Generated marshalers must produce the same bytes.

use std::borrow::Cow;
use std::fmt::Display;

use crate::codec::primitives::Writer;
use crate::codec::tag::{Tag, WireType, wire_type_for};
use crate::error::EncodeError;
use crate::limits::MAX_ARRAY_LEN;
use crate::model::{
    BytesRecord, FieldFlags, Record, RepeatedRecord, ScalarKind, StructField, StructRecord,
    StructValue, Value,
};

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Encodes a struct value to a new buffer.
pub fn encode(record: &StructRecord, value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut writer = Writer::new();
    encode_into(&mut writer, record, value)?;
    Ok(writer.into_bytes())
}

/// Encodes a struct value, appending to `writer`.
///
/// On error the writer may hold a partial encoding.
pub fn encode_into(
    writer: &mut Writer,
    record: &StructRecord,
    value: &Value,
) -> Result<(), EncodeError> {
    encode_struct(writer, record, value, record.display_name())
}

// =============================================================================
// VALUE COERCION (shared with the JSON encoder)
// =============================================================================

/// A scalar value checked against its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Scalar {
    Bool(bool),
    Signed(i64),
    Unsigned(u64),
    F32(f32),
    F64(f64),
}

impl Scalar {
    pub(crate) fn is_zero(self) -> bool {
        match self {
            Scalar::Bool(b) => !b,
            Scalar::Signed(v) => v == 0,
            Scalar::Unsigned(v) => v == 0,
            Scalar::F32(v) => v == 0.0,
            Scalar::F64(v) => v == 0.0,
        }
    }
}

pub(crate) fn mismatch(path: &str, expected: impl Display, found: &Value) -> EncodeError {
    EncodeError::TypeMismatch {
        path: path.to_string(),
        expected: expected.to_string(),
        found: found.kind_name(),
    }
}

/// Checks a scalar value against its kind. `Null` is the zero value.
pub(crate) fn scalar_value(kind: ScalarKind, value: &Value, path: &str) -> Result<Scalar, EncodeError> {
    match kind {
        ScalarKind::Bool => match value {
            Value::Null => Ok(Scalar::Bool(false)),
            Value::Bool(b) => Ok(Scalar::Bool(*b)),
            other => Err(mismatch(path, kind, other)),
        },
        ScalarKind::Float32 => match value {
            Value::Null => Ok(Scalar::F32(0.0)),
            Value::Float(f) => Ok(Scalar::F32(*f as f32)),
            other => Err(mismatch(path, kind, other)),
        },
        ScalarKind::Float64 => match value {
            Value::Null => Ok(Scalar::F64(0.0)),
            Value::Float(f) => Ok(Scalar::F64(*f)),
            other => Err(mismatch(path, kind, other)),
        },
        _ => {
            let n = match value {
                Value::Null => 0,
                Value::Int(v) => *v as i128,
                Value::Uint(v) => *v as i128,
                other => return Err(mismatch(path, kind, other)),
            };
            match kind.integer_range() {
                Some((min, max)) if n < min || n > max => {
                    return Err(EncodeError::IntegerOutOfRange {
                        path: path.to_string(),
                        kind,
                        value: n,
                    });
                }
                _ => {}
            }
            if kind.is_signed() {
                Ok(Scalar::Signed(n as i64))
            } else {
                Ok(Scalar::Unsigned(n as u64))
            }
        }
    }
}

/// Checks a byte string against its record. `Null` is the zero value,
/// which for fixed-size arrays is `size` zero bytes.
pub(crate) fn bytes_value<'v>(
    record: &BytesRecord,
    value: &'v Value,
    path: &str,
) -> Result<Cow<'v, [u8]>, EncodeError> {
    check_array_len(record.size, path)?;
    let bytes: Cow<'v, [u8]> = match value {
        Value::Null => match record.size {
            Some(size) => Cow::Owned(vec![0; size as usize]),
            None => Cow::Borrowed(&[]),
        },
        Value::Bytes(b) => Cow::Borrowed(b),
        Value::Text(s) => Cow::Borrowed(s.as_bytes()),
        other => return Err(mismatch(path, Record::Bytes(record.clone()), other)),
    };
    check_size(record.size, bytes.len(), path)?;
    Ok(bytes)
}

/// Checks a list against its record. `Null` is the zero value, which for
/// fixed-size arrays is `size` zero elements.
pub(crate) fn list_value<'v>(
    record: &RepeatedRecord,
    value: &'v Value,
    path: &str,
) -> Result<Cow<'v, [Value]>, EncodeError> {
    check_array_len(record.size, path)?;
    let items: Cow<'v, [Value]> = match value {
        Value::Null => match record.size {
            Some(size) => Cow::Owned(vec![Value::Null; size as usize]),
            None => Cow::Borrowed(&[]),
        },
        Value::List(items) => Cow::Borrowed(items),
        other => return Err(mismatch(path, Record::Repeated(record.clone()), other)),
    };
    check_size(record.size, items.len(), path)?;
    Ok(items)
}

fn check_array_len(size: Option<u64>, path: &str) -> Result<(), EncodeError> {
    match size {
        Some(len) if len > MAX_ARRAY_LEN => Err(EncodeError::ArrayTooLong {
            path: path.to_string(),
            len,
            max: MAX_ARRAY_LEN,
        }),
        _ => Ok(()),
    }
}

fn check_size(size: Option<u64>, actual: usize, path: &str) -> Result<(), EncodeError> {
    match size {
        Some(expected) if expected != actual as u64 => Err(EncodeError::SizeMismatch {
            path: path.to_string(),
            expected,
            actual,
        }),
        _ => Ok(()),
    }
}

/// Returns the field values of a struct, rejecting fields the record does
/// not declare. `Null` is a struct with no fields set.
pub(crate) fn struct_value<'v>(
    record: &StructRecord,
    value: &'v Value,
    path: &str,
) -> Result<Option<&'v StructValue>, EncodeError> {
    let fields = match value {
        Value::Null => return Ok(None),
        Value::Struct(fields) => fields,
        other => return Err(mismatch(path, Record::Struct(record.clone()), other)),
    };
    for (name, _) in fields.iter() {
        if record.field(name).is_none() {
            return Err(EncodeError::UnknownField {
                path: path.to_string(),
                name: name.to_string(),
            });
        }
    }
    Ok(Some(fields))
}

pub(crate) fn field_value<'v>(fields: Option<&'v StructValue>, field: &StructField) -> &'v Value {
    const NULL: &Value = &Value::Null;
    fields.and_then(|f| f.get(&field.name)).unwrap_or(NULL)
}

// =============================================================================
// ENCODING
// =============================================================================

fn encode_struct(
    writer: &mut Writer,
    record: &StructRecord,
    value: &Value,
    path: &str,
) -> Result<(), EncodeError> {
    let fields = struct_value(record, value, path)?;
    for field in &record.fields {
        let value = field_value(fields, field);
        let path = format!("{path}.{}", field.name);
        encode_field(writer, field, value, &path)?;
    }
    Ok(())
}

fn encode_field(
    writer: &mut Writer,
    field: &StructField,
    value: &Value,
    path: &str,
) -> Result<(), EncodeError> {
    let number = field.bin_field_num;
    match &field.record {
        Record::Optional(opt) => {
            if value.is_null() {
                return Ok(());
            }
            encode_present(writer, number, field.flags, &opt.elem, value, true, path)
        }
        record => encode_present(
            writer,
            number,
            field.flags,
            record,
            value,
            field.write_empty(),
            path,
        ),
    }
}

/// Encodes a tagged field whose optionality has already been resolved.
fn encode_present(
    writer: &mut Writer,
    number: u32,
    flags: FieldFlags,
    record: &Record,
    value: &Value,
    write_empty: bool,
    path: &str,
) -> Result<(), EncodeError> {
    match record {
        Record::Scalar(kind) => {
            let scalar = scalar_value(*kind, value, path)?;
            if scalar.is_zero() && !write_empty {
                return Ok(());
            }
            let tag = Tag::for_record(number, flags, record)?;
            writer.write_bytes(tag.as_bytes());
            write_scalar(writer, scalar, tag.wire_type());
        }
        Record::Bytes(b) => {
            let bytes = bytes_value(b, value, path)?;
            if bytes.is_empty() && !write_empty {
                return Ok(());
            }
            writer.write_bytes(Tag::new(number, WireType::LengthDelimited).as_bytes());
            writer.write_bytes_prefixed(&bytes);
        }
        Record::Repeated(r) => encode_repeated(writer, number, flags, r, value, write_empty, path)?,
        Record::Struct(s) => {
            let mut inner = Writer::new();
            encode_struct(&mut inner, s, value, path)?;
            if inner.is_empty() && !write_empty {
                return Ok(());
            }
            writer.write_bytes(Tag::new(number, WireType::LengthDelimited).as_bytes());
            writer.write_bytes_prefixed(inner.as_bytes());
        }
        Record::Optional(_) => {
            return Err(EncodeError::Unsupported {
                path: path.to_string(),
                kind: "nested optional",
            });
        }
        Record::Any(_) | Record::Named(_) => {
            return Err(EncodeError::Unsupported {
                path: path.to_string(),
                kind: record.kind(),
            });
        }
    }
    Ok(())
}

fn encode_repeated(
    writer: &mut Writer,
    number: u32,
    flags: FieldFlags,
    record: &RepeatedRecord,
    value: &Value,
    write_empty: bool,
    path: &str,
) -> Result<(), EncodeError> {
    let items = list_value(record, value, path)?;
    if items.is_empty() && !write_empty {
        return Ok(());
    }

    let tag = Tag::new(number, WireType::LengthDelimited);
    let elem = record.elem.as_ref();
    let inner = elem.unwrap_optional();

    // Scalars are packed into one length-delimited payload.
    if let Record::Scalar(kind) = inner {
        let wire_type = wire_type_for(flags, inner)?;
        let mut payload = Writer::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let scalar = scalar_value(*kind, item, &format!("{path}[{i}]"))?;
            write_scalar(&mut payload, scalar, wire_type);
        }
        writer.write_bytes(tag.as_bytes());
        writer.write_bytes_prefixed(payload.as_bytes());
        return Ok(());
    }

    if items.is_empty() {
        writer.write_bytes(tag.as_bytes());
        writer.write_byte(0);
        return Ok(());
    }

    for (i, item) in items.iter().enumerate() {
        writer.write_bytes(tag.as_bytes());
        if item.is_null() && elem.is_optional() {
            writer.write_byte(0);
            continue;
        }
        encode_element(writer, flags, inner, item, &format!("{path}[{i}]"))?;
    }
    Ok(())
}

/// Writes one length-prefixed element of an unpacked sequence.
fn encode_element(
    writer: &mut Writer,
    flags: FieldFlags,
    record: &Record,
    value: &Value,
    path: &str,
) -> Result<(), EncodeError> {
    match record {
        Record::Bytes(b) => {
            let bytes = bytes_value(b, value, path)?;
            writer.write_bytes_prefixed(&bytes);
        }
        Record::Struct(s) => {
            let mut inner = Writer::new();
            encode_struct(&mut inner, s, value, path)?;
            writer.write_bytes_prefixed(inner.as_bytes());
        }
        Record::Repeated(r) => {
            // Nested sequences become an implicit struct with the inner
            // sequence as field 1.
            let mut inner = Writer::new();
            encode_repeated(&mut inner, 1, flags, r, value, false, path)?;
            writer.write_bytes_prefixed(inner.as_bytes());
        }
        Record::Optional(_) => {
            return Err(EncodeError::Unsupported {
                path: path.to_string(),
                kind: "nested optional",
            });
        }
        Record::Scalar(_) | Record::Any(_) | Record::Named(_) => {
            return Err(EncodeError::Unsupported {
                path: path.to_string(),
                kind: record.kind(),
            });
        }
    }
    Ok(())
}

fn write_scalar(writer: &mut Writer, scalar: Scalar, wire_type: WireType) {
    match (scalar, wire_type) {
        (Scalar::Bool(b), _) => writer.write_byte(b as u8),
        (Scalar::F32(v), _) => writer.write_fixed32(v.to_bits()),
        (Scalar::F64(v), _) => writer.write_fixed64(v.to_bits()),
        (Scalar::Signed(v), WireType::I64) => writer.write_fixed64(v as u64),
        (Scalar::Signed(v), WireType::I32) => writer.write_fixed32(v as i32 as u32),
        (Scalar::Signed(v), _) => writer.write_varint(v),
        (Scalar::Unsigned(v), WireType::I64) => writer.write_fixed64(v),
        (Scalar::Unsigned(v), WireType::I32) => writer.write_fixed32(v as u32),
        (Scalar::Unsigned(v), _) => writer.write_uvarint(v),
    }
}
