//! JSON encoding following amino's conventions.
//!
//! Objects are keyed by each field's JSON name. 64-bit integers are written
//! as decimal strings, byte strings as standard base64, absent optionals as
//! `null`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Number, Value as JsonValue};

use crate::codec::binary::{Scalar, bytes_value, field_value, list_value, scalar_value, struct_value};
use crate::error::EncodeError;
use crate::model::{FieldFlags, Record, ScalarKind, StructRecord, Value};

/// Encodes a struct value to a JSON tree.
pub fn encode_json(record: &StructRecord, value: &Value) -> Result<JsonValue, EncodeError> {
    encode_struct(record, value, record.display_name())
}

/// Encodes a struct value to a compact JSON string.
pub fn encode_json_string(record: &StructRecord, value: &Value) -> Result<String, EncodeError> {
    Ok(encode_json(record, value)?.to_string())
}

fn encode_struct(record: &StructRecord, value: &Value, path: &str) -> Result<JsonValue, EncodeError> {
    let fields = struct_value(record, value, path)?;
    let mut map = Map::with_capacity(record.fields.len());
    for field in &record.fields {
        let value = field_value(fields, field);
        if field.has(FieldFlags::JSON_OMIT_EMPTY) && is_empty(&field.record, value) {
            continue;
        }
        let path = format!("{path}.{}", field.name);
        map.insert(field.json_name.clone(), encode_record(&field.record, value, &path)?);
    }
    Ok(JsonValue::Object(map))
}

fn encode_record(record: &Record, value: &Value, path: &str) -> Result<JsonValue, EncodeError> {
    match record {
        Record::Optional(opt) => {
            if value.is_null() {
                Ok(JsonValue::Null)
            } else {
                encode_record(&opt.elem, value, path)
            }
        }
        Record::Scalar(kind) => encode_scalar(*kind, scalar_value(*kind, value, path)?, path),
        Record::Bytes(b) => {
            let bytes = bytes_value(b, value, path)?;
            if b.is_string {
                let text = String::from_utf8(bytes.into_owned()).map_err(|_| {
                    EncodeError::InvalidUtf8 {
                        path: path.to_string(),
                    }
                })?;
                Ok(JsonValue::String(text))
            } else {
                Ok(JsonValue::String(STANDARD.encode(&bytes)))
            }
        }
        Record::Repeated(r) => {
            let items = list_value(r, value, path)?;
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(encode_record(&r.elem, item, &format!("{path}[{i}]"))?);
            }
            Ok(JsonValue::Array(out))
        }
        Record::Struct(s) => encode_struct(s, value, path),
        Record::Any(_) | Record::Named(_) => Err(EncodeError::Unsupported {
            path: path.to_string(),
            kind: record.kind(),
        }),
    }
}

fn encode_scalar(kind: ScalarKind, scalar: Scalar, path: &str) -> Result<JsonValue, EncodeError> {
    let json = match scalar {
        Scalar::Bool(b) => JsonValue::Bool(b),
        Scalar::Signed(v) if kind == ScalarKind::Int64 => JsonValue::String(v.to_string()),
        Scalar::Signed(v) => JsonValue::Number(v.into()),
        Scalar::Unsigned(v) if kind == ScalarKind::Uint64 => JsonValue::String(v.to_string()),
        Scalar::Unsigned(v) => JsonValue::Number(v.into()),
        Scalar::F32(v) => JsonValue::Number(finite(v as f64, path)?),
        Scalar::F64(v) => JsonValue::Number(finite(v, path)?),
    };
    Ok(json)
}

fn finite(v: f64, path: &str) -> Result<Number, EncodeError> {
    Number::from_f64(v).ok_or_else(|| EncodeError::NonFiniteFloat {
        path: path.to_string(),
    })
}

/// Zero-value test for `omitempty`. A present optional is never empty.
fn is_empty(record: &Record, value: &Value) -> bool {
    if record.is_optional() {
        return value.is_null();
    }
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Int(v) => *v == 0,
        Value::Uint(v) => *v == 0,
        Value::Float(v) => *v == 0.0,
        Value::Bytes(b) => b.is_empty(),
        Value::Text(s) => s.is_empty(),
        Value::List(items) => items.is_empty(),
        Value::Struct(_) => false,
    }
}
