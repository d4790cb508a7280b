//! Whole-tree consistency checks.
//!
//! A tree that passes validation has a well-defined wire encoding: every
//! fixed-width flag sits on a matching scalar, floats are explicitly allowed,
//! and field numbers are in range and strictly increasing.

use crate::error::ValidationError;
use crate::limits::MAX_FIELD_NUMBER;
use crate::model::{FieldFlags, Record, ScalarKind, StructField, StructRecord};

/// Validates a struct record and everything reachable from it.
pub fn validate_struct(record: &StructRecord) -> Result<(), ValidationError> {
    check_struct(record, record.display_name())
}

/// Validates a record that is not a field of any struct.
pub fn validate_record(record: &Record) -> Result<(), ValidationError> {
    match record {
        Record::Struct(s) => validate_struct(s),
        other => check_record(other, FieldFlags::empty(), "<root>"),
    }
}

fn check_struct(record: &StructRecord, prefix: &str) -> Result<(), ValidationError> {
    let mut previous = 0;
    for field in &record.fields {
        let path = format!("{prefix}.{}", field.name);
        let number = field.bin_field_num;
        if number == 0 || number > MAX_FIELD_NUMBER {
            return Err(ValidationError::FieldNumberOutOfRange {
                field: path,
                number,
                max: MAX_FIELD_NUMBER,
            });
        }
        if number <= previous {
            return Err(ValidationError::FieldNumberOrder {
                field: path,
                number,
                previous,
            });
        }
        previous = number;
        check_field(field, &path)?;
    }
    Ok(())
}

fn check_field(field: &StructField, path: &str) -> Result<(), ValidationError> {
    let fixed64 = field.has(FieldFlags::FIXED64);
    let fixed32 = field.has(FieldFlags::FIXED32);
    if fixed64 && fixed32 {
        return Err(ValidationError::ConflictingFixedWidth {
            field: path.to_string(),
        });
    }

    // Fixed-width flags apply to plain scalars only, never to optionals.
    let allowed: &[ScalarKind] = if fixed64 {
        &[ScalarKind::Uint64, ScalarKind::Int64, ScalarKind::Float64]
    } else if fixed32 {
        &[ScalarKind::Uint32, ScalarKind::Int32, ScalarKind::Float32]
    } else {
        &[]
    };
    if fixed64 || fixed32 {
        let ok = field.record.as_scalar().is_some_and(|kind| allowed.contains(&kind));
        if !ok {
            return Err(ValidationError::FixedWidthMismatch {
                field: path.to_string(),
                flag: if fixed64 { "fixed64" } else { "fixed32" },
                record: field.record.to_string(),
            });
        }
    }

    check_record(&field.record, field.flags, path)
}

fn check_record(record: &Record, flags: FieldFlags, path: &str) -> Result<(), ValidationError> {
    match record {
        Record::Scalar(kind) => {
            if kind.is_float() && !flags.contains(FieldFlags::UNSAFE) {
                return Err(ValidationError::UnsafeFloat {
                    field: path.to_string(),
                    record: kind.to_string(),
                });
            }
            Ok(())
        }
        Record::Bytes(b) => match (b.is_string, b.size) {
            (true, Some(size)) => Err(ValidationError::FixedSizeString {
                field: path.to_string(),
                size,
            }),
            _ => Ok(()),
        },
        Record::Repeated(r) => {
            if *r.elem == Record::Scalar(ScalarKind::Uint8) {
                return Err(ValidationError::ByteElementList {
                    field: path.to_string(),
                });
            }
            check_record(&r.elem, flags, &format!("{path}[]"))
        }
        Record::Optional(o) => {
            if o.elem.is_optional() {
                return Err(ValidationError::NestedOptional {
                    field: path.to_string(),
                });
            }
            check_record(&o.elem, flags, path)
        }
        Record::Struct(s) => check_struct(s, path),
        Record::Any(_) | Record::Named(_) => Err(ValidationError::Unsupported {
            field: path.to_string(),
            kind: record.kind(),
        }),
    }
}
