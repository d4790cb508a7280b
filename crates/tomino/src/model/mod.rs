//! Schema IR types for tomino.
//!
//! This module contains the typed model of what a field is on the wire:
//! - Records (scalars, bytes, sequences, optionals, structs)
//! - Struct fields with their field numbers and encoding flags
//! - Dynamic values for the reference encoder

pub mod field;
pub mod record;
pub mod value;

pub use field::{FieldFlags, StructField};
pub use record::{
    AnyRecord, BytesRecord, NamedRecord, OptionalRecord, Record, RepeatedRecord, ScalarKind,
    StructRecord,
};
pub use value::{StructValue, Value};
