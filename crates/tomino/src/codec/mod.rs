//! Binary and JSON encoding for tomino schemas.
//!
//! The binary form is the amino wire format: tagged fields in increasing
//! field-number order, zero values omitted. The JSON form follows amino's
//! JSON conventions.

pub mod binary;
pub mod json;
pub mod primitives;
pub mod tag;

pub use binary::{encode, encode_into};
pub use json::{encode_json, encode_json_string};
pub use primitives::Writer;
pub use tag::{Tag, WireType, wire_type_for};
