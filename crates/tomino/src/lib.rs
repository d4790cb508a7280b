//! tomino: schema IR and wire encoding for amino-compatible binary codecs.
//!
//! This crate turns host type descriptions into a language-neutral schema
//! tree, validates it, and computes everything a code generator needs to
//! emit marshalers that are byte-compatible with amino.
//!
//! # Overview
//!
//! - Fields are numbered by declaration order, starting at 1
//! - Annotations carry JSON names, fixed-width hints and codec hints
//! - `time.Time` and `time.Duration` are normalized to `{Seconds, Nanoseconds}`
//! - A reference encoder produces the exact bytes generated code must match
//!
//! # Quick Start
//!
//! ```rust
//! use tomino::{BasicKind, FieldDesc, StructValue, TypeDesc, TypePath, TypeUniverse, Value};
//! use tomino::codec::encode;
//! use tomino::schema::{BuildOptions, generate};
//!
//! let path = TypePath::parse_qualified("example.com/demo.Point").unwrap();
//! let universe = TypeUniverse::new().with(
//!     path.clone(),
//!     TypeDesc::strukt(vec![
//!         FieldDesc::new("X", TypeDesc::basic(BasicKind::Int)),
//!         FieldDesc::new("Label", TypeDesc::basic(BasicKind::String)).with_tag(r#"json:"label""#),
//!     ]),
//! );
//!
//! // Build and validate
//! let records = generate(&universe, &[path], BuildOptions::default()).unwrap();
//! let point = &records[0];
//! assert_eq!(point.fields[0].to_string(), "0001=X[] { int64 }");
//!
//! // Encode a value
//! let value = Value::Struct(StructValue::new().with("X", 3i64).with("Label", "a"));
//! let bytes = encode(point, &value).unwrap();
//! assert_eq!(bytes, [0x08, 0x06, 0x12, 0x01, b'a']);
//! ```
//!
//! # Modules
//!
//! - [`model`]: Schema records, struct fields and dynamic values
//! - [`schema`]: Type universe, annotation parsing and the schema builder
//! - [`validate`]: Whole-tree consistency checks
//! - [`codec`]: Wire primitives, tags and the reference encoders
//! - [`error`]: Error types
//! - [`limits`]: Wire format and builder limits

pub mod codec;
pub mod error;
pub mod limits;
pub mod model;
pub mod schema;
pub mod validate;

// Re-export commonly used types at crate root
pub use codec::{Tag, WireType, encode, encode_json};
pub use error::{BuildError, EncodeError, GenerateError, ParsePathError, TagError, ValidationError};
pub use model::{
    FieldFlags, Record, ScalarKind, StructField, StructRecord, StructValue, Value,
};
pub use schema::{
    BasicKind, BuildOptions, Builder, FieldDesc, RawAnnotations, TypeDesc, TypePath,
    TypeUniverse, generate,
};
pub use validate::{validate_record, validate_struct};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
