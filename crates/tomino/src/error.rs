//! Error types for schema building, validation and encoding.

use thiserror::Error;

use crate::model::ScalarKind;

/// Error while turning a type description into a schema tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("unsupported type: {ty}")]
    Unsupported { ty: String },

    #[error("double optionality in {ty}: only one level of pointer is supported")]
    DoubleOptional { ty: String },

    #[error("unknown named type: {path}")]
    UnknownType { path: String },

    #[error("{symbol} does not resolve to a struct (got {record})")]
    NotAStruct { symbol: String, record: String },

    #[error("named type cycle: {}", .chain.join(" -> "))]
    Cycle { chain: Vec<String> },

    #[error("schema nesting exceeds maximum depth {max}")]
    DepthExceeded { max: usize },

    #[error("struct with {count} fields exceeds the maximum field number {max}")]
    TooManyFields { count: usize, max: u32 },

    #[error("array of length {len} exceeds maximum {max}")]
    ArrayTooLong { len: u64, max: u64 },
}

/// Error parsing a qualified symbol such as `net/url.URL`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid symbol {symbol:?}: need a qualified symbol, like 'net/url.URL'")]
pub struct ParsePathError {
    pub symbol: String,
}

/// Error during whole-tree consistency checking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field {field}: invalid record for usage with {flag}: {record}")]
    FixedWidthMismatch {
        field: String,
        flag: &'static str,
        record: String,
    },

    #[error("field {field}: fixed64 and fixed32 are mutually exclusive")]
    ConflictingFixedWidth { field: String },

    #[error("field {field}: floating points must be used with the `amino:\"unsafe\"` struct tag ({record})")]
    UnsafeFloat { field: String, record: String },

    #[error("field {field}: lists of uint8 must be represented as bytes")]
    ByteElementList { field: String },

    #[error("field {field}: string hint cannot be combined with fixed size {size}")]
    FixedSizeString { field: String, size: u64 },

    #[error("field {field}: nested optional records are not supported")]
    NestedOptional { field: String },

    #[error("field {field}: field number {number} out of range 1..={max}")]
    FieldNumberOutOfRange { field: String, number: u32, max: u32 },

    #[error("field {field}: field number {number} must be greater than {previous}")]
    FieldNumberOrder {
        field: String,
        number: u32,
        previous: u32,
    },

    #[error("field {field}: {kind} records are not yet supported")]
    Unsupported { field: String, kind: &'static str },
}

/// Error computing a wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("cannot compute a tag for an optional record; unwrap it first")]
    OptionalRecord,
}

/// Error during binary or JSON encoding of a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    #[error("{path}: expected {expected}, found {found} value")]
    TypeMismatch {
        path: String,
        expected: String,
        found: &'static str,
    },

    #[error("{path}: value {value} out of range for {kind}")]
    IntegerOutOfRange {
        path: String,
        kind: ScalarKind,
        value: i128,
    },

    #[error("{path}: expected {expected} elements, found {actual}")]
    SizeMismatch {
        path: String,
        expected: u64,
        actual: usize,
    },

    #[error("{path}: unknown field {name:?}")]
    UnknownField { path: String, name: String },

    #[error("{path}: {kind} records are not yet supported")]
    Unsupported { path: String, kind: &'static str },

    #[error("{path}: string is not valid UTF-8")]
    InvalidUtf8 { path: String },

    #[error("{path}: float value is not finite")]
    NonFiniteFloat { path: String },

    #[error("{path}: array of length {len} exceeds maximum {max}")]
    ArrayTooLong { path: String, len: u64, max: u64 },

    #[error(transparent)]
    Tag(#[from] TagError),
}

/// Error from the build-then-validate pipeline, naming the failing symbol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("building IR for {symbol}: {source}")]
    Build {
        symbol: String,
        #[source]
        source: BuildError,
    },

    #[error("validating IR for {symbol}: {source}")]
    Validation {
        symbol: String,
        #[source]
        source: ValidationError,
    },
}

impl GenerateError {
    /// Returns the symbol the error refers to.
    pub fn symbol(&self) -> &str {
        match self {
            GenerateError::Build { symbol, .. } | GenerateError::Validation { symbol, .. } => {
                symbol
            }
        }
    }
}
