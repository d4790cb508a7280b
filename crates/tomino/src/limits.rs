//! Fixed limits of the amino wire format and of the schema builder.

/// Maximum encoded length of a 64-bit varint.
pub const MAX_VARINT_BYTES: usize = 10;

/// Largest field number that still fits in a wire tag.
///
/// Tags are `(field_number << 3) | wire_type`; beyond this the field number
/// no longer round-trips through 32-bit tag decoders.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Default nesting bound for schema resolution.
pub const MAX_SCHEMA_DEPTH: usize = 64;

/// Maximum length of a fixed-size array.
///
/// The zero value of an array is encoded as every one of its elements.
pub const MAX_ARRAY_LEN: u64 = 1 << 20;
