//! Schema records: the closed set of shapes a field can take on the wire.

use std::fmt;

use serde::Serialize;

use crate::model::StructField;

/// Fixed-width scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
}

impl ScalarKind {
    /// All scalar kinds, in declaration order.
    pub const ALL: [ScalarKind; 11] = [
        ScalarKind::Bool,
        ScalarKind::Int8,
        ScalarKind::Int16,
        ScalarKind::Int32,
        ScalarKind::Int64,
        ScalarKind::Uint8,
        ScalarKind::Uint16,
        ScalarKind::Uint32,
        ScalarKind::Uint64,
        ScalarKind::Float32,
        ScalarKind::Float64,
    ];

    /// Returns the canonical name (`"uint64"`, `"float32"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int8 => "int8",
            ScalarKind::Int16 => "int16",
            ScalarKind::Int32 => "int32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Uint8 => "uint8",
            ScalarKind::Uint16 => "uint16",
            ScalarKind::Uint32 => "uint32",
            ScalarKind::Uint64 => "uint64",
            ScalarKind::Float32 => "float32",
            ScalarKind::Float64 => "float64",
        }
    }

    /// Looks up a kind by its canonical name.
    pub fn from_name(name: &str) -> Option<ScalarKind> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            ScalarKind::Int8 | ScalarKind::Int16 | ScalarKind::Int32 | ScalarKind::Int64
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            ScalarKind::Uint8 | ScalarKind::Uint16 | ScalarKind::Uint32 | ScalarKind::Uint64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, ScalarKind::Float32 | ScalarKind::Float64)
    }

    /// Inclusive integer range of the kind, or `None` for bool and floats.
    pub fn integer_range(self) -> Option<(i128, i128)> {
        let range = match self {
            ScalarKind::Int8 => (i8::MIN as i128, i8::MAX as i128),
            ScalarKind::Int16 => (i16::MIN as i128, i16::MAX as i128),
            ScalarKind::Int32 => (i32::MIN as i128, i32::MAX as i128),
            ScalarKind::Int64 => (i64::MIN as i128, i64::MAX as i128),
            ScalarKind::Uint8 => (0, u8::MAX as i128),
            ScalarKind::Uint16 => (0, u16::MAX as i128),
            ScalarKind::Uint32 => (0, u32::MAX as i128),
            ScalarKind::Uint64 => (0, u64::MAX as i128),
            ScalarKind::Bool | ScalarKind::Float32 | ScalarKind::Float64 => return None,
        };
        Some(range)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte strings: `[]byte`, `[N]byte` and text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BytesRecord {
    /// Fixed length of the array, or `None` for variable length.
    pub size: Option<u64>,
    /// Hint that the bytes are text. Never changes the binary encoding and
    /// is only valid on variable-length bytes.
    pub is_string: bool,
}

/// Ordered sequences of a single element record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepeatedRecord {
    pub elem: Box<Record>,
    /// Fixed length of the array, or `None` for variable length.
    pub size: Option<u64>,
}

/// Presence tracking for a single nested record (one level only).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionalRecord {
    pub elem: Box<Record>,
}

/// An ordered list of numbered fields.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StructRecord {
    /// Declared name of the type; empty for anonymous structs.
    pub name: String,
    /// Fully-qualified origin, e.g. `net/url.URL`; empty for anonymous structs.
    pub source: String,
    pub fields: Vec<StructField>,
}

impl StructRecord {
    /// Creates an anonymous struct record.
    pub fn new(fields: Vec<StructField>) -> Self {
        Self {
            name: String::new(),
            source: String::new(),
            fields,
        }
    }

    /// Creates a named struct record.
    pub fn named(
        name: impl Into<String>,
        source: impl Into<String>,
        fields: Vec<StructField>,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            fields,
        }
    }

    /// Looks up a field by its declared name.
    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Name used in diagnostics: the declared name, or `struct` when anonymous.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "struct"
        } else {
            &self.name
        }
    }
}

/// Open/polymorphic value restricted to a set of named records. Not yet supported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnyRecord {
    pub subset: Vec<String>,
}

/// A record registered under a name for use in [`AnyRecord`]. Not yet supported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedRecord {
    pub name: String,
    pub elem: Box<Record>,
}

/// One node of a schema tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum Record {
    Scalar(ScalarKind),
    Bytes(BytesRecord),
    Repeated(RepeatedRecord),
    Optional(OptionalRecord),
    Struct(StructRecord),
    Any(AnyRecord),
    Named(NamedRecord),
}

impl Record {
    pub fn scalar(kind: ScalarKind) -> Self {
        Record::Scalar(kind)
    }

    /// Variable-length bytes.
    pub fn bytes() -> Self {
        Record::Bytes(BytesRecord {
            size: None,
            is_string: false,
        })
    }

    /// Variable-length text.
    pub fn string() -> Self {
        Record::Bytes(BytesRecord {
            size: None,
            is_string: true,
        })
    }

    /// Fixed-length bytes.
    pub fn byte_array(size: u64) -> Self {
        Record::Bytes(BytesRecord {
            size: Some(size),
            is_string: false,
        })
    }

    /// Variable-length sequence.
    pub fn repeated(elem: Record) -> Self {
        Record::Repeated(RepeatedRecord {
            elem: Box::new(elem),
            size: None,
        })
    }

    /// Fixed-length sequence.
    pub fn array(elem: Record, size: u64) -> Self {
        Record::Repeated(RepeatedRecord {
            elem: Box::new(elem),
            size: Some(size),
        })
    }

    pub fn optional(elem: Record) -> Self {
        Record::Optional(OptionalRecord {
            elem: Box::new(elem),
        })
    }

    /// Short name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Record::Scalar(_) => "scalar",
            Record::Bytes(_) => "bytes",
            Record::Repeated(_) => "repeated",
            Record::Optional(_) => "optional",
            Record::Struct(_) => "struct",
            Record::Any(_) => "any",
            Record::Named(_) => "named",
        }
    }

    pub fn as_scalar(&self) -> Option<ScalarKind> {
        match self {
            Record::Scalar(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructRecord> {
        match self {
            Record::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Record::Optional(_))
    }

    /// Returns the element of an optional record, or the record itself.
    pub fn unwrap_optional(&self) -> &Record {
        match self {
            Record::Optional(opt) => &opt.elem,
            other => other,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Record::Scalar(kind) => write!(f, "{kind}"),
            Record::Bytes(b) => match (b.size, b.is_string) {
                (None, true) => f.write_str("string"),
                (None, false) => f.write_str("bytes"),
                (Some(n), _) => write!(f, "[{n}]bytes"),
            },
            Record::Repeated(r) => match r.size {
                None => write!(f, "[]{}", r.elem),
                Some(n) => write!(f, "[{n}]{}", r.elem),
            },
            Record::Optional(o) => write!(f, "*{}", o.elem),
            Record::Struct(s) => {
                if s.name.is_empty() {
                    write!(f, "struct{{{} fields}}", s.fields.len())
                } else {
                    write!(f, "struct {}", s.name)
                }
            }
            Record::Any(a) => write!(f, "any({})", a.subset.join("|")),
            Record::Named(n) => write!(f, "{}={}", n.name, n.elem),
        }
    }
}
