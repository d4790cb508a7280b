//! Host type descriptions: the input to the schema builder.
//!
//! A [`TypeUniverse`] holds the named type definitions of a program. Each
//! definition maps a [`TypePath`] to the [`TypeDesc`] of its underlying type,
//! which may in turn reference other named types.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::ParsePathError;
use crate::schema::annotations::RawAnnotations;

/// Basic kinds of the host type system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
    Byte,
    Rune,
    UnsafePointer,
}

impl BasicKind {
    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Complex64 => "complex64",
            BasicKind::Complex128 => "complex128",
            BasicKind::String => "string",
            BasicKind::Byte => "byte",
            BasicKind::Rune => "rune",
            BasicKind::UnsafePointer => "unsafe.Pointer",
        }
    }
}

impl fmt::Display for BasicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fully-qualified name of a named type: package path plus type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypePath {
    pub package: String,
    pub name: String,
}

impl TypePath {
    /// Creates a path from a package path and a type name.
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Parses a qualified symbol such as `net/url.URL` or
    /// `github.com/a/b.Type`, splitting at the last `.` after the last `/`.
    pub fn parse_qualified(symbol: &str) -> Result<Self, ParsePathError> {
        let err = || ParsePathError {
            symbol: symbol.to_string(),
        };
        let last_part_start = symbol.rfind('/').map_or(0, |i| i + 1);
        let dot = symbol[last_part_start..].rfind('.').ok_or_else(err)?;
        let (package, name) = symbol.split_at(last_part_start + dot);
        let name = &name[1..];
        if package.is_empty() || name.is_empty() {
            return Err(err());
        }
        Ok(Self::new(package, name))
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}.{}", self.package, self.name)
        }
    }
}

impl std::str::FromStr for TypePath {
    type Err = ParsePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_qualified(s)
    }
}

/// Shape of a host type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDesc {
    Basic {
        name: BasicKind,
    },
    Pointer {
        elem: Box<TypeDesc>,
    },
    Array {
        len: u64,
        elem: Box<TypeDesc>,
    },
    Slice {
        elem: Box<TypeDesc>,
    },
    Struct {
        fields: Vec<FieldDesc>,
    },
    /// Reference to a named type defined in the universe.
    Named(TypePath),
    Interface {
        #[serde(default)]
        methods: Vec<String>,
    },
    /// Anything else (maps, channels, functions...), kept for diagnostics.
    Other {
        description: String,
    },
}

impl TypeDesc {
    pub fn basic(name: BasicKind) -> Self {
        TypeDesc::Basic { name }
    }

    pub fn pointer(elem: TypeDesc) -> Self {
        TypeDesc::Pointer {
            elem: Box::new(elem),
        }
    }

    pub fn array(len: u64, elem: TypeDesc) -> Self {
        TypeDesc::Array {
            len,
            elem: Box::new(elem),
        }
    }

    pub fn slice(elem: TypeDesc) -> Self {
        TypeDesc::Slice {
            elem: Box::new(elem),
        }
    }

    pub fn strukt(fields: Vec<FieldDesc>) -> Self {
        TypeDesc::Struct { fields }
    }

    pub fn named(package: impl Into<String>, name: impl Into<String>) -> Self {
        TypeDesc::Named(TypePath::new(package, name))
    }

    pub fn other(description: impl Into<String>) -> Self {
        TypeDesc::Other {
            description: description.into(),
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Basic { name } => write!(f, "{name}"),
            TypeDesc::Pointer { elem } => write!(f, "*{elem}"),
            TypeDesc::Array { len, elem } => write!(f, "[{len}]{elem}"),
            TypeDesc::Slice { elem } => write!(f, "[]{elem}"),
            TypeDesc::Struct { fields } => {
                f.write_str("struct{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{} {}", field.name, field.ty)?;
                }
                f.write_str("}")
            }
            TypeDesc::Named(path) => write!(f, "{path}"),
            TypeDesc::Interface { methods } => write!(f, "interface{{{}}}", methods.join("; ")),
            TypeDesc::Other { description } => f.write_str(description),
        }
    }
}

fn default_exported() -> bool {
    true
}

/// A declared struct field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDesc {
    pub name: String,
    /// Unexported fields are never encoded.
    #[serde(default = "default_exported")]
    pub exported: bool,
    #[serde(default)]
    pub annotations: RawAnnotations,
    #[serde(rename = "type")]
    pub ty: TypeDesc,
}

impl FieldDesc {
    /// Creates an exported field without annotations.
    pub fn new(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self {
            name: name.into(),
            exported: true,
            annotations: RawAnnotations::default(),
            ty,
        }
    }

    pub fn unexported(mut self) -> Self {
        self.exported = false;
        self
    }

    /// Sets the annotations from a struct tag string, e.g.
    /// `binary:"fixed64" json:"a,omitempty"`.
    pub fn with_tag(mut self, tag: &str) -> Self {
        self.annotations = RawAnnotations::from_struct_tag(tag);
        self
    }

    pub fn with_annotations(mut self, annotations: RawAnnotations) -> Self {
        self.annotations = annotations;
        self
    }
}

/// A named type definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    #[serde(flatten)]
    pub path: TypePath,
    pub underlying: TypeDesc,
}

#[derive(Deserialize)]
struct UniverseRepr {
    types: Vec<TypeDef>,
}

/// Named type definitions, keyed by path.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "UniverseRepr")]
pub struct TypeUniverse {
    types: FxHashMap<TypePath, TypeDesc>,
}

impl From<UniverseRepr> for TypeUniverse {
    fn from(repr: UniverseRepr) -> Self {
        let mut universe = TypeUniverse::new();
        for def in repr.types {
            universe.define(def.path, def.underlying);
        }
        universe
    }
}

impl TypeUniverse {
    /// Creates an empty universe.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a universe from its JSON form: `{"types": [{package, name, underlying}]}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Adds a definition, returning the one it replaced.
    pub fn define(&mut self, path: TypePath, underlying: TypeDesc) -> Option<TypeDesc> {
        self.types.insert(path, underlying)
    }

    /// Adds a definition, builder-style.
    pub fn with(mut self, path: TypePath, underlying: TypeDesc) -> Self {
        self.define(path, underlying);
        self
    }

    /// Returns the underlying shape of a named type.
    pub fn lookup(&self, path: &TypePath) -> Option<&TypeDesc> {
        self.types.get(path)
    }

    /// Defined paths, sorted.
    pub fn paths(&self) -> Vec<&TypePath> {
        let mut paths: Vec<_> = self.types.keys().collect();
        paths.sort();
        paths
    }

    /// Number of named types defined.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_qualified() {
        assert_eq!(
            TypePath::parse_qualified("net/url.URL").unwrap(),
            TypePath::new("net/url", "URL")
        );
        assert_eq!(
            TypePath::parse_qualified("github.com/thehowl/tomino/generator.TestType").unwrap(),
            TypePath::new("github.com/thehowl/tomino/generator", "TestType")
        );
        assert_eq!(
            TypePath::parse_qualified("time.Duration").unwrap(),
            TypePath::new("time", "Duration")
        );
        assert!(TypePath::parse_qualified("github.com/a/b").is_err());
        assert!(TypePath::parse_qualified("URL").is_err());
        assert!(TypePath::parse_qualified("net/url.").is_err());
        assert!(TypePath::parse_qualified(".URL").is_err());
    }

    #[test]
    fn test_type_path_display() {
        assert_eq!(TypePath::new("net/url", "URL").to_string(), "net/url.URL");
        let parsed: TypePath = "time.Time".parse().unwrap();
        assert_eq!(parsed.to_string(), "time.Time");
    }

    #[test]
    fn test_type_desc_display() {
        let ty = TypeDesc::slice(TypeDesc::strukt(vec![
            FieldDesc::new("A", TypeDesc::basic(BasicKind::Int)),
            FieldDesc::new("B", TypeDesc::pointer(TypeDesc::array(4, TypeDesc::basic(BasicKind::Byte)))),
        ]));
        assert_eq!(ty.to_string(), "[]struct{A int; B *[4]byte}");
        assert_eq!(TypeDesc::named("time", "Time").to_string(), "time.Time");
    }

    #[test]
    fn test_universe_from_json() {
        let universe = TypeUniverse::from_json(
            r#"{
                "types": [
                    {
                        "package": "example.com/p",
                        "name": "T",
                        "underlying": {
                            "kind": "struct",
                            "fields": [
                                {
                                    "name": "A",
                                    "type": { "kind": "basic", "name": "uint64" },
                                    "annotations": { "binary": "fixed64", "amino": "unsafe" }
                                },
                                { "name": "b", "exported": false, "type": { "kind": "basic", "name": "int" } },
                                {
                                    "name": "When",
                                    "type": { "kind": "named", "package": "time", "name": "Time" }
                                }
                            ]
                        }
                    },
                    {
                        "package": "example.com/p",
                        "name": "Ints",
                        "underlying": { "kind": "slice", "elem": { "kind": "basic", "name": "int" } }
                    }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(universe.len(), 2);
        let path = TypePath::new("example.com/p", "T");
        let TypeDesc::Struct { fields } = universe.lookup(&path).unwrap() else {
            panic!("expected struct");
        };
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].annotations.binary, "fixed64");
        assert_eq!(fields[0].annotations.codec, "unsafe");
        assert!(fields[0].exported);
        assert!(!fields[1].exported);
        assert_eq!(fields[2].ty, TypeDesc::named("time", "Time"));

        let paths: Vec<String> = universe.paths().iter().map(|p| p.to_string()).collect();
        assert_eq!(paths, ["example.com/p.Ints", "example.com/p.T"]);
    }

    #[test]
    fn test_define_replaces() {
        let mut universe = TypeUniverse::new();
        let path = TypePath::new("p", "T");
        assert!(universe.define(path.clone(), TypeDesc::basic(BasicKind::Int)).is_none());
        let old = universe.define(path.clone(), TypeDesc::basic(BasicKind::Bool));
        assert_eq!(old, Some(TypeDesc::basic(BasicKind::Int)));
        assert_eq!(universe.lookup(&path), Some(&TypeDesc::basic(BasicKind::Bool)));
    }
}
