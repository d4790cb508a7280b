//! Schema builder: resolves host type descriptions into schema trees.
//!
//! Fields are numbered by declaration order among the retained fields, so
//! skipped fields consume no number. Named types are resolved through the
//! well-known table first, then through the [`TypeUniverse`].

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::error::BuildError;
use crate::limits::{MAX_ARRAY_LEN, MAX_FIELD_NUMBER, MAX_SCHEMA_DEPTH};
use crate::model::{FieldFlags, Record, ScalarKind, StructField, StructRecord};
use crate::schema::annotations::parse_annotations;
use crate::schema::desc::{BasicKind, FieldDesc, TypeDesc, TypePath, TypeUniverse};
use crate::schema::well_known;

/// Options for schema building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Maximum nesting of type descriptions before giving up.
    pub max_depth: usize,
    /// Reuse resolved named types within one builder.
    pub cache_named: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_SCHEMA_DEPTH,
            cache_named: true,
        }
    }
}

impl BuildOptions {
    /// Creates options with the default depth bound and caching on.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Disables the named-type cache.
    pub fn without_cache(mut self) -> Self {
        self.cache_named = false;
        self
    }
}

/// Resolves type descriptions from one universe.
///
/// A builder keeps a cache of resolved named types; use one builder per
/// thread.
pub struct Builder<'u> {
    universe: &'u TypeUniverse,
    options: BuildOptions,
    cache: FxHashMap<TypePath, Record>,
    /// Named types currently being resolved, outermost first.
    resolving: Vec<TypePath>,
    depth: usize,
}

impl<'u> Builder<'u> {
    /// Creates a builder with default options.
    pub fn new(universe: &'u TypeUniverse) -> Self {
        Self::with_options(universe, BuildOptions::default())
    }

    /// Creates a builder with the given options.
    pub fn with_options(universe: &'u TypeUniverse, options: BuildOptions) -> Self {
        Self {
            universe,
            options,
            cache: FxHashMap::default(),
            resolving: Vec::new(),
            depth: 0,
        }
    }

    /// Returns the options this builder was created with.
    pub fn options(&self) -> BuildOptions {
        self.options
    }

    /// Builds the struct record of a named type.
    #[tracing::instrument(level = "debug", skip_all, fields(symbol = %path))]
    pub fn build_symbol(&mut self, path: &TypePath) -> Result<StructRecord, BuildError> {
        match self.resolve_named(path)? {
            Record::Struct(record) => Ok(record),
            other => Err(BuildError::NotAStruct {
                symbol: path.to_string(),
                record: other.to_string(),
            }),
        }
    }

    /// Resolves a type description into a record.
    pub fn resolve(&mut self, desc: &TypeDesc) -> Result<Record, BuildError> {
        if self.depth >= self.options.max_depth {
            return Err(BuildError::DepthExceeded {
                max: self.options.max_depth,
            });
        }
        self.depth += 1;
        let result = self.resolve_desc(desc);
        self.depth -= 1;
        result
    }

    fn resolve_desc(&mut self, desc: &TypeDesc) -> Result<Record, BuildError> {
        match desc {
            TypeDesc::Basic { name } => resolve_basic(*name),
            TypeDesc::Pointer { elem } => {
                let elem = self.resolve(elem)?;
                if elem.is_optional() {
                    return Err(BuildError::DoubleOptional {
                        ty: desc.to_string(),
                    });
                }
                Ok(Record::optional(elem))
            }
            TypeDesc::Array { len, elem } => {
                if *len > MAX_ARRAY_LEN {
                    return Err(BuildError::ArrayTooLong {
                        len: *len,
                        max: MAX_ARRAY_LEN,
                    });
                }
                let elem = self.resolve(elem)?;
                if is_byte(&elem) {
                    Ok(Record::byte_array(*len))
                } else {
                    Ok(Record::array(elem, *len))
                }
            }
            TypeDesc::Slice { elem } => {
                let elem = self.resolve(elem)?;
                if is_byte(&elem) {
                    Ok(Record::bytes())
                } else {
                    Ok(Record::repeated(elem))
                }
            }
            TypeDesc::Struct { fields } => self.resolve_struct(fields).map(Record::Struct),
            TypeDesc::Named(path) => self.resolve_named(path),
            TypeDesc::Interface { .. } | TypeDesc::Other { .. } => Err(BuildError::Unsupported {
                ty: desc.to_string(),
            }),
        }
    }

    fn resolve_named(&mut self, path: &TypePath) -> Result<Record, BuildError> {
        if let Some(record) = well_known::lookup(path) {
            debug!(%path, "well-known type");
            return Ok(Record::Struct(record));
        }

        if self.options.cache_named {
            if let Some(record) = self.cache.get(path) {
                return Ok(record.clone());
            }
        }

        if let Some(start) = self.resolving.iter().position(|p| p == path) {
            let mut chain: Vec<String> = self.resolving[start..]
                .iter()
                .map(ToString::to_string)
                .collect();
            chain.push(path.to_string());
            return Err(BuildError::Cycle { chain });
        }

        let universe = self.universe;
        let underlying = universe
            .lookup(path)
            .ok_or_else(|| BuildError::UnknownType {
                path: path.to_string(),
            })?;

        debug!(%path, "resolving named type");
        self.resolving.push(path.clone());
        let result = self.resolve(underlying);
        self.resolving.pop();

        let mut record = result?;
        if let Record::Struct(s) = &mut record {
            s.name = path.name.clone();
            s.source = path.to_string();
        }
        if self.options.cache_named {
            self.cache.insert(path.clone(), record.clone());
        }
        Ok(record)
    }

    fn resolve_struct(&mut self, fields: &[FieldDesc]) -> Result<StructRecord, BuildError> {
        let mut out: Vec<StructField> = Vec::with_capacity(fields.len());
        for desc in fields {
            if !desc.exported {
                trace!(field = %desc.name, "skipping unexported field");
                continue;
            }
            let Some(annotations) = parse_annotations(&desc.annotations) else {
                trace!(field = %desc.name, "skipping field");
                continue;
            };

            let number = next_field_number(out.len())?;

            let record = self.resolve(&desc.ty)?;
            let mut flags = annotations.flags;
            if record.is_optional() {
                flags |= FieldFlags::WRITE_EMPTY;
            }
            let json_name = annotations.json_name.unwrap_or_else(|| desc.name.clone());
            trace!(field = %desc.name, number, %record, "numbered field");
            out.push(StructField {
                name: desc.name.clone(),
                record,
                json_name,
                bin_field_num: number,
                flags,
            });
        }
        Ok(StructRecord::new(out))
    }
}

/// Number of the field retained after `retained` others.
fn next_field_number(retained: usize) -> Result<u32, BuildError> {
    let count = retained + 1;
    match u32::try_from(count) {
        Ok(number) if number <= MAX_FIELD_NUMBER => Ok(number),
        _ => Err(BuildError::TooManyFields {
            count,
            max: MAX_FIELD_NUMBER,
        }),
    }
}

fn is_byte(record: &Record) -> bool {
    *record == Record::Scalar(ScalarKind::Uint8)
}

fn resolve_basic(kind: BasicKind) -> Result<Record, BuildError> {
    let scalar = match kind {
        BasicKind::Bool => ScalarKind::Bool,
        BasicKind::Int8 => ScalarKind::Int8,
        BasicKind::Int16 => ScalarKind::Int16,
        BasicKind::Int32 | BasicKind::Rune => ScalarKind::Int32,
        BasicKind::Int64 | BasicKind::Int => ScalarKind::Int64,
        BasicKind::Uint8 | BasicKind::Byte => ScalarKind::Uint8,
        BasicKind::Uint16 => ScalarKind::Uint16,
        BasicKind::Uint32 => ScalarKind::Uint32,
        BasicKind::Uint64 | BasicKind::Uint => ScalarKind::Uint64,
        BasicKind::Float32 => ScalarKind::Float32,
        BasicKind::Float64 => ScalarKind::Float64,
        BasicKind::String => return Ok(Record::string()),
        BasicKind::Uintptr
        | BasicKind::Complex64
        | BasicKind::Complex128
        | BasicKind::UnsafePointer => {
            return Err(BuildError::Unsupported {
                ty: kind.to_string(),
            });
        }
    };
    Ok(Record::scalar(scalar))
}

/// Builds the struct record of `path` with default options.
pub fn build(universe: &TypeUniverse, path: &TypePath) -> Result<StructRecord, BuildError> {
    Builder::new(universe).build_symbol(path)
}
