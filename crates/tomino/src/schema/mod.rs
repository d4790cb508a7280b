//! Schema construction from host type descriptions.
//!
//! - [`desc`]: the type universe handed in by a front end
//! - [`annotations`]: per-field hint parsing
//! - [`well_known`]: fixed shapes for time types
//! - [`builder`]: resolution into a [`StructRecord`] tree

pub mod annotations;
pub mod builder;
pub mod desc;
pub mod well_known;

pub use annotations::{FieldAnnotations, RawAnnotations, parse_annotations};
pub use builder::{BuildOptions, Builder, build};
pub use desc::{BasicKind, FieldDesc, TypeDef, TypeDesc, TypePath, TypeUniverse};

use crate::error::GenerateError;
use crate::model::StructRecord;
use crate::validate::validate_struct;

/// Builds and validates the struct record of every symbol, in order.
///
/// One builder is shared across the run, so named types are resolved once.
/// Stops at the first failing symbol.
#[tracing::instrument(skip_all, fields(symbols = symbols.len()))]
pub fn generate(
    universe: &TypeUniverse,
    symbols: &[TypePath],
    options: BuildOptions,
) -> Result<Vec<StructRecord>, GenerateError> {
    let mut builder = Builder::with_options(universe, options);
    let mut records = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let record = builder
            .build_symbol(symbol)
            .map_err(|source| GenerateError::Build {
                symbol: symbol.to_string(),
                source,
            })?;
        validate_struct(&record).map_err(|source| GenerateError::Validation {
            symbol: symbol.to_string(),
            source,
        })?;
        tracing::debug!(%symbol, fields = record.fields.len(), "generated record");
        records.push(record);
    }
    Ok(records)
}
