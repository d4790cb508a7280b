//! Well-known types with a fixed, portable wire shape.
//!
//! `time.Time` and `time.Duration` are both encoded as
//! `{Seconds uint64 = 1; Nanoseconds uint32 = 2}` instead of their
//! host-specific representation. Negative seconds travel as their two's
//! complement bit pattern.

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::model::{Record, ScalarKind, StructField, StructRecord};
use crate::schema::desc::TypePath;

/// Package holding the well-known time types.
pub const TIME_PACKAGE: &str = "time";

lazy_static! {
    static ref WELL_KNOWN: FxHashMap<TypePath, StructRecord> = {
        let mut table = FxHashMap::default();
        for name in ["Time", "Duration"] {
            let path = TypePath::new(TIME_PACKAGE, name);
            let record = seconds_nanos(name, &path.to_string());
            table.insert(path, record);
        }
        table
    };
}

fn seconds_nanos(name: &str, source: &str) -> StructRecord {
    StructRecord::named(
        name,
        source,
        vec![
            StructField::new("Seconds", Record::scalar(ScalarKind::Uint64), 1)
                .with_json_name("seconds"),
            StructField::new("Nanoseconds", Record::scalar(ScalarKind::Uint32), 2)
                .with_json_name("nanoseconds"),
        ],
    )
}

/// Returns the normalized record of a well-known type.
pub fn lookup(path: &TypePath) -> Option<StructRecord> {
    WELL_KNOWN.get(path).cloned()
}

pub fn is_well_known(path: &TypePath) -> bool {
    WELL_KNOWN.contains_key(path)
}
