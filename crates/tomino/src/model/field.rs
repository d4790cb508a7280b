//! Struct fields and their encoding flags.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Serialize, Serializer};

use crate::model::Record;

/// Per-field encoding flags.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FieldFlags(u8);

impl FieldFlags {
    /// Encode as fixed64 (`binary:"fixed64"`).
    pub const FIXED64: FieldFlags = FieldFlags(1 << 0);
    /// Encode as fixed32 (`binary:"fixed32"`).
    pub const FIXED32: FieldFlags = FieldFlags(1 << 1);
    /// Permit floating point (`amino:"unsafe"`).
    pub const UNSAFE: FieldFlags = FieldFlags(1 << 2);
    /// Write the field even when it holds the zero value (`amino:"write_empty"`).
    pub const WRITE_EMPTY: FieldFlags = FieldFlags(1 << 3);
    /// Decode empty list elements as absent (`amino:"nil_elements"`).
    pub const NIL_ELEMENTS: FieldFlags = FieldFlags(1 << 4);
    /// Omit zero values from JSON (`json:",omitempty"`).
    pub const JSON_OMIT_EMPTY: FieldFlags = FieldFlags(1 << 5);

    const NAMES: [(FieldFlags, &'static str); 6] = [
        (FieldFlags::FIXED64, "fixed64"),
        (FieldFlags::FIXED32, "fixed32"),
        (FieldFlags::UNSAFE, "unsafe"),
        (FieldFlags::WRITE_EMPTY, "write_empty"),
        (FieldFlags::NIL_ELEMENTS, "nil_elements"),
        (FieldFlags::JSON_OMIT_EMPTY, "json_omit_empty"),
    ];

    pub const fn empty() -> Self {
        FieldFlags(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every flag in `other` is set.
    pub const fn contains(self, other: FieldFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: FieldFlags) -> Self {
        FieldFlags(self.0 | other.0)
    }

    pub fn insert(&mut self, other: FieldFlags) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: FieldFlags) {
        self.0 &= !other.0;
    }

    /// Names of the set flags, in a fixed order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMES
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }

    /// Looks up a flag by name.
    pub fn from_name(name: &str) -> Option<FieldFlags> {
        Self::NAMES
            .into_iter()
            .find(|(_, n)| *n == name)
            .map(|(flag, _)| flag)
    }
}

impl BitOr for FieldFlags {
    type Output = FieldFlags;

    fn bitor(self, rhs: FieldFlags) -> FieldFlags {
        self.union(rhs)
    }
}

impl BitOrAssign for FieldFlags {
    fn bitor_assign(&mut self, rhs: FieldFlags) {
        self.insert(rhs);
    }
}

impl fmt::Display for FieldFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, name) in self.names().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

impl fmt::Debug for FieldFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldFlags({self})")
    }
}

impl Serialize for FieldFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}

/// A numbered field of a [`StructRecord`](crate::model::StructRecord).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructField {
    /// Declared identifier in the host type.
    pub name: String,
    pub record: Record,
    /// Key used by the JSON encoding.
    pub json_name: String,
    /// Field number; the only input to the tag bytes.
    pub bin_field_num: u32,
    pub flags: FieldFlags,
}

impl StructField {
    /// Creates a field whose JSON name is its declared name and with no flags.
    pub fn new(name: impl Into<String>, record: Record, bin_field_num: u32) -> Self {
        let name = name.into();
        Self {
            json_name: name.clone(),
            name,
            record,
            bin_field_num,
            flags: FieldFlags::empty(),
        }
    }

    pub fn with_json_name(mut self, json_name: impl Into<String>) -> Self {
        self.json_name = json_name.into();
        self
    }

    pub fn with_flags(mut self, flags: FieldFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn has(&self, flag: FieldFlags) -> bool {
        self.flags.contains(flag)
    }

    /// Whether zero values are still written. Always true for optional fields.
    pub fn write_empty(&self) -> bool {
        self.has(FieldFlags::WRITE_EMPTY) || self.record.is_optional()
    }
}

impl fmt::Display for StructField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}={}[{}] {{ {} }}",
            self.bin_field_num, self.name, self.flags, self.record
        )
    }
}
