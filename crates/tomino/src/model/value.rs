//! Dynamic values encoded against a schema by the reference encoder.

/// A value shaped like some [`Record`](crate::model::Record).
///
/// `Null` is an absent optional, and the zero/empty value for every other
/// record kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bytes(Vec<u8>),
    Text(String),
    List(Vec<Value>),
    Struct(StructValue),
}

impl Value {
    /// Name of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Struct(_) => "struct",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// A time instant in the well-known `{Seconds, Nanoseconds}` shape.
    ///
    /// Negative seconds are carried as their two's complement bit pattern.
    pub fn timestamp(seconds: i64, nanos: u32) -> Value {
        Self::seconds_nanos(seconds, nanos)
    }

    /// A duration in the well-known `{Seconds, Nanoseconds}` shape.
    pub fn duration(seconds: i64, nanos: u32) -> Value {
        Self::seconds_nanos(seconds, nanos)
    }

    fn seconds_nanos(seconds: i64, nanos: u32) -> Value {
        Value::Struct(
            StructValue::new()
                .with("Seconds", Value::Uint(seconds as u64))
                .with("Nanoseconds", Value::Uint(nanos as u64)),
        )
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Uint(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Uint(v as u64)
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::Uint(v as u64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(v: [u8; N]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<StructValue> for Value {
    fn from(v: StructValue) -> Self {
        Value::Struct(v)
    }
}

impl From<std::time::Duration> for Value {
    fn from(d: std::time::Duration) -> Self {
        Value::duration(d.as_secs() as i64, d.subsec_nanos())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Field values of a struct, keyed by declared field name.
///
/// Fields that are not set read as [`Value::Null`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructValue {
    fields: Vec<(String, Value)>,
}

impl StructValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a field, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Iterates over set fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_value_insert_replaces() {
        let mut v = StructValue::new().with("A", 1i64).with("B", "x");
        v.insert("A", 2i64);
        assert_eq!(v.len(), 2);
        assert_eq!(v.get("A"), Some(&Value::Int(2)));
        assert_eq!(v.get("C"), None);
        let names: Vec<_> = v.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["A", "B"]);
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(123i64)), Value::Int(123));
    }

    #[test]
    fn test_negative_duration_carried_unsigned() {
        let v = Value::duration(-1337, 1);
        let Value::Struct(s) = v else {
            panic!("expected struct");
        };
        assert_eq!(s.get("Seconds"), Some(&Value::Uint((-1337i64) as u64)));
        assert_eq!(s.get("Nanoseconds"), Some(&Value::Uint(1)));
    }

    #[test]
    fn test_std_duration_conversion() {
        let v = Value::from(std::time::Duration::new(90, 5));
        assert_eq!(v, Value::duration(90, 5));
    }
}
