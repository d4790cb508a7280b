//! Field annotation parsing.
//!
//! Fields carry three annotation namespaces: `binary` (fixed-width hints),
//! `amino` (codec hints) and `json` (name and omitempty). Parsing yields the
//! field's JSON name and flags, or `None` if the field is skipped.

use serde::{Deserialize, Serialize};

use crate::model::FieldFlags;

/// Raw annotation strings of one field, one per namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAnnotations {
    pub binary: String,
    #[serde(alias = "amino")]
    pub codec: String,
    pub json: String,
}

impl RawAnnotations {
    pub fn new(binary: &str, codec: &str, json: &str) -> Self {
        Self {
            binary: binary.to_string(),
            codec: codec.to_string(),
            json: json.to_string(),
        }
    }

    /// Extracts the namespaces from a struct tag string such as
    /// `binary:"fixed64" amino:"unsafe" json:"a,omitempty"`.
    ///
    /// Missing keys read as empty. Parsing stops at the first malformed pair.
    pub fn from_struct_tag(tag: &str) -> Self {
        Self {
            binary: lookup_tag(tag, "binary").unwrap_or_default(),
            codec: lookup_tag(tag, "amino").unwrap_or_default(),
            json: lookup_tag(tag, "json").unwrap_or_default(),
        }
    }
}

/// Parsed annotations of a retained field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldAnnotations {
    /// JSON name override; `None` keeps the declared name.
    pub json_name: Option<String>,
    pub flags: FieldFlags,
}

/// Parses a field's annotations. Returns `None` if the field must be skipped.
///
/// Flag/type consistency is left to validation.
pub fn parse_annotations(raw: &RawAnnotations) -> Option<FieldAnnotations> {
    if raw.json == "-" {
        return None;
    }

    let mut out = FieldAnnotations::default();

    let mut json_parts = raw.json.split(',');
    if let Some(name) = json_parts.next().filter(|name| !name.is_empty()) {
        out.json_name = Some(name.to_string());
    }
    if json_parts.next() == Some("omitempty") {
        out.flags |= FieldFlags::JSON_OMIT_EMPTY;
    }

    match raw.binary.as_str() {
        "fixed64" => out.flags |= FieldFlags::FIXED64,
        "fixed32" => out.flags |= FieldFlags::FIXED32,
        _ => {}
    }

    for token in raw.codec.split(',') {
        match token {
            "unsafe" => out.flags |= FieldFlags::UNSAFE,
            "write_empty" => out.flags |= FieldFlags::WRITE_EMPTY,
            "nil_elements" => out.flags |= FieldFlags::NIL_ELEMENTS,
            _ => {}
        }
    }

    Some(out)
}

/// Looks up `key` in a conventional `key:"value" key2:"value2"` tag string.
fn lookup_tag(tag: &str, key: &str) -> Option<String> {
    let mut rest = tag;
    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            return None;
        }

        let name_end = rest
            .find(|c: char| c <= ' ' || c == ':' || c == '"' || c == '\x7f')
            .unwrap_or(rest.len());
        let bytes = rest.as_bytes();
        if name_end == 0
            || name_end + 1 >= bytes.len()
            || bytes[name_end] != b':'
            || bytes[name_end + 1] != b'"'
        {
            return None;
        }
        let name = &rest[..name_end];
        rest = &rest[name_end + 1..];

        // Scan the quoted value, skipping escaped characters.
        let bytes = rest.as_bytes();
        let mut i = 1;
        while i < bytes.len() && bytes[i] != b'"' {
            if bytes[i] == b'\\' {
                i += 1;
            }
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }
        let quoted = &rest[1..i];
        rest = &rest[i + 1..];

        if name == key {
            return unquote(quoted);
        }
    }
}

fn unquote(s: &str) -> Option<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            other => out.push(other),
        }
    }
    Some(out)
}
