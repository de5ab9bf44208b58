//! File formats: JSON/TOML parsing into raw records and station rendering.
//!
//! JSON output uses a fixed indent shared by every JSON artifact, `", "` /
//! `": "` separators and no trailing newline, so regenerated files diff
//! cleanly. TOML output wraps the records in a `stations` array of tables.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::station::Station;
use crate::types::{DatahubError, Result};

/// Default JSON indent width in spaces.
pub const DEFAULT_JSON_INDENT: usize = 4;

/// Key of the records array in TOML documents.
pub const TOML_STATIONS_KEY: &str = "stations";

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}

impl Format {
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Toml => "toml",
        }
    }

    /// Resolve a format from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Result<Format> {
        match ext {
            "json" => Ok(Format::Json),
            "toml" => Ok(Format::Toml),
            other => Err(DatahubError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Resolve a format from a path's extension.
    pub fn from_path(path: &Path) -> Result<Format> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Format::from_extension(ext)
    }
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Format::from_extension(&s.to_ascii_lowercase()).map_err(|e| e.to_string())
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse file content into raw record values.
///
/// A single object yields one entry, an array yields one per element, and a
/// TOML document with a `stations` array yields one per table. `null` JSON
/// yields nothing.
pub fn parse_entries(text: &str, format: Format) -> Result<Vec<Value>> {
    match format {
        Format::Json => {
            let value: Value = serde_json::from_str(text)
                .map_err(|e| DatahubError::Parse(format!("invalid JSON: {e}")))?;
            match value {
                Value::Null => Ok(Vec::new()),
                Value::Array(items) => Ok(items),
                obj @ Value::Object(_) => Ok(vec![obj]),
                _ => Err(DatahubError::Parse(
                    "expected a record object or a list of records".into(),
                )),
            }
        }
        Format::Toml => {
            let mut table: toml::Table = toml::from_str(text)
                .map_err(|e| DatahubError::Parse(format!("invalid TOML: {e}")))?;
            let value = match table.remove(TOML_STATIONS_KEY) {
                Some(toml::Value::Array(items)) => serde_json::to_value(items)?,
                Some(other) => {
                    table.insert(TOML_STATIONS_KEY.into(), other);
                    serde_json::to_value(table)?
                }
                None => serde_json::to_value(table)?,
            };
            match value {
                Value::Array(items) => Ok(items),
                other => Ok(vec![other]),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Serialize any value as pretty JSON with `indent` spaces.
pub fn to_json_string<T: Serialize + ?Sized>(value: &T, indent: usize) -> Result<String> {
    let indent = vec![b' '; indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent);
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| DatahubError::Parse(e.to_string()))
}

#[derive(Serialize)]
struct TomlDocument<'a> {
    stations: &'a [Station],
}

/// Render stations in the given format.
pub fn render_stations(stations: &[Station], format: Format, indent: usize) -> Result<String> {
    match format {
        Format::Json => to_json_string(stations, indent),
        Format::Toml => toml::to_string(&TomlDocument { stations })
            .map_err(|e| DatahubError::Toml(e.to_string())),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
