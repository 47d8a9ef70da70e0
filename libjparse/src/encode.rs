//! Encode parsed values for output.
//!
//! JSON is produced here through `serde_json`. YAML and TOML are handled by
//! the command-line tool, which owns those dependencies.

use crate::Value;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Output format for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JSON (standard)
    Json,
    /// YAML
    Yaml,
    /// TOML
    Toml,
}

impl Format {
    /// Look up a format by name or file extension.
    pub fn from_name(name: &str) -> Option<Format> {
        match name.to_ascii_lowercase().as_str() {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            "toml" => Some(Format::Toml),
            _ => None,
        }
    }

    /// File extension for output files.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Toml => "toml",
        }
    }
}

/// Serialize `value` as JSON. An `indent` of zero gives compact output,
/// otherwise each nesting level is indented by that many spaces. NaN and
/// infinite floats are written as `null`.
pub fn to_json(value: &Value, indent: usize) -> serde_json::Result<String> {
    if indent == 0 {
        return serde_json::to_string(value);
    }
    let pad = " ".repeat(indent);
    let mut out = Vec::new();
    let mut ser = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(pad.as_bytes()));
    value.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
