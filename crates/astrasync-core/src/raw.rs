//! Raw configuration records and the input loader.
//!
//! A [`RawConfig`] is whatever mapping a caller hands us, with no invariants.
//! The loader turns an in-memory mapping, a JSON/TOML text blob, or a file
//! path into one. Any other input shape is an `InvalidInputKind` error; that
//! is the only place the pipeline can fail on caller data.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{AstraError, Result};

/// An arbitrary string-keyed mapping describing an agent.
///
/// Accessors never fail: a key whose value has the wrong shape reads as
/// absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawConfig {
    fields: Map<String, Value>,
}

impl RawConfig {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Wrap a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(AstraError::InvalidInputKind(format!(
                "expected a mapping, got {}",
                value_kind(&other)
            ))),
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn array(&self, key: &str) -> Option<&Vec<Value>> {
        self.fields.get(key).and_then(Value::as_array)
    }

    pub fn object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.fields.get(key).and_then(Value::as_object)
    }

    /// Whether `key` holds a string equal to `expected`.
    pub fn str_eq(&self, key: &str, expected: &str) -> bool {
        self.str(key) == Some(expected)
    }
}

impl From<Map<String, Value>> for RawConfig {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// Anything the loader accepts.
#[derive(Debug, Clone)]
pub enum RawInput {
    /// An already-parsed mapping.
    Mapping(Map<String, Value>),
    /// A parsed JSON value; must turn out to be an object.
    Value(Value),
    /// Serialized text (JSON, or TOML as a fallback).
    Text(String),
    /// A file whose contents deserialize to a mapping.
    Path(PathBuf),
}

impl RawInput {
    /// Treat `input` as a path when it names an existing file, otherwise as
    /// inline text.
    pub fn infer(input: &str) -> Self {
        let path = Path::new(input);
        if path.is_file() {
            RawInput::Path(path.to_path_buf())
        } else {
            RawInput::Text(input.to_string())
        }
    }
}

impl From<Map<String, Value>> for RawInput {
    fn from(map: Map<String, Value>) -> Self {
        RawInput::Mapping(map)
    }
}

impl From<Value> for RawInput {
    fn from(value: Value) -> Self {
        RawInput::Value(value)
    }
}

impl From<RawConfig> for RawInput {
    fn from(raw: RawConfig) -> Self {
        RawInput::Mapping(raw.into_map())
    }
}

impl From<PathBuf> for RawInput {
    fn from(path: PathBuf) -> Self {
        RawInput::Path(path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextFormat {
    Json,
    Toml,
    Unknown,
}

impl TextFormat {
    fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("json") => TextFormat::Json,
            Some("toml") => TextFormat::Toml,
            _ => TextFormat::Unknown,
        }
    }
}

/// Load a raw configuration record.
///
/// # Errors
///
/// - `InvalidInputKind`: the input is not a mapping, the text is neither
///   JSON nor TOML describing a mapping, or the path does not exist.
/// - `Io`: the path exists but could not be read.
pub fn load(input: RawInput) -> Result<RawConfig> {
    match input {
        RawInput::Mapping(map) => Ok(RawConfig::new(map)),
        RawInput::Value(value) => RawConfig::from_value(value),
        RawInput::Text(text) => {
            let value = parse_text(&text, TextFormat::Unknown).ok_or_else(|| {
                AstraError::InvalidInputKind(
                    "text is neither JSON nor TOML, and is not an existing file path".to_string(),
                )
            })?;
            RawConfig::from_value(value)
        }
        RawInput::Path(path) => load_path(&path),
    }
}

fn load_path(path: &Path) -> Result<RawConfig> {
    if !path.exists() {
        return Err(AstraError::InvalidInputKind(format!(
            "path does not exist: {}",
            path.display()
        )));
    }

    let text = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), bytes = text.len(), "loaded agent file");

    let value = parse_text(&text, TextFormat::from_path(path)).ok_or_else(|| {
        AstraError::InvalidInputKind(format!(
            "could not parse {} as JSON or TOML",
            path.display()
        ))
    })?;
    RawConfig::from_value(value)
}

fn parse_text(text: &str, format: TextFormat) -> Option<Value> {
    match format {
        TextFormat::Json => parse_json(text),
        TextFormat::Toml => parse_toml(text),
        TextFormat::Unknown => parse_json(text).or_else(|| parse_toml(text)),
    }
}

fn parse_json(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

fn parse_toml(text: &str) -> Option<Value> {
    let table: toml::Value = toml::from_str(text).ok()?;
    serde_json::to_value(table).ok()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}
