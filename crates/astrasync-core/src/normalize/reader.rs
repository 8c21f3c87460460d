//! Field access with consumption tracking.
//!
//! Format rules read the raw record through a [`FieldReader`]. A key is
//! marked consumed only when its whole value is carried into the record;
//! everything else ends up in `metadata.passthrough`. Wrong-shaped values and
//! nested structures that are only summarized (crew members, sub-agents,
//! workflow nodes, tool definitions) are never marked.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use crate::format::AgentFormat;
use crate::obs;
use crate::raw::RawConfig;
use crate::record::AgentTraits;

/// Read-side view of a raw record for one format rule.
pub struct FieldReader<'a> {
    raw: &'a RawConfig,
    format: AgentFormat,
    description_limit: usize,
    consumed: BTreeSet<String>,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(raw: &'a RawConfig, format: AgentFormat, description_limit: usize) -> Self {
        Self {
            raw,
            format,
            description_limit,
            consumed: BTreeSet::new(),
        }
    }

    /// Peek at the raw record without consuming anything.
    pub fn raw(&self) -> &'a RawConfig {
        self.raw
    }

    pub fn description_limit(&self) -> usize {
        self.description_limit
    }

    /// Mark `key` consumed if present.
    pub fn mark(&mut self, key: &str) {
        if self.raw.contains(key) {
            self.consumed.insert(key.to_string());
        }
    }

    /// Take any value.
    pub fn value(&mut self, key: &str) -> Option<&'a Value> {
        let value = self.raw.get(key)?;
        self.consumed.insert(key.to_string());
        Some(value)
    }

    /// Take a non-blank string.
    pub fn string(&mut self, key: &str) -> Option<String> {
        let value = self.raw.get(key)?;
        match value.as_str() {
            Some(s) if !s.trim().is_empty() => {
                self.consumed.insert(key.to_string());
                Some(s.to_string())
            }
            Some(_) => None,
            None => {
                self.malformed(key, "string");
                None
            }
        }
    }

    /// Take the first non-blank string among `keys`.
    pub fn first_string(&mut self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.string(key))
    }

    pub fn array(&mut self, key: &str) -> Option<&'a [Value]> {
        let value = self.raw.get(key)?;
        match value.as_array() {
            Some(items) => {
                self.consumed.insert(key.to_string());
                Some(items.as_slice())
            }
            None => {
                self.malformed(key, "sequence");
                None
            }
        }
    }

    /// Take a sequence that will be flattened to names.
    ///
    /// Consumed only when every item is a bare string. Structured entries
    /// carry more than a name, so the key stays in the passthrough.
    pub fn names(&mut self, key: &str) -> Option<&'a [Value]> {
        let items = self.members(key)?;
        if items.iter().all(Value::is_string) {
            self.consumed.insert(key.to_string());
        }
        Some(items)
    }

    /// Read a sequence of nested members without consuming it.
    pub fn members(&self, key: &str) -> Option<&'a [Value]> {
        let value = self.raw.get(key)?;
        match value.as_array() {
            Some(items) => Some(items.as_slice()),
            None => {
                self.malformed(key, "sequence");
                None
            }
        }
    }

    /// Take a `{name: enabled}` mapping.
    ///
    /// Consumed only when every entry is `true`; otherwise the disabled or
    /// non-boolean entries would be lost, so the key stays in the passthrough.
    pub fn flags(&mut self, key: &str) -> Option<&'a Map<String, Value>> {
        let value = self.raw.get(key)?;
        match value.as_object() {
            Some(map) => {
                if map.values().all(|v| v == &Value::Bool(true)) {
                    self.consumed.insert(key.to_string());
                }
                Some(map)
            }
            None => {
                self.malformed(key, "mapping");
                None
            }
        }
    }

    pub fn object(&mut self, key: &str) -> Option<&'a Map<String, Value>> {
        let value = self.raw.get(key)?;
        match value.as_object() {
            Some(map) => {
                self.consumed.insert(key.to_string());
                Some(map)
            }
            None => {
                self.malformed(key, "mapping");
                None
            }
        }
    }

    /// Take a version given as a string or a bare number.
    pub fn version(&mut self, key: &str) -> Option<String> {
        let value = self.raw.get(key)?;
        let version = match value {
            Value::String(s) if !s.trim().is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::String(_) => return None,
            _ => {
                self.malformed(key, "string or number");
                return None;
            }
        };
        self.consumed.insert(key.to_string());
        Some(version)
    }

    /// Description text derived from a prose field, truncated to the
    /// configured limit. The source key is left unconsumed so the full text
    /// survives in the passthrough.
    pub fn prose(&self, key: &str) -> Option<String> {
        self.raw
            .str(key)
            .filter(|s| !s.trim().is_empty())
            .map(|s| truncate_prose(s, self.description_limit))
    }

    fn malformed(&self, key: &str, expected: &str) {
        obs::emit_malformed_field(self.format, key, expected);
    }

    /// Raw keys no rule consumed, in key order.
    pub(crate) fn passthrough(&self) -> Map<String, Value> {
        self.raw
            .as_map()
            .iter()
            .filter(|(key, _)| !self.consumed.contains(key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

/// Ordered, duplicate-free capability names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    names: Vec<String>,
}

impl Capabilities {
    /// Append `name` unless it is blank or already present.
    pub fn push(&mut self, name: impl Into<String>) {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() || self.names.iter().any(|n| n == trimmed) {
            return;
        }
        self.names.push(trimmed.to_string());
    }

    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.push(name);
        }
    }

    /// Capability names of every tool in a tool list.
    pub fn extend_tools(&mut self, tools: &[Value]) {
        self.extend(tools.iter().filter_map(tool_name));
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.names
    }
}

/// Partial record produced by a format rule.
#[derive(Debug, Default)]
pub struct Extraction {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) owner: Option<String>,
    pub(crate) capabilities: Capabilities,
    pub(crate) traits: AgentTraits,
    pub(crate) attributes: Map<String, Value>,
}

impl Extraction {
    pub(crate) fn attribute(&mut self, key: &str, value: impl Into<Value>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    /// Keep the first name seen.
    pub(crate) fn name_or(&mut self, name: Option<String>) {
        if self.name.is_none() {
            self.name = name;
        }
    }

    /// Keep the first description seen.
    pub(crate) fn description_or(&mut self, description: Option<String>) {
        if self.description.is_none() {
            self.description = description;
        }
    }
}

/// Capability name for one tool entry.
///
/// Strings are taken as-is. Mappings use `name`, then an OpenAI-style
/// `function.name`, then `type`.
pub fn tool_name(tool: &Value) -> Option<String> {
    match tool {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => str_field(map, "name")
            .or_else(|| {
                map.get("function")
                    .and_then(|f| f.get("name"))
                    .and_then(Value::as_str)
            })
            .or_else(|| str_field(map, "type"))
            .map(str::to_string),
        _ => None,
    }
}

/// Non-blank string field of a nested mapping.
pub fn str_field<'m>(map: &'m Map<String, Value>, key: &str) -> Option<&'m str> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// Loose truthiness: `true`, non-zero numbers, and non-empty strings,
/// sequences and mappings.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Truncate to `limit` characters, appending `...` when text was cut.
pub fn truncate_prose(text: &str, limit: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(limit).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawConfig {
        RawConfig::from_value(value).expect("object")
    }

    #[test]
    fn test_wrong_shape_is_not_consumed() {
        let raw = raw(json!({"tools": "search", "name": "Bot"}));
        let mut reader = FieldReader::new(&raw, AgentFormat::OpenAi, 200);

        assert!(reader.array("tools").is_none());
        assert_eq!(reader.string("name").as_deref(), Some("Bot"));

        let passthrough = reader.passthrough();
        assert_eq!(passthrough.get("tools"), Some(&json!("search")));
        assert!(!passthrough.contains_key("name"));
    }

    #[test]
    fn test_prose_does_not_consume() {
        let raw = raw(json!({"instructions": "a".repeat(250)}));
        let reader = FieldReader::new(&raw, AgentFormat::OpenAi, 200);

        let prose = reader.prose("instructions").expect("prose");
        assert_eq!(prose.chars().count(), 203);
        assert!(prose.ends_with("..."));
        assert!(reader.passthrough().contains_key("instructions"));
    }

    #[test]
    fn test_structured_names_stay_in_passthrough() {
        let raw = raw(json!({
            "tools": [{"type": "function", "function": {"name": "refund", "parameters": {}}}],
            "skills": ["search", "calc"],
            "agents": [{"role": "Writer"}],
        }));
        let mut reader = FieldReader::new(&raw, AgentFormat::Generic, 200);

        assert_eq!(reader.names("tools").map(<[Value]>::len), Some(1));
        assert_eq!(reader.names("skills").map(<[Value]>::len), Some(2));
        assert_eq!(reader.members("agents").map(<[Value]>::len), Some(1));

        let passthrough = reader.passthrough();
        assert!(passthrough.contains_key("tools"));
        assert!(passthrough.contains_key("agents"));
        assert!(!passthrough.contains_key("skills"));
    }

    #[test]
    fn test_flags_consumed_only_when_all_enabled() {
        let raw = raw(json!({
            "capabilities": {"streaming": true, "batch": true},
            "features": {"search": true, "voice": false},
        }));
        let mut reader = FieldReader::new(&raw, AgentFormat::Generic, 200);

        assert!(reader.flags("capabilities").is_some());
        assert!(reader.flags("features").is_some());

        let passthrough = reader.passthrough();
        assert!(!passthrough.contains_key("capabilities"));
        assert_eq!(passthrough["features"], json!({"search": true, "voice": false}));
    }

    #[test]
    fn test_version_accepts_numbers() {
        let raw = raw(json!({"version": 2}));
        let mut reader = FieldReader::new(&raw, AgentFormat::Generic, 200);
        assert_eq!(reader.version("version").as_deref(), Some("2"));
    }

    #[test]
    fn test_capabilities_dedup_preserves_order() {
        let mut caps = Capabilities::default();
        caps.extend(["search", "calc", "search", " ", "calc", "write"]);
        assert_eq!(caps.into_vec(), vec!["search", "calc", "write"]);
    }

    #[test]
    fn test_tool_name_shapes() {
        assert_eq!(tool_name(&json!("search")).as_deref(), Some("search"));
        assert_eq!(
            tool_name(&json!({"type": "retrieval"})).as_deref(),
            Some("retrieval")
        );
        assert_eq!(
            tool_name(&json!({"type": "function", "function": {"name": "get_weather"}}))
                .as_deref(),
            Some("get_weather")
        );
        assert_eq!(
            tool_name(&json!({"name": "lookup", "type": "tool"})).as_deref(),
            Some("lookup")
        );
        assert_eq!(tool_name(&json!(42)), None);
    }

    #[test]
    fn test_truthy() {
        assert!(truthy(&json!(true)));
        assert!(truthy(&json!({"type": "buffer"})));
        assert!(!truthy(&json!(false)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!([])));
        assert!(!truthy(&Value::Null));
    }
}
