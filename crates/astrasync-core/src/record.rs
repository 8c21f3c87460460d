//! The canonical, framework-agnostic agent record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::digest;
use crate::error::Result;
use crate::format::AgentFormat;

/// Structural traits derived from the raw definition.
///
/// The trust estimator reads these; they are also forwarded so the
/// registration service can apply its own scoring.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AgentTraits {
    /// Declares explicit input/output schemas or structured output.
    pub structured_output: bool,
    /// Coordinates several agents, steps or workflow nodes.
    pub orchestration: bool,
    /// Declares persistent memory.
    pub persistent_memory: bool,
    /// Declares a session service.
    pub session_aware: bool,
}

/// Canonical fields that can be filled from normalizer defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DefaultedField {
    Name,
    Owner,
    Version,
}

/// Everything about the raw record that does not fit a canonical field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentMetadata {
    pub traits: AgentTraits,

    /// Facts derived by the format rule (model, role, member counts, ...).
    #[serde(default)]
    pub attributes: Map<String, Value>,

    /// Raw keys no rule consumed, copied verbatim.
    #[serde(default)]
    pub passthrough: Map<String, Value>,

    /// Canonical fields that fell back to a default.
    #[serde(default)]
    pub defaulted: Vec<DefaultedField>,
}

impl AgentMetadata {
    pub fn was_defaulted(&self, field: DefaultedField) -> bool {
        self.defaulted.contains(&field)
    }
}

/// Normalized agent record handed to the registration service.
///
/// Built once by the normalizer and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    name: String,
    description: String,
    owner: String,
    agent_type: AgentFormat,
    capabilities: Vec<String>,
    version: String,
    metadata: AgentMetadata,
}

impl AgentRecord {
    pub(crate) fn new(
        name: String,
        description: String,
        owner: String,
        agent_type: AgentFormat,
        capabilities: Vec<String>,
        version: String,
        metadata: AgentMetadata,
    ) -> Self {
        Self {
            name,
            description,
            owner,
            agent_type,
            capabilities,
            version,
            metadata,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn agent_type(&self) -> AgentFormat {
        self.agent_type
    }

    pub fn capabilities(&self) -> &[String] {
        &self.capabilities
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn metadata(&self) -> &AgentMetadata {
        &self.metadata
    }

    pub fn traits(&self) -> &AgentTraits {
        &self.metadata.traits
    }

    /// SHA-256 hex digest over the canonical JSON form of this record.
    pub fn digest(&self) -> Result<String> {
        digest::compute_digest(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> AgentRecord {
        AgentRecord::new(
            "Bot".to_string(),
            "helps".to_string(),
            "Unknown".to_string(),
            AgentFormat::OpenAi,
            vec!["retrieval".to_string()],
            "1.0.0".to_string(),
            AgentMetadata {
                defaulted: vec![DefaultedField::Owner, DefaultedField::Version],
                ..AgentMetadata::default()
            },
        )
    }

    #[test]
    fn test_record_serializes_with_camel_case_keys() {
        let json = serde_json::to_value(sample()).expect("serialize");
        assert_eq!(json["agentType"], json!("openai"));
        assert_eq!(json["capabilities"], json!(["retrieval"]));
        assert_eq!(json["metadata"]["traits"]["structuredOutput"], json!(false));
        assert_eq!(json["metadata"]["defaulted"], json!(["owner", "version"]));
    }

    #[test]
    fn test_record_serde_roundtrip() {
        let record = sample();
        let text = serde_json::to_string(&record).expect("serialize");
        let back: AgentRecord = serde_json::from_str(&text).expect("deserialize");
        assert_eq!(record, back);
    }

    #[test]
    fn test_digest_changes_with_content() {
        let a = sample();
        let mut b = sample();
        b.name = "Other".to_string();
        assert_ne!(a.digest().expect("a"), b.digest().expect("b"));
        assert_eq!(a.digest().expect("a"), sample().digest().expect("again"));
    }

    #[test]
    fn test_was_defaulted() {
        let record = sample();
        assert!(record.metadata().was_defaulted(DefaultedField::Owner));
        assert!(!record.metadata().was_defaulted(DefaultedField::Name));
    }
}
