//! Explicit registration of code-defined agents.
//!
//! Build a definition from plain values and submit it in one call:
//!
//! ```ignore
//! let outcome = AgentRegistration::new("invoice_summarizer")
//!     .description("Summarises supplier invoices")
//!     .capability("pdf_extraction")
//!     .metadata("module", module_path!())
//!     .register(&client)
//!     .await?;
//! ```

use serde_json::{Map, Value};

use crate::client::{AstraSyncClient, RegistrationOutcome};
use crate::error::Result;
use crate::gateway::RegistrationGateway;

/// Capability recorded when none is declared.
pub const DEFAULT_CAPABILITY: &str = "function-based";

/// Key the caller's metadata entries are nested under in the definition.
pub const METADATA_KEY: &str = "metadata";

/// A code-defined agent awaiting registration.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRegistration {
    name: String,
    description: Option<String>,
    owner: Option<String>,
    version: Option<String>,
    capabilities: Vec<String>,
    metadata: Map<String, Value>,
}

impl AgentRegistration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            owner: None,
            version: None,
            capabilities: Vec::new(),
            metadata: Map::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Owner sent as the registration's owner override.
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.push(capability.into());
        self
    }

    pub fn capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities
            .extend(capabilities.into_iter().map(Into::into));
        self
    }

    /// Extra entry carried verbatim under `metadata` in the record's
    /// passthrough. Entries never reach the top level, so they cannot change
    /// how the definition is detected.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The raw definition this registration submits.
    pub fn to_definition(&self) -> Map<String, Value> {
        let mut definition = Map::new();
        let description = self
            .description
            .clone()
            .unwrap_or_else(|| format!("Auto-registered {}", self.name));
        let capabilities = if self.capabilities.is_empty() {
            vec![DEFAULT_CAPABILITY.to_string()]
        } else {
            self.capabilities.clone()
        };

        definition.insert("name".to_string(), Value::String(self.name.clone()));
        definition.insert("description".to_string(), Value::String(description));
        definition.insert("capabilities".to_string(), Value::from(capabilities));
        if let Some(version) = &self.version {
            definition.insert("version".to_string(), Value::String(version.clone()));
        }
        if !self.metadata.is_empty() {
            definition.insert(
                METADATA_KEY.to_string(),
                Value::Object(self.metadata.clone()),
            );
        }
        definition
    }

    /// Submit now through `client`.
    pub async fn register<G>(&self, client: &AstraSyncClient<G>) -> Result<RegistrationOutcome>
    where
        G: RegistrationGateway,
    {
        client
            .register(self.to_definition(), self.owner.as_deref())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_definition_defaults() {
        let definition = AgentRegistration::new("summarize").to_definition();
        assert_eq!(definition["name"], json!("summarize"));
        assert_eq!(definition["description"], json!("Auto-registered summarize"));
        assert_eq!(definition["capabilities"], json!(["function-based"]));
        assert!(!definition.contains_key("version"));
    }

    #[test]
    fn test_metadata_is_nested() {
        let definition = AgentRegistration::new("real")
            .metadata("name", "shadow")
            .metadata("module", "billing::agents")
            .capabilities(["pdf", "ocr"])
            .to_definition();
        assert_eq!(definition["name"], json!("real"));
        assert_eq!(
            definition["metadata"],
            json!({"name": "shadow", "module": "billing::agents"})
        );
        assert!(!definition.contains_key("module"));
        assert_eq!(definition["capabilities"], json!(["pdf", "ocr"]));
    }

    #[test]
    fn test_metadata_cannot_change_detected_format() {
        let definition = AgentRegistration::new("researcher")
            .metadata("role", "Analyst")
            .metadata("goal", "Find sources")
            .metadata("agent_name", "r-1")
            .metadata("max_loops", 3)
            .to_definition();
        let raw = astrasync_core::RawConfig::new(definition);
        assert_eq!(astrasync_core::detect(&raw), astrasync_core::AgentFormat::Generic);
    }
}
