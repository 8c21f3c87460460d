//! Wire types exchanged with the registration service.
//!
//! Unknown response fields are kept in `extra` so callers can read whatever
//! the service adds without a client upgrade.

use astrasync_core::{validation, AgentRecord, TrustScore};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistrationRequest {
    pub email: String,
    pub agent: AgentRecord,
}

/// On-chain registration state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockchainStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub agent_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_score: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blockchain: Option<BlockchainStatus>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RegistrationResponse {
    /// The service's score, if present and well-formed.
    pub fn parsed_trust_score(&self) -> Option<TrustScore> {
        self.trust_score.as_deref().and_then(TrustScore::parse)
    }

    /// Whether the id was issued during the preview period.
    pub fn is_preview(&self) -> bool {
        validation::is_preview_id(&self.agent_id)
    }
}

/// Body of `GET /verify/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationResponse {
    #[serde(default)]
    pub exists: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VerificationResponse {
    pub fn missing() -> Self {
        Self {
            exists: false,
            extra: Map::new(),
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    #[serde(default = "healthy")]
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn healthy() -> String {
    "ok".to_string()
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: healthy(),
            extra: Map::new(),
        }
    }
}
