//! In-memory preview registry.
//!
//! `MemoryGateway` issues ids, statuses and trust scores the way the hosted
//! service does during its preview period, without any network access. Used
//! by `astrasync register --offline` and by tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map};
use uuid::Uuid;

use astrasync_core::trust;

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::RegistrationGateway;
use crate::types::{
    BlockchainStatus, HealthStatus, RegistrationRequest, RegistrationResponse,
    VerificationResponse,
};

/// Status given to every accepted registration.
pub const REGISTERED_STATUS: &str = "registered";

/// Blockchain status while an account is not yet finalized.
pub const PENDING_CHAIN_STATUS: &str = "pending";

pub const DEFAULT_NETWORK: &str = "preview";

#[derive(Debug, Default)]
struct Registry {
    by_id: HashMap<String, RegistrationResponse>,
    /// `(email, record digest)` → issued id.
    by_key: HashMap<(String, String), String>,
}

/// In-memory registration backend backed by `HashMap`s.
#[derive(Debug)]
pub struct MemoryGateway {
    network: String,
    available: AtomicBool,
    registry: Mutex<Registry>,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            network: DEFAULT_NETWORK.to_string(),
            available: AtomicBool::new(true),
            registry: Mutex::new(Registry::default()),
        }
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    /// Simulate an outage: every call fails with a 503 until re-enabled.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of distinct registrations held.
    pub fn len(&self) -> usize {
        self.lock().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, agent_id: &str) -> Option<RegistrationResponse> {
        self.lock().by_id.get(agent_id).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_available(&self) -> GatewayResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(GatewayError::Status {
                status: 503,
                body: "preview registry unavailable".to_string(),
            })
        }
    }
}

/// `TEMP-<unix-millis>-<8 hex>`
fn preview_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "TEMP-{}-{}",
        Utc::now().timestamp_millis(),
        suffix[..8].to_ascii_uppercase()
    )
}

#[async_trait]
impl RegistrationGateway for MemoryGateway {
    async fn register(&self, request: &RegistrationRequest) -> GatewayResult<RegistrationResponse> {
        self.ensure_available()?;

        let digest = request
            .agent
            .digest()
            .map_err(|e| GatewayError::Encode(e.to_string()))?;
        let key = (request.email.clone(), digest);

        let mut registry = self.lock();
        if let Some(existing) = registry
            .by_key
            .get(&key)
            .and_then(|id| registry.by_id.get(id))
        {
            return Ok(existing.clone());
        }

        let score = trust::estimate(&request.agent, request.agent.agent_type());
        let mut extra = Map::new();
        extra.insert(
            "message".to_string(),
            json!("Preview registration; create an account to finalize"),
        );

        let response = RegistrationResponse {
            agent_id: preview_id(),
            status: REGISTERED_STATUS.to_string(),
            trust_score: Some(score.to_string()),
            blockchain: Some(BlockchainStatus {
                status: PENDING_CHAIN_STATUS.to_string(),
                network: Some(self.network.clone()),
                extra: Map::new(),
            }),
            extra,
        };

        registry
            .by_key
            .insert(key, response.agent_id.clone());
        registry
            .by_id
            .insert(response.agent_id.clone(), response.clone());
        Ok(response)
    }

    async fn verify(&self, agent_id: &str) -> GatewayResult<VerificationResponse> {
        self.ensure_available()?;

        let registry = self.lock();
        let Some(found) = registry.by_id.get(agent_id) else {
            return Ok(VerificationResponse::missing());
        };
        let mut extra = Map::new();
        extra.insert("agentId".to_string(), json!(found.agent_id));
        extra.insert("status".to_string(), json!(found.status));
        if let Some(score) = &found.trust_score {
            extra.insert("trustScore".to_string(), json!(score));
        }
        Ok(VerificationResponse {
            exists: true,
            extra,
        })
    }

    async fn health(&self) -> GatewayResult<HealthStatus> {
        self.ensure_available()?;

        let mut health = HealthStatus::default();
        health
            .extra
            .insert("backend".to_string(), json!("memory"));
        health
            .extra
            .insert("registrations".to_string(), json!(self.len()));
        Ok(health)
    }
}
