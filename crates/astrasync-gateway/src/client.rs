//! High-level registration client.

use astrasync_core::obs;
use astrasync_core::{
    estimate, ingest, validate_agent_id, validate_email, AgentFormat, AgentRecord,
    NormalizeOptions, RawInput, TrustScore,
};
use tracing::Instrument;

use crate::config::GatewayConfig;
use crate::error::{ClientError, Result};
use crate::gateway::RegistrationGateway;
use crate::http::HttpGateway;
use crate::metrics::METRICS;
use crate::types::{HealthStatus, RegistrationRequest, RegistrationResponse, VerificationResponse};

/// Everything produced by one registration.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationOutcome {
    pub format: AgentFormat,
    pub record: AgentRecord,
    /// Local preview estimate, computed before submission.
    pub local_score: TrustScore,
    pub response: RegistrationResponse,
}

impl RegistrationOutcome {
    pub fn agent_id(&self) -> &str {
        &self.response.agent_id
    }

    /// The service's score when it sent one, otherwise the local estimate.
    pub fn effective_trust_score(&self) -> TrustScore {
        self.response
            .parsed_trust_score()
            .unwrap_or(self.local_score)
    }
}

/// Detect, normalize and register agents through a [`RegistrationGateway`].
///
/// The gateway is the only async boundary; everything before submission is
/// pure.
pub struct AstraSyncClient<G> {
    gateway: G,
    email: Option<String>,
    options: NormalizeOptions,
}

impl AstraSyncClient<HttpGateway> {
    /// Client for the hosted service, with the email taken from `config`.
    pub fn from_config(config: GatewayConfig) -> Result<Self> {
        let email = config.email.clone();
        let mut client = Self::new(HttpGateway::new(config)?);
        client.email = email;
        Ok(client)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_config(GatewayConfig::from_env())
    }
}

impl<G> AstraSyncClient<G>
where
    G: RegistrationGateway,
{
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            email: None,
            options: NormalizeOptions::default(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_normalize_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Register an agent definition.
    ///
    /// `owner`, when given, replaces whatever owner the definition declares.
    ///
    /// # Errors
    ///
    /// - `MissingEmail` / `Core(InvalidEmail)` before anything is loaded.
    /// - `Core(InvalidInputKind | Io)` from the loader.
    /// - `Gateway(..)` when submission fails.
    pub async fn register(
        &self,
        input: impl Into<RawInput>,
        owner: Option<&str>,
    ) -> Result<RegistrationOutcome> {
        let email = self.email.as_deref().ok_or(ClientError::MissingEmail)?;
        validate_email(email)?;

        let mut options = self.options.clone();
        if let Some(owner) = owner {
            options = options.with_owner_override(Some(owner.to_string()));
        }

        let (format, record) = ingest(input.into(), &options)?;
        let local_score = estimate(&record, format);
        let digest = record.digest()?;

        let request = RegistrationRequest {
            email: email.to_string(),
            agent: record,
        };

        obs::emit_registration_submitted(format, request.agent.name(), &digest);
        METRICS.record_submitted(format);

        let response = match self
            .gateway
            .register(&request)
            .instrument(obs::registration_span(email, format))
            .await
        {
            Ok(response) => response,
            Err(e) => {
                METRICS.record_failed(format, &e);
                obs::emit_registration_failed(format, &e);
                return Err(e.into());
            }
        };

        METRICS.record_accepted(&response);
        obs::emit_registration_completed(
            &response.agent_id,
            &response.status,
            response.trust_score.as_deref().unwrap_or("N/A"),
        );

        Ok(RegistrationOutcome {
            format,
            record: request.agent,
            local_score,
            response,
        })
    }

    /// # Errors
    ///
    /// `Core(InvalidAgentId)` without contacting the gateway when `agent_id`
    /// has no known prefix.
    pub async fn verify(&self, agent_id: &str) -> Result<VerificationResponse> {
        validate_agent_id(agent_id)?;
        let response = self.gateway.verify(agent_id).await?;
        METRICS.record_verification(response.exists);
        obs::emit_verification(agent_id, response.exists);
        Ok(response)
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        Ok(self.gateway.health().await?)
    }
}
