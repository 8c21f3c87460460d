//! HTTP gateway for the hosted registration service.

use async_trait::async_trait;
use reqwest::{Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::RegistrationGateway;
use crate::types::{HealthStatus, RegistrationRequest, RegistrationResponse, VerificationResponse};

/// JSON-over-HTTP client for the registration API.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    config: GatewayConfig,
    http_client: reqwest::Client,
}

impl HttpGateway {
    /// # Errors
    ///
    /// `GatewayError::Config` if the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn from_env() -> GatewayResult<Self> {
        Self::new(GatewayConfig::from_env())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// `{api_url}/verify/{agent_id}` with the id percent-encoded as a single
    /// path segment.
    fn verify_url(&self, agent_id: &str) -> GatewayResult<Url> {
        let invalid = |reason: String| {
            GatewayError::Config(format!("invalid API URL {}: {reason}", self.config.api_url))
        };
        let mut url = Url::parse(&self.config.api_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("cannot be a base".to_string()))?
            .pop_if_empty()
            .push("verify")
            .push(agent_id);
        Ok(url)
    }
}

/// Decode a success body, or turn the status and body into an error.
async fn decode<T: DeserializeOwned>(response: Response) -> GatewayResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GatewayError::Status {
            status: status.as_u16(),
            body,
        });
    }
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl RegistrationGateway for HttpGateway {
    async fn register(&self, request: &RegistrationRequest) -> GatewayResult<RegistrationResponse> {
        let url = self.config.endpoint("register");
        debug!(url = %url, agent = %request.agent.name(), "posting registration");

        let response = self.http_client.post(&url).json(request).send().await?;
        decode(response).await
    }

    async fn verify(&self, agent_id: &str) -> GatewayResult<VerificationResponse> {
        let url = self.verify_url(agent_id)?;
        debug!(url = %url, "verifying agent");

        let response = self.http_client.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(VerificationResponse::missing());
        }
        decode(response).await
    }

    async fn health(&self) -> GatewayResult<HealthStatus> {
        let url = self.config.endpoint("health");
        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }
        // Some deployments answer with plain text.
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes).unwrap_or_default())
    }
}
