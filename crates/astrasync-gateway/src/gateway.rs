//! The registration backend seam.
//!
//! Implementations: [`HttpGateway`](crate::HttpGateway) for the hosted
//! service and [`MemoryGateway`](crate::MemoryGateway) for offline preview
//! and tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::GatewayResult;
use crate::types::{HealthStatus, RegistrationRequest, RegistrationResponse, VerificationResponse};

#[async_trait]
pub trait RegistrationGateway: Send + Sync {
    /// Submit a canonical record for registration.
    async fn register(&self, request: &RegistrationRequest) -> GatewayResult<RegistrationResponse>;

    /// Look up a previously issued agent id.
    async fn verify(&self, agent_id: &str) -> GatewayResult<VerificationResponse>;

    async fn health(&self) -> GatewayResult<HealthStatus>;
}

#[async_trait]
impl<G> RegistrationGateway for Arc<G>
where
    G: RegistrationGateway + ?Sized,
{
    async fn register(&self, request: &RegistrationRequest) -> GatewayResult<RegistrationResponse> {
        (**self).register(request).await
    }

    async fn verify(&self, agent_id: &str) -> GatewayResult<VerificationResponse> {
        (**self).verify(agent_id).await
    }

    async fn health(&self) -> GatewayResult<HealthStatus> {
        (**self).health().await
    }
}
