//! AstraSync registration gateway.
//!
//! The [`RegistrationGateway`] trait is the seam between the pure core and
//! the registration service. [`HttpGateway`] talks to the hosted API,
//! [`MemoryGateway`] emulates its preview behaviour offline, and
//! [`AstraSyncClient`] runs the full load → detect → normalize → submit
//! pipeline over either.

pub mod builder;
pub mod client;
pub mod config;
pub mod error;
pub mod fakes;
pub mod gateway;
pub mod http;
pub mod metrics;
pub mod types;

pub use builder::AgentRegistration;
pub use client::{AstraSyncClient, RegistrationOutcome};
pub use config::GatewayConfig;
pub use error::{ClientError, GatewayError, GatewayResult, Result};
pub use fakes::MemoryGateway;
pub use gateway::RegistrationGateway;
pub use http::HttpGateway;
pub use metrics::{FailureKind, MetricsSnapshot, RegistrationMetrics, METRICS};
pub use types::{
    BlockchainStatus, HealthStatus, RegistrationRequest, RegistrationResponse,
    VerificationResponse,
};
