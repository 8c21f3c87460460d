//! Structured observability hooks for AstraSync registration events.
//!
//! This module provides:
//! - A registration-scoped tracing span via [`registration_span`]
//! - Emission functions for detection, normalization, scoring and the
//!   registration round trip
//!
//! Pipeline events are emitted at `debug!`, registration events at `info!`.
//! Filter with `RUST_LOG`; JSON output is selected by the binary.

use tracing::{debug, info, warn};

use crate::format::AgentFormat;

/// Registration-scoped span carrying the caller email and detected format.
///
/// Attach it to the gateway round trip with `tracing::Instrument`.
///
/// # Example
///
/// ```ignore
/// let span = registration_span("dev@example.com", AgentFormat::OpenAi);
/// gateway.register(&request).instrument(span).await
/// ```
pub fn registration_span(email: &str, format: AgentFormat) -> tracing::Span {
    tracing::info_span!("astrasync.registration", email = %email, format = %format)
}

/// Emit event: a detection rule matched (or the generic fallback applied).
pub fn emit_format_detected(format: AgentFormat, priority: usize, key_count: usize) {
    debug!(
        event = "format.detected",
        format = %format,
        priority = priority,
        key_count = key_count,
    );
}

/// Emit event: a field had the wrong shape and was left in the passthrough.
pub fn emit_malformed_field(format: AgentFormat, key: &str, expected: &str) {
    debug!(
        event = "record.malformed_field",
        format = %format,
        key = %key,
        expected = %expected,
    );
}

pub fn emit_record_normalized(
    format: AgentFormat,
    name: &str,
    capability_count: usize,
    passthrough_count: usize,
) {
    debug!(
        event = "record.normalized",
        format = %format,
        name = %name,
        capabilities = capability_count,
        passthrough = passthrough_count,
    );
}

pub fn emit_score_estimated(format: AgentFormat, name: &str, score: u8) {
    debug!(event = "trust.estimated", format = %format, name = %name, score = score);
}

/// Emit event: a registration request is about to be sent.
pub fn emit_registration_submitted(format: AgentFormat, name: &str, digest: &str) {
    info!(
        event = "registration.submitted",
        format = %format,
        name = %name,
        digest = %digest,
    );
}

/// Emit event: the service accepted a registration.
pub fn emit_registration_completed(agent_id: &str, status: &str, trust_score: &str) {
    info!(
        event = "registration.completed",
        agent_id = %agent_id,
        status = %status,
        trust_score = %trust_score,
    );
}

/// Emit event: a registration failed (warning level).
pub fn emit_registration_failed(format: AgentFormat, error: &dyn std::fmt::Display) {
    warn!(event = "registration.failed", format = %format, error = %error);
}

pub fn emit_verification(agent_id: &str, exists: bool) {
    info!(event = "registration.verified", agent_id = %agent_id, exists = exists);
}
