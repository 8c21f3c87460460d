//! Process-wide registration counters.
//!
//! Submissions and failures are counted per detected [`AgentFormat`], so a
//! flush shows the mix of frameworks a process registered. Gateway failures
//! are further split by [`FailureKind`], and accepted registrations by
//! whether the service issued a preview or a final id.
//!
//! [`RegistrationMetrics::flush`] emits everything as one `tracing::info!`
//! event; the CLI calls it before exiting.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use astrasync_core::AgentFormat;
use serde::Serialize;

use crate::error::GatewayError;
use crate::types::RegistrationResponse;

const FORMAT_COUNT: usize = AgentFormat::ALL.len();

#[allow(clippy::declare_interior_mutable_const)]
const ZERO: AtomicU64 = AtomicU64::new(0);

/// Global metrics singleton.
pub static METRICS: RegistrationMetrics = RegistrationMetrics::new();

/// Why a submission did not produce a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The service could not be reached.
    Unreachable,
    /// The service answered with a non-success status.
    Rejected,
    /// The service answered with a body that did not decode.
    InvalidResponse,
    /// The request never left the process.
    Local,
}

impl FailureKind {
    pub fn of(error: &GatewayError) -> Self {
        match error {
            GatewayError::Http(_) => FailureKind::Unreachable,
            GatewayError::Status { .. } => FailureKind::Rejected,
            GatewayError::InvalidResponse(_) => FailureKind::InvalidResponse,
            GatewayError::Encode(_) | GatewayError::Config(_) => FailureKind::Local,
        }
    }
}

/// Point-in-time copy of every counter. Formats with no traffic are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub submitted: BTreeMap<AgentFormat, u64>,
    pub failed: BTreeMap<AgentFormat, u64>,
    pub accepted_preview: u64,
    pub accepted_final: u64,
    pub unreachable: u64,
    pub rejected: u64,
    pub invalid_responses: u64,
    pub local_failures: u64,
    pub verified_found: u64,
    pub verified_missing: u64,
}

pub struct RegistrationMetrics {
    submitted: [AtomicU64; FORMAT_COUNT],
    failed: [AtomicU64; FORMAT_COUNT],
    accepted_preview: AtomicU64,
    accepted_final: AtomicU64,
    unreachable: AtomicU64,
    rejected: AtomicU64,
    invalid_responses: AtomicU64,
    local_failures: AtomicU64,
    verified_found: AtomicU64,
    verified_missing: AtomicU64,
}

impl Default for RegistrationMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter slot of a format; tags are declared in `AgentFormat::ALL` order.
fn slot(format: AgentFormat) -> usize {
    format as usize
}

fn load(counter: &AtomicU64) -> u64 {
    counter.load(Ordering::Relaxed)
}

fn per_format(counters: &[AtomicU64; FORMAT_COUNT]) -> BTreeMap<AgentFormat, u64> {
    AgentFormat::ALL
        .iter()
        .map(|format| (*format, load(&counters[slot(*format)])))
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// `openai=2,crewai=1` in tag order.
fn mix(counts: &BTreeMap<AgentFormat, u64>) -> String {
    counts
        .iter()
        .map(|(format, count)| format!("{format}={count}"))
        .collect::<Vec<_>>()
        .join(",")
}

impl RegistrationMetrics {
    pub const fn new() -> Self {
        Self {
            submitted: [ZERO; FORMAT_COUNT],
            failed: [ZERO; FORMAT_COUNT],
            accepted_preview: ZERO,
            accepted_final: ZERO,
            unreachable: ZERO,
            rejected: ZERO,
            invalid_responses: ZERO,
            local_failures: ZERO,
            verified_found: ZERO,
            verified_missing: ZERO,
        }
    }

    pub fn record_submitted(&self, format: AgentFormat) {
        self.submitted[slot(format)].fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "submitted", format = %format, "counter incremented");
    }

    pub fn record_accepted(&self, response: &RegistrationResponse) {
        let counter = if response.is_preview() {
            &self.accepted_preview
        } else {
            &self.accepted_final
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self, format: AgentFormat, error: &GatewayError) {
        self.failed[slot(format)].fetch_add(1, Ordering::Relaxed);
        let counter = match FailureKind::of(error) {
            FailureKind::Unreachable => &self.unreachable,
            FailureKind::Rejected => &self.rejected,
            FailureKind::InvalidResponse => &self.invalid_responses,
            FailureKind::Local => &self.local_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "failed", format = %format, "counter incremented");
    }

    pub fn record_verification(&self, exists: bool) {
        let counter = if exists {
            &self.verified_found
        } else {
            &self.verified_missing
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn submitted(&self, format: AgentFormat) -> u64 {
        load(&self.submitted[slot(format)])
    }

    pub fn failed(&self, format: AgentFormat) -> u64 {
        load(&self.failed[slot(format)])
    }

    pub fn total_submitted(&self) -> u64 {
        self.submitted.iter().map(load).sum()
    }

    pub fn total_failed(&self) -> u64 {
        self.failed.iter().map(load).sum()
    }

    pub fn failures(&self, kind: FailureKind) -> u64 {
        match kind {
            FailureKind::Unreachable => load(&self.unreachable),
            FailureKind::Rejected => load(&self.rejected),
            FailureKind::InvalidResponse => load(&self.invalid_responses),
            FailureKind::Local => load(&self.local_failures),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            submitted: per_format(&self.submitted),
            failed: per_format(&self.failed),
            accepted_preview: load(&self.accepted_preview),
            accepted_final: load(&self.accepted_final),
            unreachable: load(&self.unreachable),
            rejected: load(&self.rejected),
            invalid_responses: load(&self.invalid_responses),
            local_failures: load(&self.local_failures),
            verified_found: load(&self.verified_found),
            verified_missing: load(&self.verified_missing),
        }
    }

    /// Emit the current snapshot as a single `info!` event.
    pub fn flush(&self) {
        let snapshot = self.snapshot();
        tracing::info!(
            metric = "flush",
            submitted = %mix(&snapshot.submitted),
            failed = %mix(&snapshot.failed),
            accepted_preview = snapshot.accepted_preview,
            accepted_final = snapshot.accepted_final,
            unreachable = snapshot.unreachable,
            rejected = snapshot.rejected,
            invalid_responses = snapshot.invalid_responses,
            verified_found = snapshot.verified_found,
            verified_missing = snapshot.verified_missing,
        );
    }

    /// Zero every counter.
    pub fn reset(&self) {
        for counter in self.submitted.iter().chain(self.failed.iter()) {
            counter.store(0, Ordering::Relaxed);
        }
        for counter in [
            &self.accepted_preview,
            &self.accepted_final,
            &self.unreachable,
            &self.rejected,
            &self.invalid_responses,
            &self.local_failures,
            &self.verified_found,
            &self.verified_missing,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn response(agent_id: &str) -> RegistrationResponse {
        RegistrationResponse {
            agent_id: agent_id.to_string(),
            status: "registered".to_string(),
            trust_score: None,
            blockchain: None,
            extra: Map::new(),
        }
    }

    #[test]
    fn test_submissions_are_counted_per_format() {
        let m = RegistrationMetrics::new();
        m.record_submitted(AgentFormat::OpenAi);
        m.record_submitted(AgentFormat::OpenAi);
        m.record_submitted(AgentFormat::CrewAi);

        assert_eq!(m.submitted(AgentFormat::OpenAi), 2);
        assert_eq!(m.submitted(AgentFormat::CrewAi), 1);
        assert_eq!(m.submitted(AgentFormat::Generic), 0);
        assert_eq!(m.total_submitted(), 3);
        assert_eq!(mix(&m.snapshot().submitted), "openai=2,crewai=1");
        m.flush();
    }

    #[test]
    fn test_failures_are_classified() {
        let m = RegistrationMetrics::new();
        m.record_failed(AgentFormat::N8n, &GatewayError::Http("refused".into()));
        m.record_failed(
            AgentFormat::N8n,
            &GatewayError::Status {
                status: 503,
                body: String::new(),
            },
        );
        m.record_failed(
            AgentFormat::Letta,
            &GatewayError::InvalidResponse("html".into()),
        );

        assert_eq!(m.failed(AgentFormat::N8n), 2);
        assert_eq!(m.total_failed(), 3);
        assert_eq!(m.failures(FailureKind::Unreachable), 1);
        assert_eq!(m.failures(FailureKind::Rejected), 1);
        assert_eq!(m.failures(FailureKind::InvalidResponse), 1);
        assert_eq!(m.failures(FailureKind::Local), 0);
    }

    #[test]
    fn test_accepted_split_by_id_kind() {
        let m = RegistrationMetrics::new();
        m.record_accepted(&response("TEMP-1-ABC"));
        m.record_accepted(&response("ASTRAS-42"));
        m.record_accepted(&response("TEMP-2-DEF"));
        m.record_verification(true);
        m.record_verification(false);

        let snapshot = m.snapshot();
        assert_eq!(snapshot.accepted_preview, 2);
        assert_eq!(snapshot.accepted_final, 1);
        assert_eq!(snapshot.verified_found, 1);
        assert_eq!(snapshot.verified_missing, 1);
    }

    #[test]
    fn test_snapshot_serializes_format_tags() {
        let m = RegistrationMetrics::new();
        m.record_submitted(AgentFormat::GoogleAdk);
        let value = serde_json::to_value(m.snapshot()).expect("serialize");
        assert_eq!(value["submitted"], json!({"google_adk": 1}));
        assert_eq!(value["failed"], json!({}));
    }

    #[test]
    fn test_reset_zeroes_all() {
        let m = RegistrationMetrics::new();
        m.record_submitted(AgentFormat::Mcp);
        m.record_failed(AgentFormat::Mcp, &GatewayError::Config("bad".into()));
        m.record_accepted(&response("ASTRAS-1"));
        m.record_verification(true);
        m.reset();
        assert_eq!(m.snapshot(), MetricsSnapshot::default());
    }
}
