//! Local, advisory trust-score estimation.
//!
//! The estimate only previews what the registration service is likely to
//! assign. When the service returns its own score the caller uses that one
//! and drops this estimate; the two are never combined.

use std::fmt;

use crate::format::AgentFormat;
use crate::obs;
use crate::record::{AgentRecord, DefaultedField};

/// Starting score before any bonus.
pub const BASELINE: u8 = 70;

/// Highest score a local estimate can reach.
pub const PREVIEW_CEILING: u8 = 95;

/// Highest score the service can assign.
pub const AUTHORITATIVE_CEILING: u8 = 100;

const NAME_BONUS: u8 = 5;
const DESCRIPTION_BONUS: u8 = 5;
const DESCRIPTION_RICH_LEN: usize = 50;
const DESCRIPTION_DETAILED_LEN: usize = 100;
const CAPABILITY_BONUS: u8 = 5;
const CAPABILITY_RICH_COUNT: usize = 3;
const VERSION_BONUS: u8 = 5;
const STRUCTURED_OUTPUT_BONUS: u8 = 5;
const ORCHESTRATION_BONUS: u8 = 3;
const MEMORY_BONUS: u8 = 2;

/// A trust score percentage.
///
/// Provisional scores come from the preview period (local estimates and the
/// service's `TEMP-` scores); authoritative scores come from the service once
/// registration is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrustScore {
    value: u8,
    provisional: bool,
}

impl TrustScore {
    /// Provisional score, clamped to the preview ceiling.
    pub fn preview(value: u8) -> Self {
        Self {
            value: value.min(PREVIEW_CEILING),
            provisional: true,
        }
    }

    /// Authoritative score, clamped to 100.
    pub fn authoritative(value: u8) -> Self {
        Self {
            value: value.min(AUTHORITATIVE_CEILING),
            provisional: false,
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn is_provisional(&self) -> bool {
        self.provisional
    }

    /// Parse `TEMP-<n>%` or `<n>%`.
    ///
    /// Returns `None` for anything else, including values above 100.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (provisional, rest) = match text.strip_prefix("TEMP-") {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let digits = rest.strip_suffix('%')?;
        let value: u8 = digits.parse().ok()?;
        if value > AUTHORITATIVE_CEILING {
            return None;
        }
        Some(Self { value, provisional })
    }
}

impl fmt::Display for TrustScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.provisional {
            write!(f, "TEMP-{}%", self.value)
        } else {
            write!(f, "{}%", self.value)
        }
    }
}

/// Per-signal breakdown of an estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub name: u8,
    pub description: u8,
    pub capabilities: u8,
    pub version: u8,
    pub structured_output: u8,
    pub orchestration: u8,
    pub memory: u8,
}

impl ScoreBreakdown {
    pub fn bonus(&self) -> u8 {
        self.name
            + self.description
            + self.capabilities
            + self.version
            + self.structured_output
            + self.orchestration
            + self.memory
    }

    pub fn total(&self) -> u8 {
        BASELINE.saturating_add(self.bonus()).min(PREVIEW_CEILING)
    }
}

/// Score each richness signal of `record`.
///
/// Format bonuses only apply when `format` belongs to the matching
/// capability class, so a generic record with a stray `orchestration` trait
/// earns nothing for it.
pub fn breakdown(record: &AgentRecord, format: AgentFormat) -> ScoreBreakdown {
    let metadata = record.metadata();
    let traits = record.traits();
    let description_len = record.description().chars().count();
    let capability_count = record.capabilities().len();

    let mut score = ScoreBreakdown::default();

    if !metadata.was_defaulted(DefaultedField::Name) {
        score.name = NAME_BONUS;
    }
    if description_len > DESCRIPTION_RICH_LEN {
        score.description += DESCRIPTION_BONUS;
    }
    if description_len > DESCRIPTION_DETAILED_LEN {
        score.description += DESCRIPTION_BONUS;
    }
    if capability_count > 0 {
        score.capabilities += CAPABILITY_BONUS;
    }
    if capability_count > CAPABILITY_RICH_COUNT {
        score.capabilities += CAPABILITY_BONUS;
    }
    if !metadata.was_defaulted(DefaultedField::Version) {
        score.version = VERSION_BONUS;
    }
    if format.is_schema_based() && traits.structured_output {
        score.structured_output = STRUCTURED_OUTPUT_BONUS;
    }
    if format.supports_orchestration() && traits.orchestration {
        score.orchestration = ORCHESTRATION_BONUS;
    }
    if format.is_memory_aware() && (traits.persistent_memory || traits.session_aware) {
        score.memory = MEMORY_BONUS;
    }
    score
}

/// Advisory preview score for `record`, within `[0, 95]`.
pub fn estimate(record: &AgentRecord, format: AgentFormat) -> TrustScore {
    let score = TrustScore::preview(breakdown(record, format).total());
    obs::emit_score_estimated(format, record.name(), score.value());
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use crate::raw::RawConfig;
    use serde_json::json;

    fn record(value: serde_json::Value, format: AgentFormat) -> AgentRecord {
        normalize(&RawConfig::from_value(value).expect("object"), format)
    }

    #[test]
    fn test_bare_record_scores_baseline() {
        let r = record(json!({}), AgentFormat::Generic);
        assert_eq!(estimate(&r, AgentFormat::Generic), TrustScore::preview(70));
    }

    #[test]
    fn test_description_thresholds() {
        let short = record(json!({"description": "a".repeat(50)}), AgentFormat::Generic);
        let medium = record(json!({"description": "a".repeat(51)}), AgentFormat::Generic);
        let long = record(json!({"description": "a".repeat(101)}), AgentFormat::Generic);
        assert_eq!(breakdown(&short, AgentFormat::Generic).description, 0);
        assert_eq!(breakdown(&medium, AgentFormat::Generic).description, 5);
        assert_eq!(breakdown(&long, AgentFormat::Generic).description, 10);
    }

    #[test]
    fn test_capability_thresholds() {
        let three = record(json!({"tools": ["a", "b", "c"]}), AgentFormat::Generic);
        let four = record(json!({"tools": ["a", "b", "c", "d"]}), AgentFormat::Generic);
        assert_eq!(breakdown(&three, AgentFormat::Generic).capabilities, 5);
        assert_eq!(breakdown(&four, AgentFormat::Generic).capabilities, 10);
    }

    #[test]
    fn test_format_bonuses_are_gated_by_class() {
        let adk = record(
            json!({
                "name": "Planner",
                "input_schema": {"type": "object"},
                "output_schema": {"type": "object"},
                "sub_agents": [{"name": "a"}],
                "session_service": "memory",
            }),
            AgentFormat::GoogleAdk,
        );
        let b = breakdown(&adk, AgentFormat::GoogleAdk);
        assert_eq!(b.structured_output, 5);
        assert_eq!(b.orchestration, 3);
        assert_eq!(b.memory, 2);

        // The same traits earn nothing on a format outside the class.
        let b = breakdown(&adk, AgentFormat::OpenAi);
        assert_eq!(b.structured_output + b.orchestration + b.memory, 0);
    }

    #[test]
    fn test_estimate_is_capped() {
        let rich = record(
            json!({
                "name": "Everything",
                "description": "d".repeat(150),
                "version": "2.0.0",
                "agent_type": "sequential",
                "input_schema": {"type": "object"},
                "output_schema": {"type": "object"},
                "tools": ["a", "b", "c", "d", "e"],
                "session_service": "memory",
            }),
            AgentFormat::GoogleAdk,
        );
        let b = breakdown(&rich, AgentFormat::GoogleAdk);
        assert!(BASELINE + b.bonus() > PREVIEW_CEILING);
        assert_eq!(estimate(&rich, AgentFormat::GoogleAdk).value(), 95);
    }

    #[test]
    fn test_display_and_parse() {
        assert_eq!(TrustScore::preview(85).to_string(), "TEMP-85%");
        assert_eq!(TrustScore::authoritative(92).to_string(), "92%");
        assert_eq!(TrustScore::parse("TEMP-85%"), Some(TrustScore::preview(85)));
        assert_eq!(TrustScore::parse(" 100% "), Some(TrustScore::authoritative(100)));
        assert_eq!(TrustScore::parse("101%"), None);
        assert_eq!(TrustScore::parse("TEMP-85"), None);
        assert_eq!(TrustScore::parse("high"), None);
    }

    #[test]
    fn test_preview_is_clamped() {
        assert_eq!(TrustScore::preview(99).value(), 95);
        assert!(TrustScore::preview(99).is_provisional());
    }
}
