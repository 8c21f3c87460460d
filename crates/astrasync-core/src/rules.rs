//! The detection priority chain.
//!
//! Each [`FormatRule`] pairs a format with the predicate that recognises it
//! and the extractor that normalizes it. [`FORMAT_RULES`] is ordered: the
//! detector returns the first match, so more specific signatures sit above
//! the broader ones they overlap with. Reordering entries changes behaviour.

use crate::detect;
use crate::format::AgentFormat;
use crate::normalize::formats;
use crate::normalize::{Extraction, FieldReader};
use crate::raw::RawConfig;

/// Recognises one format from key presence and shape.
pub type Predicate = fn(&RawConfig) -> bool;

/// Pulls canonical fields for one format out of a raw record.
pub type Extractor = fn(&mut FieldReader<'_>, &mut Extraction);

/// A `{format, predicate, extractor}` triple.
#[derive(Clone, Copy)]
pub struct FormatRule {
    pub format: AgentFormat,
    pub matches: Predicate,
    pub extract: Extractor,
}

impl std::fmt::Debug for FormatRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRule")
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

/// Detection chain, highest priority first.
pub static FORMAT_RULES: [FormatRule; 11] = [
    FormatRule {
        format: AgentFormat::GoogleAdk,
        matches: detect::is_google_adk,
        extract: formats::extract_google_adk,
    },
    FormatRule {
        format: AgentFormat::Agentforce,
        matches: detect::is_agentforce,
        extract: formats::extract_agentforce,
    },
    FormatRule {
        format: AgentFormat::N8n,
        matches: detect::is_n8n,
        extract: formats::extract_n8n,
    },
    FormatRule {
        format: AgentFormat::AgentStack,
        matches: detect::is_agentstack,
        extract: formats::extract_agentstack,
    },
    FormatRule {
        format: AgentFormat::Mcp,
        matches: detect::is_mcp,
        extract: formats::extract_mcp,
    },
    FormatRule {
        format: AgentFormat::CrewAi,
        matches: detect::is_crewai,
        extract: formats::extract_crewai,
    },
    FormatRule {
        format: AgentFormat::AutoGpt,
        matches: detect::is_autogpt,
        extract: formats::extract_autogpt,
    },
    FormatRule {
        format: AgentFormat::IbmAcp,
        matches: detect::is_ibm_acp,
        extract: formats::extract_ibm_acp,
    },
    FormatRule {
        format: AgentFormat::LangChain,
        matches: detect::is_langchain,
        extract: formats::extract_langchain,
    },
    FormatRule {
        format: AgentFormat::Letta,
        matches: detect::is_letta,
        extract: formats::extract_letta,
    },
    FormatRule {
        format: AgentFormat::OpenAi,
        matches: detect::is_openai,
        extract: formats::extract_openai,
    },
];

fn matches_anything(_: &RawConfig) -> bool {
    true
}

/// Fallback rule for records no other rule recognises.
pub static GENERIC_RULE: FormatRule = FormatRule {
    format: AgentFormat::Generic,
    matches: matches_anything,
    extract: formats::extract_generic,
};

/// The rule that normalizes `format`.
pub fn rule_for(format: AgentFormat) -> &'static FormatRule {
    FORMAT_RULES
        .iter()
        .find(|rule| rule.format == format)
        .unwrap_or(&GENERIC_RULE)
}
