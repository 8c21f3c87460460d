//! Format detection.
//!
//! [`detect`] walks [`FORMAT_RULES`](crate::rules::FORMAT_RULES) in priority
//! order and returns the first format whose predicate matches, or
//! [`AgentFormat::Generic`]. Predicates only look at key presence and shape;
//! a missing or wrong-shaped key simply fails to match.
//!
//! Order matters. A rule whose signature can also appear in a broader format
//! must come first: Google ADK records may carry `model`, so the ADK rule runs
//! before the OpenAI rule, and a CrewAI agent may declare `llm` and `tools`,
//! so CrewAI runs before LangChain.

use serde_json::Value;

use crate::format::AgentFormat;
use crate::obs;
use crate::raw::RawConfig;
use crate::rules::{FormatRule, FORMAT_RULES};

/// `agent_type` values used by Google ADK agents.
pub const ADK_AGENT_TYPES: &[&str] = &["llm", "sequential", "parallel", "loop"];

/// Keys inside a serialized ADK `config` block.
const ADK_CONFIG_MARKERS: &[&str] = &["google.adk", "ADKAgent", "agent_type"];

/// `agent_type` values used by Salesforce Agentforce.
const AGENTFORCE_AGENT_TYPES: &[&str] = &["External", "Internal"];

/// Node type prefixes used by n8n.
const N8N_TYPE_MARKERS: &[&str] = &["n8n-nodes", "@n8n/"];

/// Sub-keys of a Letta memory block.
const LETTA_MEMORY_KEYS: &[&str] = &[
    "core_memory",
    "human",
    "persona",
    "core",
    "recall",
    "archival_memory",
];

/// Keys of a flat AgentStack agent definition.
const AGENTSTACK_AGENT_KEYS: &[&str] = &["agent_name", "system_prompt", "max_loops"];

/// Detect the format of a raw record. Total: never fails.
pub fn detect(raw: &RawConfig) -> AgentFormat {
    match matching_rule(raw) {
        Some((priority, rule)) => {
            obs::emit_format_detected(rule.format, priority, raw.as_map().len());
            rule.format
        }
        None => {
            obs::emit_format_detected(AgentFormat::Generic, FORMAT_RULES.len(), raw.as_map().len());
            AgentFormat::Generic
        }
    }
}

/// First matching rule and its zero-based priority.
pub fn matching_rule(raw: &RawConfig) -> Option<(usize, &'static FormatRule)> {
    FORMAT_RULES
        .iter()
        .enumerate()
        .find(|(_, rule)| (rule.matches)(raw))
}

/// Every format whose predicate matches, in priority order.
///
/// Useful for diagnosing ambiguous records; [`detect`] only reports the
/// first entry.
pub fn candidates(raw: &RawConfig) -> Vec<AgentFormat> {
    FORMAT_RULES
        .iter()
        .filter(|rule| (rule.matches)(raw))
        .map(|rule| rule.format)
        .collect()
}

fn has_n8n_marker(node_type: &str) -> bool {
    N8N_TYPE_MARKERS.iter().any(|m| node_type.contains(m))
}

fn node_has_n8n_type(node: &Value) -> bool {
    node.get("type")
        .and_then(Value::as_str)
        .is_some_and(has_n8n_marker)
}

pub(crate) fn is_google_adk(raw: &RawConfig) -> bool {
    if raw.contains("input_schema") && raw.contains("output_schema") {
        return true;
    }
    if raw
        .str("agent_type")
        .is_some_and(|t| ADK_AGENT_TYPES.contains(&t))
    {
        return true;
    }
    raw.object("config")
        .is_some_and(|config| ADK_CONFIG_MARKERS.iter().any(|k| config.contains_key(*k)))
}

pub(crate) fn is_agentforce(raw: &RawConfig) -> bool {
    if raw.contains("agent_template_type") {
        return true;
    }
    raw.str("agent_type")
        .is_some_and(|t| AGENTFORCE_AGENT_TYPES.contains(&t))
        && (raw.contains("topics") || raw.contains("label"))
}

pub(crate) fn is_n8n(raw: &RawConfig) -> bool {
    if raw.str("type").is_some_and(has_n8n_marker) {
        return true;
    }
    if raw
        .object("workflow")
        .and_then(|wf| wf.get("nodes"))
        .is_some_and(Value::is_array)
    {
        return true;
    }
    raw.array("nodes")
        .is_some_and(|nodes| nodes.iter().any(node_has_n8n_type))
}

pub(crate) fn is_agentstack(raw: &RawConfig) -> bool {
    if raw.object("swarm_architecture").is_some() {
        return true;
    }
    if raw
        .array("agents")
        .is_some_and(|agents| agents.iter().any(|a| a.get("agent_name").is_some()))
    {
        return true;
    }
    AGENTSTACK_AGENT_KEYS
        .iter()
        .filter(|k| raw.contains(k))
        .count()
        >= 2
}

pub(crate) fn is_mcp(raw: &RawConfig) -> bool {
    if raw.str_eq("protocol", "ai-agent") {
        return true;
    }
    // An empty skill list still declares the MCP shape.
    raw.array("skills")
        .is_some_and(|skills| skills.iter().all(|s| s.get("name").is_some()))
}

pub(crate) fn is_crewai(raw: &RawConfig) -> bool {
    if raw.contains("role") && (raw.contains("goal") || raw.contains("backstory")) {
        return true;
    }
    raw.array("agents").is_some() && raw.array("tasks").is_some()
}

pub(crate) fn is_autogpt(raw: &RawConfig) -> bool {
    ["ai_name", "ai_role", "ai_goals"]
        .iter()
        .all(|k| raw.contains(k))
}

pub(crate) fn is_ibm_acp(raw: &RawConfig) -> bool {
    raw.contains("agentId") && raw.contains("authentication")
}

pub(crate) fn is_langchain(raw: &RawConfig) -> bool {
    raw.contains("llm")
        && (raw.array("tools").is_some() || raw.contains("memory") || raw.contains("prompt"))
}

pub(crate) fn is_letta(raw: &RawConfig) -> bool {
    if raw
        .object("memory")
        .is_some_and(|m| LETTA_MEMORY_KEYS.iter().any(|k| m.contains_key(*k)))
    {
        return true;
    }
    raw.str_eq("type", "agent") && raw.contains("memory")
}

pub(crate) fn is_openai(raw: &RawConfig) -> bool {
    raw.contains("model") && raw.contains("instructions")
}
