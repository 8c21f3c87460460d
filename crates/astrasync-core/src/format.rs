//! Closed enumeration of the agent-definition dialects AstraSync understands.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One framework's schema for agent definitions.
///
/// Every raw record is assigned exactly one of these; `Generic` is the
/// universal fallback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgentFormat {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "mcp")]
    Mcp,
    #[serde(rename = "letta")]
    Letta,
    #[serde(rename = "ibm_acp")]
    IbmAcp,
    #[serde(rename = "autogpt")]
    AutoGpt,
    #[serde(rename = "agentforce")]
    Agentforce,
    #[serde(rename = "google_adk")]
    GoogleAdk,
    #[serde(rename = "langchain")]
    LangChain,
    #[serde(rename = "crewai")]
    CrewAi,
    #[serde(rename = "n8n")]
    N8n,
    #[serde(rename = "agentstack")]
    AgentStack,
    #[serde(rename = "generic")]
    Generic,
}

impl AgentFormat {
    /// Every tag, in declaration order.
    pub const ALL: [AgentFormat; 12] = [
        AgentFormat::OpenAi,
        AgentFormat::Mcp,
        AgentFormat::Letta,
        AgentFormat::IbmAcp,
        AgentFormat::AutoGpt,
        AgentFormat::Agentforce,
        AgentFormat::GoogleAdk,
        AgentFormat::LangChain,
        AgentFormat::CrewAi,
        AgentFormat::N8n,
        AgentFormat::AgentStack,
        AgentFormat::Generic,
    ];

    /// Wire and display string for this tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentFormat::OpenAi => "openai",
            AgentFormat::Mcp => "mcp",
            AgentFormat::Letta => "letta",
            AgentFormat::IbmAcp => "ibm_acp",
            AgentFormat::AutoGpt => "autogpt",
            AgentFormat::Agentforce => "agentforce",
            AgentFormat::GoogleAdk => "google_adk",
            AgentFormat::LangChain => "langchain",
            AgentFormat::CrewAi => "crewai",
            AgentFormat::N8n => "n8n",
            AgentFormat::AgentStack => "agentstack",
            AgentFormat::Generic => "generic",
        }
    }

    /// Human-readable framework name, used in generated placeholder names.
    pub fn label(&self) -> &'static str {
        match self {
            AgentFormat::OpenAi => "OpenAI",
            AgentFormat::Mcp => "MCP",
            AgentFormat::Letta => "Letta",
            AgentFormat::IbmAcp => "IBM ACP",
            AgentFormat::AutoGpt => "AutoGPT",
            AgentFormat::Agentforce => "Agentforce",
            AgentFormat::GoogleAdk => "Google ADK",
            AgentFormat::LangChain => "LangChain",
            AgentFormat::CrewAi => "CrewAI",
            AgentFormat::N8n => "n8n",
            AgentFormat::AgentStack => "AgentStack",
            AgentFormat::Generic => "Generic",
        }
    }

    /// Formats that can declare explicit input/output schemas.
    pub fn is_schema_based(&self) -> bool {
        matches!(self, AgentFormat::GoogleAdk)
    }

    /// Formats that can describe multi-step or multi-agent structure.
    pub fn supports_orchestration(&self) -> bool {
        matches!(
            self,
            AgentFormat::GoogleAdk
                | AgentFormat::CrewAi
                | AgentFormat::N8n
                | AgentFormat::AgentStack
                | AgentFormat::LangChain
        )
    }

    /// Formats that can declare persistent memory or session state.
    pub fn is_memory_aware(&self) -> bool {
        matches!(
            self,
            AgentFormat::Letta
                | AgentFormat::LangChain
                | AgentFormat::CrewAi
                | AgentFormat::N8n
                | AgentFormat::AgentStack
                | AgentFormat::GoogleAdk
        )
    }
}

impl fmt::Display for AgentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognised format tag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown agent format: {0}")]
pub struct UnknownFormatTag(pub String);

impl FromStr for AgentFormat {
    type Err = UnknownFormatTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(format) = AgentFormat::ALL.iter().find(|f| f.as_str() == s) {
            return Ok(*format);
        }
        // Tags used by earlier SDK releases.
        match s {
            "acp" => Ok(AgentFormat::IbmAcp),
            "google-adk" => Ok(AgentFormat::GoogleAdk),
            "unknown" => Ok(AgentFormat::Generic),
            other => Err(UnknownFormatTag(other.to_string())),
        }
    }
}
