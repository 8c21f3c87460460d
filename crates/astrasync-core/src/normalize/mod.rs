//! Field normalization: raw record + format tag → [`AgentRecord`].
//!
//! The per-format rules live in [`formats`]; this module applies the
//! cross-format defaults (name placeholder, owner, version) and assembles the
//! metadata grouping.

pub(crate) mod formats;
mod reader;

pub use reader::{
    str_field, tool_name, truncate_prose, truthy, Capabilities, Extraction, FieldReader,
};

use crate::format::AgentFormat;
use crate::obs;
use crate::raw::RawConfig;
use crate::record::{AgentMetadata, AgentRecord, DefaultedField};
use crate::rules;

pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_OWNER: &str = "Unknown";
pub const DEFAULT_DESCRIPTION_LIMIT: usize = 200;

/// Fallback values and limits applied by the [`Normalizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub default_version: String,
    pub default_owner: String,
    /// Caller-supplied owner; wins over anything in the raw record.
    pub owner_override: Option<String>,
    /// Maximum description length, in characters, for prose sources.
    pub description_limit: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            default_version: DEFAULT_VERSION.to_string(),
            default_owner: DEFAULT_OWNER.to_string(),
            owner_override: None,
            description_limit: DEFAULT_DESCRIPTION_LIMIT,
        }
    }
}

impl NormalizeOptions {
    pub fn with_default_version(mut self, version: impl Into<String>) -> Self {
        self.default_version = version.into();
        self
    }

    pub fn with_default_owner(mut self, owner: impl Into<String>) -> Self {
        self.default_owner = owner.into();
        self
    }

    /// Blank overrides are ignored.
    pub fn with_owner_override(mut self, owner: Option<String>) -> Self {
        self.owner_override = owner.filter(|o| !o.trim().is_empty());
        self
    }

    pub fn with_description_limit(mut self, limit: usize) -> Self {
        self.description_limit = limit;
        self
    }
}

/// Placeholder name for a record that declares none.
pub fn placeholder_name(format: AgentFormat) -> String {
    match format {
        AgentFormat::Generic => "Unnamed Agent".to_string(),
        other => format!("Unnamed {} Agent", other.label()),
    }
}

/// Maps raw records to canonical records.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    options: NormalizeOptions,
}

impl Normalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize `raw` using the rule set for `format`.
    ///
    /// Total: malformed fields fall back to defaults and stay in the
    /// passthrough. The same input always yields the same record.
    pub fn normalize(&self, raw: &RawConfig, format: AgentFormat) -> AgentRecord {
        let rule = rules::rule_for(format);
        let mut reader = FieldReader::new(raw, format, self.options.description_limit);
        let mut extraction = Extraction::default();
        (rule.extract)(&mut reader, &mut extraction);

        let mut defaulted = Vec::new();

        let name = extraction.name.unwrap_or_else(|| {
            defaulted.push(DefaultedField::Name);
            placeholder_name(format)
        });

        let owner = match (&self.options.owner_override, extraction.owner) {
            (Some(owner), _) => owner.clone(),
            (None, Some(owner)) => owner,
            (None, None) => {
                defaulted.push(DefaultedField::Owner);
                self.options.default_owner.clone()
            }
        };

        let version = reader.version("version").unwrap_or_else(|| {
            defaulted.push(DefaultedField::Version);
            self.options.default_version.clone()
        });

        let description = extraction.description.unwrap_or_default();
        let capabilities = extraction.capabilities.into_vec();

        let metadata = AgentMetadata {
            traits: extraction.traits,
            attributes: extraction.attributes,
            passthrough: reader.passthrough(),
            defaulted,
        };

        obs::emit_record_normalized(
            format,
            &name,
            capabilities.len(),
            metadata.passthrough.len(),
        );

        AgentRecord::new(
            name,
            description,
            owner,
            format,
            capabilities,
            version,
            metadata,
        )
    }
}

/// Normalize with the default options.
pub fn normalize(raw: &RawConfig, format: AgentFormat) -> AgentRecord {
    Normalizer::default().normalize(raw, format)
}
