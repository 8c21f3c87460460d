//! AstraSync Core Library
//!
//! Turns agent definitions written for any supported framework into one
//! canonical record: load the raw configuration, detect its format,
//! normalize it, and estimate a preview trust score.

pub mod detect;
pub mod digest;
pub mod error;
pub mod format;
pub mod normalize;
pub mod obs;
pub mod raw;
pub mod record;
pub mod rules;
pub mod telemetry;
pub mod trust;
pub mod validation;

pub use detect::{candidates, detect};
pub use error::{AstraError, Result};
pub use format::{AgentFormat, UnknownFormatTag};
pub use normalize::{normalize, placeholder_name, NormalizeOptions, Normalizer};
pub use raw::{load, RawConfig, RawInput};
pub use record::{AgentMetadata, AgentRecord, AgentTraits, DefaultedField};
pub use rules::{FormatRule, FORMAT_RULES};
pub use telemetry::{init_tracing, LogFormat};
pub use trust::{estimate, ScoreBreakdown, TrustScore};
pub use validation::{validate_agent_id, validate_email};

/// SDK version reported to the registration service.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Load, detect and normalize in one step.
///
/// # Errors
///
/// Only the loader can fail; see [`raw::load`].
pub fn ingest(input: RawInput, options: &NormalizeOptions) -> Result<(AgentFormat, AgentRecord)> {
    let raw = load(input)?;
    let format = detect(&raw);
    let record = Normalizer::new(options.clone()).normalize(&raw, format);
    Ok((format, record))
}
