//! Caller identity and agent-id validation.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{AstraError, Result};

/// Accepted email shape.
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// Prefix of identifiers issued during the preview period.
pub const PREVIEW_ID_PREFIX: &str = "TEMP-";

/// Prefix of identifiers issued once registration is final.
pub const PRODUCTION_ID_PREFIX: &str = "ASTRAS-";

pub const AGENT_ID_PREFIXES: &[&str] = &[PREVIEW_ID_PREFIX, PRODUCTION_ID_PREFIX];

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_some_and(|re| re.is_match(email))
}

/// # Errors
///
/// `AstraError::InvalidEmail` when `email` does not match [`EMAIL_PATTERN`].
pub fn validate_email(email: &str) -> Result<()> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(AstraError::InvalidEmail(email.to_string()))
    }
}

/// Whether `agent_id` was issued during the preview period.
pub fn is_preview_id(agent_id: &str) -> bool {
    agent_id.starts_with(PREVIEW_ID_PREFIX)
}

/// # Errors
///
/// `AstraError::InvalidAgentId` unless `agent_id` carries a known prefix
/// followed by a non-empty remainder.
pub fn validate_agent_id(agent_id: &str) -> Result<()> {
    let valid = AGENT_ID_PREFIXES.iter().any(|prefix| {
        agent_id
            .strip_prefix(prefix)
            .is_some_and(|rest| !rest.trim().is_empty())
    });
    if valid {
        Ok(())
    } else {
        Err(AstraError::InvalidAgentId(agent_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        for email in ["dev@example.com", "first.last+tag@sub.example.io", "a_b%c@x.co"] {
            assert!(validate_email(email).is_ok(), "{email} should be valid");
        }
    }

    #[test]
    fn test_invalid_emails() {
        for email in ["", "plain", "no-at.example.com", "a@b", "a@b.c", "a b@example.com"] {
            assert!(
                matches!(validate_email(email), Err(AstraError::InvalidEmail(_))),
                "{email:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_agent_id_prefixes() {
        assert!(validate_agent_id("TEMP-1706439245-X7K9M2").is_ok());
        assert!(validate_agent_id("ASTRAS-0001").is_ok());
        assert!(is_preview_id("TEMP-1"));
        assert!(!is_preview_id("ASTRAS-1"));

        for id in ["", "TEMP-", "ASTRAS- ", "temp-123", "AGENT-1"] {
            assert!(
                matches!(validate_agent_id(id), Err(AstraError::InvalidAgentId(_))),
                "{id:?} should be rejected"
            );
        }
    }
}
