//! Error taxonomy for the AstraSync core.
//!
//! Only the loader boundary and the identity validators can fail. Detection,
//! normalization and estimation are total over any mapping and never return
//! an error.

/// AstraSync core errors.
#[derive(Debug, thiserror::Error)]
pub enum AstraError {
    #[error("invalid input kind: {0}")]
    InvalidInputKind(String),

    #[error("invalid email format: {0}")]
    InvalidEmail(String),

    #[error("invalid agent id: {0}")]
    InvalidAgentId(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for AstraSync core operations.
pub type Result<T> = std::result::Result<T, AstraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_astra_error_display() {
        let err = AstraError::InvalidInputKind("expected a mapping, got array".to_string());
        assert!(err.to_string().contains("invalid input kind"));
        assert!(err.to_string().contains("array"));

        let err = AstraError::InvalidEmail("not-an-email".to_string());
        assert!(err.to_string().contains("invalid email format"));

        let err = AstraError::InvalidAgentId("XYZ-1".to_string());
        assert!(err.to_string().contains("XYZ-1"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AstraError = io.into();
        assert!(matches!(err, AstraError::Io(_)));
    }
}
