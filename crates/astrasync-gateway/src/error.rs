//! Error types for the registration gateway and client.

use astrasync_core::AstraError;
use thiserror::Error;

/// Errors raised while talking to a registration backend.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Transport failure (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered with a non-success status.
    #[error("registration service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered with a body we could not decode.
    #[error("invalid response from registration service: {0}")]
    InvalidResponse(String),

    /// The request could not be encoded.
    #[error("could not encode request: {0}")]
    Encode(String),

    #[error("gateway configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GatewayError::InvalidResponse(err.to_string())
        } else {
            GatewayError::Http(err.to_string())
        }
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Errors surfaced by [`AstraSyncClient`](crate::AstraSyncClient).
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("email is required for registration; set it on the client or via ASTRASYNC_EMAIL")]
    MissingEmail,

    #[error(transparent)]
    Core(#[from] AstraError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
