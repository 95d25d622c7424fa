//! Error types for the API key authentication client.
//!
//! Every failure surfaces to the immediate caller. Nothing in this crate
//! retries or falls back to a stale token.

use std::path::PathBuf;

use http::StatusCode;

/// Construction-time failures. Fatal for the client being built.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// No API key in the options nor in `IBMCLOUD_API_KEY`.
    #[error("API key not found: declare it in the client options or in an environment variable named IBMCLOUD_API_KEY")]
    MissingApiKey,

    #[error("invalid {name} '{value}': {reason}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("failed to read settings file '{path}': {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings format: {0}")]
    Format(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// A collaborator response did not have the expected shape.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected response body: {0}")]
    Body(#[from] serde_json::Error),

    #[error("malformed JWT: {0}")]
    MalformedJwt(String),

    #[error("JWT payload is not valid base64url: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Exchanging the API key for a bearer token failed.
#[derive(Debug, thiserror::Error)]
pub enum IssuanceError {
    #[error("failed to reach token endpoint: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("token endpoint answered {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid token response: {0}")]
    Parse(#[from] ParseError),
}

/// Listing resource keys failed.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error(transparent)]
    Issuance(#[from] IssuanceError),

    #[error("failed to reach resource controller: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("resource controller answered {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid resource keys response: {0}")]
    Parse(#[from] ParseError),
}

/// Any failure of the client, for callers that don't care which step broke.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Issuance(#[from] IssuanceError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}
