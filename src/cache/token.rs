use serde::Deserialize;

use crate::errors::ParseError;
use crate::parser::jwt;

/// A bearer token together with the expiry decoded from its `exp` claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub expires_at_ms: i64, // UNIX TIMESTAMP, milliseconds
}

impl Token {
    pub fn new(value: String, expires_at_ms: i64) -> Self {
        Self { value, expires_at_ms }
    }

    /// Decode the expiry out of a freshly issued token.
    pub fn from_jwt(value: String) -> Result<Self, ParseError> {
        let expires_at_ms = jwt::expiry_millis(&value)?;
        Ok(Self { value, expires_at_ms })
    }

    pub fn is_stale(&self, now_ms: i64, margin_ms: i64, policy: RefreshPolicy) -> bool {
        policy.is_stale(self.expires_at_ms, now_ms, margin_ms)
    }
}

/// Decides when a cached token must be reissued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPolicy {
    /// Reissue once the expiry lies at or before `now - margin`.
    /// A token is served until a margin *after* its literal expiry.
    #[default]
    PastMargin,
    /// Reissue once `now + margin` reaches the expiry.
    BeforeExpiry,
}

impl RefreshPolicy {
    pub fn is_stale(&self, expires_at_ms: i64, now_ms: i64, margin_ms: i64) -> bool {
        match self {
            RefreshPolicy::PastMargin => expires_at_ms <= now_ms - margin_ms,
            RefreshPolicy::BeforeExpiry => now_ms + margin_ms >= expires_at_ms,
        }
    }
}
