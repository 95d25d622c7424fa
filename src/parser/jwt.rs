//! Reads the claims of a bearer token without verifying its signature.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::errors::ParseError;

// JWT segments are base64url without padding, but some issuers pad anyway
const JWT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct JwtClaims {
    /// Expiry, seconds since epoch. Any JSON number, fractions truncated.
    #[serde(deserialize_with = "numeric_date")]
    pub exp: i64,
    #[serde(default, deserialize_with = "optional_numeric_date", skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_id: Option<String>,
}

fn numeric_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let seconds = f64::deserialize(deserializer)?;
    if !seconds.is_finite() || seconds.abs() > i64::MAX as f64 {
        return Err(D::Error::custom(format!("numeric date out of range: {}", seconds)));
    }
    Ok(seconds.trunc() as i64)
}

fn optional_numeric_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    match Option::<f64>::deserialize(deserializer)? {
        Some(seconds) if seconds.is_finite() => Ok(Some(seconds.trunc() as i64)),
        Some(seconds) => Err(D::Error::custom(format!("numeric date out of range: {}", seconds))),
        None => Ok(None),
    }
}

pub fn decode_claims(token: &str) -> Result<JwtClaims, ParseError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(ParseError::MalformedJwt(format!(
            "expected 3 segments, got {}",
            parts.len()
        )));
    }

    let decoded = JWT_ENGINE.decode(parts[1])?;
    let claims: JwtClaims = serde_json::from_slice(&decoded)?;
    debug!(exp = claims.exp, "jwt claims decoded");
    Ok(claims)
}

/// `exp` converted to milliseconds, the unit the cache compares against.
pub fn expiry_millis(token: &str) -> Result<i64, ParseError> {
    let exp = decode_claims(token)?.exp;
    exp.checked_mul(1000)
        .ok_or_else(|| ParseError::MalformedJwt(format!("exp claim out of range: {}", exp)))
}
