//! # API Key Authentication Library
//!
//! Exchanges a long-lived cloud API key for short-lived IAM bearer tokens,
//! keeps the current token in memory until it goes stale, and uses it to
//! look up named service credentials from the resource controller.
//!
//! Modules:
//! - `config` : explicit options, settings file and the resolving loader
//! - `cache` : the token record, refresh policy and token cache
//! - `sources` : IAM token issuer and resource controller collaborators
//! - `lookup` : service credential lookup by name
//! - `parser` : reading the `exp` claim out of bearer tokens
//! - `client` : the public client tying everything together

pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod helpers;
pub mod lookup;
pub mod parser;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::cache::token::{RefreshPolicy, Token};
pub use crate::client::ApikeyAuthClient;
pub use crate::config::{ClientConfig, ClientOptions, Credentials};
pub use crate::errors::{AuthError, ConfigurationError, IssuanceError, LookupError, ParseError};
pub use crate::lookup::{CredentialResult, CredentialStatus};
