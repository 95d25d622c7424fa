//! Network collaborators: the IAM token issuer and the resource controller.
//!
//! Both are reached through traits so the cache and the lookup can run
//! against in-memory doubles.

use reqwest::Client;

use crate::errors::ConfigurationError;

pub mod iam;
pub mod resource_keys;

pub use iam::{IamTokenIssuer, IssueToken, TokenResponse};
pub use resource_keys::{ListResourceKeys, ResourceControllerClient, ResourceKey, ResourceKeyList};

/// One HTTP client shared by every collaborator of a client instance.
pub fn build_http_client(accept_invalid_certs: bool) -> Result<Client, ConfigurationError> {
    Client::builder()
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .map_err(ConfigurationError::HttpClient)
}
