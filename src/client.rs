//! Public client surface: construct once, then ask for tokens and
//! service credentials from as many tasks as needed.

use std::sync::Arc;

use tracing::info;

use crate::cache::token::Token;
use crate::cache::token_cache::TokenCache;
use crate::config::loader::ClientConfig;
use crate::config::settings::ClientOptions;
use crate::errors::{ConfigurationError, IssuanceError, LookupError};
use crate::lookup::{CredentialLookup, CredentialResult};
use crate::sources::{build_http_client, IamTokenIssuer, ResourceControllerClient};

/// Authenticates with an API key and looks up service credentials.
///
/// Cloning is cheap and every clone shares the same cached token.
#[derive(Clone)]
pub struct ApikeyAuthClient {
    tokens: Arc<TokenCache<IamTokenIssuer>>,
    lookup: Arc<CredentialLookup<IamTokenIssuer, ResourceControllerClient>>,
}

impl ApikeyAuthClient {
    /// Resolve `options` (with environment fallback) and build the client.
    ///
    /// Fails immediately when no API key can be found.
    pub fn new(options: ClientOptions) -> Result<Self, ConfigurationError> {
        Self::from_config(ClientConfig::resolve(options)?)
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, ConfigurationError> {
        let http = build_http_client(config.accept_invalid_certs)?;
        let resource_keys_endpoint = config.resource_keys_endpoint();

        let issuer = IamTokenIssuer::new(http.clone(), config.credentials.clone());
        info!(
            token_endpoint = issuer.endpoint(),
            resource_keys_endpoint = %resource_keys_endpoint,
            policy = ?config.refresh_policy,
            safety_margin_seconds = config.safety_margin_seconds,
            "auth client ready"
        );

        let tokens = Arc::new(TokenCache::new(
            issuer,
            config.safety_margin_seconds,
            config.refresh_policy,
        ));
        let lookup = CredentialLookup::new(
            tokens.clone(),
            ResourceControllerClient::new(http, resource_keys_endpoint),
        );

        Ok(Self {
            tokens,
            lookup: Arc::new(lookup),
        })
    }

    /// A bearer token valid for IAM-enabled services. `force` skips the cache.
    pub async fn get_token(&self, force: bool) -> Result<String, IssuanceError> {
        self.tokens.get_token(force).await
    }

    /// Look up a service credential by its name.
    pub async fn get_service_credential_by_name(&self, name: &str) -> Result<CredentialResult, LookupError> {
        self.lookup.find_by_name(name).await
    }

    pub async fn cached_token(&self) -> Option<Token> {
        self.tokens.cached().await
    }
}
