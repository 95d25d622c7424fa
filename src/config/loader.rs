use std::{env, fs, path::Path};

use regex::Regex;
use tracing::debug;
use url::Url;

use crate::cache::token::RefreshPolicy;
use crate::config::settings::ClientOptions;
use crate::errors::ConfigurationError;
use crate::helpers::time::get_token_safety_margin_seconds;
use crate::utils::constants::{
    DEFAULT_IAM_URL, DEFAULT_RESOURCE_CONTROLLER_URL, ENV_API_KEY, ENV_IAM_URL,
    ENV_RESOURCE_CONTROLLER_URL, RESOURCE_KEYS_PATH, TOKEN_PATH,
};

/// API key and authority URL, resolved once and never changed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    apikey: String,
    authority_url: String,
}

impl Credentials {
    pub fn new(apikey: impl Into<String>, authority_url: impl Into<String>) -> Result<Self, ConfigurationError> {
        let apikey = apikey.into();
        if apikey.is_empty() {
            return Err(ConfigurationError::MissingApiKey);
        }
        let authority_url = normalize_url("authority URL", authority_url.into())?;
        Ok(Self { apikey, authority_url })
    }

    pub fn apikey(&self) -> &str {
        &self.apikey
    }

    pub fn authority_url(&self) -> &str {
        &self.authority_url
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}{}", self.authority_url, TOKEN_PATH)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("apikey", &"<redacted>")
            .field("authority_url", &self.authority_url)
            .finish()
    }
}

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub credentials: Credentials,
    pub resource_controller_url: String,
    pub safety_margin_seconds: u64,
    pub refresh_policy: RefreshPolicy,
    pub accept_invalid_certs: bool,
}

impl ClientConfig {
    /// Resolve every value: explicit option, then environment, then default.
    ///
    /// This is the only place the process environment is consulted.
    pub fn resolve(options: ClientOptions) -> Result<Self, ConfigurationError> {
        let apikey = options
            .apikey
            .filter(|v| !v.is_empty())
            .or_else(|| env_var(ENV_API_KEY))
            .ok_or(ConfigurationError::MissingApiKey)?;

        let authority_url = options
            .url
            .filter(|v| !v.is_empty())
            .or_else(|| env_var(ENV_IAM_URL))
            .unwrap_or_else(|| DEFAULT_IAM_URL.to_owned());

        let resource_controller_url = options
            .resource_controller_url
            .filter(|v| !v.is_empty())
            .or_else(|| env_var(ENV_RESOURCE_CONTROLLER_URL))
            .unwrap_or_else(|| DEFAULT_RESOURCE_CONTROLLER_URL.to_owned());

        let config = Self {
            credentials: Credentials::new(apikey, authority_url)?,
            resource_controller_url: normalize_url("resource controller URL", resource_controller_url)?,
            safety_margin_seconds: get_token_safety_margin_seconds(options.safety_margin_seconds),
            refresh_policy: options.refresh_policy.unwrap_or_default(),
            accept_invalid_certs: options.accept_invalid_certs.unwrap_or(false),
        };
        debug!(config = ?config, "client configuration resolved");
        Ok(config)
    }

    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::resolve(ClientOptions::default())
    }

    pub fn resource_keys_endpoint(&self) -> String {
        format!("{}{}", self.resource_controller_url, RESOURCE_KEYS_PATH)
    }
}

/// Load client options from a YAML settings file.
///
/// `${VAR}` and `${VAR:default}` placeholders are expanded from the
/// environment before parsing.
pub fn load_options(path: &Path) -> Result<ClientOptions, ConfigurationError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigurationError::File {
        path: path.to_path_buf(),
        source,
    })?;
    parse_options(&expand_env_vars(&content))
}

pub fn parse_options(content: &str) -> Result<ClientOptions, ConfigurationError> {
    // an empty file is a valid, empty settings file
    if content.trim().is_empty() {
        return Ok(ClientOptions::default());
    }
    serde_yaml::from_str(content).map_err(|e| ConfigurationError::Format(e.to_string()))
}

fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").expect("placeholder pattern is valid");
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn normalize_url(name: &'static str, value: String) -> Result<String, ConfigurationError> {
    let parsed = Url::parse(&value).map_err(|e| ConfigurationError::InvalidUrl {
        name,
        value: value.clone(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigurationError::InvalidUrl {
            name,
            value,
            reason: "scheme must be http or https".to_owned(),
        });
    }
    Ok(value.trim_end_matches('/').to_owned())
}
