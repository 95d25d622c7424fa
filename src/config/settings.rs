use serde::Deserialize;

use crate::cache::token::RefreshPolicy;

/// ================================
/// Explicit client options
/// ================================
///
/// Everything is optional here; unset values fall back to the environment
/// and then to defaults when resolved by [`crate::config::ClientConfig::resolve`].
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientOptions {
    pub apikey: Option<String>,
    /// Authority (IAM) base URL.
    pub url: Option<String>,
    pub resource_controller_url: Option<String>,
    pub safety_margin_seconds: Option<u64>,
    pub refresh_policy: Option<RefreshPolicy>,
    /// Skip TLS certificate verification. Off unless asked for.
    pub accept_invalid_certs: Option<bool>,
    pub logging: Option<LoggingConfig>,
}

impl ClientOptions {
    pub fn with_apikey(mut self, apikey: impl Into<String>) -> Self {
        self.apikey = Some(apikey.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_resource_controller_url(mut self, url: impl Into<String>) -> Self {
        self.resource_controller_url = Some(url.into());
        self
    }

    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = Some(policy);
        self
    }

    /// Options given on top of `self` win; unset ones keep `self`'s value.
    pub fn merge(self, overrides: ClientOptions) -> Self {
        Self {
            apikey: overrides.apikey.or(self.apikey),
            url: overrides.url.or(self.url),
            resource_controller_url: overrides.resource_controller_url.or(self.resource_controller_url),
            safety_margin_seconds: overrides.safety_margin_seconds.or(self.safety_margin_seconds),
            refresh_policy: overrides.refresh_policy.or(self.refresh_policy),
            accept_invalid_certs: overrides.accept_invalid_certs.or(self.accept_invalid_certs),
            logging: overrides.logging.or(self.logging),
        }
    }
}

impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("apikey", &self.apikey.as_ref().map(|_| "<redacted>"))
            .field("url", &self.url)
            .field("resource_controller_url", &self.resource_controller_url)
            .field("safety_margin_seconds", &self.safety_margin_seconds)
            .field("refresh_policy", &self.refresh_policy)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("logging", &self.logging)
            .finish()
    }
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    #[serde(default = "LogFormat::from_env")]
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Compact,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

impl LogFormat {
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "compact".to_string())
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }
}
