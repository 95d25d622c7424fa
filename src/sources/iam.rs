use std::future::Future;

use http::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error};

use crate::config::loader::Credentials;
use crate::errors::{IssuanceError, ParseError};
use crate::utils::constants::APIKEY_GRANT_TYPE;

/// Exchanges a long-lived credential for a fresh bearer token.
pub trait IssueToken: Send + Sync {
    fn issue_token(&self) -> impl Future<Output = Result<String, IssuanceError>> + Send;
}

/// Typed body of the IAM token endpoint answer.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub expiration: Option<i64>,
}

impl TokenResponse {
    pub fn from_body(body: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(body)?)
    }
}

#[derive(Debug, Clone)]
pub struct IamTokenIssuer {
    client: Client,
    endpoint: String,
    credentials: Credentials,
}

impl IamTokenIssuer {
    pub fn new(client: Client, credentials: Credentials) -> Self {
        Self {
            client,
            endpoint: credentials.token_endpoint(),
            credentials,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl IssueToken for IamTokenIssuer {
    async fn issue_token(&self) -> Result<String, IssuanceError> {
        let form = [
            ("grant_type", APIKEY_GRANT_TYPE),
            ("apikey", self.credentials.apikey()),
        ];

        debug!(endpoint = %self.endpoint, "requesting IAM token");
        let response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .form(&form[..])
            .send()
            .await
            .inspect_err(|e| error!(endpoint = %self.endpoint, error = %e, "token request failed"))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!(endpoint = %self.endpoint, %status, "token endpoint rejected the API key exchange");
            return Err(IssuanceError::Status { status, body });
        }

        let token_response = TokenResponse::from_body(&body)
            .inspect_err(|e| error!(error = %e, "token response has an unexpected shape"))?;
        Ok(token_response.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_requires_access_token() {
        let parsed = TokenResponse::from_body(
            r#"{"access_token":"abc","refresh_token":"not_supported","token_type":"Bearer","expires_in":3600,"expiration":1782462021}"#,
        )
        .unwrap();
        assert_eq!(parsed.access_token, "abc");
        assert_eq!(parsed.expires_in, Some(3600));

        let err = TokenResponse::from_body(r#"{"errorCode":"BXNIM0415E"}"#).unwrap_err();
        assert!(matches!(err, ParseError::Body(_)));
    }

    #[test]
    fn endpoint_derives_from_authority_url() {
        let credentials = Credentials::new("key", "https://iam.example.com/").unwrap();
        let issuer = IamTokenIssuer::new(Client::new(), credentials);
        assert_eq!(issuer.endpoint(), "https://iam.example.com/identity/token");
    }
}
