// tests/common/mod.rs
use httpmock::Method::{GET, POST};
use httpmock::{Mock, MockServer};
use serde_json::{json, Value};

use crate::client::ApikeyAuthClient;
use crate::config::settings::ClientOptions;
use crate::parser::jwt::test::sample_jwt;
use crate::utils::constants::{APIKEY_GRANT_TYPE, RESOURCE_KEYS_PATH, TOKEN_PATH};

pub const TEST_APIKEY: &str = "test-apikey-0123456789";

/// IAM and resource controller doubles, each on its own ephemeral port.
pub struct CloudMocks {
    pub iam: MockServer,
    pub resource_controller: MockServer,
}

impl CloudMocks {
    pub async fn start() -> Self {
        Self {
            iam: MockServer::start_async().await,
            resource_controller: MockServer::start_async().await,
        }
    }

    pub fn options(&self) -> ClientOptions {
        ClientOptions::default()
            .with_apikey(TEST_APIKEY)
            .with_url(self.iam.base_url())
            .with_resource_controller_url(self.resource_controller.base_url())
    }

    pub fn client(&self) -> ApikeyAuthClient {
        ApikeyAuthClient::new(self.options()).expect("client")
    }

    /// Token endpoint answering with a JWT that expires `exp` (unix seconds).
    pub async fn mock_token(&self, exp: i64, marker: &str) -> (Mock<'_>, String) {
        let token = sample_jwt(exp, marker);
        let body = json!({
            "access_token": token,
            "refresh_token": "not_supported",
            "token_type": "Bearer",
            "expires_in": 3600,
            "expiration": exp,
        });
        let mock = self
            .iam
            .mock_async(|when, then| {
                when.method(POST)
                    .path(TOKEN_PATH)
                    .header("accept", "application/json")
                    .form_urlencoded_tuple("grant_type", APIKEY_GRANT_TYPE)
                    .form_urlencoded_tuple("apikey", TEST_APIKEY);
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(body);
            })
            .await;
        (mock, token)
    }

    pub async fn mock_token_failure(&self, status: u16) -> Mock<'_> {
        self.iam
            .mock_async(|when, then| {
                when.method(POST).path(TOKEN_PATH);
                then.status(status).json_body(json!({
                    "errorCode": "BXNIM0415E",
                    "errorMessage": "Provided API key could not be found."
                }));
            })
            .await
    }

    /// Resource keys endpoint expecting `token` as bearer.
    pub async fn mock_resource_keys(&self, token: &str, body: Value) -> Mock<'_> {
        let authorization = format!("Bearer {}", token);
        self.resource_controller
            .mock_async(|when, then| {
                when.method(GET)
                    .path(RESOURCE_KEYS_PATH)
                    .header("authorization", authorization);
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(body);
            })
            .await
    }

    pub async fn mock_resource_keys_raw(&self, status: u16, body: &str) -> Mock<'_> {
        self.resource_controller
            .mock_async(|when, then| {
                when.method(GET).path(RESOURCE_KEYS_PATH);
                then.status(status).body(body);
            })
            .await
    }
}

pub fn resource_key(name: &str, credentials: Value) -> Value {
    json!({
        "guid": format!("guid-{}", name),
        "name": name,
        "state": "active",
        "credentials": credentials,
    })
}

pub fn listing(resources: Vec<Value>) -> Value {
    json!({
        "rows_count": resources.len(),
        "next_url": null,
        "resources": resources,
    })
}
