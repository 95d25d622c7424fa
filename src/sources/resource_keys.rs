use std::future::Future;

use http::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::errors::{LookupError, ParseError};

/// Lists the resource keys visible to a bearer token.
pub trait ListResourceKeys: Send + Sync {
    fn list_resource_keys(
        &self,
        bearer_token: &str,
    ) -> impl Future<Output = Result<ResourceKeyList, LookupError>> + Send;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceKeyList {
    pub rows_count: u64,
    #[serde(default)]
    pub resources: Vec<ResourceKey>,
}

impl ResourceKeyList {
    pub fn from_body(body: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(body)?)
    }
}

/// One named service credential. Fields other than these are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceKey {
    pub name: String,
    #[serde(default)]
    pub credentials: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct ResourceControllerClient {
    client: Client,
    endpoint: String,
}

impl ResourceControllerClient {
    pub fn new(client: Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

impl ListResourceKeys for ResourceControllerClient {
    async fn list_resource_keys(&self, bearer_token: &str) -> Result<ResourceKeyList, LookupError> {
        debug!(endpoint = %self.endpoint, "listing resource keys");
        let response = self
            .client
            .get(&self.endpoint)
            .bearer_auth(bearer_token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .inspect_err(|e| error!(endpoint = %self.endpoint, error = %e, "resource keys request failed"))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            error!(endpoint = %self.endpoint, %status, "resource controller rejected the request");
            return Err(LookupError::Status { status, body });
        }

        let list = ResourceKeyList::from_body(&body)
            .inspect_err(|e| error!(error = %e, "resource keys response has an unexpected shape"))?;
        debug!(rows_count = list.rows_count, "resource keys listed");
        Ok(list)
    }
}
