use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::cache::token_cache::TokenCache;
use crate::errors::LookupError;
use crate::helpers::time::{Clock, SystemClock};
use crate::sources::{IssueToken, ListResourceKeys, ResourceKeyList};
use crate::utils::constants::NOT_FOUND_MESSAGE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialStatus {
    Success,
    NotFound,
}

/// Outcome of a lookup by name. Built fresh for every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialResult {
    pub status: CredentialStatus,
    pub credentials: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl CredentialResult {
    pub fn success(credentials: Map<String, Value>) -> Self {
        Self {
            status: CredentialStatus::Success,
            credentials,
            error_message: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: CredentialStatus::NotFound,
            credentials: Map::new(),
            error_message: Some(NOT_FOUND_MESSAGE.to_owned()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CredentialStatus::Success
    }
}

/// Resolves a service credential name to its secret payload.
pub struct CredentialLookup<I, L, C = SystemClock> {
    tokens: Arc<TokenCache<I, C>>,
    lister: L,
}

impl<I: IssueToken, L: ListResourceKeys, C: Clock> CredentialLookup<I, L, C> {
    pub fn new(tokens: Arc<TokenCache<I, C>>, lister: L) -> Self {
        Self { tokens, lister }
    }

    pub async fn find_by_name(&self, name: &str) -> Result<CredentialResult, LookupError> {
        let token = self.tokens.get_token(false).await?;
        let listing = self.lister.list_resource_keys(&token).await?;
        Ok(select_by_name(listing, name))
    }
}

/// First entry named `name` in listing order wins.
pub fn select_by_name(listing: ResourceKeyList, name: &str) -> CredentialResult {
    if listing.rows_count == 0 {
        debug!(name, "resource key listing is empty");
        return CredentialResult::not_found();
    }

    match listing.resources.into_iter().find(|resource| resource.name == name) {
        Some(resource) => {
            info!(name, "service credential found");
            CredentialResult::success(resource.credentials)
        }
        None => {
            info!(name, "service credential not found");
            CredentialResult::not_found()
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::cache::token::RefreshPolicy;
    use crate::errors::IssuanceError;
    use crate::parser::jwt::test::sample_jwt;
    use crate::sources::ResourceKey;

    struct StaticIssuer {
        fail: bool,
    }

    impl IssueToken for StaticIssuer {
        async fn issue_token(&self) -> Result<String, IssuanceError> {
            if self.fail {
                return Err(IssuanceError::Status {
                    status: StatusCode::BAD_REQUEST,
                    body: "bad key".to_owned(),
                });
            }
            Ok(sample_jwt(chrono::Utc::now().timestamp() + 3600, "lookup"))
        }
    }

    struct StaticLister {
        listing: ResourceKeyList,
        calls: AtomicUsize,
    }

    impl ListResourceKeys for StaticLister {
        async fn list_resource_keys(&self, bearer_token: &str) -> Result<ResourceKeyList, LookupError> {
            assert!(!bearer_token.is_empty());
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.listing.clone())
        }
    }

    fn key(name: &str, credentials: Value) -> ResourceKey {
        ResourceKey {
            name: name.to_owned(),
            credentials: credentials.as_object().cloned().unwrap_or_default(),
        }
    }

    fn listing(resources: Vec<ResourceKey>) -> ResourceKeyList {
        ResourceKeyList {
            rows_count: resources.len() as u64,
            resources,
        }
    }

    fn lookup(listing: ResourceKeyList) -> CredentialLookup<StaticIssuer, StaticLister> {
        let tokens = Arc::new(TokenCache::new(StaticIssuer { fail: false }, 60, RefreshPolicy::PastMargin));
        CredentialLookup::new(
            tokens,
            StaticLister {
                listing,
                calls: AtomicUsize::new(0),
            },
        )
    }

    #[tokio::test]
    async fn unknown_name_is_not_found() {
        let lookup = lookup(listing(vec![key("Monitoring_User", json!({"apikey": "m"}))]));

        let result = lookup.find_by_name("NO_EXIST").await.unwrap();
        assert_eq!(result, CredentialResult::not_found());
        assert_eq!(result.error_message.as_deref(), Some("No key found"));
        assert!(result.credentials.is_empty());
    }

    #[tokio::test]
    async fn single_match_returns_its_credentials() {
        let lookup = lookup(listing(vec![
            key("Monitoring_User", json!({"apikey": "m"})),
            key("MyPostgreSQL_Database", json!({"connection": {"postgres": {"hosts": []}}})),
        ]));

        let result = lookup.find_by_name("MyPostgreSQL_Database").await.unwrap();
        assert!(result.is_success());
        assert_eq!(result.error_message, None);
        assert_eq!(result.credentials["connection"], json!({"postgres": {"hosts": []}}));
    }

    #[tokio::test]
    async fn duplicate_names_first_in_listing_order_wins() {
        let lookup = lookup(listing(vec![
            key("dup", json!({"n": 1})),
            key("other", json!({"n": 2})),
            key("dup", json!({"n": 3})),
        ]));

        let result = lookup.find_by_name("dup").await.unwrap();
        assert_eq!(result.credentials["n"], 1);
    }

    #[tokio::test]
    async fn zero_rows_is_not_found() {
        let lookup = lookup(ResourceKeyList::default());

        let result = lookup.find_by_name("anything").await.unwrap();
        assert_eq!(result, CredentialResult::not_found());
        assert_eq!(lookup.lister.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn token_is_reused_across_lookups() {
        let lookup = lookup(listing(vec![key("a", json!({}))]));
        lookup.find_by_name("a").await.unwrap();
        let cached = lookup.tokens.cached().await.unwrap();
        lookup.find_by_name("a").await.unwrap();
        assert_eq!(lookup.tokens.cached().await.unwrap(), cached);
    }

    #[tokio::test]
    async fn issuance_failure_surfaces_as_lookup_error() {
        let tokens = Arc::new(TokenCache::new(StaticIssuer { fail: true }, 60, RefreshPolicy::PastMargin));
        let lister = StaticLister {
            listing: ResourceKeyList::default(),
            calls: AtomicUsize::new(0),
        };
        let lookup = CredentialLookup::new(tokens, lister);

        let err = lookup.find_by_name("a").await.unwrap_err();
        assert!(matches!(err, LookupError::Issuance(_)));
        assert_eq!(lookup.lister.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn result_serializes_like_the_public_contract() {
        let value = serde_json::to_value(CredentialResult::not_found()).unwrap();
        assert_eq!(
            value,
            json!({"status": "NOT_FOUND", "credentials": {}, "errorMessage": "No key found"})
        );

        let value = serde_json::to_value(CredentialResult::success(Map::new())).unwrap();
        assert_eq!(value, json!({"status": "SUCCESS", "credentials": {}}));
    }
}
