use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::cache::token::{RefreshPolicy, Token};
use crate::errors::IssuanceError;
use crate::helpers::time::{Clock, SystemClock};
use crate::sources::IssueToken;

/// Holds the current bearer token of one client and reissues it lazily.
///
/// The slot lock is held across the staleness check and the issuance, so
/// concurrent callers that find the token stale wait for the one refresh in
/// flight and then read its result instead of issuing again.
pub struct TokenCache<I, C = SystemClock> {
    issuer: I,
    clock: C,
    margin_ms: i64,
    policy: RefreshPolicy,
    slot: Mutex<Option<Token>>,
}

impl<I: IssueToken> TokenCache<I> {
    pub fn new(issuer: I, safety_margin_seconds: u64, policy: RefreshPolicy) -> Self {
        Self::with_clock(issuer, SystemClock, safety_margin_seconds, policy)
    }
}

impl<I: IssueToken, C: Clock> TokenCache<I, C> {
    pub fn with_clock(issuer: I, clock: C, safety_margin_seconds: u64, policy: RefreshPolicy) -> Self {
        Self {
            issuer,
            clock,
            margin_ms: (safety_margin_seconds as i64).saturating_mul(1000),
            policy,
            slot: Mutex::new(None),
        }
    }

    /// Return a token that is not stale, issuing one when needed.
    ///
    /// `force` always issues. A failed issuance leaves the cached token as it was.
    pub async fn get_token(&self, force: bool) -> Result<String, IssuanceError> {
        let mut slot = self.slot.lock().await;

        if !force {
            if let Some(token) = slot.as_ref() {
                let now_ms = self.clock.now_ms();
                if !token.is_stale(now_ms, self.margin_ms, self.policy) {
                    debug!(expires_at_ms = token.expires_at_ms, "serving cached token");
                    return Ok(token.value.clone());
                }
                info!(expires_at_ms = token.expires_at_ms, now_ms, "cached token is stale");
            }
        }

        let token = self.issue().await?;
        let value = token.value.clone();
        *slot = Some(token);
        Ok(value)
    }

    /// Snapshot of the cached token, if any.
    pub async fn cached(&self) -> Option<Token> {
        self.slot.lock().await.clone()
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    async fn issue(&self) -> Result<Token, IssuanceError> {
        let value = self
            .issuer
            .issue_token()
            .await
            .inspect_err(|e| error!(error = %e, "token issuance failed"))?;
        let token = Token::from_jwt(value)
            .inspect_err(|e| error!(error = %e, "issued token has no readable exp claim"))?;
        info!(expires_at_ms = token.expires_at_ms, "new token issued");
        Ok(token)
    }
}
