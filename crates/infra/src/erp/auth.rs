//! ERP authentication: credential cache and login flow
//!
//! The ERP issues bearer tokens from a login endpoint authenticated by a
//! static header set (service token, application key, username, password).
//! Tokens carry no usable expiry, so the cache holds exactly one credential
//! and staleness is discovered reactively: the request executor invalidates
//! it when a call comes back 401/403.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use salesbridge_domain::{CachedCredential, ClientConfig, ErpConfig, Result, SalesbridgeError};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::errors::extract_upstream_message;
use crate::http::{HttpClient, RetryPolicy};

/// Process-wide credential store
///
/// Injectable so tests can substitute a deterministic fake. Concurrent
/// callers may race to refresh an absent credential; the worst case is one
/// extra login call, which is tolerated rather than coordinated.
#[async_trait]
pub trait TokenCache: Send + Sync {
    async fn get(&self) -> Option<CachedCredential>;
    async fn store(&self, credential: CachedCredential);
    async fn invalidate(&self);
}

/// Single-slot in-memory cache
#[derive(Default)]
pub struct InMemoryTokenCache {
    slot: RwLock<Option<CachedCredential>>,
}

impl InMemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenCache for InMemoryTokenCache {
    async fn get(&self) -> Option<CachedCredential> {
        self.slot.read().await.clone()
    }

    async fn store(&self, credential: CachedCredential) {
        *self.slot.write().await = Some(credential);
    }

    async fn invalidate(&self) {
        *self.slot.write().await = None;
    }
}

/// The login response carries the token under either of two keys.
#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(rename = "bearerToken")]
    bearer_token: Option<String>,
    token: Option<String>,
}

impl LoginResponse {
    fn into_token(self) -> Option<String> {
        self.bearer_token.or(self.token)
    }
}

/// Acquires and caches bearer tokens for the configured service identity.
pub struct ErpAuthenticator {
    login_url: String,
    service_token: String,
    app_key: String,
    username: String,
    password: String,
    http: HttpClient,
    cache: Arc<dyn TokenCache>,
}

impl ErpAuthenticator {
    /// Build an authenticator from deployment configuration.
    ///
    /// The login call retries 5xx responses only, up to
    /// `client.login_max_attempts` total attempts with linear backoff; any
    /// other failure is immediate.
    pub fn new(
        erp: &ErpConfig,
        client: &ClientConfig,
        cache: Arc<dyn TokenCache>,
    ) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(client.login_timeout_secs))
            .policy(RetryPolicy::server_errors_only(
                client.login_max_attempts,
                Duration::from_millis(client.backoff_step_ms),
            ))
            .build()?;

        Ok(Self {
            login_url: erp.login_url(),
            service_token: erp.service_token.clone(),
            app_key: erp.app_key.clone(),
            username: erp.username.clone(),
            password: erp.password.clone(),
            http,
            cache,
        })
    }

    /// Return the cached token, or log in to obtain a fresh one.
    ///
    /// No expiry check happens here; a cached token is returned as-is.
    pub async fn bearer_token(&self) -> Result<String> {
        if let Some(credential) = self.cache.get().await {
            debug!("using cached bearer token");
            return Ok(credential.token);
        }

        let token = self.login().await?;
        self.cache.store(CachedCredential::new(token.clone())).await;
        info!("bearer token obtained and cached");
        Ok(token)
    }

    /// Drop the cached credential so the next call logs in again.
    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }

    async fn login(&self) -> Result<String> {
        info!("requesting new authentication token");

        let builder = self
            .http
            .request(Method::POST, &self.login_url)
            .header("token", &self.service_token)
            .header("appkey", &self.app_key)
            .header("username", &self.username)
            .header("password", &self.password)
            .json(&serde_json::json!({}));

        let response = self.http.send(builder).await.map_err(|err| {
            SalesbridgeError::Authentication(format!("login request failed: {err}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = extract_upstream_message(&body).unwrap_or_else(|| status.to_string());
            warn!(%status, "ERP login rejected");

            if status.is_server_error() {
                // The retry budget was already spent inside the HTTP client.
                return Err(SalesbridgeError::Authentication(format!(
                    "ERP service unavailable after retries: {detail}"
                )));
            }
            return Err(SalesbridgeError::Authentication(detail));
        }

        let login: LoginResponse = response.json().await.map_err(|err| {
            SalesbridgeError::Authentication(format!("malformed login response: {err}"))
        })?;

        login.into_token().ok_or_else(|| {
            SalesbridgeError::Authentication(
                "login response did not contain a bearer token".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_cache_round_trips_a_credential() {
        let cache = InMemoryTokenCache::new();
        assert!(cache.get().await.is_none());

        cache.store(CachedCredential::new("tok-1")).await;
        let held = cache.get().await.expect("credential should be cached");
        assert_eq!(held.token, "tok-1");

        cache.invalidate().await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn store_replaces_the_previous_credential() {
        let cache = InMemoryTokenCache::new();
        cache.store(CachedCredential::new("old")).await;
        cache.store(CachedCredential::new("new")).await;

        assert_eq!(cache.get().await.expect("credential").token, "new");
    }

    #[test]
    fn login_response_prefers_bearer_token_key() {
        let parsed: LoginResponse =
            serde_json::from_str(r#"{"bearerToken":"abc","token":"xyz"}"#).expect("parse");
        assert_eq!(parsed.into_token().as_deref(), Some("abc"));

        let parsed: LoginResponse = serde_json::from_str(r#"{"token":"xyz"}"#).expect("parse");
        assert_eq!(parsed.into_token().as_deref(), Some("xyz"));
    }

    #[test]
    fn login_response_without_token_yields_none() {
        let parsed: LoginResponse = serde_json::from_str(r#"{"status":"ok"}"#).expect("parse");
        assert!(parsed.into_token().is_none());
    }
}
