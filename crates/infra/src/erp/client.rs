//! Authenticated request executor for the ERP REST API
//!
//! Turns one logical call into one or more HTTP attempts: a bearer token is
//! acquired (from cache or by logging in), transient failures are retried
//! under the configured policy, and a rejected token is refreshed and the
//! request resent exactly once.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use salesbridge_domain::{Config, Result, SalesbridgeError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::auth::{ErpAuthenticator, InMemoryTokenCache, TokenCache};
use super::errors::{extract_upstream_message, ErpError};
use crate::http::{HttpClient, RetryPolicy};

/// Authenticated ERP client
///
/// Shared by every domain service in this module; cloning the `Arc` it is
/// held in shares the credential cache, so one refresh serves all callers.
pub struct ErpClient {
    http: HttpClient,
    authenticator: ErpAuthenticator,
    auth_retry_pause: Duration,
}

impl ErpClient {
    /// Create a client with the default in-memory credential cache.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_token_cache(config, Arc::new(InMemoryTokenCache::new()))
    }

    /// Create a client with an injected credential cache (for tests).
    pub fn with_token_cache(config: &Config, cache: Arc<dyn TokenCache>) -> Result<Self> {
        let client_cfg = &config.client;

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(client_cfg.request_timeout_secs))
            .policy(RetryPolicy::transient(
                client_cfg.request_max_attempts,
                Duration::from_millis(client_cfg.backoff_step_ms),
            ))
            .build()?;

        let authenticator = ErpAuthenticator::new(&config.erp, client_cfg, cache)?;

        Ok(Self {
            http,
            authenticator,
            auth_retry_pause: Duration::from_millis(client_cfg.auth_retry_pause_ms),
        })
    }

    /// POST a JSON body and deserialize the response.
    pub async fn post<T, B>(&self, url: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(Method::POST, url, Some(body)).await
    }

    /// GET and deserialize the response.
    pub async fn get<T>(&self, url: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.execute::<T, serde_json::Value>(Method::GET, url, None).await
    }

    /// Issue an authenticated call and deserialize the response body.
    ///
    /// The transient retry budget (timeouts, unreachable hosts, 5xx) lives
    /// inside the HTTP client policy and is independent of the single
    /// refresh-and-resend allowed for a rejected credential.
    pub async fn execute<T, B>(&self, method: Method, url: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let mut auth_retried = false;

        loop {
            let token = self.authenticator.bearer_token().await?;

            let mut builder = self
                .http
                .request(method.clone(), url)
                .header("Authorization", format!("Bearer {token}"))
                .header("Content-Type", "application/json");
            if let Some(body) = body {
                builder = builder.json(body);
            }

            let response = self
                .http
                .send(builder)
                .await
                .map_err(|err| ErpError::from(err).into_domain_error())?;

            let status = response.status();

            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                self.authenticator.invalidate().await;

                if !auth_retried {
                    auth_retried = true;
                    debug!(%status, "bearer token rejected, refreshing credential");
                    if !self.auth_retry_pause.is_zero() {
                        tokio::time::sleep(self.auth_retry_pause).await;
                    }
                    continue;
                }

                warn!(%status, url, "refreshed credential rejected as well, giving up");
                return Err(ErpError::from_status(status).into_domain_error());
            }

            if !status.is_success() {
                let body_text = response.text().await.unwrap_or_default();
                let mut err = ErpError::from_status(status);
                if let Some(detail) = extract_upstream_message(&body_text) {
                    err = err.with_context(detail);
                }
                warn!(%status, url, "ERP request failed");
                return Err(err.into_domain_error());
            }

            return response.json::<T>().await.map_err(|err| {
                SalesbridgeError::Internal(format!("failed to decode ERP response: {err}"))
            });
        }
    }

    /// Reachability probe: can a credential be obtained at all?
    pub async fn check_connectivity(&self) -> bool {
        match self.authenticator.bearer_token().await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "ERP connectivity check failed");
                false
            }
        }
    }
}
