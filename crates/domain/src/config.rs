//! Configuration structures
//!
//! Deployment configuration for the ERP gateway. Values are loaded by
//! `salesbridge-infra` from environment variables or a config file.

use serde::{Deserialize, Serialize};

use crate::constants;

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub erp: ErpConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub listing: ListingConfig,
}

/// ERP service identity: endpoint base plus the static login header set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErpConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub service_token: String,
    pub app_key: String,
    pub username: String,
    pub password: String,
}

fn default_base_url() -> String {
    constants::DEFAULT_ERP_BASE_URL.to_string()
}

impl ErpConfig {
    pub fn login_url(&self) -> String {
        format!("{}{}", self.base_url, constants::LOGIN_PATH)
    }

    pub fn query_service_url(&self) -> String {
        format!("{}{}", self.base_url, constants::QUERY_SERVICE_PATH)
    }

    pub fn save_service_url(&self) -> String {
        format!("{}{}", self.base_url, constants::SAVE_SERVICE_PATH)
    }

    pub fn order_service_url(&self) -> String {
        format!("{}{}", self.base_url, constants::ORDER_SERVICE_PATH)
    }

    /// Price table endpoint for one product (first page of table 0).
    pub fn price_url(&self, product_code: &str) -> String {
        format!(
            "{}{}/{}/tabela/0?pagina=1",
            self.base_url,
            constants::PRICE_SERVICE_PREFIX,
            product_code
        )
    }
}

/// HTTP client tuning: timeouts and retry budgets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub login_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Total login attempts (initial call + retries on 5xx).
    pub login_max_attempts: u32,
    /// Total attempts per authenticated request (initial + transient retries).
    pub request_max_attempts: u32,
    /// Linear backoff step; retry n sleeps n x step.
    pub backoff_step_ms: u64,
    /// Pause before resending a request after a token refresh.
    pub auth_retry_pause_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            login_timeout_secs: constants::DEFAULT_LOGIN_TIMEOUT_SECS,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT_SECS,
            login_max_attempts: constants::DEFAULT_LOGIN_MAX_ATTEMPTS,
            request_max_attempts: constants::DEFAULT_REQUEST_MAX_ATTEMPTS,
            backoff_step_ms: constants::DEFAULT_BACKOFF_STEP_MS,
            auth_retry_pause_ms: constants::DEFAULT_AUTH_RETRY_PAUSE_MS,
        }
    }
}

/// Listing enrichment tuning
///
/// The group size bounds simultaneous outstanding calls while enriching a
/// page; the pauses throttle bursts against the ERP. These are tunables,
/// not contract values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    pub enrichment_group_size: usize,
    pub group_pause_ms: u64,
    pub item_save_pause_ms: u64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            enrichment_group_size: constants::DEFAULT_ENRICHMENT_GROUP_SIZE,
            group_pause_ms: constants::DEFAULT_GROUP_PAUSE_MS,
            item_save_pause_ms: constants::DEFAULT_ITEM_SAVE_PAUSE_MS,
        }
    }
}
