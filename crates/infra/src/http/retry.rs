//! Retry policy applied by the HTTP client
//!
//! A policy bundles the attempt budget, a backoff function, and the
//! predicate deciding which failures are worth retrying. Every request
//! executor in this crate applies retries through one of these objects
//! rather than carrying its own ad hoc counter.

use std::time::Duration;

use reqwest::StatusCode;

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backoff {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Linear backoff: step x retry number (1x, 2x, 3x, ...)
    Linear { step: Duration },
}

impl Backoff {
    /// Delay before the given retry (1-based retry number).
    pub fn delay(&self, retry_number: u32) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Linear { step } => step.saturating_mul(retry_number),
        }
    }
}

/// Retry policy applied uniformly by [`HttpClient::send`]
///
/// [`HttpClient::send`]: super::client::HttpClient::send
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts (initial try + retries).
    pub max_attempts: u32,
    pub backoff: Backoff,
    /// Retry responses with a 5xx status.
    pub retry_server_errors: bool,
    /// Retry timeouts and unreachable hosts.
    pub retry_network_errors: bool,
}

impl RetryPolicy {
    /// Single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            backoff: Backoff::Fixed(Duration::ZERO),
            retry_server_errors: false,
            retry_network_errors: false,
        }
    }

    /// Retries 5xx responses only; any other failure returns immediately.
    pub fn server_errors_only(max_attempts: u32, step: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Linear { step },
            retry_server_errors: true,
            retry_network_errors: false,
        }
    }

    /// Retries 5xx responses, timeouts and unreachable hosts.
    pub fn transient(max_attempts: u32, step: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Linear { step },
            retry_server_errors: true,
            retry_network_errors: true,
        }
    }

    pub(crate) fn should_retry_status(&self, status: StatusCode) -> bool {
        self.retry_server_errors && status.is_server_error()
    }

    pub(crate) fn should_retry_error(&self, err: &reqwest::Error) -> bool {
        self.retry_network_errors && (err.is_timeout() || err.is_connect())
    }
}
