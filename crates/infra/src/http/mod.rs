//! HTTP client utilities

pub mod client;
pub mod retry;

pub use client::{HttpClient, HttpClientBuilder, HttpSendError};
pub use retry::{Backoff, RetryPolicy};
