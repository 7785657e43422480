use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use salesbridge_domain::SalesbridgeError;
use thiserror::Error;
use tracing::debug;

use super::retry::RetryPolicy;

/// Failure modes of [`HttpClient::send`]
///
/// Transport errors keep the underlying `reqwest::Error` so callers can
/// classify timeouts vs. unreachable hosts after the retry budget is spent.
#[derive(Debug, Error)]
pub enum HttpSendError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("request body cannot be cloned; buffer the body to enable retries")]
    UncloneableBody,

    #[error("http client exhausted retries without producing a result")]
    Exhausted,
}

/// HTTP client with built-in timeout and policy-driven retry.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    policy: RetryPolicy,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute the provided request builder under the configured policy.
    ///
    /// Non-retryable statuses are returned as-is; classifying them is the
    /// caller's concern.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, HttpSendError> {
        let attempts = self.policy.max_attempts.max(1);

        for attempt in 0..attempts {
            let cloned_builder = builder.try_clone().ok_or(HttpSendError::UncloneableBody)?;
            let request = cloned_builder.build()?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(attempt = attempt + 1, %method, %url, "sending HTTP request");

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(attempt = attempt + 1, %method, %url, %status, "received HTTP response");

                    if self.policy.should_retry_status(status) && attempt + 1 < attempts {
                        self.sleep_before_retry(attempt + 1).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(err) => {
                    debug!(attempt = attempt + 1, %method, %url, error = %err, "HTTP request failed");

                    if self.policy.should_retry_error(&err) && attempt + 1 < attempts {
                        self.sleep_before_retry(attempt + 1).await;
                        continue;
                    }

                    return Err(err.into());
                }
            }
        }

        Err(HttpSendError::Exhausted)
    }

    async fn sleep_before_retry(&self, retry_number: u32) {
        let delay = self.policy.backoff.delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    policy: RetryPolicy,
    default_headers: Option<reqwest::header::HeaderMap>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            policy: RetryPolicy::none(),
            default_headers: None,
        }
    }
}

impl HttpClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn default_headers(mut self, headers: reqwest::header::HeaderMap) -> Self {
        self.default_headers = Some(headers);
        self
    }

    pub fn build(self) -> Result<HttpClient, SalesbridgeError> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(headers) = self.default_headers {
            builder = builder.default_headers(headers);
        }

        let client = builder
            .build()
            .map_err(|err| SalesbridgeError::Internal(format!("failed to build HTTP client: {err}")))?;

        Ok(HttpClient { client, policy: self.policy })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use reqwest::StatusCode;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn transient_client(max_attempts: u32) -> HttpClient {
        HttpClient::builder()
            .policy(RetryPolicy::transient(max_attempts, Duration::from_millis(5)))
            .build()
            .expect("http client")
    }

    #[tokio::test]
    async fn returns_successful_response_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let client = transient_client(3);
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn retries_server_errors_until_success() {
        let server = MockServer::start().await;
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_clone = attempts.clone();
        Mock::given(method("GET"))
            .respond_with(move |_req: &wiremock::Request| -> ResponseTemplate {
                let current = attempts_clone.fetch_add(1, Ordering::SeqCst);
                if current < 2 {
                    ResponseTemplate::new(500)
                } else {
                    ResponseTemplate::new(200)
                }
            })
            .expect(3)
            .mount(&server)
            .await;

        let client = transient_client(3);
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 3);
    }

    #[tokio::test]
    async fn exhausts_the_attempt_budget_on_persistent_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(4)
            .mount(&server)
            .await;

        let client = transient_client(4);
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        // The last response is handed back for the caller to classify.
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 4);
    }

    #[tokio::test]
    async fn does_not_retry_client_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = transient_client(3);
        let response =
            client.send(client.request(Method::GET, server.uri())).await.expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[tokio::test]
    async fn network_failures_surface_as_transport_errors() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener); // release the port so that requests fail with ECONNREFUSED
        let url = format!("http://{}", addr);

        let client = transient_client(2);
        let result = client.send(client.request(Method::GET, &url)).await;

        match result {
            Err(HttpSendError::Transport(err)) => assert!(err.is_connect()),
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn server_errors_only_policy_does_not_retry_network_failures() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = format!("http://{}", addr);

        let client = HttpClient::builder()
            .policy(RetryPolicy::server_errors_only(4, Duration::from_millis(5)))
            .build()
            .expect("http client");

        // A connect failure must fail on the first attempt under this policy.
        let result = client.send(client.request(Method::GET, &url)).await;
        assert!(matches!(result, Err(HttpSendError::Transport(_))));
    }
}
