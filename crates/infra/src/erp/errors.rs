//! ERP-specific error types and classification
//!
//! Categorizes upstream failures so the request executor can decide what
//! is retryable, and converts them into the domain error taxonomy at the
//! integration boundary.

use std::fmt;

use reqwest::StatusCode;
use salesbridge_domain::SalesbridgeError;

use crate::http::HttpSendError;

/// ERP failure category
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(test, derive(Copy))]
pub enum ErpErrorCategory {
    /// Request timed out
    NetworkTimeout,

    /// Host offline or unreachable
    HostUnreachable,

    /// ERP server failure (5xx)
    ServerUnavailable,

    /// Credential rejected (401, 403)
    Authentication,

    /// Any other non-2xx response
    Rejected,

    /// Unknown or unclassified error
    Unknown,
}

impl ErpErrorCategory {
    /// Returns true if the failure is worth retrying with backoff
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::NetworkTimeout | Self::HostUnreachable | Self::ServerUnavailable)
    }

    /// Returns user-facing message for this category
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NetworkTimeout => "The ERP service took too long to respond. Please try again.",
            Self::HostUnreachable => {
                "The ERP service could not be reached. Please check the connection and try again."
            }
            Self::ServerUnavailable => {
                "The ERP service is temporarily unavailable. Please try again in a few moments."
            }
            Self::Authentication => "Session expired. Please try again.",
            Self::Rejected => "The ERP service rejected the request.",
            Self::Unknown => "Communication with the ERP service failed.",
        }
    }
}

impl fmt::Display for ErpErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkTimeout => write!(f, "Network Timeout"),
            Self::HostUnreachable => write!(f, "Host Unreachable"),
            Self::ServerUnavailable => write!(f, "Server Unavailable"),
            Self::Authentication => write!(f, "Authentication Rejected"),
            Self::Rejected => write!(f, "Request Rejected"),
            Self::Unknown => write!(f, "Unknown Error"),
        }
    }
}

/// Internal ERP error with classification metadata
///
/// Used within the integration; callers outside receive `SalesbridgeError`
/// via conversion.
#[derive(Debug, Clone)]
pub struct ErpError {
    category: ErpErrorCategory,
    message: String,
    context: Option<String>,
}

impl ErpError {
    pub fn new(category: ErpErrorCategory, message: impl Into<String>) -> Self {
        Self { category, message: message.into(), context: None }
    }

    /// Add upstream detail (e.g. the payload's statusMessage) to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn category(&self) -> &ErpErrorCategory {
        &self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_transient(&self) -> bool {
        self.category.is_transient()
    }

    /// User-facing message, with upstream detail when available
    pub fn user_message(&self) -> String {
        match &self.context {
            Some(ctx) => format!("{} ({})", self.category.user_message(), ctx),
            None => self.category.user_message().to_string(),
        }
    }

    /// Classify an HTTP status code
    pub fn from_status(status: StatusCode) -> Self {
        let category = match status.as_u16() {
            401 | 403 => ErpErrorCategory::Authentication,
            500..=599 => ErpErrorCategory::ServerUnavailable,
            200..=299 => ErpErrorCategory::Unknown,
            _ => ErpErrorCategory::Rejected,
        };

        Self::new(
            category,
            format!("HTTP {}: {}", status.as_u16(), status.canonical_reason().unwrap_or("Unknown")),
        )
    }

    /// Convert to the domain error taxonomy
    ///
    /// `Authentication` maps to `SessionExpired`: by the time this
    /// conversion runs, the executor has already refreshed the credential
    /// once and been rejected again.
    pub fn into_domain_error(self) -> SalesbridgeError {
        let message = self.user_message();
        match self.category {
            ErpErrorCategory::Authentication => SalesbridgeError::SessionExpired(message),
            ErpErrorCategory::NetworkTimeout
            | ErpErrorCategory::HostUnreachable
            | ErpErrorCategory::ServerUnavailable => SalesbridgeError::TransientService(message),
            ErpErrorCategory::Rejected => SalesbridgeError::Upstream(message),
            ErpErrorCategory::Unknown => SalesbridgeError::Internal(message),
        }
    }
}

impl fmt::Display for ErpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.category, self.message)?;
        if let Some(ctx) = &self.context {
            write!(f, " ({})", ctx)?;
        }
        Ok(())
    }
}

impl std::error::Error for ErpError {}

impl From<reqwest::Error> for ErpError {
    fn from(err: reqwest::Error) -> Self {
        let (category, message) = if err.is_timeout() {
            (ErpErrorCategory::NetworkTimeout, "request timed out".to_string())
        } else if err.is_connect() {
            (ErpErrorCategory::HostUnreachable, "failed to connect to the ERP service".to_string())
        } else if let Some(status) = err.status() {
            return Self::from_status(status).with_context(err.to_string());
        } else {
            (ErpErrorCategory::Unknown, "network error".to_string())
        };

        Self::new(category, message).with_context(err.to_string())
    }
}

impl From<HttpSendError> for ErpError {
    fn from(err: HttpSendError) -> Self {
        match err {
            HttpSendError::Transport(inner) => inner.into(),
            other => Self::new(ErpErrorCategory::Unknown, other.to_string()),
        }
    }
}

impl From<ErpError> for SalesbridgeError {
    fn from(err: ErpError) -> Self {
        err.into_domain_error()
    }
}

/// Pull a human-readable message out of an upstream error payload.
///
/// The ERP reports failures under different keys depending on the service
/// (`statusMessage` on the gateway, `error` on login); fall back through
/// the known ones.
pub(crate) fn extract_upstream_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["statusMessage", "error", "message"]
        .iter()
        .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
        .filter(|message| !message.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_and_403_map_to_authentication() {
        assert_eq!(
            ErpError::from_status(StatusCode::UNAUTHORIZED).category(),
            &ErpErrorCategory::Authentication
        );
        assert_eq!(
            ErpError::from_status(StatusCode::FORBIDDEN).category(),
            &ErpErrorCategory::Authentication
        );
    }

    #[test]
    fn status_5xx_maps_to_server_unavailable_and_is_transient() {
        let err = ErpError::from_status(StatusCode::BAD_GATEWAY);
        assert_eq!(err.category(), &ErpErrorCategory::ServerUnavailable);
        assert!(err.is_transient());
    }

    #[test]
    fn status_4xx_other_than_auth_is_rejected_and_not_transient() {
        let err = ErpError::from_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.category(), &ErpErrorCategory::Rejected);
        assert!(!err.is_transient());
    }

    #[test]
    fn authentication_converts_to_session_expired() {
        let domain: SalesbridgeError =
            ErpError::from_status(StatusCode::UNAUTHORIZED).into_domain_error();
        assert!(matches!(domain, SalesbridgeError::SessionExpired(_)));
    }

    #[test]
    fn server_unavailable_converts_to_transient_service() {
        let domain: SalesbridgeError =
            ErpError::from_status(StatusCode::INTERNAL_SERVER_ERROR).into_domain_error();
        assert!(matches!(domain, SalesbridgeError::TransientService(_)));
    }

    #[test]
    fn context_is_carried_into_the_domain_message() {
        let err = ErpError::from_status(StatusCode::BAD_REQUEST)
            .with_context("Pedido sem itens");
        let domain = err.into_domain_error();
        assert!(domain.to_string().contains("Pedido sem itens"));
    }

    #[test]
    fn extracts_status_message_from_gateway_payloads() {
        let body = r#"{"status":"0","statusMessage":"Produto inexistente"}"#;
        assert_eq!(extract_upstream_message(body).as_deref(), Some("Produto inexistente"));
    }

    #[test]
    fn extracts_error_field_from_login_payloads() {
        let body = r#"{"error":"invalid credentials"}"#;
        assert_eq!(extract_upstream_message(body).as_deref(), Some("invalid credentials"));
    }

    #[test]
    fn non_json_bodies_yield_no_message() {
        assert_eq!(extract_upstream_message("<html>502</html>"), None);
        assert_eq!(extract_upstream_message(""), None);
    }
}
