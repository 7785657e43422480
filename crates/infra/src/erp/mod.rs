/// ERP integration module
///
/// Wraps the hosted ERP's REST API behind the gateway traits from
/// `salesbridge-core`.
///
/// # Architecture
///
/// - **Auth**: `ErpAuthenticator` + `TokenCache` - single-slot bearer
///   credential, refreshed reactively on 401/403
/// - **Client**: `ErpClient` - authenticated request executor with
///   transient retries and a one-shot credential refresh
/// - **Envelope**: dataset request builders and the positional response
///   decoder, isolating the ERP's wire quirks
/// - **Services**: `CatalogService`, `OrderService`, `LeadService` -
///   implementations of the core gateway ports
///
/// # Error Handling
///
/// - Transient failures (timeout, unreachable, 5xx): retried by the HTTP
///   client policy, then surfaced as `TransientService`
/// - Rejected credentials: refreshed and resent once, then
///   `SessionExpired`
/// - Other non-2xx: `Upstream`, carrying the payload's statusMessage
/// - Price lookups never fail: they degrade to 0 so listing survives a
///   pricing outage
pub mod auth;
pub mod catalog;
pub mod client;
pub mod envelope;
pub mod errors;
pub mod leads;
pub mod orders;

pub use auth::{ErpAuthenticator, InMemoryTokenCache, TokenCache};
pub use catalog::CatalogService;
pub use client::ErpClient;
pub use errors::{ErpError, ErpErrorCategory};
pub use leads::LeadService;
pub use orders::OrderService;
