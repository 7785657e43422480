//! ERP gateway port interfaces
//!
//! The web-facing application codes against these traits; the concrete
//! implementations in `salesbridge-infra` wrap the ERP's REST API.

use async_trait::async_trait;
use salesbridge_domain::{LeadDraft, OrderDocument, ProductPage, ProductQuery, Result, StockSummary};

/// Catalog operations: paginated product listing plus the per-product
/// stock and price lookups used to enrich it.
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// List one page of products matching the query filters.
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage>;

    /// Aggregate stock for a product, optionally narrowed to locations
    /// whose code contains `location_filter`.
    async fn stock_summary(
        &self,
        product_code: &str,
        location_filter: Option<&str>,
    ) -> Result<StockSummary>;

    /// Current price for a product.
    ///
    /// Infallible by contract: any lookup failure degrades to 0 so a price
    /// outage can never block product listing.
    async fn current_price(&self, product_code: &str) -> f64;
}

/// Sales order submission
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Submit an order document verbatim and return the upstream's
    /// created-order representation. Failures are surfaced to the caller.
    async fn submit_order(&self, order: &OrderDocument) -> Result<serde_json::Value>;
}

/// Lead persistence
#[async_trait]
pub trait LeadGateway: Send + Sync {
    /// Save a lead record and attach its product lines, returning the
    /// saved lead representation.
    async fn save_lead(&self, lead: &LeadDraft) -> Result<serde_json::Value>;
}
