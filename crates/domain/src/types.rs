//! Common data types used throughout the application

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Catalog product, enriched with aggregated stock and current price
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub code: String,
    pub description: String,
    pub active: bool,
    pub location: Option<String>,
    pub brand: Option<String>,
    pub characteristics: Option<String>,
    pub unit: Option<String>,
    pub commercial_price: f64,
    pub stock_quantity: f64,
}

/// Single stock row for a product at one location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockRecord {
    pub quantity: f64,
    pub product_code: String,
    pub active: bool,
    pub control: Option<String>,
    pub location_code: Option<String>,
}

/// Aggregated stock for one product across all location rows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StockSummary {
    pub records: Vec<StockRecord>,
    pub count: usize,
    pub total_quantity: f64,
}

impl StockSummary {
    /// Build a summary by summing the quantity across all rows.
    ///
    /// Zero rows is a valid result (empty list, total 0), not an error.
    pub fn from_records(records: Vec<StockRecord>) -> Self {
        let total_quantity = records.iter().map(|r| r.quantity).sum();
        Self { count: records.len(), total_quantity, records }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Paginated, filtered catalog query
///
/// `page` is 1-based; both optional filters combine with logical AND when
/// present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductQuery {
    pub page: u32,
    pub page_size: u32,
    pub name_contains: Option<String>,
    pub code: Option<String>,
}

impl ProductQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size, name_contains: None, code: None }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name_contains = Some(name.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Zero-based record offset of the requested page window.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }
}

/// One page of enriched products plus pagination totals
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u64,
}

impl ProductPage {
    /// Build a page with `total_pages = ceil(total / page_size)`.
    pub fn new(products: Vec<Product>, total: u64, page: u32, page_size: u32) -> Self {
        let total_pages =
            if page_size == 0 { 0 } else { total.div_ceil(u64::from(page_size)) };
        Self { products, total, page, page_size, total_pages }
    }

    /// The "upstream has no matching structure" result: empty and zeroed.
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self { products: Vec::new(), total: 0, page, page_size, total_pages: 0 }
    }
}

/// Sales order payload forwarded verbatim to the ERP
///
/// The business content is opaque to this system; only the presence of
/// line items is checked before submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct OrderDocument(pub serde_json::Value);

impl OrderDocument {
    pub fn new(document: serde_json::Value) -> Self {
        Self(document)
    }

    /// Line items of the document, under either `itens` or `items`.
    pub fn line_items(&self) -> Option<&Vec<serde_json::Value>> {
        ["itens", "items"].iter().find_map(|key| self.0.get(key).and_then(|v| v.as_array()))
    }

    pub fn has_line_items(&self) -> bool {
        self.line_items().is_some_and(|items| !items.is_empty())
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Product line attached to a lead
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadProduct {
    pub code: String,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
}

impl LeadProduct {
    /// Lines without a code and description are skipped when saving.
    pub fn is_complete(&self) -> bool {
        !self.code.is_empty() && !self.description.is_empty()
    }
}

/// Lead record to create or update, with optional product lines
///
/// Lead fields are keyed by the ERP's own field names and forwarded as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LeadDraft {
    pub fields: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub products: Vec<LeadProduct>,
}

/// Bearer credential held in the process-wide token cache
///
/// There is no expiry check; staleness is discovered reactively when a
/// request using the token is rejected.
#[derive(Debug, Clone)]
pub struct CachedCredential {
    pub token: String,
    pub acquired_at: DateTime<Utc>,
}

impl CachedCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into(), acquired_at: Utc::now() }
    }
}
