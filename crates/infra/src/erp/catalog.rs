//! Product catalog operations
//!
//! Listing joins three upstream sources per product: the catalog query for
//! the page window, then a stock total and a current price per row. The
//! per-product lookups run in bounded concurrent groups and degrade
//! independently, so a stock or price outage for one product never fails
//! the page.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use salesbridge_core::CatalogGateway;
use salesbridge_domain::{
    Config, ErpConfig, ListingConfig, Product, ProductPage, ProductQuery, Result,
    SalesbridgeError, StockRecord, StockSummary,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::client::ErpClient;
use super::envelope::{
    product_criteria, stock_criteria, DecodedEntities, FieldMap, QueryRequest, QueryResponse,
};

const PRODUCT_ENTITY: &str = "Produto";
const STOCK_ENTITY: &str = "Estoque";

const PRODUCT_FIELDS: [&str; 8] = [
    "CODPROD",
    "DESCRPROD",
    "ATIVO",
    "LOCAL",
    "MARCA",
    "CARACTERISTICAS",
    "UNIDADE",
    "VLRCOMERC",
];

const STOCK_FIELDS: [&str; 5] = ["ESTOQUE", "CODPROD", "ATIVO", "CONTROLE", "CODLOCAL"];

/// Catalog service backed by the ERP's generic query endpoint
pub struct CatalogService {
    client: Arc<ErpClient>,
    erp: ErpConfig,
    listing: ListingConfig,
}

impl CatalogService {
    pub fn new(client: Arc<ErpClient>, config: &Config) -> Self {
        Self { client, erp: config.erp.clone(), listing: config.listing.clone() }
    }

    async fn run_query(&self, request: &QueryRequest) -> Result<DecodedEntities> {
        let response: QueryResponse =
            self.client.post(&self.erp.query_service_url(), request).await?;
        Ok(response.decode())
    }

    /// Fetch stock and price for one product, degrading to zero stock and
    /// the catalog price when a lookup fails.
    async fn enrich(&self, mut product: Product) -> Product {
        let (stock, price) = futures::join!(
            self.stock_summary(&product.code, None),
            self.current_price(&product.code),
        );

        match stock {
            Ok(summary) => product.stock_quantity = summary.total_quantity,
            Err(err) => {
                warn!(code = %product.code, error = %err, "stock lookup failed, defaulting to zero");
                product.stock_quantity = 0.0;
            }
        }

        if price > 0.0 {
            product.commercial_price = price;
        }

        product
    }
}

#[async_trait]
impl CatalogGateway for CatalogService {
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage> {
        if query.page == 0 || query.page_size == 0 {
            return Err(SalesbridgeError::InvalidInput(
                "page must be >= 1 and page_size must be > 0".to_string(),
            ));
        }

        let criteria = product_criteria(query.code.as_deref(), query.name_contains.as_deref());
        debug!(
            page = query.page,
            page_size = query.page_size,
            criteria = criteria.as_deref().unwrap_or(""),
            "listing products"
        );

        let request = QueryRequest::new(
            PRODUCT_ENTITY,
            &PRODUCT_FIELDS,
            query.offset(),
            Some(query.page_size),
            criteria,
        );
        let decoded = self.run_query(&request).await?;

        if decoded.rows.is_empty() {
            info!("no products matched the catalog query");
            return Ok(ProductPage::empty(query.page, query.page_size));
        }

        let total_reported = decoded.total;
        let products: Vec<Product> = decoded.rows.iter().map(product_from_fields).collect();
        debug!(count = products.len(), "enriching products with stock and price");

        let group_size = self.listing.enrichment_group_size.max(1);
        let pause = Duration::from_millis(self.listing.group_pause_ms);
        let mut enriched = Vec::with_capacity(products.len());
        let mut remaining = products.into_iter().peekable();

        loop {
            let group: Vec<Product> = remaining.by_ref().take(group_size).collect();
            if group.is_empty() {
                break;
            }

            let results =
                futures::future::join_all(group.into_iter().map(|product| self.enrich(product)))
                    .await;
            enriched.extend(results);

            if remaining.peek().is_some() && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        let total = total_reported.unwrap_or(enriched.len() as u64);
        info!(count = enriched.len(), total, "catalog page assembled");
        Ok(ProductPage::new(enriched, total, query.page, query.page_size))
    }

    async fn stock_summary(
        &self,
        product_code: &str,
        location_filter: Option<&str>,
    ) -> Result<StockSummary> {
        let criteria = stock_criteria(product_code, location_filter);
        let request = QueryRequest::new(STOCK_ENTITY, &STOCK_FIELDS, 0, None, Some(criteria));
        let decoded = self.run_query(&request).await?;

        let records = decoded.rows.iter().map(stock_from_fields).collect();
        Ok(StockSummary::from_records(records))
    }

    async fn current_price(&self, product_code: &str) -> f64 {
        let url = self.erp.price_url(product_code);

        match self.client.get::<PriceResponse>(&url).await {
            Ok(response) => response.first_price().unwrap_or(0.0),
            Err(err) => {
                warn!(code = %product_code, error = %err, "price lookup failed, defaulting to zero");
                0.0
            }
        }
    }
}

/// Price table response for one product
#[derive(Debug, Deserialize)]
struct PriceResponse {
    #[serde(default)]
    produtos: Vec<PriceEntry>,
}

#[derive(Debug, Deserialize)]
struct PriceEntry {
    #[serde(default)]
    valor: f64,
}

impl PriceResponse {
    fn first_price(&self) -> Option<f64> {
        self.produtos.first().map(|entry| entry.valor)
    }
}

fn product_from_fields(fields: &FieldMap) -> Product {
    Product {
        code: field(fields, "CODPROD"),
        description: field(fields, "DESCRPROD"),
        active: active_flag(fields.get("ATIVO")),
        location: optional_field(fields, "LOCAL"),
        brand: optional_field(fields, "MARCA"),
        characteristics: optional_field(fields, "CARACTERISTICAS"),
        unit: optional_field(fields, "UNIDADE"),
        commercial_price: numeric_field(fields, "VLRCOMERC"),
        stock_quantity: 0.0,
    }
}

fn stock_from_fields(fields: &FieldMap) -> StockRecord {
    StockRecord {
        quantity: numeric_field(fields, "ESTOQUE"),
        product_code: field(fields, "CODPROD"),
        active: active_flag(fields.get("ATIVO")),
        control: optional_field(fields, "CONTROLE"),
        location_code: optional_field(fields, "CODLOCAL"),
    }
}

fn field(fields: &FieldMap, name: &str) -> String {
    fields.get(name).cloned().unwrap_or_default()
}

fn optional_field(fields: &FieldMap, name: &str) -> Option<String> {
    fields.get(name).cloned().filter(|value| !value.is_empty())
}

fn numeric_field(fields: &FieldMap, name: &str) -> f64 {
    fields.get(name).and_then(|value| value.parse().ok()).unwrap_or(0.0)
}

// ERP boolean columns carry "S"/"N".
fn active_flag(value: Option<&String>) -> bool {
    value.map(|v| v == "S").unwrap_or(false)
}
