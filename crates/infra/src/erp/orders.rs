//! Sales order submission
//!
//! The order document is a business transaction assembled by the caller;
//! it is forwarded verbatim and every failure is surfaced, since the caller
//! must know whether the order was created or not.

use std::sync::Arc;

use async_trait::async_trait;
use salesbridge_core::OrderGateway;
use salesbridge_domain::{Config, ErpConfig, OrderDocument, Result, SalesbridgeError};
use tracing::{info, warn};

use super::client::ErpClient;

/// Order service backed by the ERP's order-creation endpoint
pub struct OrderService {
    client: Arc<ErpClient>,
    erp: ErpConfig,
}

impl OrderService {
    pub fn new(client: Arc<ErpClient>, config: &Config) -> Self {
        Self { client, erp: config.erp.clone() }
    }
}

#[async_trait]
impl OrderGateway for OrderService {
    async fn submit_order(&self, order: &OrderDocument) -> Result<serde_json::Value> {
        if !order.has_line_items() {
            return Err(SalesbridgeError::InvalidInput(
                "order document has no line items".to_string(),
            ));
        }

        let correlation_id = uuid::Uuid::new_v4().to_string();
        info!(%correlation_id, "submitting sales order");

        let created: serde_json::Value = self
            .client
            .post(&self.erp.order_service_url(), order.as_json())
            .await
            .map_err(|err| {
                warn!(%correlation_id, error = %err, "sales order submission failed");
                err
            })?;

        info!(%correlation_id, "sales order accepted by the ERP");
        Ok(created)
    }
}
