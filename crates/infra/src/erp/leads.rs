//! Lead persistence: save the lead record, then attach its product lines
//!
//! Product lines are saved one at a time with a short pause between saves
//! to avoid bursts against the ERP. Lines missing a code or description
//! are skipped with a warning; a save failure for a present line aborts
//! the flow naming the offending item.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use salesbridge_core::LeadGateway;
use salesbridge_domain::{Config, ErpConfig, LeadDraft, LeadProduct, Result, SalesbridgeError};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::client::ErpClient;
use super::envelope::SaveRequest;

const LEAD_ENTITY: &str = "Lead";
const LEAD_PRODUCT_ENTITY: &str = "LeadProduto";

/// Lead service backed by the ERP's generic save endpoint
pub struct LeadService {
    client: Arc<ErpClient>,
    erp: ErpConfig,
    item_save_pause: Duration,
}

impl LeadService {
    pub fn new(client: Arc<ErpClient>, config: &Config) -> Self {
        Self {
            client,
            erp: config.erp.clone(),
            item_save_pause: Duration::from_millis(config.listing.item_save_pause_ms),
        }
    }

    async fn save_record(
        &self,
        root_entity: &str,
        fields: &serde_json::Map<String, Value>,
    ) -> Result<Value> {
        let request = SaveRequest::new(root_entity, fields);
        self.client.post(&self.erp.save_service_url(), &request).await
    }

    async fn attach_product(&self, lead_code: &str, product: &LeadProduct) -> Result<Value> {
        let quantity = if product.quantity > 0.0 { product.quantity } else { 1.0 };

        let mut fields = serde_json::Map::new();
        fields.insert("CODLEAD".to_string(), Value::String(lead_code.to_string()));
        fields.insert("CODPROD".to_string(), Value::String(product.code.clone()));
        fields.insert("DESCRPROD".to_string(), Value::String(product.description.clone()));
        fields.insert("QUANTIDADE".to_string(), json!(quantity));
        fields.insert("VLRUNIT".to_string(), json!(product.unit_price));
        fields.insert("VLRTOTAL".to_string(), json!(product.total_price));

        self.save_record(LEAD_PRODUCT_ENTITY, &fields).await
    }
}

#[async_trait]
impl LeadGateway for LeadService {
    async fn save_lead(&self, lead: &LeadDraft) -> Result<Value> {
        let saved = self.save_record(LEAD_ENTITY, &lead.fields).await?;
        info!("lead record saved");

        if lead.products.is_empty() {
            return Ok(saved);
        }

        // New leads get their code from the save response; updates already
        // carry it in the draft.
        let lead_code = extract_lead_code(&saved)
            .or_else(|| lead.fields.get("CODLEAD").and_then(value_as_code));

        let Some(lead_code) = lead_code else {
            warn!(
                lines = lead.products.len(),
                "saved lead has no code, skipping product lines"
            );
            return Ok(saved);
        };

        for (index, product) in lead.products.iter().enumerate() {
            if !product.is_complete() {
                warn!(line = index + 1, "product line missing code or description, skipping");
                continue;
            }

            if !self.item_save_pause.is_zero() {
                tokio::time::sleep(self.item_save_pause).await;
            }

            self.attach_product(&lead_code, product).await.map_err(|err| {
                SalesbridgeError::Upstream(format!(
                    "failed to save product line \"{}\": {err}",
                    product.description
                ))
            })?;
            info!(line = index + 1, total = lead.products.len(), "lead product line saved");
        }

        Ok(saved)
    }
}

fn extract_lead_code(saved: &Value) -> Option<String> {
    saved
        .get("CODLEAD")
        .or_else(|| saved.pointer("/responseBody/entity/CODLEAD/$"))
        .and_then(value_as_code)
}

fn value_as_code(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
