//! Shared helpers for the ERP integration tests

use salesbridge_domain::{ClientConfig, Config, ErpConfig, ListingConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config pointing at the mock server, with millisecond backoffs and
/// pauses so retry tests stay fast.
pub fn test_config(base_url: &str) -> Config {
    Config {
        erp: ErpConfig {
            base_url: base_url.to_string(),
            service_token: "svc-token".to_string(),
            app_key: "app-key".to_string(),
            username: "svc-user".to_string(),
            password: "secret".to_string(),
        },
        client: ClientConfig {
            login_timeout_secs: 5,
            request_timeout_secs: 5,
            login_max_attempts: 4,
            request_max_attempts: 3,
            backoff_step_ms: 5,
            auth_retry_pause_ms: 1,
        },
        listing: ListingConfig {
            enrichment_group_size: 5,
            group_pause_ms: 1,
            item_save_pause_ms: 1,
        },
    }
}

/// Mount a login mock that returns the given bearer token.
pub async fn mount_login(server: &MockServer, token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "bearerToken": token })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// Dataset envelope for product rows: each row is (code, description,
/// commercial price).
pub fn product_envelope(rows: &[(&str, &str, &str)], total: usize) -> Value {
    let entities: Vec<Value> = rows
        .iter()
        .map(|(code, description, price)| {
            json!({
                "f0": { "$": code },
                "f1": { "$": description },
                "f2": { "$": "S" },
                "f5": { "$": "UN" },
                "f6": { "$": price }
            })
        })
        .collect();

    json!({
        "responseBody": {
            "entities": {
                "total": total.to_string(),
                "metadata": {
                    "fields": {
                        "field": [
                            { "name": "CODPROD" },
                            { "name": "DESCRPROD" },
                            { "name": "ATIVO" },
                            { "name": "LOCAL" },
                            { "name": "MARCA" },
                            { "name": "UNIDADE" },
                            { "name": "VLRCOMERC" }
                        ]
                    }
                },
                "entity": entities
            }
        }
    })
}

/// Dataset envelope for stock rows of one product.
pub fn stock_envelope(product_code: &str, quantities: &[f64]) -> Value {
    let entities: Vec<Value> = quantities
        .iter()
        .enumerate()
        .map(|(index, quantity)| {
            json!({
                "f0": { "$": quantity.to_string() },
                "f1": { "$": product_code },
                "f2": { "$": "S" },
                "f4": { "$": (100 + index).to_string() }
            })
        })
        .collect();

    json!({
        "responseBody": {
            "entities": {
                "total": quantities.len().to_string(),
                "metadata": {
                    "fields": {
                        "field": [
                            { "name": "ESTOQUE" },
                            { "name": "CODPROD" },
                            { "name": "ATIVO" },
                            { "name": "CONTROLE" },
                            { "name": "CODLOCAL" }
                        ]
                    }
                },
                "entity": entities
            }
        }
    })
}
