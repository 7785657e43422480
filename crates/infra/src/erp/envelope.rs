//! ERP dataset envelope codec
//!
//! The ERP's generic query service speaks a quirky envelope: requests carry
//! a dataset descriptor with a comma-separated fieldset, and responses key
//! row values positionally (`f0`, `f1`, ...) against a separate field-name
//! list, with the actual value nested under `$`. Everything about that
//! format lives here; the rest of the crate only sees plain field maps.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Query requests
// ============================================================================

/// Dataset query request: `{ "requestBody": { "dataSet": ... } }`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    request_body: QueryRequestBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequestBody {
    data_set: DataSet,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DataSet {
    root_entity: String,
    include_presentation_fields: String,
    // The gateway expects offset and limit as strings.
    offset_page: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<String>,
    entity: EntitySelection,
    #[serde(skip_serializing_if = "Option::is_none")]
    criteria: Option<Criteria>,
}

#[derive(Debug, Serialize)]
struct EntitySelection {
    fieldset: FieldSet,
}

#[derive(Debug, Serialize)]
struct FieldSet {
    list: String,
}

#[derive(Debug, Serialize)]
struct Criteria {
    expression: Expression,
}

#[derive(Debug, Serialize)]
struct Expression {
    #[serde(rename = "$")]
    value: String,
}

impl QueryRequest {
    pub fn new(
        root_entity: &str,
        fields: &[&str],
        offset: u64,
        limit: Option<u32>,
        criteria: Option<String>,
    ) -> Self {
        Self {
            request_body: QueryRequestBody {
                data_set: DataSet {
                    root_entity: root_entity.to_string(),
                    include_presentation_fields: "N".to_string(),
                    offset_page: offset.to_string(),
                    limit: limit.map(|l| l.to_string()),
                    entity: EntitySelection {
                        fieldset: FieldSet { list: fields.join(", ") },
                    },
                    criteria: criteria.map(|value| Criteria { expression: Expression { value } }),
                },
            },
        }
    }
}

/// Compose the optional filter expression for a product listing.
///
/// Only present predicates participate; both present joins with AND. The
/// name filter is a case-insensitive "contains": the ERP compares the
/// uppercased description column against an uppercased LIKE pattern.
pub fn product_criteria(code: Option<&str>, name_contains: Option<&str>) -> Option<String> {
    let mut predicates = Vec::new();

    if let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) {
        predicates.push(format!("CODPROD = {code}"));
    }

    if let Some(name) = name_contains.map(str::trim).filter(|n| !n.is_empty()) {
        predicates.push(format!("DESCRPROD LIKE '%{}%'", name.to_uppercase()));
    }

    if predicates.is_empty() {
        None
    } else {
        Some(predicates.join(" AND "))
    }
}

/// Filter expression for the stock query (always scoped to one product).
pub fn stock_criteria(product_code: &str, location_filter: Option<&str>) -> String {
    let mut expression = format!("CODPROD = {product_code}");

    if let Some(location) = location_filter.map(str::trim).filter(|l| !l.is_empty()) {
        expression.push_str(&format!(" AND CODLOCAL LIKE '%{location}%'"));
    }

    expression
}

// ============================================================================
// Save requests
// ============================================================================

/// Dataset save request: one record of `$`-keyed field values.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    request_body: SaveRequestBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveRequestBody {
    data_set: SaveDataSet,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SaveDataSet {
    root_entity: String,
    entity: HashMap<String, FieldValue>,
}

#[derive(Debug, Serialize)]
struct FieldValue {
    #[serde(rename = "$")]
    value: String,
}

impl SaveRequest {
    /// Build a save payload from ERP-named fields. Null values are skipped;
    /// everything else is carried as the stringly wire representation.
    pub fn new(root_entity: &str, fields: &serde_json::Map<String, Value>) -> Self {
        let entity = fields
            .iter()
            .filter_map(|(name, value)| {
                wire_string(value).map(|value| (name.clone(), FieldValue { value }))
            })
            .collect();

        Self {
            request_body: SaveRequestBody {
                data_set: SaveDataSet { root_entity: root_entity.to_string(), entity },
            },
        }
    }
}

fn wire_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        _ => None,
    }
}

// ============================================================================
// Query responses
// ============================================================================

/// A decoded row: ERP field name -> string value.
pub type FieldMap = HashMap<String, String>;

/// Decoded result of a dataset query.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DecodedEntities {
    pub rows: Vec<FieldMap>,
    pub total: Option<u64>,
}

/// Raw dataset query response envelope
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    response_body: Option<ResponseBody>,
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    entities: Option<Entities>,
}

#[derive(Debug, Deserialize)]
struct Entities {
    #[serde(default)]
    total: Option<String>,
    #[serde(default)]
    metadata: Option<Metadata>,
    #[serde(default)]
    entity: Option<OneOrMany>,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    fields: FieldList,
}

#[derive(Debug, Deserialize)]
struct FieldList {
    field: Vec<FieldName>,
}

#[derive(Debug, Deserialize)]
struct FieldName {
    name: String,
}

/// The gateway returns a bare object for a single row and an array for
/// several.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<RawRow>),
    One(RawRow),
}

type RawRow = HashMap<String, Value>;

impl QueryResponse {
    /// Decode the positional envelope into plain field maps.
    ///
    /// An absent `responseBody.entities` (or an envelope with no rows)
    /// decodes to the empty result; upstream "no records" is not a failure.
    pub fn decode(self) -> DecodedEntities {
        let Some(entities) = self.response_body.and_then(|body| body.entities) else {
            return DecodedEntities::default();
        };

        let Some(rows) = entities.entity else {
            return DecodedEntities::default();
        };

        let field_names: Vec<String> = entities
            .metadata
            .map(|m| m.fields.field.into_iter().map(|f| f.name).collect())
            .unwrap_or_default();

        let raw_rows = match rows {
            OneOrMany::Many(rows) => rows,
            OneOrMany::One(row) => vec![row],
        };

        let decoded = raw_rows
            .into_iter()
            .map(|raw| {
                let mut fields = FieldMap::new();
                for (index, name) in field_names.iter().enumerate() {
                    let key = format!("f{index}");
                    if let Some(value) = raw.get(&key).and_then(cell_value) {
                        fields.insert(name.clone(), value);
                    }
                }
                fields
            })
            .collect();

        let total = entities.total.as_deref().and_then(|t| t.parse().ok());
        DecodedEntities { rows: decoded, total }
    }
}

/// Row cells nest the actual value under `$`.
fn cell_value(cell: &Value) -> Option<String> {
    match cell.get("$")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
