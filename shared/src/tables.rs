use lambda_http::{Body, Response};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::response::ok;
use crate::store::{record_to_item, ItemStore};
use crate::types::Table;
use crate::validation::{bool_field, integer_field, optional_number_field, parse_body, require_fields};

fn parse_table(body: &[u8]) -> Result<Table, ApiError> {
    let body = parse_body(body)?;
    require_fields(&body, &["id", "number", "places", "isVip"])?;

    let table = Table {
        id: integer_field(&body, "id")?,
        number: integer_field(&body, "number")?,
        places: integer_field(&body, "places")?,
        is_vip: bool_field(&body, "isVip")?,
        min_order: optional_number_field(&body, "minOrder")?,
    };

    if table.places < 1 {
        return Err(ApiError::validation("Invalid places: must be at least 1"));
    }
    if table
        .min_order
        .as_ref()
        .and_then(|min| min.as_f64())
        .is_some_and(|min| min < 0.0)
    {
        return Err(ApiError::validation("Invalid minOrder: must not be negative"));
    }
    Ok(table)
}

/// List every table
pub async fn list_tables(store: &dyn ItemStore, collection: &str) -> Result<Response<Body>, ApiError> {
    let tables = store
        .scan_all(collection)
        .await
        .map_err(|e| ApiError::collaborator("Cannot retrieve tables", e))?;

    ok(&json!({ "tables": tables }))
}

/// Create (or overwrite) a table keyed by its caller-supplied id
pub async fn create_table(
    store: &dyn ItemStore,
    collection: &str,
    body: &[u8],
) -> Result<Response<Body>, ApiError> {
    let table = parse_table(body)?;

    store
        .put(collection, record_to_item(&table)?)
        .await
        .map_err(|e| ApiError::collaborator("Cannot add table", e))?;

    tracing::info!("Table {} stored", table.id);
    ok(&json!({ "id": table.id }))
}

/// Get a table by the id in its path segment
pub async fn get_table(
    store: &dyn ItemStore,
    collection: &str,
    table_id: &str,
) -> Result<Response<Body>, ApiError> {
    let id: i64 = table_id
        .parse()
        .map_err(|_| ApiError::validation("Invalid table id"))?;

    let item = store
        .get(collection, &Value::from(id))
        .await
        .map_err(|e| ApiError::collaborator("Cannot retrieve table", e))?;

    match item {
        Some(item) => ok(&item),
        // Deliberately 400 rather than 404
        None => Err(ApiError::NotFound("Table not found".to_string())),
    }
}
