use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::{error::DisplayErrorContext, types::AttributeValue, Client as DynamoClient};
use serde_json::{Number, Value};

use crate::store::{Item, ItemStore, StoreError, KEY_ATTRIBUTE};

/// DynamoDB backed [`ItemStore`]; a collection is a table name.
pub struct DynamoItemStore {
    client: DynamoClient,
}

impl DynamoItemStore {
    pub fn new(client: DynamoClient) -> Self {
        Self { client }
    }
}

fn request_error<E: std::error::Error>(e: E) -> StoreError {
    StoreError::Request(DisplayErrorContext(e).to_string())
}

#[async_trait]
impl ItemStore for DynamoItemStore {
    async fn put(&self, collection: &str, item: Item) -> Result<(), StoreError> {
        self.client
            .put_item()
            .table_name(collection)
            .set_item(Some(to_item(&item)))
            .send()
            .await
            .map_err(request_error)?;
        Ok(())
    }

    async fn get(&self, collection: &str, key: &Value) -> Result<Option<Item>, StoreError> {
        let (name, value) = primary_key(key);
        let result = self
            .client
            .get_item()
            .table_name(collection)
            .key(name, value)
            .send()
            .await
            .map_err(request_error)?;

        result.item().map(from_item).transpose()
    }

    async fn scan_all(&self, collection: &str) -> Result<Vec<Item>, StoreError> {
        let mut items = Vec::new();
        let mut start_key = None;

        loop {
            let page = self
                .client
                .scan()
                .table_name(collection)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(request_error)?;

            for item in page.items() {
                items.push(from_item(item)?);
            }

            start_key = next_start_key(page.last_evaluated_key());
            if start_key.is_none() {
                break;
            }
        }

        tracing::info!("Scanned {} items from {}", items.len(), collection);
        Ok(items)
    }
}

/// Key for a single-item lookup. Integer ids go out as `N`, string ids as `S`.
pub(crate) fn primary_key(value: &Value) -> (String, AttributeValue) {
    (KEY_ATTRIBUTE.to_string(), to_attribute(value))
}

/// Start key for the next scan page; `None` once the table is exhausted.
/// DynamoDB may report the end as either an absent or an empty key.
fn next_start_key(
    last_evaluated: Option<&HashMap<String, AttributeValue>>,
) -> Option<HashMap<String, AttributeValue>> {
    last_evaluated.filter(|key| !key.is_empty()).cloned()
}

pub fn to_item(item: &Item) -> HashMap<String, AttributeValue> {
    item.iter()
        .map(|(name, value)| (name.clone(), to_attribute(value)))
        .collect()
}

pub fn from_item(item: &HashMap<String, AttributeValue>) -> Result<Item, StoreError> {
    item.iter()
        .map(|(name, attribute)| Ok::<_, StoreError>((name.clone(), from_attribute(attribute)?)))
        .collect()
}

pub fn to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(to_item(map)),
    }
}

pub fn from_attribute(attribute: &AttributeValue) -> Result<Value, StoreError> {
    let value = match attribute {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => Value::Number(parse_number(n)?),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(values) => Value::Array(
            values
                .iter()
                .map(from_attribute)
                .collect::<Result<_, _>>()?,
        ),
        AttributeValue::M(map) => Value::Object(from_item(map)?),
        AttributeValue::Ss(strings) => {
            Value::Array(strings.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(numbers) => Value::Array(
            numbers
                .iter()
                .map(|n| parse_number(n).map(Value::Number))
                .collect::<Result<_, _>>()?,
        ),
        other => {
            return Err(StoreError::Decode(format!(
                "unsupported attribute type: {:?}",
                other
            )))
        }
    };
    Ok(value)
}

/// DynamoDB numbers travel as strings; keep integers integral.
fn parse_number(raw: &str) -> Result<Number, StoreError> {
    if let Ok(i) = raw.parse::<i64>() {
        return Ok(i.into());
    }
    if let Ok(u) = raw.parse::<u64>() {
        return Ok(u.into());
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| StoreError::Decode(format!("invalid number: {}", raw)))
}
