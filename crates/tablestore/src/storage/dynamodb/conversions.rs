//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between the SDK's `AttributeValue` maps and
//! the backend-neutral item model. These are testable in isolation without
//! DynamoDB access.

use std::collections::{BTreeMap, HashMap};

use aws_sdk_dynamodb::types::{AttributeValue as SdkValue, TableStatus as SdkTableStatus};
use tablestore_core::condition::Expression;
use tablestore_core::{AttributeValue, Item, Key, KeyValue, StoreError, TableStatus};

/// Convert an item to a DynamoDB item.
pub fn item_to_sdk(item: Item) -> HashMap<String, SdkValue> {
    item.into_iter()
        .map(|(name, value)| (name, value_to_sdk(value)))
        .collect()
}

/// Convert a DynamoDB item to an item.
pub fn item_from_sdk(item: HashMap<String, SdkValue>) -> Result<Item, StoreError> {
    item.into_iter()
        .map(|(name, value)| value_from_sdk(value).map(|value| (name, value)))
        .collect()
}

/// Convert a primary key to the DynamoDB key map.
pub fn key_to_sdk(key: &Key) -> HashMap<String, SdkValue> {
    item_to_sdk(key.to_item())
}

pub fn key_value_to_sdk(value: &KeyValue) -> SdkValue {
    match value {
        KeyValue::S(s) => SdkValue::S(s.clone()),
        KeyValue::N(n) => SdkValue::N(n.clone()),
    }
}

pub fn value_to_sdk(value: AttributeValue) -> SdkValue {
    match value {
        AttributeValue::S(s) => SdkValue::S(s),
        AttributeValue::N(n) => SdkValue::N(n),
        AttributeValue::Bool(b) => SdkValue::Bool(b),
        AttributeValue::Null => SdkValue::Null(true),
        AttributeValue::L(values) => SdkValue::L(values.into_iter().map(value_to_sdk).collect()),
        AttributeValue::M(item) => SdkValue::M(item_to_sdk(item)),
    }
}

/// Convert a DynamoDB attribute. String and number sets become lists.
pub fn value_from_sdk(value: SdkValue) -> Result<AttributeValue, StoreError> {
    Ok(match value {
        SdkValue::S(s) => AttributeValue::S(s),
        SdkValue::N(n) => AttributeValue::N(n),
        SdkValue::Bool(b) => AttributeValue::Bool(b),
        SdkValue::Null(_) => AttributeValue::Null,
        SdkValue::L(values) => AttributeValue::L(
            values
                .into_iter()
                .map(value_from_sdk)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        SdkValue::M(map) => AttributeValue::M(item_from_sdk(map)?),
        SdkValue::Ss(values) => {
            AttributeValue::L(values.into_iter().map(AttributeValue::S).collect())
        }
        SdkValue::Ns(values) => {
            AttributeValue::L(values.into_iter().map(AttributeValue::N).collect())
        }
        SdkValue::B(_) | SdkValue::Bs(_) => {
            return Err(StoreError::Serialization(
                "binary attributes are not supported".to_string(),
            ))
        }
        other => {
            return Err(StoreError::Serialization(format!(
                "unsupported attribute value: {:?}",
                other
            )))
        }
    })
}

/// Split an expression into the SDK's name and value placeholder maps.
///
/// The value map is `None` when empty: DynamoDB rejects an empty
/// `ExpressionAttributeValues`.
pub fn expression_maps(
    expression: Expression,
) -> (
    String,
    HashMap<String, String>,
    Option<HashMap<String, SdkValue>>,
) {
    let names = expression.names.into_iter().collect();
    let values = sdk_values(expression.values);
    (expression.expression, names, values)
}

fn sdk_values(values: BTreeMap<String, AttributeValue>) -> Option<HashMap<String, SdkValue>> {
    if values.is_empty() {
        return None;
    }
    Some(
        values
            .into_iter()
            .map(|(placeholder, value)| (placeholder, value_to_sdk(value)))
            .collect(),
    )
}

pub fn table_status_from_sdk(status: &SdkTableStatus) -> TableStatus {
    match status {
        SdkTableStatus::Active => TableStatus::Active,
        SdkTableStatus::Creating => TableStatus::Creating,
        SdkTableStatus::Updating => TableStatus::Updating,
        SdkTableStatus::Deleting => TableStatus::Deleting,
        other => TableStatus::Other(other.as_str().to_string()),
    }
}
