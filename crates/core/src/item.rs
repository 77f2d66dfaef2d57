//! Backend-neutral attribute model.
//!
//! Records are mapped to items through `serde_json::Value`: `serde` provides the
//! field list, this module provides the attribute types. Numbers travel as
//! decimal strings, the way the store's wire format carries them.

mod finite;

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::storage::{Result, StoreError};

/// A stored item: attribute name to attribute value.
pub type Item = BTreeMap<String, AttributeValue>;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    S(String),
    N(String),
    Bool(bool),
    Null,
    L(Vec<AttributeValue>),
    M(Item),
}

impl AttributeValue {
    pub fn as_s(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_n(&self) -> Option<&str> {
        match self {
            Self::N(n) => Some(n),
            _ => None,
        }
    }

    /// Short type descriptor, as used in the store's error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::S(_) => "S",
            Self::N(_) => "N",
            Self::Bool(_) => "BOOL",
            Self::Null => "NULL",
            Self::L(_) => "L",
            Self::M(_) => "M",
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::S(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::S(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

macro_rules! numeric_attribute {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for AttributeValue {
                fn from(value: $ty) -> Self {
                    Self::N(value.to_string())
                }
            }
        )*
    };
}

numeric_attribute!(i32, i64, u32, u64, f64);

impl From<KeyValue> for AttributeValue {
    fn from(value: KeyValue) -> Self {
        match value {
            KeyValue::S(s) => Self::S(s),
            KeyValue::N(n) => Self::N(n),
        }
    }
}

/// A key attribute value. Keys are restricted to strings and numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
    S(String),
    N(String),
}

impl KeyValue {
    /// Store ordering: strings lexicographically, numbers numerically.
    pub fn compare(&self, other: &KeyValue) -> Ordering {
        match (self, other) {
            (Self::S(a), Self::S(b)) => a.cmp(b),
            (Self::N(a), Self::N(b)) => compare_numbers(a, b).unwrap_or_else(|| a.cmp(b)),
            (Self::S(_), Self::N(_)) => Ordering::Less,
            (Self::N(_), Self::S(_)) => Ordering::Greater,
        }
    }

    /// The same key with numbers in canonical form, so `5`, `5.0` and `5e0`
    /// address one item.
    pub fn normalized(self) -> Self {
        match self {
            Self::N(n) => Self::N(canonical_number(&n)),
            other => other,
        }
    }

    /// Converts a key-typed attribute. Returns `None` for non-key types.
    pub fn from_attribute(value: &AttributeValue) -> Option<Self> {
        match value {
            AttributeValue::S(s) => Some(Self::S(s.clone())),
            AttributeValue::N(n) => Some(Self::N(n.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::S(s) | Self::N(s) => f.write_str(s),
        }
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        Self::S(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        Self::S(value)
    }
}

macro_rules! numeric_key {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for KeyValue {
                fn from(value: $ty) -> Self {
                    Self::N(value.to_string())
                }
            }
        )*
    };
}

numeric_key!(i32, i64, u32, u64);

/// Renders a decimal string in its shortest exact form. Integers keep full
/// precision; anything unparseable is returned unchanged.
pub fn canonical_number(raw: &str) -> String {
    if let Ok(i) = raw.parse::<i64>() {
        return i.to_string();
    }
    if let Ok(u) = raw.parse::<u64>() {
        return u.to_string();
    }
    match raw.parse::<f64>() {
        Ok(f) if f == 0.0 => "0".to_string(),
        Ok(f) if f.is_finite() => f.to_string(),
        _ => raw.to_string(),
    }
}

/// Compares two decimal strings numerically.
pub(crate) fn compare_numbers(a: &str, b: &str) -> Option<Ordering> {
    let a: f64 = a.parse().ok()?;
    let b: f64 = b.parse().ok()?;
    a.partial_cmp(&b)
}

/// Serializes a record into an item.
///
/// The record must serialize to a map and hold only finite numbers. Top-level
/// `null` fields are omitted so that an absent `Option` is stored as an absent
/// attribute.
pub fn to_item<T: Serialize>(record: &T) -> Result<Item> {
    finite::check(record).map_err(|err| match err {
        finite::FiniteError::Custom(msg) => StoreError::Serialization(msg),
        err => StoreError::InvalidRecord(err.to_string()),
    })?;

    let value =
        serde_json::to_value(record).map_err(|e| StoreError::Serialization(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k, value_to_attribute(v)))
            .collect()),
        other => Err(StoreError::InvalidRecord(format!(
            "record must serialize to a map, got {}",
            json_kind(&other)
        ))),
    }
}

/// Deserializes an item into a record.
pub fn from_item<T: DeserializeOwned>(item: Item) -> Result<T> {
    let value = attribute_to_value(AttributeValue::M(item))?;
    serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Converts a JSON value to an attribute value.
pub fn value_to_attribute(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(values) => {
            AttributeValue::L(values.into_iter().map(value_to_attribute).collect())
        }
        Value::Object(map) => AttributeValue::M(
            map.into_iter()
                .map(|(k, v)| (k, value_to_attribute(v)))
                .collect(),
        ),
    }
}

/// Converts an attribute value back to a JSON value.
pub fn attribute_to_value(attribute: AttributeValue) -> Result<Value> {
    Ok(match attribute {
        AttributeValue::Null => Value::Null,
        AttributeValue::Bool(b) => Value::Bool(b),
        AttributeValue::S(s) => Value::String(s),
        AttributeValue::N(n) => Value::Number(parse_number(&n)?),
        AttributeValue::L(values) => Value::Array(
            values
                .into_iter()
                .map(attribute_to_value)
                .collect::<Result<Vec<_>>>()?,
        ),
        AttributeValue::M(item) => {
            let mut map = Map::new();
            for (k, v) in item {
                map.insert(k, attribute_to_value(v)?);
            }
            Value::Object(map)
        }
    })
}

fn parse_number(raw: &str) -> Result<Number> {
    if let Ok(i) = raw.parse::<i64>() {
        return Ok(Number::from(i));
    }
    if let Ok(u) = raw.parse::<u64>() {
        return Ok(Number::from(u));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| StoreError::Serialization(format!("invalid number attribute: {raw}")))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct Order {
        order_id: String,
        timestamp: i64,
        amount: f64,
        note: Option<String>,
        tags: Vec<String>,
    }

    fn sample_order() -> Order {
        Order {
            order_id: "A1".to_string(),
            timestamp: 1_700_000_000,
            amount: 50.5,
            note: None,
            tags: vec!["express".to_string()],
        }
    }

    #[test]
    fn test_to_item_maps_field_types() {
        let item = to_item(&sample_order()).unwrap();

        assert_eq!(item.get("OrderId").unwrap().as_s(), Some("A1"));
        assert_eq!(item.get("Timestamp").unwrap().as_n(), Some("1700000000"));
        assert_eq!(item.get("Amount").unwrap().as_n(), Some("50.5"));
        assert_eq!(
            item.get("Tags"),
            Some(&AttributeValue::L(vec![AttributeValue::S(
                "express".to_string()
            )]))
        );
    }

    #[test]
    fn test_to_item_omits_null_fields() {
        let item = to_item(&sample_order()).unwrap();
        assert!(!item.contains_key("Note"));
    }

    #[test]
    fn test_from_item_restores_record() {
        let mut order = sample_order();
        order.note = Some("leave at door".to_string());

        let parsed: Order = from_item(to_item(&order).unwrap()).unwrap();
        assert_eq!(parsed, order);
    }

    #[test]
    fn test_from_item_missing_option_is_none() {
        let parsed: Order = from_item(to_item(&sample_order()).unwrap()).unwrap();
        assert_eq!(parsed.note, None);
    }

    #[test]
    fn test_to_item_rejects_non_map_records() {
        let err = to_item(&42).unwrap_err();
        assert_eq!(
            err,
            StoreError::InvalidRecord("record must serialize to a map, got a number".to_string())
        );
    }

    #[test]
    fn test_to_item_rejects_non_finite_numbers() {
        let order = Order {
            amount: f64::NAN,
            ..sample_order()
        };
        let err = to_item(&order).unwrap_err();
        assert_eq!(
            err,
            StoreError::InvalidRecord(
                "field `Amount` holds a non-finite number (NaN)".to_string()
            )
        );

        let order = Order {
            amount: f64::INFINITY,
            ..sample_order()
        };
        assert!(matches!(to_item(&order), Err(StoreError::InvalidRecord(_))));
    }

    #[test]
    fn test_attribute_to_value_rejects_bad_number() {
        let err = attribute_to_value(AttributeValue::N("forty".to_string())).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn test_key_value_compare_is_numeric_for_numbers() {
        let nine = KeyValue::from(9);
        let ten = KeyValue::from(10);
        assert_eq!(nine.compare(&ten), Ordering::Less);
        assert_eq!(
            KeyValue::from("b").compare(&KeyValue::from("a")),
            Ordering::Greater
        );
    }

    #[test]
    fn test_key_value_from_attribute() {
        assert_eq!(
            KeyValue::from_attribute(&AttributeValue::S("A1".to_string())),
            Some(KeyValue::S("A1".to_string()))
        );
        assert_eq!(KeyValue::from_attribute(&AttributeValue::Bool(true)), None);
    }

    #[test]
    fn test_canonical_number() {
        assert_eq!(canonical_number("5"), "5");
        assert_eq!(canonical_number("5.0"), "5");
        assert_eq!(canonical_number("5e0"), "5");
        assert_eq!(canonical_number("-0.0"), "0");
        assert_eq!(canonical_number("0.50"), "0.5");
        assert_eq!(canonical_number("18446744073709551615"), "18446744073709551615");
        assert_eq!(canonical_number("abc"), "abc");

        assert_eq!(
            KeyValue::N("12.50".to_string()).normalized(),
            KeyValue::N("12.5".to_string())
        );
        assert_eq!(KeyValue::from("5.0").normalized(), KeyValue::from("5.0"));
    }
}
