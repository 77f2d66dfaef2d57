//! The `Record` trait: the static mapping between a Rust type and its table.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::item::{Item, KeyValue};
use crate::storage::{Key, KeyPart, Result, StoreError};

/// A type stored in its own table.
///
/// `serde` decides which fields become attributes and how they are named; the
/// key constants must use the serialized attribute names.
///
/// ```
/// use serde::{Deserialize, Serialize};
/// use tablestore_core::Record;
///
/// #[derive(Serialize, Deserialize)]
/// #[serde(rename_all = "PascalCase")]
/// struct Order {
///     order_id: String,
///     timestamp: i64,
///     amount: u32,
/// }
///
/// impl Record for Order {
///     const HASH_KEY: &'static str = "OrderId";
///     const RANGE_KEY: Option<&'static str> = Some("Timestamp");
/// }
///
/// assert_eq!(Order::table_name(), "Order");
/// ```
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    /// Attribute name of the hash key.
    const HASH_KEY: &'static str;

    /// Attribute name of the range key, if the table has one.
    const RANGE_KEY: Option<&'static str> = None;

    /// Numeric attribute holding the record version. Only consulted when
    /// version checks are enforced.
    const VERSION_ATTRIBUTE: Option<&'static str> = None;

    /// Table name. Defaults to the unqualified type name.
    fn table_name() -> String {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// `my_crate::model::Order<u8>` -> `Order`.
pub fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// Extracts the primary key of a record from its item.
pub fn record_key<T: Record>(item: &Item) -> Result<Key> {
    let hash = KeyPart {
        name: T::HASH_KEY.to_string(),
        value: key_attribute(item, T::HASH_KEY)?,
    };
    let range = T::RANGE_KEY
        .map(|name| {
            key_attribute(item, name).map(|value| KeyPart {
                name: name.to_string(),
                value,
            })
        })
        .transpose()?;

    Ok(Key { hash, range })
}

fn key_attribute(item: &Item, name: &str) -> Result<KeyValue> {
    match item.get(name) {
        Some(value) => KeyValue::from_attribute(value).ok_or_else(|| {
            StoreError::InvalidRecord(format!(
                "key attribute `{name}` must be a string or number, got {}",
                value.type_name()
            ))
        }),
        None => Err(StoreError::InvalidRecord(format!(
            "missing key attribute `{name}`"
        ))),
    }
}
