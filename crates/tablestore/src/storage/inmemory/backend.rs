//! In-memory backend implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tablestore_core::condition::matches_all;
use tablestore_core::item::canonical_number;
use tablestore_core::{
    AttributeValue, Item, Key, KeyAttribute, KeyPart, KeyValue, Result, ScalarType,
    ScanCondition, StoreError, TableBackend, TableSchema, TableStatus, WriteCondition,
};
use tokio::sync::RwLock;

type StoredKey = (KeyValue, Option<KeyValue>);

#[derive(Debug)]
struct Table {
    schema: TableSchema,
    items: HashMap<StoredKey, Item>,
    /// Status polls left before the table reports `Active`.
    pending_polls: usize,
}

impl Table {
    fn stored_key(&self, item: &Item) -> Result<StoredKey> {
        let hash = key_value(item, &self.schema.hash_key)?;
        let range = self
            .schema
            .range_key
            .as_ref()
            .map(|range| key_value(item, range))
            .transpose()?;
        Ok((hash, range))
    }

    fn lookup_key(&self, key: &Key) -> Result<StoredKey> {
        self.stored_key(&key.to_item())
    }

    fn sorted_items(&self) -> Vec<(&StoredKey, &Item)> {
        let mut items: Vec<_> = self.items.iter().collect();
        items.sort_by(|(a, _), (b, _)| {
            a.0.compare(&b.0).then_with(|| match (&a.1, &b.1) {
                (Some(x), Some(y)) => x.compare(y),
                _ => std::cmp::Ordering::Equal,
            })
        });
        items
    }
}

/// Reads a key attribute the way the store validates it: present and of the declared type.
fn key_value(item: &Item, attribute: &KeyAttribute) -> Result<KeyValue> {
    let value = item.get(&attribute.name).ok_or_else(|| {
        StoreError::Service(format!(
            "One or more parameter values were invalid: Missing the key {} in the item",
            attribute.name
        ))
    })?;

    match (attribute.scalar_type, value) {
        (ScalarType::String, AttributeValue::S(s)) => Ok(KeyValue::S(s.clone())),
        (ScalarType::Number, AttributeValue::N(n)) => Ok(KeyValue::N(canonical_number(n))),
        _ => Err(StoreError::Service(format!(
            "One or more parameter values were invalid: Type mismatch for key {}",
            attribute.name
        ))),
    }
}

fn check_conditions(conditions: &[WriteCondition], stored: Option<&Item>) -> Result<()> {
    if conditions.iter().all(|condition| condition.holds(stored)) {
        Ok(())
    } else {
        Err(StoreError::ConditionFailed)
    }
}

/// In-memory storage backend for testing.
///
/// Uses a HashMap wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the backend is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    tables: Arc<RwLock<HashMap<String, Table>>>,
    activation_polls: usize,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend. New tables are active immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// New tables report `Creating` for this many status polls before turning `Active`.
    pub fn with_activation_polls(mut self, polls: usize) -> Self {
        self.activation_polls = polls;
        self
    }

    /// Number of items currently stored in a table.
    pub async fn item_count(&self, table: &str) -> Option<usize> {
        let tables = self.tables.read().await;
        tables.get(table).map(|t| t.items.len())
    }
}

fn missing_table(table: &str) -> StoreError {
    StoreError::TableNotFound {
        table: table.to_string(),
    }
}

#[async_trait]
impl TableBackend for InMemoryBackend {
    async fn create_table(&self, schema: &TableSchema) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.contains_key(&schema.table_name) {
            return Err(StoreError::TableAlreadyExists {
                table: schema.table_name.clone(),
            });
        }
        tables.insert(
            schema.table_name.clone(),
            Table {
                schema: schema.clone(),
                items: HashMap::new(),
                pending_polls: self.activation_polls,
            },
        );
        Ok(())
    }

    async fn describe_table(&self, table: &str) -> Result<Option<TableStatus>> {
        let mut tables = self.tables.write().await;
        Ok(tables.get_mut(table).map(|t| {
            if t.pending_polls == 0 {
                TableStatus::Active
            } else {
                t.pending_polls -= 1;
                TableStatus::Creating
            }
        }))
    }

    async fn put_item(&self, table: &str, item: Item, conditions: &[WriteCondition]) -> Result<()> {
        let mut tables = self.tables.write().await;
        let t = tables.get_mut(table).ok_or_else(|| missing_table(table))?;

        let key = t.stored_key(&item)?;
        check_conditions(conditions, t.items.get(&key))?;
        t.items.insert(key, item);
        Ok(())
    }

    async fn batch_put(&self, table: &str, items: Vec<Item>) -> Result<()> {
        let mut tables = self.tables.write().await;
        let t = tables.get_mut(table).ok_or_else(|| missing_table(table))?;

        let keyed = items
            .into_iter()
            .map(|item| t.stored_key(&item).map(|key| (key, item)))
            .collect::<Result<Vec<_>>>()?;
        t.items.extend(keyed);
        Ok(())
    }

    async fn get_item(
        &self,
        table: &str,
        key: &Key,
        _consistent_read: bool,
    ) -> Result<Option<Item>> {
        let tables = self.tables.read().await;
        let t = tables.get(table).ok_or_else(|| missing_table(table))?;

        let key = t.lookup_key(key)?;
        Ok(t.items.get(&key).cloned())
    }

    async fn first_in_partition(
        &self,
        table: &str,
        hash: &KeyPart,
        _consistent_read: bool,
    ) -> Result<Option<Item>> {
        let tables = self.tables.read().await;
        let t = tables.get(table).ok_or_else(|| missing_table(table))?;

        let hash_value = key_value(&Key::from(hash.clone()).to_item(), &t.schema.hash_key)?;
        Ok(t.sorted_items()
            .into_iter()
            .find(|((h, _), _)| *h == hash_value)
            .map(|(_, item)| item.clone()))
    }

    async fn scan(
        &self,
        table: &str,
        conditions: &[ScanCondition],
        _consistent_read: bool,
    ) -> Result<Vec<Item>> {
        for condition in conditions {
            condition.validate()?;
        }

        let tables = self.tables.read().await;
        let t = tables.get(table).ok_or_else(|| missing_table(table))?;

        Ok(t.sorted_items()
            .into_iter()
            .filter(|(_, item)| matches_all(conditions, item))
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn delete_item(
        &self,
        table: &str,
        key: &Key,
        conditions: &[WriteCondition],
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        let t = tables.get_mut(table).ok_or_else(|| missing_table(table))?;

        let key = t.lookup_key(key)?;
        check_conditions(conditions, t.items.get(&key))?;
        t.items.remove(&key);
        Ok(())
    }
}
