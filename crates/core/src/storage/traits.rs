use async_trait::async_trait;

use crate::condition::ScanCondition;
use crate::item::Item;
use crate::schema::{TableSchema, TableStatus};

use super::{Key, KeyPart, Result, WriteCondition};

/// Native operations of a table store.
///
/// Implementations pass each call through to the store. They report a failed
/// write precondition as [`StoreError::ConditionFailed`](super::StoreError)
/// and leave its interpretation to the caller.
#[async_trait]
pub trait TableBackend: Send + Sync {
    /// Issues a create-table request. Does not wait for the table.
    async fn create_table(&self, schema: &TableSchema) -> Result<()>;

    /// Gets the table status, or `None` if the table does not exist (yet).
    async fn describe_table(&self, table: &str) -> Result<Option<TableStatus>>;

    /// Inserts or replaces an item when all conditions hold.
    async fn put_item(&self, table: &str, item: Item, conditions: &[WriteCondition])
        -> Result<()>;

    /// Writes all items as one batched request (or as few as the store allows).
    async fn batch_put(&self, table: &str, items: Vec<Item>) -> Result<()>;

    /// Gets an item by its full primary key.
    async fn get_item(&self, table: &str, key: &Key, consistent_read: bool)
        -> Result<Option<Item>>;

    /// Gets the item with the lowest range key under a hash key.
    async fn first_in_partition(
        &self,
        table: &str,
        hash: &KeyPart,
        consistent_read: bool,
    ) -> Result<Option<Item>>;

    /// Reads every item matching all conditions, across all pages.
    async fn scan(
        &self,
        table: &str,
        conditions: &[ScanCondition],
        consistent_read: bool,
    ) -> Result<Vec<Item>>;

    /// Deletes an item when all conditions hold.
    async fn delete_item(&self, table: &str, key: &Key, conditions: &[WriteCondition])
        -> Result<()>;
}
