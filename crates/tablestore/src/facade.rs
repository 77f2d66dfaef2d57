//! The typed storage facade.

use tablestore_core::item::{from_item, to_item};
use tablestore_core::record::record_key;
use tablestore_core::{
    AttributeValue, FacadeConfig, Item, Key, KeyPart, KeyValue, Record, Result, ScanCondition,
    StoreError, TableBackend, TableSchema, VersionCheck, WriteCondition,
};

#[cfg(feature = "dynamodb")]
use crate::storage::DynamoDbBackend;
#[cfg(feature = "dynamodb")]
use tablestore_core::ConnectionDescriptor;

use crate::wait::wait_for_table_active;

/// Typed table operations against one store endpoint.
///
/// The record type of each call selects the table (`Record::table_name`) and
/// the key attributes. Every operation is a single pass-through to the
/// backend: nothing is cached and nothing is retried.
#[derive(Debug)]
pub struct StorageFacade<B> {
    backend: B,
    config: FacadeConfig,
}

#[cfg(feature = "dynamodb")]
impl StorageFacade<DynamoDbBackend> {
    /// Connects to DynamoDB with the default configuration: strongly
    /// consistent reads, version checks skipped.
    pub async fn connect(descriptor: ConnectionDescriptor) -> Result<Self> {
        Self::connect_with_config(descriptor, FacadeConfig::default()).await
    }

    pub async fn connect_with_config(
        descriptor: ConnectionDescriptor,
        config: FacadeConfig,
    ) -> Result<Self> {
        for (name, value) in [
            ("region", descriptor.region()),
            ("access key id", descriptor.access_key_id()),
            ("secret access key", descriptor.secret_access_key()),
        ] {
            if value.is_empty() {
                return Err(StoreError::Configuration(format!("{name} must not be empty")));
            }
        }

        let backend = DynamoDbBackend::connect(&descriptor).await;
        tracing::info!(target_env = %descriptor.target_display(), "Connected table store facade");
        Ok(Self::with_backend(backend, config))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Existence {
    Any,
    Required,
}

impl<B: TableBackend> StorageFacade<B> {
    pub fn with_backend(backend: B, config: FacadeConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &FacadeConfig {
        &self.config
    }

    /// Creates the table for `T` and waits until it is active.
    ///
    /// The primary key is declared as a string, the range key as a number, and
    /// the table gets one read and one write capacity unit. Both names must
    /// match `T::HASH_KEY` and `T::RANGE_KEY`.
    pub async fn create_table<T: Record>(
        &self,
        primary_key: &str,
        range_key: Option<&str>,
    ) -> Result<()> {
        let schema = TableSchema::for_record::<T>(primary_key, range_key)?;
        self.create_table_from_schema(&schema).await
    }

    /// Creates a table from an explicit schema and waits until it is active.
    pub async fn create_table_from_schema(&self, schema: &TableSchema) -> Result<()> {
        tracing::info!(table = %schema.table_name, "Creating table");
        self.backend.create_table(schema).await?;
        wait_for_table_active(&self.backend, &schema.table_name, &self.config.table_wait).await?;
        tracing::info!(table = %schema.table_name, "Table is active");
        Ok(())
    }

    /// Inserts or replaces a record.
    pub async fn store<T: Record>(&self, record: &T) -> Result<()> {
        self.put(record, Existence::Any).await
    }

    /// Writes all records in one batched request.
    ///
    /// Every record is staged before anything is sent, so a record that cannot
    /// be mapped aborts the whole batch. Batched writes never carry version
    /// conditions.
    pub async fn batch_store<'a, T, I>(&self, records: I) -> Result<()>
    where
        T: Record + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let table = T::table_name();

        let mut staged = Vec::new();
        for record in records {
            let item = to_item(record)?;
            record_key::<T>(&item)?;
            staged.push(item);
        }

        if staged.is_empty() {
            tracing::debug!(table = %table, "Nothing to batch store");
            return Ok(());
        }

        if self.version_attribute::<T>().is_some() {
            tracing::warn!(table = %table, "Batch store does not check record versions");
        }

        tracing::debug!(table = %table, count = staged.len(), "Batch storing items");
        self.backend.batch_put(&table, staged).await
    }

    /// Reads every record of the table.
    ///
    /// This scans the whole table and can be very expensive on large tables.
    pub async fn get_all<T: Record>(&self) -> Result<Vec<T>> {
        self.scan(&[]).await
    }

    /// Gets a record by hash key; `Ok(None)` when absent.
    ///
    /// On a table with a range key this returns the record with the lowest
    /// range key under the hash key.
    pub async fn get_item<T: Record>(&self, key: impl Into<KeyValue>) -> Result<Option<T>> {
        let table = T::table_name();
        let hash = KeyPart::new(T::HASH_KEY, key);
        let consistent_read = self.config.consistent_read;

        let item = match T::RANGE_KEY {
            None => {
                self.backend
                    .get_item(&table, &Key::from(hash), consistent_read)
                    .await?
            }
            Some(_) => {
                self.backend
                    .first_in_partition(&table, &hash, consistent_read)
                    .await?
            }
        };

        item.map(from_item).transpose()
    }

    /// Gets a record by its full hash and range key; `Ok(None)` when absent.
    pub async fn get_item_by_key<T: Record>(
        &self,
        hash: impl Into<KeyValue>,
        range: impl Into<KeyValue>,
    ) -> Result<Option<T>> {
        let table = T::table_name();
        let Some(range_key) = T::RANGE_KEY else {
            return Err(StoreError::InvalidRecord(format!("{table} has no range key")));
        };

        let key = Key::hash(T::HASH_KEY, hash).with_range(range_key, range);
        self.backend
            .get_item(&table, &key, self.config.consistent_read)
            .await?
            .map(from_item)
            .transpose()
    }

    /// Reads every record matching all conditions. No conditions reads the whole table.
    pub async fn scan<T: Record>(&self, conditions: &[ScanCondition]) -> Result<Vec<T>> {
        for condition in conditions {
            condition.validate()?;
        }

        let table = T::table_name();
        let items = self
            .backend
            .scan(&table, conditions, self.config.consistent_read)
            .await?;

        tracing::debug!(
            table = %table,
            conditions = conditions.len(),
            count = items.len(),
            "Scanned table"
        );
        items.into_iter().map(from_item).collect()
    }

    /// Replaces an existing record. Fails with `NotFound` if it does not exist.
    pub async fn update_item<T: Record>(&self, record: &T) -> Result<()> {
        self.put(record, Existence::Required).await
    }

    /// Deletes an existing record. Fails with `NotFound` if it does not exist.
    pub async fn delete_item<T: Record>(&self, record: &T) -> Result<()> {
        let item = to_item(record)?;
        let key = record_key::<T>(&item)?;

        let version = match self.version_attribute::<T>() {
            Some(attribute) => read_version(&item, attribute)?.map(|v| (attribute, v)),
            None => None,
        };

        let mut conditions = vec![WriteCondition::AttributeExists(T::HASH_KEY.to_string())];
        if let Some((attribute, current)) = version {
            conditions.push(WriteCondition::AttributeEquals {
                name: attribute.to_string(),
                value: AttributeValue::from(current),
            });
        }

        self.delete(&T::table_name(), &key, &conditions, version.is_some())
            .await
    }

    /// Deletes an existing record by key. Fails with `NotFound` if it does not exist.
    pub async fn delete_by_key<T: Record>(&self, key: &Key) -> Result<()> {
        let conditions = [WriteCondition::AttributeExists(key.hash.name.clone())];
        self.delete(&T::table_name(), key, &conditions, false).await
    }

    async fn delete(
        &self,
        table: &str,
        key: &Key,
        conditions: &[WriteCondition],
        versioned: bool,
    ) -> Result<()> {
        tracing::debug!(table, key = %key, "Deleting item");
        match self.backend.delete_item(table, key, conditions).await {
            Err(StoreError::ConditionFailed) => {
                Err(self.missing_or_conflict(table, key, versioned).await)
            }
            result => result,
        }
    }

    async fn put<T: Record>(&self, record: &T, existence: Existence) -> Result<()> {
        let table = T::table_name();
        let mut item = to_item(record)?;
        let key = record_key::<T>(&item)?;

        let mut conditions = Vec::new();
        if existence == Existence::Required {
            conditions.push(WriteCondition::AttributeExists(T::HASH_KEY.to_string()));
        }
        let versioned = self.stamp_version::<T>(&mut item, &mut conditions)?;

        tracing::debug!(table = %table, key = %key, "Putting item");
        match self.backend.put_item(&table, item, &conditions).await {
            Err(StoreError::ConditionFailed) => Err(match existence {
                Existence::Required => self.missing_or_conflict(&table, &key, versioned).await,
                Existence::Any => StoreError::VersionConflict {
                    table,
                    key: key.to_string(),
                },
            }),
            result => result,
        }
    }

    /// Adds the version precondition and writes the next version into the item.
    fn stamp_version<T: Record>(
        &self,
        item: &mut Item,
        conditions: &mut Vec<WriteCondition>,
    ) -> Result<bool> {
        let Some(attribute) = self.version_attribute::<T>() else {
            return Ok(false);
        };

        let current = read_version(item, attribute)?;
        conditions.push(match current {
            Some(version) => WriteCondition::AttributeEquals {
                name: attribute.to_string(),
                value: AttributeValue::from(version),
            },
            None => WriteCondition::AttributeNotExists(T::HASH_KEY.to_string()),
        });

        let next = current.map_or(0, |version| version.saturating_add(1));
        item.insert(attribute.to_string(), AttributeValue::from(next));
        Ok(true)
    }

    fn version_attribute<T: Record>(&self) -> Option<&'static str> {
        match self.config.version_check {
            VersionCheck::Enforce => T::VERSION_ATTRIBUTE,
            VersionCheck::Skip => None,
        }
    }

    /// Explains a failed existence precondition. With a version condition in
    /// play the record may exist with another version.
    async fn missing_or_conflict(&self, table: &str, key: &Key, versioned: bool) -> StoreError {
        if versioned {
            match self.backend.get_item(table, key, true).await {
                Ok(Some(_)) => {
                    return StoreError::VersionConflict {
                        table: table.to_string(),
                        key: key.to_string(),
                    }
                }
                Ok(None) => {}
                Err(err) => return err,
            }
        }

        StoreError::NotFound {
            table: table.to_string(),
            key: key.to_string(),
        }
    }
}

fn read_version(item: &Item, attribute: &str) -> Result<Option<u64>> {
    match item.get(attribute) {
        None | Some(AttributeValue::Null) => Ok(None),
        Some(AttributeValue::N(n)) => n.parse().map(Some).map_err(|_| {
            StoreError::InvalidRecord(format!(
                "version attribute `{attribute}` must be a non-negative integer, got {n}"
            ))
        }),
        Some(other) => Err(StoreError::InvalidRecord(format!(
            "version attribute `{attribute}` must be a number, got {}",
            other.type_name()
        ))),
    }
}
