//! Typed create/put/scan/get/update/delete operations over a DynamoDB-style
//! table store.
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//! use tablestore::{ConnectionDescriptor, Record, ScanCondition, StorageFacade};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct Order {
//!     order_id: String,
//!     timestamp: i64,
//!     amount: u32,
//! }
//!
//! impl Record for Order {
//!     const HASH_KEY: &'static str = "OrderId";
//!     const RANGE_KEY: Option<&'static str> = Some("Timestamp");
//! }
//!
//! # async fn run() -> tablestore::Result<()> {
//! let store = StorageFacade::connect(ConnectionDescriptor::from_env()?).await?;
//! store.create_table::<Order>("OrderId", Some("Timestamp")).await?;
//!
//! let order = Order { order_id: "A1".into(), timestamp: 1_700_000_000, amount: 5 };
//! store.store(&order).await?;
//!
//! let large = store
//!     .scan::<Order>(&[ScanCondition::greater_than("Amount", 3)])
//!     .await?;
//! assert_eq!(large.len(), 1);
//!
//! store.delete_item(&order).await?;
//! # Ok(())
//! # }
//! ```

mod facade;
pub mod storage;
pub mod wait;

pub use facade::StorageFacade;
pub use tablestore_core::{
    AttributeValue, ConnectionDescriptor, FacadeConfig, Item, Key, KeyAttribute, KeyPart,
    KeyValue, ProvisionedThroughput, Record, Result, ScalarType, ScanCondition, ScanOperator,
    StoreError, TableBackend, TableSchema, TableStatus, TableWaitPolicy, VersionCheck,
    WriteCondition,
};

#[cfg(feature = "dynamodb")]
pub use storage::DynamoDbBackend;

#[cfg(feature = "inmemory")]
pub use storage::InMemoryBackend;
