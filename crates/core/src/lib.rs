//! Pure types for the table store facade: the attribute model, the `Record`
//! mapping, scan conditions, table schemas, configuration, errors and the
//! backend trait. Nothing in this crate performs I/O.

pub mod condition;
pub mod config;
pub mod item;
pub mod record;
pub mod schema;
pub mod storage;

pub use condition::{ScanCondition, ScanOperator};
pub use config::{ConnectionDescriptor, FacadeConfig, TableWaitPolicy, VersionCheck};
pub use item::{AttributeValue, Item, KeyValue};
pub use record::Record;
pub use schema::{KeyAttribute, ProvisionedThroughput, ScalarType, TableSchema, TableStatus};
pub use storage::{Key, KeyPart, Result, StoreError, TableBackend, WriteCondition};
