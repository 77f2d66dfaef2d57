//! Table schema types (pure data).

use crate::record::Record;
use crate::storage::{Result, StoreError};

/// Scalar type of a key attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarType {
    String,
    Number,
}

/// A key attribute definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    pub name: String,
    pub scalar_type: ScalarType,
}

impl KeyAttribute {
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scalar_type: ScalarType::String,
        }
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scalar_type: ScalarType::Number,
        }
    }
}

/// Provisioned read/write capacity units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProvisionedThroughput {
    pub read_capacity_units: i64,
    pub write_capacity_units: i64,
}

impl Default for ProvisionedThroughput {
    /// The minimal allocation: one read and one write capacity unit.
    fn default() -> Self {
        Self {
            read_capacity_units: 1,
            write_capacity_units: 1,
        }
    }
}

/// Table schema configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub table_name: String,
    pub hash_key: KeyAttribute,
    pub range_key: Option<KeyAttribute>,
    pub throughput: ProvisionedThroughput,
}

impl TableSchema {
    pub fn new(table_name: impl Into<String>, hash_key: KeyAttribute) -> Self {
        Self {
            table_name: table_name.into(),
            hash_key,
            range_key: None,
            throughput: ProvisionedThroughput::default(),
        }
    }

    /// Schema for a record type: string hash key, numeric range key.
    ///
    /// The key names must be the ones the record declares, otherwise every
    /// later write would address the table with the wrong key.
    pub fn for_record<T: Record>(primary_key: &str, range_key: Option<&str>) -> Result<Self> {
        if primary_key != T::HASH_KEY || range_key != T::RANGE_KEY {
            return Err(StoreError::InvalidRecord(format!(
                "{} is keyed by {}, not {}",
                T::table_name(),
                key_names(T::HASH_KEY, T::RANGE_KEY),
                key_names(primary_key, range_key)
            )));
        }

        let schema = Self::new(T::table_name(), KeyAttribute::string(primary_key));
        Ok(match range_key {
            Some(range_key) => schema.with_range_key(KeyAttribute::number(range_key)),
            None => schema,
        })
    }

    pub fn with_range_key(mut self, range_key: KeyAttribute) -> Self {
        self.range_key = Some(range_key);
        self
    }

    pub fn with_throughput(mut self, throughput: ProvisionedThroughput) -> Self {
        self.throughput = throughput;
        self
    }
}

fn key_names(hash: &str, range: Option<&str>) -> String {
    match range {
        Some(range) => format!("({hash}, {range})"),
        None => format!("({hash})"),
    }
}

/// Table status as reported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Active,
    Creating,
    Updating,
    Deleting,
    Other(String),
}
