//! Scan conditions.
//!
//! A scan takes a slice of conditions that must all hold. Conditions are
//! evaluated locally by the in-memory backend and rendered as a filter
//! expression for DynamoDB.

mod eval;
mod expression;

pub use eval::{attributes_equal, compare_attributes, matches_all};
pub use expression::{filter_expression, write_condition_expression, Expression};

use crate::item::{AttributeValue, Item};
use crate::storage::{Result, StoreError};

/// Comparison operator of a scan condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    BeginsWith,
    Between,
    In,
    Contains,
    NotContains,
    IsNull,
    IsNotNull,
}

impl ScanOperator {
    fn accepts(self, value_count: usize) -> bool {
        match self {
            Self::IsNull | Self::IsNotNull => value_count == 0,
            Self::Between => value_count == 2,
            Self::In => value_count >= 1,
            _ => value_count == 1,
        }
    }
}

/// A filter on one attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanCondition {
    pub attribute: String,
    pub operator: ScanOperator,
    pub values: Vec<AttributeValue>,
}

impl ScanCondition {
    pub fn new(
        attribute: impl Into<String>,
        operator: ScanOperator,
        values: Vec<AttributeValue>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            operator,
            values,
        }
    }

    fn single(
        attribute: impl Into<String>,
        operator: ScanOperator,
        value: impl Into<AttributeValue>,
    ) -> Self {
        Self::new(attribute, operator, vec![value.into()])
    }

    pub fn equal(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::single(attribute, ScanOperator::Equal, value)
    }

    pub fn not_equal(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::single(attribute, ScanOperator::NotEqual, value)
    }

    pub fn less_than(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::single(attribute, ScanOperator::LessThan, value)
    }

    pub fn less_than_or_equal(
        attribute: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        Self::single(attribute, ScanOperator::LessThanOrEqual, value)
    }

    pub fn greater_than(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::single(attribute, ScanOperator::GreaterThan, value)
    }

    pub fn greater_than_or_equal(
        attribute: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        Self::single(attribute, ScanOperator::GreaterThanOrEqual, value)
    }

    pub fn begins_with(attribute: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::single(attribute, ScanOperator::BeginsWith, prefix.into())
    }

    pub fn between(
        attribute: impl Into<String>,
        low: impl Into<AttributeValue>,
        high: impl Into<AttributeValue>,
    ) -> Self {
        Self::new(attribute, ScanOperator::Between, vec![low.into(), high.into()])
    }

    pub fn is_in<V: Into<AttributeValue>>(
        attribute: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::new(
            attribute,
            ScanOperator::In,
            values.into_iter().map(Into::into).collect(),
        )
    }

    pub fn contains(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::single(attribute, ScanOperator::Contains, value)
    }

    pub fn not_contains(attribute: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::single(attribute, ScanOperator::NotContains, value)
    }

    pub fn is_null(attribute: impl Into<String>) -> Self {
        Self::new(attribute, ScanOperator::IsNull, Vec::new())
    }

    pub fn is_not_null(attribute: impl Into<String>) -> Self {
        Self::new(attribute, ScanOperator::IsNotNull, Vec::new())
    }

    /// Checks the operator's arity and value types before a request is built.
    pub fn validate(&self) -> Result<()> {
        if self.attribute.is_empty() {
            return Err(StoreError::InvalidCondition(
                "attribute name must not be empty".to_string(),
            ));
        }

        if !self.operator.accepts(self.values.len()) {
            return Err(StoreError::InvalidCondition(format!(
                "{:?} on `{}` does not accept {} value(s)",
                self.operator,
                self.attribute,
                self.values.len()
            )));
        }

        if self.operator == ScanOperator::BeginsWith && self.values[0].as_s().is_none() {
            return Err(StoreError::InvalidCondition(format!(
                "BeginsWith on `{}` requires a string prefix",
                self.attribute
            )));
        }

        Ok(())
    }

    /// Evaluates the condition against an item.
    pub fn matches(&self, item: &Item) -> bool {
        eval::matches(self, item)
    }
}
