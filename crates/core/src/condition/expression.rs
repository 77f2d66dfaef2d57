//! Rendering of conditions as DynamoDB expressions.
//!
//! Attribute names always go through `#` placeholders so that reserved words
//! (`Timestamp`, `Status`, ...) never reach the expression text.

use std::collections::BTreeMap;

use crate::item::AttributeValue;
use crate::storage::{Result, WriteCondition};

use super::{ScanCondition, ScanOperator};

/// An expression with its placeholder maps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expression {
    pub expression: String,
    pub names: BTreeMap<String, String>,
    pub values: BTreeMap<String, AttributeValue>,
}

impl Expression {
    fn name(&mut self, placeholder: String, attribute: &str) -> String {
        self.names.insert(placeholder.clone(), attribute.to_string());
        placeholder
    }

    fn value(&mut self, placeholder: String, value: &AttributeValue) -> String {
        self.values.insert(placeholder.clone(), value.clone());
        placeholder
    }
}

/// Builds the filter expression for a scan. `None` when there are no conditions.
pub fn filter_expression(conditions: &[ScanCondition]) -> Result<Option<Expression>> {
    if conditions.is_empty() {
        return Ok(None);
    }

    let mut expr = Expression::default();
    let mut clauses = Vec::with_capacity(conditions.len());

    for (i, condition) in conditions.iter().enumerate() {
        condition.validate()?;

        let name = expr.name(format!("#f{i}"), &condition.attribute);
        let mut values = Vec::with_capacity(condition.values.len());
        for (j, value) in condition.values.iter().enumerate() {
            values.push(expr.value(format!(":f{i}_{j}"), value));
        }

        let clause = match condition.operator {
            ScanOperator::Equal => format!("{name} = {}", values[0]),
            ScanOperator::NotEqual => format!("{name} <> {}", values[0]),
            ScanOperator::LessThan => format!("{name} < {}", values[0]),
            ScanOperator::LessThanOrEqual => format!("{name} <= {}", values[0]),
            ScanOperator::GreaterThan => format!("{name} > {}", values[0]),
            ScanOperator::GreaterThanOrEqual => format!("{name} >= {}", values[0]),
            ScanOperator::BeginsWith => format!("begins_with({name}, {})", values[0]),
            ScanOperator::Between => format!("{name} BETWEEN {} AND {}", values[0], values[1]),
            ScanOperator::In => format!("{name} IN ({})", values.join(", ")),
            ScanOperator::Contains => format!("contains({name}, {})", values[0]),
            ScanOperator::NotContains => format!("NOT contains({name}, {})", values[0]),
            ScanOperator::IsNull => format!("attribute_not_exists({name})"),
            ScanOperator::IsNotNull => format!("attribute_exists({name})"),
        };
        clauses.push(clause);
    }

    expr.expression = clauses.join(" AND ");
    Ok(Some(expr))
}

/// Builds the condition expression for a put or delete. `None` when unconditional.
pub fn write_condition_expression(conditions: &[WriteCondition]) -> Option<Expression> {
    if conditions.is_empty() {
        return None;
    }

    let mut expr = Expression::default();
    let clauses: Vec<String> = conditions
        .iter()
        .enumerate()
        .map(|(i, condition)| match condition {
            WriteCondition::AttributeExists(attribute) => {
                let name = expr.name(format!("#w{i}"), attribute);
                format!("attribute_exists({name})")
            }
            WriteCondition::AttributeNotExists(attribute) => {
                let name = expr.name(format!("#w{i}"), attribute);
                format!("attribute_not_exists({name})")
            }
            WriteCondition::AttributeEquals { name, value } => {
                let name = expr.name(format!("#w{i}"), name);
                let value = expr.value(format!(":w{i}"), value);
                format!("{name} = {value}")
            }
        })
        .collect();

    expr.expression = clauses.join(" AND ");
    Some(expr)
}
