//! Local evaluation of scan conditions (the store's comparison rules).

use std::cmp::Ordering;

use crate::item::{compare_numbers, AttributeValue, Item};

use super::{ScanCondition, ScanOperator};

/// True when every condition holds. An empty slice matches everything.
pub fn matches_all(conditions: &[ScanCondition], item: &Item) -> bool {
    conditions.iter().all(|condition| condition.matches(item))
}

/// Equality with numeric comparison for numbers.
pub fn attributes_equal(a: &AttributeValue, b: &AttributeValue) -> bool {
    match (a, b) {
        (AttributeValue::N(x), AttributeValue::N(y)) => {
            compare_numbers(x, y).map_or(x == y, |ordering| ordering == Ordering::Equal)
        }
        _ => a == b,
    }
}

/// Ordering of two scalars of the same type. Mixed or non-scalar types do not compare.
pub fn compare_attributes(a: &AttributeValue, b: &AttributeValue) -> Option<Ordering> {
    match (a, b) {
        (AttributeValue::S(x), AttributeValue::S(y)) => Some(x.cmp(y)),
        (AttributeValue::N(x), AttributeValue::N(y)) => compare_numbers(x, y),
        _ => None,
    }
}

pub(super) fn matches(condition: &ScanCondition, item: &Item) -> bool {
    let values = &condition.values;
    if !condition.operator.accepts(values.len()) {
        return false;
    }

    let actual = item.get(&condition.attribute);
    match (condition.operator, actual) {
        (ScanOperator::IsNull, actual) => actual.is_none(),
        (ScanOperator::IsNotNull, actual) => actual.is_some(),
        (ScanOperator::NotContains, actual) => !actual.is_some_and(|a| contains(a, &values[0])),
        (_, None) => false,
        (ScanOperator::Equal, Some(a)) => attributes_equal(a, &values[0]),
        (ScanOperator::NotEqual, Some(a)) => !attributes_equal(a, &values[0]),
        (ScanOperator::LessThan, Some(a)) => ordered(a, &values[0], |o| o == Ordering::Less),
        (ScanOperator::LessThanOrEqual, Some(a)) => {
            ordered(a, &values[0], |o| o != Ordering::Greater)
        }
        (ScanOperator::GreaterThan, Some(a)) => ordered(a, &values[0], |o| o == Ordering::Greater),
        (ScanOperator::GreaterThanOrEqual, Some(a)) => {
            ordered(a, &values[0], |o| o != Ordering::Less)
        }
        (ScanOperator::Between, Some(a)) => {
            ordered(a, &values[0], |o| o != Ordering::Less)
                && ordered(a, &values[1], |o| o != Ordering::Greater)
        }
        (ScanOperator::BeginsWith, Some(a)) => match (a, &values[0]) {
            (AttributeValue::S(s), AttributeValue::S(prefix)) => s.starts_with(prefix.as_str()),
            _ => false,
        },
        (ScanOperator::In, Some(a)) => values.iter().any(|v| attributes_equal(a, v)),
        (ScanOperator::Contains, Some(a)) => contains(a, &values[0]),
    }
}

fn ordered(
    actual: &AttributeValue,
    bound: &AttributeValue,
    test: impl Fn(Ordering) -> bool,
) -> bool {
    compare_attributes(actual, bound).is_some_and(test)
}

fn contains(actual: &AttributeValue, needle: &AttributeValue) -> bool {
    match (actual, needle) {
        (AttributeValue::S(s), AttributeValue::S(sub)) => s.contains(sub.as_str()),
        (AttributeValue::L(values), needle) => values.iter().any(|v| attributes_equal(v, needle)),
        _ => false,
    }
}
