use std::fmt;

use crate::condition::attributes_equal;
use crate::item::{AttributeValue, Item, KeyValue};

/// One named key attribute.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPart {
    pub name: String,
    pub value: KeyValue,
}

impl KeyPart {
    pub fn new(name: impl Into<String>, value: impl Into<KeyValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The primary key of an item: a hash key and an optional range key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key {
    pub hash: KeyPart,
    pub range: Option<KeyPart>,
}

impl Key {
    /// Creates a hash-only key.
    pub fn hash(name: impl Into<String>, value: impl Into<KeyValue>) -> Self {
        Self {
            hash: KeyPart::new(name, value),
            range: None,
        }
    }

    /// Adds a range key.
    pub fn with_range(mut self, name: impl Into<String>, value: impl Into<KeyValue>) -> Self {
        self.range = Some(KeyPart::new(name, value));
        self
    }

    /// The key attributes as an item.
    pub fn to_item(&self) -> Item {
        let mut item = Item::new();
        item.insert(
            self.hash.name.clone(),
            AttributeValue::from(self.hash.value.clone()),
        );
        if let Some(range) = &self.range {
            item.insert(range.name.clone(), AttributeValue::from(range.value.clone()));
        }
        item
    }
}

impl From<KeyPart> for Key {
    fn from(hash: KeyPart) -> Self {
        Self { hash, range: None }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.hash.name, self.hash.value)?;
        if let Some(range) = &self.range {
            write!(f, ", {}={}", range.name, range.value)?;
        }
        Ok(())
    }
}

/// A precondition on a single-item write, evaluated against the stored item.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteCondition {
    /// The stored item has the attribute. On a key attribute this means "the item exists".
    AttributeExists(String),
    /// The stored item lacks the attribute, or there is no stored item.
    AttributeNotExists(String),
    /// The stored item has the attribute with this value.
    AttributeEquals { name: String, value: AttributeValue },
}

impl WriteCondition {
    /// Evaluates the condition against the currently stored item, if any.
    pub fn holds(&self, stored: Option<&Item>) -> bool {
        match self {
            Self::AttributeExists(name) => stored.is_some_and(|item| item.contains_key(name)),
            Self::AttributeNotExists(name) => !stored.is_some_and(|item| item.contains_key(name)),
            Self::AttributeEquals { name, value } => stored
                .and_then(|item| item.get(name))
                .is_some_and(|stored| attributes_equal(stored, value)),
        }
    }
}
