//! Storage backend implementations.
//!
//! This module provides concrete implementations of the `TableBackend` trait
//! defined in `tablestore_core::storage`. The implementations are selected
//! at compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `dynamodb` (default): AWS DynamoDB backend using `aws-sdk-dynamodb`
//! - `inmemory` (default): in-memory backend for tests and local development
//!
//! Both can be enabled at the same time; the facade is generic over the backend.

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbBackend;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryBackend;
