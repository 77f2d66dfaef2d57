//! DynamoDB storage backend implementation.
//!
//! This module provides a DynamoDB-based implementation of the backend trait
//! using `aws-sdk-dynamodb`.

mod backend;
mod client;
mod conversions;
mod error;

pub use backend::{DynamoDbBackend, MAX_BATCH_WRITE_ITEMS};
pub use client::create_client;
