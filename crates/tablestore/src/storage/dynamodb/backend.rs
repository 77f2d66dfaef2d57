//! DynamoDB backend implementation.
//!
//! Implements `TableBackend` from `tablestore_core` using DynamoDB.

use async_trait::async_trait;
use aws_sdk_dynamodb::operation::batch_write_item::BatchWriteItemOutput;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, KeySchemaElement, KeyType, ProvisionedThroughput as SdkThroughput,
    PutRequest, ScalarAttributeType, WriteRequest,
};
use aws_sdk_dynamodb::Client;
use tablestore_core::condition::{filter_expression, write_condition_expression};
use tablestore_core::{
    ConnectionDescriptor, Item, Key, KeyAttribute, KeyPart, Result, ScalarType, ScanCondition,
    StoreError, TableBackend, TableSchema, TableStatus, WriteCondition,
};

use super::client::create_client;
use super::conversions::{
    expression_maps, item_from_sdk, item_to_sdk, key_to_sdk, key_value_to_sdk,
    table_status_from_sdk,
};
use super::error::{
    map_batch_write_error, map_build_error, map_create_table_error, map_delete_item_error,
    map_describe_table_error, map_get_item_error, map_put_item_error, map_query_error,
    map_scan_error,
};

/// Maximum number of put requests DynamoDB accepts in one BatchWriteItem call.
pub const MAX_BATCH_WRITE_ITEMS: usize = 25;

/// DynamoDB-based backend.
///
/// The SDK client is internally pooled and safe to share between tasks.
#[derive(Debug, Clone)]
pub struct DynamoDbBackend {
    client: Client,
}

impl DynamoDbBackend {
    /// Creates a backend around an existing DynamoDB client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a backend bound to the descriptor's endpoint.
    pub async fn connect(descriptor: &ConnectionDescriptor) -> Self {
        tracing::debug!(target_env = %descriptor.target_display(), "Creating DynamoDB client");
        Self::new(create_client(descriptor).await)
    }

    /// Get the underlying SDK client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

fn key_schema_element(name: &str, key_type: KeyType) -> Result<KeySchemaElement> {
    KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()
        .map_err(map_build_error)
}

fn attribute_definition(key: &KeyAttribute) -> Result<AttributeDefinition> {
    AttributeDefinition::builder()
        .attribute_name(&key.name)
        .attribute_type(to_scalar_type(key.scalar_type))
        .build()
        .map_err(map_build_error)
}

fn to_scalar_type(scalar_type: ScalarType) -> ScalarAttributeType {
    match scalar_type {
        ScalarType::String => ScalarAttributeType::S,
        ScalarType::Number => ScalarAttributeType::N,
    }
}

/// Splits write requests into groups BatchWriteItem accepts, keeping their order.
fn plan_batches<T>(requests: Vec<T>) -> Vec<Vec<T>> {
    let mut batches = Vec::with_capacity(requests.len().div_ceil(MAX_BATCH_WRITE_ITEMS));
    let mut requests = requests.into_iter().peekable();
    while requests.peek().is_some() {
        batches.push(requests.by_ref().take(MAX_BATCH_WRITE_ITEMS).collect());
    }
    batches
}

fn unprocessed_in(output: &BatchWriteItemOutput, table: &str) -> usize {
    output
        .unprocessed_items
        .as_ref()
        .and_then(|pending| pending.get(table))
        .map_or(0, Vec::len)
}

fn check_unprocessed(table: &str, count: usize) -> Result<()> {
    if count > 0 {
        return Err(StoreError::UnprocessedItems {
            table: table.to_string(),
            count,
        });
    }
    Ok(())
}

#[async_trait]
impl TableBackend for DynamoDbBackend {
    async fn create_table(&self, schema: &TableSchema) -> Result<()> {
        let mut key_schema = vec![key_schema_element(&schema.hash_key.name, KeyType::Hash)?];
        let mut attribute_definitions = vec![attribute_definition(&schema.hash_key)?];

        if let Some(range) = &schema.range_key {
            key_schema.push(key_schema_element(&range.name, KeyType::Range)?);
            attribute_definitions.push(attribute_definition(range)?);
        }

        let throughput = SdkThroughput::builder()
            .read_capacity_units(schema.throughput.read_capacity_units)
            .write_capacity_units(schema.throughput.write_capacity_units)
            .build()
            .map_err(map_build_error)?;

        self.client
            .create_table()
            .table_name(&schema.table_name)
            .set_key_schema(Some(key_schema))
            .set_attribute_definitions(Some(attribute_definitions))
            .provisioned_throughput(throughput)
            .send()
            .await
            .map_err(|e| map_create_table_error(e, &schema.table_name))?;

        Ok(())
    }

    async fn describe_table(&self, table: &str) -> Result<Option<TableStatus>> {
        match self.client.describe_table().table_name(table).send().await {
            Ok(output) => Ok(output
                .table()
                .and_then(|description| description.table_status())
                .map(table_status_from_sdk)),
            Err(err) => match err.into_service_error() {
                DescribeTableError::ResourceNotFoundException(_) => Ok(None),
                err => Err(map_describe_table_error(err, table)),
            },
        }
    }

    async fn put_item(&self, table: &str, item: Item, conditions: &[WriteCondition]) -> Result<()> {
        let mut request = self
            .client
            .put_item()
            .table_name(table)
            .set_item(Some(item_to_sdk(item)));

        if let Some(expr) = write_condition_expression(conditions) {
            let (expression, names, values) = expression_maps(expr);
            request = request
                .condition_expression(expression)
                .set_expression_attribute_names(Some(names))
                .set_expression_attribute_values(values);
        }

        request
            .send()
            .await
            .map_err(|e| map_put_item_error(e, table))?;

        Ok(())
    }

    async fn batch_put(&self, table: &str, items: Vec<Item>) -> Result<()> {
        let requests = items
            .into_iter()
            .map(|item| {
                let put = PutRequest::builder()
                    .set_item(Some(item_to_sdk(item)))
                    .build()
                    .map_err(map_build_error)?;
                Ok(WriteRequest::builder().put_request(put).build())
            })
            .collect::<Result<Vec<_>>>()?;

        let mut unprocessed = 0;
        for batch in plan_batches(requests) {
            let output = self
                .client
                .batch_write_item()
                .request_items(table, batch)
                .send()
                .await
                .map_err(|e| map_batch_write_error(e, table))?;

            unprocessed += unprocessed_in(&output, table);
        }

        check_unprocessed(table, unprocessed)
    }

    async fn get_item(
        &self,
        table: &str,
        key: &Key,
        consistent_read: bool,
    ) -> Result<Option<Item>> {
        let result = self
            .client
            .get_item()
            .table_name(table)
            .set_key(Some(key_to_sdk(key)))
            .consistent_read(consistent_read)
            .send()
            .await
            .map_err(|e| map_get_item_error(e, table))?;

        result.item.map(item_from_sdk).transpose()
    }

    async fn first_in_partition(
        &self,
        table: &str,
        hash: &KeyPart,
        consistent_read: bool,
    ) -> Result<Option<Item>> {
        let result = self
            .client
            .query()
            .table_name(table)
            .key_condition_expression("#pk = :pk")
            .expression_attribute_names("#pk", &hash.name)
            .expression_attribute_values(":pk", key_value_to_sdk(&hash.value))
            .scan_index_forward(true)
            .consistent_read(consistent_read)
            .limit(1)
            .send()
            .await
            .map_err(|e| map_query_error(e, table))?;

        result
            .items
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(item_from_sdk)
            .transpose()
    }

    async fn scan(
        &self,
        table: &str,
        conditions: &[ScanCondition],
        consistent_read: bool,
    ) -> Result<Vec<Item>> {
        let mut request = self
            .client
            .scan()
            .table_name(table)
            .consistent_read(consistent_read);

        if let Some(expr) = filter_expression(conditions)? {
            let (expression, names, values) = expression_maps(expr);
            request = request
                .filter_expression(expression)
                .set_expression_attribute_names(Some(names))
                .set_expression_attribute_values(values);
        }

        let mut pages = request.into_paginator().send();
        let mut items = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| map_scan_error(e, table))?;
            for item in page.items.unwrap_or_default() {
                items.push(item_from_sdk(item)?);
            }
        }

        Ok(items)
    }

    async fn delete_item(
        &self,
        table: &str,
        key: &Key,
        conditions: &[WriteCondition],
    ) -> Result<()> {
        let mut request = self
            .client
            .delete_item()
            .table_name(table)
            .set_key(Some(key_to_sdk(key)));

        if let Some(expr) = write_condition_expression(conditions) {
            let (expression, names, values) = expression_maps(expr);
            request = request
                .condition_expression(expression)
                .set_expression_attribute_names(Some(names))
                .set_expression_attribute_values(values);
        }

        request
            .send()
            .await
            .map_err(|e| map_delete_item_error(e, table))?;

        Ok(())
    }
}
