//! Facade behavior against the in-memory backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tablestore::{
    AttributeValue, FacadeConfig, InMemoryBackend, Key, KeyAttribute, Record, ScanCondition,
    ScanOperator, StorageFacade, StoreError, TableSchema, TableWaitPolicy, VersionCheck,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Order {
    order_id: String,
    timestamp: i64,
    amount: u32,
}

impl Record for Order {
    const HASH_KEY: &'static str = "OrderId";
    const RANGE_KEY: Option<&'static str> = Some("Timestamp");
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Customer {
    id: String,
    name: String,
    email: Option<String>,
}

impl Record for Customer {
    const HASH_KEY: &'static str = "Id";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Counter {
    id: i64,
    hits: u32,
}

impl Record for Counter {
    const HASH_KEY: &'static str = "Id";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Document {
    id: String,
    body: String,
    version: Option<u64>,
}

impl Record for Document {
    const HASH_KEY: &'static str = "Id";
    const VERSION_ATTRIBUTE: Option<&'static str> = Some("Version");
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Reading {
    id: String,
    at: f64,
    value: f64,
}

impl Record for Reading {
    const HASH_KEY: &'static str = "Id";
    const RANGE_KEY: Option<&'static str> = Some("At");
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn fast_wait(timeout: Duration) -> TableWaitPolicy {
    TableWaitPolicy {
        initial_interval: Duration::from_millis(1),
        max_interval: Duration::from_millis(4),
        multiplier: 2,
        timeout,
    }
}

fn customer(id: &str, name: &str) -> Customer {
    Customer {
        id: id.to_string(),
        name: name.to_string(),
        email: None,
    }
}

fn order(id: &str, timestamp: i64, amount: u32) -> Order {
    Order {
        order_id: id.to_string(),
        timestamp,
        amount,
    }
}

async fn facade_with(config: FacadeConfig) -> StorageFacade<InMemoryBackend> {
    init_tracing();
    let facade = StorageFacade::with_backend(InMemoryBackend::new(), config);
    facade
        .create_table::<Customer>("Id", None)
        .await
        .expect("Failed to create Customer table");
    facade
        .create_table::<Order>("OrderId", Some("Timestamp"))
        .await
        .expect("Failed to create Order table");
    facade
        .create_table::<Document>("Id", None)
        .await
        .expect("Failed to create Document table");
    facade
        .create_table_from_schema(&TableSchema::new("Counter", KeyAttribute::number("Id")))
        .await
        .expect("Failed to create Counter table");
    facade
}

async fn facade() -> StorageFacade<InMemoryBackend> {
    facade_with(FacadeConfig::default()).await
}

#[tokio::test]
async fn test_store_then_get_returns_equal_record() {
    let facade = facade().await;
    let mut record = customer("c1", "Ada");
    record.email = Some("ada@example.com".to_string());

    facade.store(&record).await.unwrap();

    let fetched = facade.get_item::<Customer>("c1").await.unwrap();
    assert_eq!(fetched, Some(record));
}

#[tokio::test]
async fn test_store_replaces_existing_record() {
    let facade = facade().await;
    facade.store(&customer("c1", "Ada")).await.unwrap();
    facade.store(&customer("c1", "Grace")).await.unwrap();

    let all = facade.get_all::<Customer>().await.unwrap();
    assert_eq!(all, vec![customer("c1", "Grace")]);
}

#[tokio::test]
async fn test_get_missing_record_returns_none() {
    let facade = facade().await;

    assert_eq!(facade.get_item::<Customer>("nope").await.unwrap(), None);
    assert_eq!(facade.get_item::<Order>("nope").await.unwrap(), None);
}

#[tokio::test]
async fn test_get_item_by_integer_key() {
    let facade = facade().await;
    facade.store(&Counter { id: 42, hits: 7 }).await.unwrap();

    let fetched = facade.get_item::<Counter>(42).await.unwrap();
    assert_eq!(fetched, Some(Counter { id: 42, hits: 7 }));
    assert_eq!(facade.get_item::<Counter>(43).await.unwrap(), None);
}

#[tokio::test]
async fn test_get_item_on_range_table_returns_lowest_range_key() {
    let facade = facade().await;
    facade
        .batch_store(&[order("A1", 30, 1), order("A1", 10, 2), order("B2", 5, 3)])
        .await
        .unwrap();

    let first = facade.get_item::<Order>("A1").await.unwrap();
    assert_eq!(first, Some(order("A1", 10, 2)));

    let exact = facade.get_item_by_key::<Order>("A1", 30).await.unwrap();
    assert_eq!(exact, Some(order("A1", 30, 1)));

    let missing = facade.get_item_by_key::<Order>("A1", 20).await.unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn test_fractional_range_key_round_trips() {
    let facade = facade().await;
    facade
        .create_table::<Reading>("Id", Some("At"))
        .await
        .unwrap();
    let whole = Reading {
        id: "r".to_string(),
        at: 5.0,
        value: 1.5,
    };
    let half = Reading {
        id: "r".to_string(),
        at: 2.5,
        value: 3.0,
    };
    facade.batch_store(&[whole.clone(), half.clone()]).await.unwrap();

    let by_integer = facade.get_item_by_key::<Reading>("r", 5).await.unwrap();
    assert_eq!(by_integer, Some(whole));

    let first = facade.get_item::<Reading>("r").await.unwrap();
    assert_eq!(first, Some(half));
}

#[tokio::test]
async fn test_store_rejects_non_finite_numbers() {
    let facade = facade().await;
    facade
        .create_table::<Reading>("Id", Some("At"))
        .await
        .unwrap();
    let broken = Reading {
        id: "r".to_string(),
        at: 1.0,
        value: f64::NAN,
    };

    let err = facade.store(&broken).await.unwrap_err();

    assert!(matches!(err, StoreError::InvalidRecord(_)));
    assert_eq!(facade.backend().item_count("Reading").await, Some(0));
}

#[tokio::test]
async fn test_get_item_by_key_requires_range_key() {
    let facade = facade().await;

    let err = facade
        .get_item_by_key::<Customer>("c1", 1)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        StoreError::InvalidRecord("Customer has no range key".to_string())
    );
}

#[tokio::test]
async fn test_update_missing_record_fails_and_creates_nothing() {
    let facade = facade().await;

    let err = facade.update_item(&customer("c1", "Ada")).await.unwrap_err();

    assert_eq!(
        err,
        StoreError::NotFound {
            table: "Customer".to_string(),
            key: "Id=c1".to_string(),
        }
    );
    assert_eq!(facade.get_item::<Customer>("c1").await.unwrap(), None);
}

#[tokio::test]
async fn test_update_existing_record_replaces_it() {
    let facade = facade().await;
    facade.store(&customer("c1", "Ada")).await.unwrap();

    facade.update_item(&customer("c1", "Grace")).await.unwrap();

    let fetched = facade.get_item::<Customer>("c1").await.unwrap();
    assert_eq!(fetched, Some(customer("c1", "Grace")));
}

#[tokio::test]
async fn test_delete_missing_record_fails() {
    let facade = facade().await;

    let err = facade.delete_item(&customer("c1", "Ada")).await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(facade.backend().item_count("Customer").await, Some(0));
}

#[tokio::test]
async fn test_delete_by_key() {
    let facade = facade().await;
    facade.store(&order("A1", 10, 2)).await.unwrap();
    let key = Key::hash("OrderId", "A1").with_range("Timestamp", 10);

    facade.delete_by_key::<Order>(&key).await.unwrap();

    assert_eq!(facade.get_item::<Order>("A1").await.unwrap(), None);
    let err = facade.delete_by_key::<Order>(&key).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::NotFound {
            table: "Order".to_string(),
            key: "OrderId=A1, Timestamp=10".to_string(),
        }
    );
}

#[tokio::test]
async fn test_batch_store_is_visible_to_get_all() {
    let facade = facade().await;
    facade.store(&customer("c0", "Existing")).await.unwrap();

    let batch: Vec<Customer> = (1..=60)
        .map(|i| customer(&format!("c{i:02}"), "Batch"))
        .collect();
    facade.batch_store(&batch).await.unwrap();

    let all = facade.get_all::<Customer>().await.unwrap();
    assert_eq!(all.len(), 61);
    for record in &batch {
        assert!(all.contains(record), "missing {record:?}");
    }
}

#[tokio::test]
async fn test_batch_store_empty_sends_nothing() {
    let facade = facade().await;

    facade.batch_store::<Customer, _>([]).await.unwrap();

    assert_eq!(facade.backend().item_count("Customer").await, Some(0));
}

#[tokio::test]
async fn test_scan_is_a_conjunction() {
    let facade = facade().await;
    facade
        .batch_store(&[
            order("A1", 1, 2),
            order("A2", 2, 5),
            order("B1", 3, 8),
            order("A3", 4, 12),
        ])
        .await
        .unwrap();

    let found = facade
        .scan::<Order>(&[
            ScanCondition::begins_with("OrderId", "A"),
            ScanCondition::between("Amount", 3, 10),
        ])
        .await
        .unwrap();
    assert_eq!(found, vec![order("A2", 2, 5)]);

    let none = facade
        .scan::<Order>(&[
            ScanCondition::equal("OrderId", "B1"),
            ScanCondition::less_than("Amount", 8),
        ])
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_scan_without_conditions_matches_get_all() {
    let facade = facade().await;
    facade
        .batch_store(&[customer("c2", "Grace"), customer("c1", "Ada")])
        .await
        .unwrap();

    let scanned = facade.scan::<Customer>(&[]).await.unwrap();
    let all = facade.get_all::<Customer>().await.unwrap();

    assert_eq!(scanned, all);
    assert_eq!(scanned.len(), 2);
}

#[tokio::test]
async fn test_scan_for_absent_attribute() {
    let facade = facade().await;
    let mut with_email = customer("c1", "Ada");
    with_email.email = Some("ada@example.com".to_string());
    facade
        .batch_store(&[with_email.clone(), customer("c2", "Grace")])
        .await
        .unwrap();

    let without = facade
        .scan::<Customer>(&[ScanCondition::is_null("Email")])
        .await
        .unwrap();
    assert_eq!(without, vec![customer("c2", "Grace")]);

    let with = facade
        .scan::<Customer>(&[ScanCondition::is_not_null("Email")])
        .await
        .unwrap();
    assert_eq!(with, vec![with_email]);
}

#[tokio::test]
async fn test_scan_rejects_malformed_condition() {
    let facade = facade().await;

    let err = facade
        .scan::<Order>(&[ScanCondition::new(
            "Amount",
            ScanOperator::Between,
            vec![AttributeValue::from(1_i64)],
        )])
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::InvalidCondition(_)));
}

#[tokio::test]
async fn test_operations_on_missing_table() {
    init_tracing();
    let facade = StorageFacade::with_backend(InMemoryBackend::new(), FacadeConfig::default());

    let err = facade.store(&customer("c1", "Ada")).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::TableNotFound {
            table: "Customer".to_string()
        }
    );
    assert!(matches!(
        facade.get_all::<Customer>().await,
        Err(StoreError::TableNotFound { .. })
    ));
}

#[tokio::test]
async fn test_create_table_waits_for_activation() {
    init_tracing();
    let config = FacadeConfig::default().with_table_wait(fast_wait(Duration::from_secs(5)));
    let facade =
        StorageFacade::with_backend(InMemoryBackend::new().with_activation_polls(3), config);

    facade
        .create_table::<Customer>("Id", None)
        .await
        .unwrap();
    facade.store(&customer("c1", "Ada")).await.unwrap();

    assert_eq!(
        facade.get_item::<Customer>("c1").await.unwrap(),
        Some(customer("c1", "Ada"))
    );
}

#[tokio::test]
async fn test_create_table_times_out() {
    init_tracing();
    let config = FacadeConfig::default().with_table_wait(fast_wait(Duration::from_millis(20)));
    let facade = StorageFacade::with_backend(
        InMemoryBackend::new().with_activation_polls(usize::MAX),
        config,
    );

    let err = facade
        .create_table::<Customer>("Id", None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::TableActivationTimeout { ref table, .. } if table == "Customer"
    ));
}

#[tokio::test]
async fn test_create_existing_table_fails() {
    let facade = facade().await;

    let err = facade
        .create_table::<Customer>("Id", None)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        StoreError::TableAlreadyExists {
            table: "Customer".to_string()
        }
    );
}

#[tokio::test]
async fn test_create_table_rejects_keys_the_record_does_not_declare() {
    init_tracing();
    let facade = StorageFacade::with_backend(InMemoryBackend::new(), FacadeConfig::default());

    let without_range = facade
        .create_table::<Order>("OrderId", None)
        .await
        .unwrap_err();
    assert_eq!(
        without_range,
        StoreError::InvalidRecord(
            "Order is keyed by (OrderId, Timestamp), not (OrderId)".to_string()
        )
    );

    let renamed = facade
        .create_table::<Order>("Id", Some("Ts"))
        .await
        .unwrap_err();
    assert!(matches!(renamed, StoreError::InvalidRecord(_)));

    assert_eq!(facade.backend().item_count("Order").await, None);

    facade
        .create_table::<Order>("OrderId", Some("Timestamp"))
        .await
        .unwrap();
    facade
        .batch_store(&[order("A1", 1, 5), order("A1", 2, 6)])
        .await
        .unwrap();
    assert_eq!(facade.get_all::<Order>().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_order_lifecycle() {
    init_tracing();
    let facade = StorageFacade::with_backend(InMemoryBackend::new(), FacadeConfig::default());
    facade
        .create_table::<Order>("OrderId", Some("Timestamp"))
        .await
        .unwrap();

    let placed = order("A1", 1_700_000_000, 5);
    facade.store(&placed).await.unwrap();

    assert_eq!(
        facade.get_item::<Order>("A1").await.unwrap(),
        Some(placed.clone())
    );
    assert_eq!(
        facade
            .scan::<Order>(&[ScanCondition::greater_than("Amount", 3)])
            .await
            .unwrap(),
        vec![placed.clone()]
    );

    facade.delete_item(&placed).await.unwrap();
    assert_eq!(facade.get_item::<Order>("A1").await.unwrap(), None);

    let err = facade.delete_item(&placed).await.unwrap_err();
    assert_eq!(
        err,
        StoreError::NotFound {
            table: "Order".to_string(),
            key: "OrderId=A1, Timestamp=1700000000".to_string(),
        }
    );
}

#[tokio::test]
async fn test_last_writer_wins_without_version_checks() {
    let facade = facade().await;
    let draft = Document {
        id: "d1".to_string(),
        body: "draft".to_string(),
        version: None,
    };
    facade.store(&draft).await.unwrap();

    let stale = Document {
        body: "stale".to_string(),
        ..draft.clone()
    };
    facade.update_item(&stale).await.unwrap();

    let fetched = facade.get_item::<Document>("d1").await.unwrap();
    assert_eq!(fetched, Some(stale));
}

#[tokio::test]
async fn test_enforced_versions_reject_stale_writes() {
    let facade =
        facade_with(FacadeConfig::default().with_version_check(VersionCheck::Enforce)).await;
    let draft = Document {
        id: "d1".to_string(),
        body: "draft".to_string(),
        version: None,
    };
    facade.store(&draft).await.unwrap();

    let first = facade.get_item::<Document>("d1").await.unwrap().unwrap();
    assert_eq!(first.version, Some(0));

    let edited = Document {
        body: "edited".to_string(),
        ..first.clone()
    };
    facade.update_item(&edited).await.unwrap();
    let second = facade.get_item::<Document>("d1").await.unwrap().unwrap();
    assert_eq!(second.version, Some(1));
    assert_eq!(second.body, "edited");

    let conflict = StoreError::VersionConflict {
        table: "Document".to_string(),
        key: "Id=d1".to_string(),
    };
    assert_eq!(facade.update_item(&first).await.unwrap_err(), conflict);
    assert_eq!(facade.store(&draft).await.unwrap_err(), conflict);
    assert_eq!(facade.delete_item(&first).await.unwrap_err(), conflict);

    facade.delete_item(&second).await.unwrap();
    assert!(facade.delete_item(&second).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_enforced_update_of_missing_record_is_not_found() {
    let facade =
        facade_with(FacadeConfig::default().with_version_check(VersionCheck::Enforce)).await;
    let ghost = Document {
        id: "ghost".to_string(),
        body: "boo".to_string(),
        version: Some(3),
    };

    let err = facade.update_item(&ghost).await.unwrap_err();

    assert!(err.is_not_found());
}
