//! Waiting for a new table to become active.

use tablestore_core::{Result, StoreError, TableBackend, TableStatus, TableWaitPolicy};
use tokio::time::{sleep, Instant};

/// Polls the table status until it reports `Active`.
///
/// The poll interval starts at `initial_interval` and grows by `multiplier`
/// up to `max_interval`. Gives up with `TableActivationTimeout` once `timeout`
/// has elapsed. A table that is not visible yet counts as still creating.
/// Dropping the future cancels the wait.
pub async fn wait_for_table_active<B>(
    backend: &B,
    table: &str,
    policy: &TableWaitPolicy,
) -> Result<()>
where
    B: TableBackend + ?Sized,
{
    let started = Instant::now();
    let mut interval = policy.initial_interval;

    loop {
        let status = backend.describe_table(table).await?;
        if status == Some(TableStatus::Active) {
            return Ok(());
        }

        let waited = started.elapsed();
        if waited >= policy.timeout {
            tracing::warn!(table, ?waited, "Table did not become active in time");
            return Err(StoreError::TableActivationTimeout {
                table: table.to_string(),
                waited,
            });
        }

        tracing::debug!(table, ?status, ?interval, "Waiting for table to become active");
        sleep(interval.min(policy.timeout - waited)).await;
        interval = policy.next_interval(interval);
    }
}
