//! Background worker draining deferred metadata-update items.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use filelink_core::{MetadataUpdateItem, RecordStore, Result, WorkQueue};
use filelink_resolver::SaveLifecycle;

/// Configuration for the metadata-update worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Whether to process items at all.
    pub enabled: bool,
    /// Wall-clock budget for one drain in seconds.
    pub time_budget_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            time_budget_secs: filelink_core::defaults::WORKER_TIME_BUDGET_SECS,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `FILELINK_WORKER_ENABLED` | `true` | Enable/disable item processing |
    /// | `FILELINK_WORKER_TIME_BUDGET_SECS` | `60` | Per-drain time budget |
    pub fn from_env() -> Self {
        let enabled = std::env::var("FILELINK_WORKER_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let time_budget_secs = std::env::var("FILELINK_WORKER_TIME_BUDGET_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(filelink_core::defaults::WORKER_TIME_BUDGET_SECS);

        Self {
            enabled,
            time_budget_secs,
        }
    }

    /// Set the per-drain time budget.
    pub fn with_time_budget(mut self, secs: u64) -> Self {
        self.time_budget_secs = secs;
        self
    }

    /// Enable or disable item processing.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Why a work item was consumed without writing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The owning record was deleted after the item was enqueued.
    RecordMissing,
    /// A newer save superseded the item; the fresher data wins.
    Stale,
}

/// Outcome of processing one work item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// The record was re-saved with freshly resolved metadata.
    Completed,
    /// The item was consumed without touching any record.
    Dropped(DropReason),
}

/// Event emitted by the worker.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// An item was claimed and is being processed.
    ItemStarted { key: String },
    /// An item completed successfully.
    ItemCompleted { key: String },
    /// An item was consumed without writing anything.
    ItemDropped { key: String, reason: DropReason },
    /// An item failed and was released for redelivery.
    ItemFailed { key: String, error: String },
    /// A drain pass started.
    DrainStarted,
    /// A drain pass finished.
    DrainStopped { processed: usize },
}

/// Counters for one drain pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrainSummary {
    pub processed: usize,
    pub dropped: usize,
    pub failed: usize,
}

/// Worker that consumes deferred metadata-update items.
///
/// Processing an item re-runs the record's normal save path with the
/// operation context marked as processing, so the re-entered resolver
/// probes still-unset values synchronously instead of deferring again.
/// Consumption is idempotent: re-running an item against an already
/// resolved record changes nothing.
pub struct MetadataUpdateWorker {
    lifecycle: Arc<SaveLifecycle>,
    config: WorkerConfig,
    event_tx: broadcast::Sender<WorkerEvent>,
}

impl MetadataUpdateWorker {
    /// Create a new worker on top of a save lifecycle.
    pub fn new(lifecycle: Arc<SaveLifecycle>, config: WorkerConfig) -> Self {
        let (event_tx, _) = broadcast::channel(filelink_core::defaults::EVENT_BUS_CAPACITY);
        Self {
            lifecycle,
            config,
            event_tx,
        }
    }

    /// Get a receiver for worker events.
    pub fn events(&self) -> broadcast::Receiver<WorkerEvent> {
        self.event_tx.subscribe()
    }

    /// Process one work item.
    ///
    /// Safe to re-run: missing records and superseded items are consumed
    /// silently, and a repeated run against an already resolved record is
    /// a no-op save.
    pub async fn process_item(&self, item: &MetadataUpdateItem) -> Result<ItemOutcome> {
        let store = self.lifecycle.store();

        let record = match item.revision_id {
            Some(revision_id) => store.load_revision(revision_id).await?,
            None => store.load(item.record_id).await?,
        };
        let Some(mut record) = record else {
            debug!(
                record_type = %item.record_type,
                record_id = item.record_id,
                "record gone since enqueue, dropping work item"
            );
            return Ok(ItemOutcome::Dropped(DropReason::RecordMissing));
        };

        if !record.has_translation(&item.langcode) {
            // The save path below resolves every surviving translation.
            debug!(
                record_id = item.record_id,
                langcode = %item.langcode,
                "translation gone since enqueue"
            );
        }

        if record.revisionable {
            // A metadata backfill is not semantically a new version.
            record.set_new_revision(false);
        }

        if let Some(changed_at) = record.changed_at {
            if changed_at > item.enqueued_at {
                debug!(
                    record_id = item.record_id,
                    langcode = %item.langcode,
                    "superseded by a newer save, dropping work item"
                );
                return Ok(ItemOutcome::Dropped(DropReason::Stale));
            }
        }

        // Mark processing for the duration of the nested save; the guard
        // releases on every exit path, including the error return below.
        let ctx = self.lifecycle.context().clone();
        let _guard = ctx.enter_processing();
        self.lifecycle.save(&mut record).await?;

        Ok(ItemOutcome::Completed)
    }

    /// Drain the queue: claim, process, and acknowledge items until the
    /// queue is empty or the time budget is exhausted.
    ///
    /// Failed items are released for redelivery and not retried within the
    /// same pass.
    pub async fn drain(&self) -> Result<DrainSummary> {
        let mut summary = DrainSummary::default();
        if !self.config.enabled {
            info!("metadata-update worker is disabled, skipping drain");
            return Ok(summary);
        }

        let started = Instant::now();
        let budget = Duration::from_secs(self.config.time_budget_secs);
        let queue = self.lifecycle.queue().clone();
        let mut released: HashSet<Uuid> = HashSet::new();

        let _ = self.event_tx.send(WorkerEvent::DrainStarted);

        while started.elapsed() < budget {
            let Some(claimed) = queue.claim().await? else {
                break;
            };
            if released.contains(&claimed.delivery_id) {
                // Already failed in this pass; redelivery belongs to a
                // later invocation.
                queue.release(claimed.delivery_id).await?;
                break;
            }

            let key = claimed.item.key();
            let _ = self.event_tx.send(WorkerEvent::ItemStarted { key: key.clone() });

            // Each item is its own operation scope for enqueue dedup.
            self.lifecycle.context().reset_enqueued();

            match self.process_item(&claimed.item).await {
                Ok(ItemOutcome::Completed) => {
                    queue.ack(claimed.delivery_id).await?;
                    summary.processed += 1;
                    let _ = self.event_tx.send(WorkerEvent::ItemCompleted { key });
                }
                Ok(ItemOutcome::Dropped(reason)) => {
                    queue.ack(claimed.delivery_id).await?;
                    summary.dropped += 1;
                    let _ = self.event_tx.send(WorkerEvent::ItemDropped { key, reason });
                }
                Err(error) => {
                    warn!(
                        item_key = %key,
                        error = %error,
                        "work item failed, releasing for redelivery"
                    );
                    queue.release(claimed.delivery_id).await?;
                    released.insert(claimed.delivery_id);
                    summary.failed += 1;
                    let _ = self.event_tx.send(WorkerEvent::ItemFailed {
                        key,
                        error: error.to_string(),
                    });
                }
            }
        }

        info!(
            processed = summary.processed,
            dropped = summary.dropped,
            failed = summary.failed,
            duration_ms = started.elapsed().as_millis() as u64,
            "queue drain finished"
        );
        let _ = self.event_tx.send(WorkerEvent::DrainStopped {
            processed: summary.processed,
        });
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_config_default() {
        let config = WorkerConfig::default();
        assert!(config.enabled);
        assert_eq!(config.time_budget_secs, 60);
    }

    #[test]
    fn test_worker_config_builder() {
        let config = WorkerConfig::default()
            .with_time_budget(5)
            .with_enabled(false);
        assert_eq!(config.time_budget_secs, 5);
        assert!(!config.enabled);
    }

    #[test]
    fn test_worker_config_chaining_order_independence() {
        let config1 = WorkerConfig::default().with_enabled(false).with_time_budget(10);
        let config2 = WorkerConfig::default().with_time_budget(10).with_enabled(false);
        assert_eq!(config1.enabled, config2.enabled);
        assert_eq!(config1.time_budget_secs, config2.time_budget_secs);
    }

    #[test]
    fn test_drain_summary_default() {
        let summary = DrainSummary::default();
        assert_eq!(summary.processed, 0);
        assert_eq!(summary.dropped, 0);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn test_worker_event_clone_and_debug() {
        let event = WorkerEvent::ItemDropped {
            key: "article:1:en:".to_string(),
            reason: DropReason::Stale,
        };
        let cloned = event.clone();
        let debug_str = format!("{:?}", cloned);
        assert!(debug_str.contains("ItemDropped"));
        assert!(debug_str.contains("Stale"));
    }

    #[test]
    fn test_drop_reason_equality() {
        assert_eq!(DropReason::Stale, DropReason::Stale);
        assert_ne!(DropReason::Stale, DropReason::RecordMissing);
        assert!(matches!(
            ItemOutcome::Dropped(DropReason::RecordMissing),
            ItemOutcome::Dropped(_)
        ));
    }
}
