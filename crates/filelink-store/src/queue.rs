//! In-memory work queue implementation.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use filelink_core::{ClaimedItem, Error, MetadataUpdateItem, Result, WorkQueue};

#[derive(Debug, Default)]
struct QueueInner {
    pending: VecDeque<(Uuid, MetadataUpdateItem)>,
    in_flight: HashMap<Uuid, MetadataUpdateItem>,
}

/// In-memory FIFO implementation of [`WorkQueue`].
///
/// Claimed items move to an in-flight map until acknowledged; released
/// items rejoin the back of the queue under the same delivery id, giving
/// at-least-once semantics.
#[derive(Debug, Default)]
pub struct MemoryQueue {
    inner: Mutex<QueueInner>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of claimed-but-unacknowledged deliveries.
    pub fn in_flight_count(&self) -> usize {
        self.inner
            .lock()
            .expect("queue lock poisoned")
            .in_flight
            .len()
    }
}

#[async_trait]
impl WorkQueue for MemoryQueue {
    async fn enqueue(&self, item: MetadataUpdateItem) -> Result<Uuid> {
        let delivery_id = Uuid::new_v4();
        let mut inner = self.inner.lock().expect("queue lock poisoned");
        debug!(item_key = %item.key(), %delivery_id, "work item enqueued");
        inner.pending.push_back((delivery_id, item));
        Ok(delivery_id)
    }

    async fn claim(&self) -> Result<Option<ClaimedItem>> {
        let mut inner = self.inner.lock().expect("queue lock poisoned");
        let Some((delivery_id, item)) = inner.pending.pop_front() else {
            return Ok(None);
        };
        inner.in_flight.insert(delivery_id, item.clone());
        Ok(Some(ClaimedItem { delivery_id, item }))
    }

    async fn ack(&self, delivery_id: Uuid) -> Result<()> {
        let mut inner = self.inner.lock().expect("queue lock poisoned");
        inner
            .in_flight
            .remove(&delivery_id)
            .map(|_| ())
            .ok_or_else(|| Error::Queue(format!("unknown delivery id: {delivery_id}")))
    }

    async fn release(&self, delivery_id: Uuid) -> Result<()> {
        let mut inner = self.inner.lock().expect("queue lock poisoned");
        let item = inner
            .in_flight
            .remove(&delivery_id)
            .ok_or_else(|| Error::Queue(format!("unknown delivery id: {delivery_id}")))?;
        debug!(item_key = %item.key(), %delivery_id, "work item released for redelivery");
        inner.pending.push_back((delivery_id, item));
        Ok(())
    }

    async fn pending_count(&self) -> Result<i64> {
        let inner = self.inner.lock().expect("queue lock poisoned");
        Ok(inner.pending.len() as i64)
    }
}
