//! In-memory record store implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use filelink_core::{Document, Error, RecordStore, Result};

#[derive(Debug, Default)]
struct RecordsInner {
    /// Latest persisted state per record id.
    records: HashMap<i64, Document>,
    /// Revision snapshots by revision id.
    revisions: HashMap<i64, Document>,
    /// Persist calls per record id.
    persist_counts: HashMap<i64, usize>,
    next_revision_id: i64,
}

/// In-memory implementation of [`RecordStore`].
///
/// Revision ids are assigned from a store-wide monotonic counter when a
/// revisionable record is persisted as new or with `new_revision` set;
/// persisting with `new_revision` cleared overwrites the current revision
/// snapshot in place.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    inner: Mutex<RecordsInner>,
    /// Remaining persist calls to fail, for save-failure injection.
    fail_persists: AtomicUsize,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` persist calls fail with a store error.
    pub fn fail_next_persists(&self, count: usize) {
        self.fail_persists.store(count, Ordering::SeqCst);
    }

    /// How many times a record has been persisted.
    pub fn persist_count(&self, id: i64) -> usize {
        self.inner
            .lock()
            .expect("record store lock poisoned")
            .persist_counts
            .get(&id)
            .copied()
            .unwrap_or(0)
    }
}

/// Normalize a stored snapshot into a loadable record.
fn loaded(mut doc: Document) -> Document {
    doc.is_new = false;
    doc.new_revision = true;
    doc
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn load(&self, id: i64) -> Result<Option<Document>> {
        let inner = self.inner.lock().expect("record store lock poisoned");
        Ok(inner.records.get(&id).cloned().map(loaded))
    }

    async fn load_revision(&self, revision_id: i64) -> Result<Option<Document>> {
        let inner = self.inner.lock().expect("record store lock poisoned");
        Ok(inner.revisions.get(&revision_id).cloned().map(loaded))
    }

    async fn persist(&self, doc: &mut Document) -> Result<()> {
        if self
            .fail_persists
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(Error::Store("injected persist failure".into()));
        }

        let mut inner = self.inner.lock().expect("record store lock poisoned");

        if doc.revisionable && (doc.is_new || doc.new_revision || doc.revision_id.is_none()) {
            inner.next_revision_id += 1;
            doc.revision_id = Some(inner.next_revision_id);
        }
        doc.is_new = false;

        if let Some(revision_id) = doc.revision_id {
            inner.revisions.insert(revision_id, doc.clone());
        }
        inner.records.insert(doc.id, doc.clone());
        *inner.persist_counts.entry(doc.id).or_default() += 1;

        debug!(
            record_type = %doc.doc_type,
            record_id = doc.id,
            revision_id = ?doc.revision_id,
            "record persisted"
        );
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut inner = self.inner.lock().expect("record store lock poisoned");
        if inner.records.remove(&id).is_none() {
            return Err(Error::RecordNotFound(id));
        }
        inner.revisions.retain(|_, doc| doc.id != id);
        Ok(())
    }
}
