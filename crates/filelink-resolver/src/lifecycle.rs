//! Record save lifecycle for link-bearing records.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use filelink_core::{
    Document, LinkValue, MetadataUpdateItem, RecordStore, ResolutionContext, Result, WorkQueue,
};

use crate::resolver::{MetadataResolver, ResolutionDecision};

/// Drives the save path for records carrying link values.
///
/// Pre-persist, every link value of every translation is run through the
/// [`MetadataResolver`] against the unchanged original. Post-persist, one
/// work item per deferred language is enqueued, deduplicated through the
/// operation's [`ResolutionContext`]: a multi-valued field on one
/// record/revision/language yields exactly one item per save.
///
/// The lifecycle owns no dedup scope itself: callers hold one context per
/// top-level operation (the background worker starts a fresh scope per
/// work item).
pub struct SaveLifecycle {
    store: Arc<dyn RecordStore>,
    queue: Arc<dyn WorkQueue>,
    resolver: MetadataResolver,
    ctx: Arc<ResolutionContext>,
}

impl SaveLifecycle {
    pub fn new(
        store: Arc<dyn RecordStore>,
        queue: Arc<dyn WorkQueue>,
        resolver: MetadataResolver,
        ctx: Arc<ResolutionContext>,
    ) -> Self {
        Self {
            store,
            queue,
            resolver,
            ctx,
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn queue(&self) -> &Arc<dyn WorkQueue> {
        &self.queue
    }

    pub fn context(&self) -> &Arc<ResolutionContext> {
        &self.ctx
    }

    /// Save a record: resolve link metadata, persist, enqueue deferred work.
    ///
    /// Never advances the record's changed time; a metadata backfill is
    /// not a content change.
    pub async fn save(&self, doc: &mut Document) -> Result<()> {
        let original = if doc.is_new {
            None
        } else {
            self.store.load(doc.id).await?
        };
        let is_new = doc.is_new;

        let mut deferred_langs: Vec<String> = Vec::new();
        for langcode in doc.languages() {
            let previous_links: Vec<LinkValue> = original
                .as_ref()
                .and_then(|original| original.links_for(&langcode))
                .map(<[LinkValue]>::to_vec)
                .unwrap_or_default();

            let Some(values) = doc.links_for_mut(&langcode) else {
                continue;
            };

            let mut deferred = false;
            for (index, value) in values.iter_mut().enumerate() {
                let decision = self
                    .resolver
                    .resolve(value, previous_links.get(index), is_new, &self.ctx)
                    .await;
                if decision == ResolutionDecision::Deferred {
                    deferred = true;
                }
            }
            if deferred {
                deferred_langs.push(langcode);
            }
        }

        // Persist first: a work item needs the post-persist identity (the
        // revision id is only assigned here for new revisionable records).
        self.store.persist(doc).await?;

        if deferred_langs.is_empty() {
            return Ok(());
        }

        let enqueued_at = Utc::now();
        for langcode in deferred_langs {
            let item = MetadataUpdateItem::new(
                doc.doc_type.clone(),
                doc.id,
                langcode,
                doc.revision_id,
                enqueued_at,
            );
            let key = item.key();
            if self.ctx.mark_enqueued(&key) {
                debug!(item_key = %key, "deferred work item enqueued");
                self.queue.enqueue(item).await?;
            } else {
                debug!(item_key = %key, "work item already queued in this operation, skipping");
            }
        }
        Ok(())
    }
}
