//! Trait definitions for filelink's external collaborators.
//!
//! The record store and the deferred work queue are external systems; these
//! traits pin down the minimal contract the resolver and worker rely on.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{ClaimedItem, Document, MetadataUpdateItem, ProbeOutcome};
use crate::Result;

// =============================================================================
// PROBE
// =============================================================================

/// Remote metadata probe.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Check a URI and report what the remote server says about it.
    ///
    /// Infallible by contract: transport failures come back as
    /// [`ProbeOutcome::TransportError`], not as errors.
    async fn probe(&self, uri: &str) -> ProbeOutcome;
}

// =============================================================================
// RECORD STORE
// =============================================================================

/// Storage for owning records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load the latest persisted state of a record.
    async fn load(&self, id: i64) -> Result<Option<Document>>;

    /// Load one exact revision of a record.
    async fn load_revision(&self, revision_id: i64) -> Result<Option<Document>>;

    /// Write a record. Assigns a revision id according to the record's
    /// `revisionable`/`new_revision` flags and clears `is_new`.
    async fn persist(&self, doc: &mut Document) -> Result<()>;

    /// Remove a record and its revisions.
    async fn delete(&self, id: i64) -> Result<()>;
}

// =============================================================================
// WORK QUEUE
// =============================================================================

/// Deferred work queue with at-least-once delivery.
///
/// A claimed item stays invisible until it is either acknowledged (consumed)
/// or released (made claimable again). Consumers must therefore be
/// idempotent.
#[async_trait]
pub trait WorkQueue: Send + Sync {
    /// Append an item; returns its delivery id.
    async fn enqueue(&self, item: MetadataUpdateItem) -> Result<Uuid>;

    /// Claim the next item for processing, if any.
    async fn claim(&self) -> Result<Option<ClaimedItem>>;

    /// Acknowledge a delivery as consumed.
    async fn ack(&self, delivery_id: Uuid) -> Result<()>;

    /// Return a claimed delivery to the queue for redelivery.
    async fn release(&self, delivery_id: Uuid) -> Result<()>;

    /// Number of claimable items.
    async fn pending_count(&self) -> Result<i64>;
}
