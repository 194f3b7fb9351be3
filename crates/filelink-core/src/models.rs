//! Core data model for filelink.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// LINK VALUES
// =============================================================================

/// A URL-bearing field value augmented with resolved remote metadata.
///
/// `size` and `format` are `None` until a resolution attempt has run. A
/// failed attempt writes the explicit attempted-but-empty state
/// (`size = Some(0)`, `format = None`) so later saves retry it, while a
/// value that was never probed stays fully unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkValue {
    /// Target URI.
    pub uri: String,
    /// Content size in bytes, as reported by the remote server.
    pub size: Option<u64>,
    /// Content format (media type without parameters).
    pub format: Option<String>,
}

impl LinkValue {
    /// Create a new, unresolved link value.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            size: None,
            format: None,
        }
    }

    /// Create a link value with already-resolved metadata.
    pub fn with_metadata(uri: impl Into<String>, size: u64, format: Option<String>) -> Self {
        Self {
            uri: uri.into(),
            size: Some(size),
            format,
        }
    }

    /// Reset metadata to the unresolved state.
    pub fn clear_metadata(&mut self) {
        self.size = None;
        self.format = None;
    }

    /// Whether both metadata components carry usable values.
    ///
    /// A zero size or an empty format string counts as missing, so values
    /// left over from a failed attempt are re-resolved on the next save.
    pub fn has_metadata(&self) -> bool {
        !size_is_empty(self.size) && !format_is_empty(self.format.as_deref())
    }
}

/// Whether a stored size is usable ("empty" covers both unset and zero).
pub fn size_is_empty(size: Option<u64>) -> bool {
    matches!(size, None | Some(0))
}

/// Whether a stored format is usable ("empty" covers both unset and "").
pub fn format_is_empty(format: Option<&str>) -> bool {
    format.map_or(true, str::is_empty)
}

// =============================================================================
// PROBE OUTCOMES
// =============================================================================

/// Result of one remote metadata probe.
///
/// Transport failures are data, not control flow: a probe never returns an
/// `Err`, it reports what happened and lets the caller decide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The server answered; the status may still be unusable.
    Response(ProbeResponse),
    /// The request never completed (DNS, timeout, connection refused).
    TransportError { message: String },
}

impl ProbeOutcome {
    /// Whether the outcome carries usable metadata.
    pub fn is_supported(&self) -> bool {
        match self {
            ProbeOutcome::Response(response) => response.is_supported(),
            ProbeOutcome::TransportError { .. } => false,
        }
    }
}

/// Response metadata from a remote probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    /// Final HTTP status after redirect handling.
    pub status: u16,
    /// Raw `Content-Type` header, parameters included.
    pub content_type: Option<String>,
    /// Parsed `Content-Length` header, or the measured body length when the
    /// probe had to fall back to a full fetch.
    pub content_length: Option<u64>,
    /// True when the size was measured by fetching the full body.
    pub fetched_full_body: bool,
}

impl ProbeResponse {
    /// Statuses the field type accepts as carrying usable metadata.
    ///
    /// 301/302 appear when the redirect policy stops a chain (for example on
    /// a protocol downgrade) and the redirect response itself is reported.
    pub fn is_supported(&self) -> bool {
        matches!(self.status, 200 | 301 | 302)
    }

    /// Content format with parameters stripped.
    ///
    /// `text/html; charset=UTF-8` resolves to `text/html`. An absent or
    /// empty header resolves to `None`.
    pub fn format(&self) -> Option<String> {
        let raw = self.content_type.as_deref()?;
        let format = raw.split(';').next().unwrap_or("").trim();
        if format.is_empty() {
            None
        } else {
            Some(format.to_string())
        }
    }
}

// =============================================================================
// WORK ITEMS
// =============================================================================

/// A unit of deferred metadata-resolution work.
///
/// Identifies which record/revision/language needs re-resolution. Items are
/// immutable once created; the queue serializes the four identity fields
/// plus the enqueue timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataUpdateItem {
    /// Owning record type.
    pub record_type: String,
    /// Owning record id.
    pub record_id: i64,
    /// Language the deferred values belong to.
    pub langcode: String,
    /// Exact revision to reload, when the record type is revisionable.
    pub revision_id: Option<i64>,
    /// When the item was enqueued; the worker's staleness guard compares
    /// this against the record's changed time.
    pub enqueued_at: DateTime<Utc>,
}

impl MetadataUpdateItem {
    /// Create a new work item.
    pub fn new(
        record_type: impl Into<String>,
        record_id: i64,
        langcode: impl Into<String>,
        revision_id: Option<i64>,
        enqueued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            record_type: record_type.into(),
            record_id,
            langcode: langcode.into(),
            revision_id,
            enqueued_at,
        }
    }

    /// Deduplication key for this item.
    ///
    /// Components are `:`-delimited so that adjacent numeric fields cannot
    /// run together (id=1/rev=23 must never equal id=12/rev=3). An absent
    /// revision id contributes an empty trailing component.
    pub fn key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.record_type,
            self.record_id,
            self.langcode,
            self.revision_id.map(|r| r.to_string()).unwrap_or_default()
        )
    }
}

/// A work item claimed from the queue, paired with its delivery handle.
///
/// The delivery id acknowledges or releases this particular delivery; the
/// item itself may be delivered more than once.
#[derive(Debug, Clone)]
pub struct ClaimedItem {
    pub delivery_id: Uuid,
    pub item: MetadataUpdateItem,
}

// =============================================================================
// RECORDS
// =============================================================================

/// Minimal owning record carrying link values.
///
/// The real record storage engine is an external collaborator; this is the
/// shape the in-memory store persists and the save lifecycle operates on.
/// Link values are held per language: the default language in `links`,
/// other translations in `translations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Record type (the first work-item key component).
    pub doc_type: String,
    /// Record id, unique within the record space.
    pub id: i64,
    /// Current revision id, assigned by the store for revisionable records.
    pub revision_id: Option<i64>,
    /// Default language code.
    pub langcode: String,
    /// Link values in the default language.
    pub links: Vec<LinkValue>,
    /// Link values of other translations, keyed by language code.
    pub translations: BTreeMap<String, Vec<LinkValue>>,
    /// Last content change, when the record type tracks one.
    pub changed_at: Option<DateTime<Utc>>,
    /// Whether persisting may create new revisions.
    pub revisionable: bool,
    /// True until the record has been persisted once.
    #[serde(skip)]
    pub is_new: bool,
    /// Whether the next persist creates a new revision (revisionable
    /// records only). The worker clears this before a metadata backfill.
    #[serde(skip, default = "default_new_revision")]
    pub new_revision: bool,
}

fn default_new_revision() -> bool {
    true
}

impl Document {
    /// Create a new, not-yet-persisted record.
    pub fn new(doc_type: impl Into<String>, id: i64, langcode: impl Into<String>) -> Self {
        Self {
            doc_type: doc_type.into(),
            id,
            revision_id: None,
            langcode: langcode.into(),
            links: Vec::new(),
            translations: BTreeMap::new(),
            changed_at: None,
            revisionable: false,
            is_new: true,
            new_revision: true,
        }
    }

    /// Create a record in the not-specified language.
    pub fn untranslated(doc_type: impl Into<String>, id: i64) -> Self {
        Self::new(doc_type, id, crate::defaults::LANGCODE_NOT_SPECIFIED)
    }

    /// Enable revisioning for this record.
    pub fn revisionable(mut self) -> Self {
        self.revisionable = true;
        self
    }

    /// Whether the record carries values in the given language.
    pub fn has_translation(&self, langcode: &str) -> bool {
        langcode == self.langcode || self.translations.contains_key(langcode)
    }

    /// Add or replace a translation's link values.
    pub fn set_translation(&mut self, langcode: impl Into<String>, links: Vec<LinkValue>) {
        self.translations.insert(langcode.into(), links);
    }

    /// All languages the record carries values in, default language first.
    pub fn languages(&self) -> Vec<String> {
        let mut languages = vec![self.langcode.clone()];
        languages.extend(self.translations.keys().cloned());
        languages
    }

    /// Link values for one language.
    pub fn links_for(&self, langcode: &str) -> Option<&[LinkValue]> {
        if langcode == self.langcode {
            Some(&self.links)
        } else {
            self.translations.get(langcode).map(Vec::as_slice)
        }
    }

    /// Mutable link values for one language.
    pub fn links_for_mut(&mut self, langcode: &str) -> Option<&mut Vec<LinkValue>> {
        if langcode == self.langcode {
            Some(&mut self.links)
        } else {
            self.translations.get_mut(langcode)
        }
    }

    /// Control whether the next persist creates a new revision.
    pub fn set_new_revision(&mut self, new_revision: bool) {
        self.new_revision = new_revision;
    }

    /// Record a content change now.
    ///
    /// The save lifecycle never advances `changed_at` on its own: a
    /// metadata backfill must not look like a content change.
    pub fn touch(&mut self) {
        self.changed_at = Some(Utc::now());
    }
}
