//! Per-operation resolution state shared between the resolver and worker.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Shared state for one resolution operation.
///
/// Carries the enqueue-deduplication set and the worker re-entrancy counter
/// as an explicit object instead of module-level statics, so concurrent
/// tests and embedders can scope them independently.
///
/// The dedup set lives for one top-level operation: callers either build a
/// fresh context per operation or call [`reset_enqueued`]. The processing
/// counter spans nested saves within one worker item and must reach zero
/// again on every exit path, which [`enter_processing`]'s RAII guard
/// guarantees.
///
/// [`reset_enqueued`]: ResolutionContext::reset_enqueued
/// [`enter_processing`]: ResolutionContext::enter_processing
#[derive(Debug, Default)]
pub struct ResolutionContext {
    enqueued: Mutex<HashSet<String>>,
    processing: AtomicUsize,
}

impl ResolutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a work-item key as enqueued.
    ///
    /// Returns `false` when the key was already present, in which case the
    /// caller must not enqueue another item for it.
    pub fn mark_enqueued(&self, key: &str) -> bool {
        self.enqueued
            .lock()
            .expect("dedup set lock poisoned")
            .insert(key.to_string())
    }

    /// Whether a key has been enqueued in this operation.
    pub fn is_enqueued(&self, key: &str) -> bool {
        self.enqueued
            .lock()
            .expect("dedup set lock poisoned")
            .contains(key)
    }

    /// Clear the dedup set, starting a new operation scope.
    pub fn reset_enqueued(&self) {
        self.enqueued
            .lock()
            .expect("dedup set lock poisoned")
            .clear();
    }

    /// Whether a worker is currently re-saving a record through this
    /// context. The resolver must not defer while this holds.
    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::SeqCst) > 0
    }

    /// Mark worker processing as active for the lifetime of the returned
    /// guard. Nests; the counter is decremented when each guard drops,
    /// including on error and panic paths.
    pub fn enter_processing(&self) -> ProcessingGuard<'_> {
        self.processing.fetch_add(1, Ordering::SeqCst);
        ProcessingGuard { context: self }
    }
}

/// RAII handle for the worker-is-processing counter.
#[derive(Debug)]
pub struct ProcessingGuard<'a> {
    context: &'a ResolutionContext,
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.context.processing.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_enqueued_dedups() {
        let ctx = ResolutionContext::new();
        assert!(ctx.mark_enqueued("node:1:en:"));
        assert!(!ctx.mark_enqueued("node:1:en:"));
        assert!(ctx.is_enqueued("node:1:en:"));
        assert!(!ctx.is_enqueued("node:2:en:"));
    }

    #[test]
    fn reset_starts_a_new_scope() {
        let ctx = ResolutionContext::new();
        ctx.mark_enqueued("node:1:en:");
        ctx.reset_enqueued();
        assert!(!ctx.is_enqueued("node:1:en:"));
        assert!(ctx.mark_enqueued("node:1:en:"));
    }

    #[test]
    fn processing_guard_releases_on_drop() {
        let ctx = ResolutionContext::new();
        assert!(!ctx.is_processing());
        {
            let _guard = ctx.enter_processing();
            assert!(ctx.is_processing());
        }
        assert!(!ctx.is_processing());
    }

    #[test]
    fn processing_guard_nests() {
        let ctx = ResolutionContext::new();
        let outer = ctx.enter_processing();
        {
            let _inner = ctx.enter_processing();
            assert!(ctx.is_processing());
        }
        // Still processing until the outer guard is gone.
        assert!(ctx.is_processing());
        drop(outer);
        assert!(!ctx.is_processing());
    }

    #[test]
    fn processing_guard_releases_on_panic() {
        let ctx = ResolutionContext::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = ctx.enter_processing();
            panic!("save failed");
        }));
        assert!(result.is_err());
        assert!(!ctx.is_processing());
    }
}
