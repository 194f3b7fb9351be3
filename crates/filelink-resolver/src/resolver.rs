//! Metadata resolution decision policy.

use std::sync::Arc;

use tracing::{debug, warn};

use filelink_core::{
    format_is_empty, size_is_empty, LinkValue, Probe, ProbeOutcome, ResolutionContext,
    ResolverSettings,
};

/// What the resolver did with one link value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionDecision {
    /// The HTTP kill switch is set; the value was left untouched.
    Skipped,
    /// Stored metadata is current; the value was left untouched.
    Unchanged,
    /// Metadata was cleared; the caller must enqueue a work item for the
    /// owning record.
    Deferred,
    /// The value was probed and its metadata written (possibly to the
    /// attempted-but-empty state).
    Resolved,
}

/// Decides, per link value, whether remote metadata needs re-resolution and
/// either probes inline or defers to the background worker.
///
/// Side effects are confined to the value being evaluated; enqueueing and
/// record I/O belong to the surrounding save lifecycle.
pub struct MetadataResolver {
    probe: Arc<dyn Probe>,
    settings: ResolverSettings,
}

impl MetadataResolver {
    pub fn new(probe: Arc<dyn Probe>, settings: ResolverSettings) -> Self {
        Self { probe, settings }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Evaluate one link value against its previously stored state.
    ///
    /// `previous` is the value at the same position in the unchanged
    /// original record, `None` when the owner is new or the position did
    /// not exist before. While `ctx` reports worker processing, deferral is
    /// suppressed and still-unset values resolve synchronously; that
    /// nested save is what performs the deferred probe.
    pub async fn resolve(
        &self,
        current: &mut LinkValue,
        previous: Option<&LinkValue>,
        is_new_owner: bool,
        ctx: &ResolutionContext,
    ) -> ResolutionDecision {
        if self.settings.disable_http_requests {
            debug!(uri = %current.uri, "http requests disabled, leaving metadata as-is");
            return ResolutionDecision::Skipped;
        }

        if !needs_resolution(current, previous, is_new_owner) {
            return ResolutionDecision::Unchanged;
        }

        if self.settings.deferred_request && !ctx.is_processing() {
            // The worker will re-save the record; until then the value
            // reads as never-resolved.
            current.clear_metadata();
            debug!(uri = %current.uri, "metadata resolution deferred");
            return ResolutionDecision::Deferred;
        }

        let outcome = self.probe.probe(&current.uri).await;
        apply_outcome(current, &outcome);
        ResolutionDecision::Resolved
    }
}

/// Whether a value needs re-resolution.
///
/// True for a new owner, a changed URI, or previously empty metadata; the
/// last case retries values left empty by an earlier failed attempt.
fn needs_resolution(current: &LinkValue, previous: Option<&LinkValue>, is_new_owner: bool) -> bool {
    if is_new_owner {
        return true;
    }
    match previous {
        None => true,
        Some(previous) => {
            current.uri != previous.uri
                || size_is_empty(previous.size)
                || format_is_empty(previous.format.as_deref())
        }
    }
}

/// Write a probe outcome into a link value.
fn apply_outcome(value: &mut LinkValue, outcome: &ProbeOutcome) {
    match outcome {
        ProbeOutcome::Response(response) if response.is_supported() => {
            value.size = Some(response.content_length.unwrap_or(0));
            value.format = response.format();
            debug!(
                uri = %value.uri,
                status = response.status,
                size = value.size,
                format = value.format.as_deref().unwrap_or(""),
                "metadata resolved"
            );
        }
        ProbeOutcome::Response(response) => {
            warn!(
                uri = %value.uri,
                status = response.status,
                "unsupported probe status, storing empty metadata"
            );
            value.size = Some(0);
            value.format = None;
        }
        ProbeOutcome::TransportError { message } => {
            warn!(uri = %value.uri, error = %message, "probe failed, storing empty metadata");
            value.size = Some(0);
            value.format = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filelink_core::ProbeResponse;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Probe double that returns a fixed outcome and counts calls.
    struct StaticProbe {
        outcome: ProbeOutcome,
        calls: AtomicUsize,
    }

    impl StaticProbe {
        fn new(outcome: ProbeOutcome) -> Self {
            Self {
                outcome,
                calls: AtomicUsize::new(0),
            }
        }

        fn ok(content_type: &str, content_length: Option<u64>) -> Self {
            Self::new(ProbeOutcome::Response(ProbeResponse {
                status: 200,
                content_type: Some(content_type.into()),
                content_length,
                fetched_full_body: false,
            }))
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl Probe for StaticProbe {
        async fn probe(&self, _uri: &str) -> ProbeOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn resolver(probe: Arc<StaticProbe>, settings: ResolverSettings) -> MetadataResolver {
        MetadataResolver::new(probe, settings)
    }

    #[tokio::test]
    async fn new_owner_resolves_inline() {
        let probe = Arc::new(StaticProbe::ok("text/plain; charset=utf-8", Some(27)));
        let resolver = resolver(probe.clone(), ResolverSettings::default());
        let ctx = ResolutionContext::new();

        let mut value = LinkValue::new("http://example.com/a.txt");
        let decision = resolver.resolve(&mut value, None, true, &ctx).await;

        assert_eq!(decision, ResolutionDecision::Resolved);
        assert_eq!(value.size, Some(27));
        assert_eq!(value.format.as_deref(), Some("text/plain"));
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn unchanged_value_is_not_probed() {
        let probe = Arc::new(StaticProbe::ok("text/plain", Some(27)));
        let resolver = resolver(probe.clone(), ResolverSettings::default());
        let ctx = ResolutionContext::new();

        let previous =
            LinkValue::with_metadata("http://example.com/a.txt", 27, Some("text/plain".into()));
        let mut current = previous.clone();

        // Twice, to pin down idempotence.
        for _ in 0..2 {
            let decision = resolver
                .resolve(&mut current, Some(&previous), false, &ctx)
                .await;
            assert_eq!(decision, ResolutionDecision::Unchanged);
        }
        assert_eq!(current, previous);
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test]
    async fn changed_uri_is_probed_again() {
        let probe = Arc::new(StaticProbe::ok("text/plain", Some(5)));
        let resolver = resolver(probe.clone(), ResolverSettings::default());
        let ctx = ResolutionContext::new();

        let previous =
            LinkValue::with_metadata("http://example.com/a.txt", 27, Some("text/plain".into()));
        let mut current = LinkValue::with_metadata(
            "http://example.com/b.txt",
            27,
            Some("text/plain".into()),
        );

        let decision = resolver
            .resolve(&mut current, Some(&previous), false, &ctx)
            .await;
        assert_eq!(decision, ResolutionDecision::Resolved);
        assert_eq!(current.size, Some(5));
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn empty_previous_metadata_is_retried() {
        // A prior failed attempt left size=0/format=None; the next save
        // tries again.
        let probe = Arc::new(StaticProbe::ok("text/plain", Some(27)));
        let resolver = resolver(probe.clone(), ResolverSettings::default());
        let ctx = ResolutionContext::new();

        let previous = LinkValue::with_metadata("http://example.com/a.txt", 0, None);
        let mut current = previous.clone();

        let decision = resolver
            .resolve(&mut current, Some(&previous), false, &ctx)
            .await;
        assert_eq!(decision, ResolutionDecision::Resolved);
        assert_eq!(current.size, Some(27));
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn deferred_mode_clears_metadata_without_probing() {
        let probe = Arc::new(StaticProbe::ok("text/plain", Some(27)));
        let resolver = resolver(
            probe.clone(),
            ResolverSettings::default().with_deferred(true),
        );
        let ctx = ResolutionContext::new();

        let mut value = LinkValue::with_metadata(
            "http://example.com/a.txt",
            99,
            Some("application/pdf".into()),
        );
        let decision = resolver.resolve(&mut value, None, true, &ctx).await;

        assert_eq!(decision, ResolutionDecision::Deferred);
        assert_eq!(value.size, None);
        assert_eq!(value.format, None);
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test]
    async fn worker_processing_suppresses_deferral() {
        let probe = Arc::new(StaticProbe::ok("text/plain; charset=utf-8", Some(27)));
        let resolver = resolver(
            probe.clone(),
            ResolverSettings::default().with_deferred(true),
        );
        let ctx = ResolutionContext::new();

        let _guard = ctx.enter_processing();
        let mut value = LinkValue::new("http://example.com/a.txt");
        let decision = resolver.resolve(&mut value, None, false, &ctx).await;

        assert_eq!(decision, ResolutionDecision::Resolved);
        assert_eq!(value.size, Some(27));
        assert_eq!(value.format.as_deref(), Some("text/plain"));
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn disable_switch_skips_everything() {
        let probe = Arc::new(StaticProbe::ok("text/plain", Some(27)));
        let resolver = resolver(
            probe.clone(),
            ResolverSettings::default()
                .with_deferred(true)
                .with_http_disabled(true),
        );
        let ctx = ResolutionContext::new();

        let mut value =
            LinkValue::with_metadata("http://example.com/a.txt", 99, Some("image/png".into()));
        let decision = resolver.resolve(&mut value, None, true, &ctx).await;

        assert_eq!(decision, ResolutionDecision::Skipped);
        // Metadata untouched, not even cleared.
        assert_eq!(value.size, Some(99));
        assert_eq!(value.format.as_deref(), Some("image/png"));
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test]
    async fn unsupported_status_stores_empty_metadata() {
        let probe = Arc::new(StaticProbe::new(ProbeOutcome::Response(ProbeResponse {
            status: 404,
            content_type: None,
            content_length: None,
            fetched_full_body: false,
        })));
        let resolver = resolver(probe.clone(), ResolverSettings::default());
        let ctx = ResolutionContext::new();

        let mut value = LinkValue::new("http://example.com/gone.txt");
        let decision = resolver.resolve(&mut value, None, true, &ctx).await;

        assert_eq!(decision, ResolutionDecision::Resolved);
        assert_eq!(value.size, Some(0));
        assert_eq!(value.format, None);
    }

    #[tokio::test]
    async fn transport_error_stores_empty_metadata() {
        let probe = Arc::new(StaticProbe::new(ProbeOutcome::TransportError {
            message: "dns failure".into(),
        }));
        let resolver = resolver(probe.clone(), ResolverSettings::default());
        let ctx = ResolutionContext::new();

        let mut value = LinkValue::new("http://nowhere.invalid/a.txt");
        let decision = resolver.resolve(&mut value, None, true, &ctx).await;

        assert_eq!(decision, ResolutionDecision::Resolved);
        assert_eq!(value.size, Some(0));
        assert_eq!(value.format, None);
    }

    #[tokio::test]
    async fn supported_without_length_stores_zero() {
        // The real probe always measures a length for supported responses;
        // a backend that cannot still yields a defined result.
        let probe = Arc::new(StaticProbe::ok("text/html", None));
        let resolver = resolver(probe.clone(), ResolverSettings::default());
        let ctx = ResolutionContext::new();

        let mut value = LinkValue::new("http://example.com/page");
        resolver.resolve(&mut value, None, true, &ctx).await;

        assert_eq!(value.size, Some(0));
        assert_eq!(value.format.as_deref(), Some("text/html"));
    }
}
