//! Test fixtures for resolver and worker tests.
//!
//! Always compiled so integration tests in dependent crates can use the
//! scripted probe without feature gymnastics.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use filelink_core::{Probe, ProbeOutcome, ProbeResponse};

/// Scripted probe with per-URI request counters.
///
/// Plays the role of a counting HTTP middleware: tests script an outcome
/// per URI and assert afterwards how often each target was actually hit.
/// Unscripted URIs answer 404.
#[derive(Debug, Default)]
pub struct FixtureProbe {
    outcomes: Mutex<HashMap<String, ProbeOutcome>>,
    requests: Mutex<HashMap<String, usize>>,
}

impl FixtureProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the outcome for one URI.
    pub fn set_outcome(&self, uri: impl Into<String>, outcome: ProbeOutcome) {
        self.outcomes
            .lock()
            .expect("fixture outcomes lock poisoned")
            .insert(uri.into(), outcome);
    }

    /// How many times a URI has been probed.
    pub fn request_count(&self, uri: &str) -> usize {
        self.requests
            .lock()
            .expect("fixture requests lock poisoned")
            .get(uri)
            .copied()
            .unwrap_or(0)
    }

    /// Total probes across all URIs.
    pub fn total_requests(&self) -> usize {
        self.requests
            .lock()
            .expect("fixture requests lock poisoned")
            .values()
            .sum()
    }
}

/// Canned 200 outcome: `text/plain; charset=utf-8`, advertised length.
pub fn text_plain_outcome(content_length: u64) -> ProbeOutcome {
    ProbeOutcome::Response(ProbeResponse {
        status: 200,
        content_type: Some("text/plain; charset=utf-8".into()),
        content_length: Some(content_length),
        fetched_full_body: false,
    })
}

/// Canned unsupported-status outcome.
pub fn status_outcome(status: u16) -> ProbeOutcome {
    ProbeOutcome::Response(ProbeResponse {
        status,
        content_type: None,
        content_length: None,
        fetched_full_body: false,
    })
}

/// Canned transport failure.
pub fn transport_error_outcome() -> ProbeOutcome {
    ProbeOutcome::TransportError {
        message: "connection timed out".into(),
    }
}

#[async_trait]
impl Probe for FixtureProbe {
    async fn probe(&self, uri: &str) -> ProbeOutcome {
        *self
            .requests
            .lock()
            .expect("fixture requests lock poisoned")
            .entry(uri.to_string())
            .or_default() += 1;

        self.outcomes
            .lock()
            .expect("fixture outcomes lock poisoned")
            .get(uri)
            .cloned()
            .unwrap_or_else(|| status_outcome(404))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_probe_counts_requests() {
        let probe = FixtureProbe::new();
        probe.set_outcome("http://example.com/a.txt", text_plain_outcome(27));

        assert_eq!(probe.request_count("http://example.com/a.txt"), 0);
        let outcome = probe.probe("http://example.com/a.txt").await;
        assert!(outcome.is_supported());
        assert_eq!(probe.request_count("http://example.com/a.txt"), 1);
        assert_eq!(probe.total_requests(), 1);
    }

    #[tokio::test]
    async fn unscripted_uri_answers_not_found() {
        let probe = FixtureProbe::new();
        let outcome = probe.probe("http://example.com/unknown.txt").await;
        assert!(!outcome.is_supported());
    }
}
