//! Global resolution switches.

/// Switches controlling how link metadata is resolved during a save.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolverSettings {
    /// Skip probing and enqueueing entirely. Escape hatch for bulk imports
    /// where thousands of outbound requests would be unacceptable.
    pub disable_http_requests: bool,
    /// Defer resolution to the background worker instead of probing inline
    /// during the save.
    pub deferred_request: bool,
}

impl ResolverSettings {
    /// Create settings from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `FILELINK_DISABLE_HTTP_REQUESTS` | `false` | Skip all resolution |
    /// | `FILELINK_DEFERRED_REQUEST` | `false` | Defer resolution to the worker |
    pub fn from_env() -> Self {
        let disable_http_requests = std::env::var("FILELINK_DISABLE_HTTP_REQUESTS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let deferred_request = std::env::var("FILELINK_DEFERRED_REQUEST")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Self {
            disable_http_requests,
            deferred_request,
        }
    }

    /// Enable or disable deferred resolution.
    pub fn with_deferred(mut self, deferred: bool) -> Self {
        self.deferred_request = deferred;
        self
    }

    /// Enable or disable the HTTP kill switch.
    pub fn with_http_disabled(mut self, disabled: bool) -> Self {
        self.disable_http_requests = disabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_resolve_inline() {
        let settings = ResolverSettings::default();
        assert!(!settings.disable_http_requests);
        assert!(!settings.deferred_request);
    }

    #[test]
    fn builder_chaining() {
        let settings = ResolverSettings::default()
            .with_deferred(true)
            .with_http_disabled(true);
        assert!(settings.deferred_request);
        assert!(settings.disable_http_requests);
    }
}
