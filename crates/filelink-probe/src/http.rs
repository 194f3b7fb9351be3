//! HTTP implementation of the remote metadata probe.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{redirect, Client};
use tracing::{debug, warn};

use filelink_core::{Error, Probe, ProbeOutcome, ProbeResponse, Result};

/// Configuration for the HTTP probe.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Total request timeout in seconds.
    pub timeout_secs: u64,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Maximum redirect hops before the probe gives up.
    pub max_redirects: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: filelink_core::defaults::PROBE_TIMEOUT_SECS,
            connect_timeout_secs: filelink_core::defaults::PROBE_CONNECT_TIMEOUT_SECS,
            max_redirects: filelink_core::defaults::PROBE_MAX_REDIRECTS,
        }
    }
}

impl ProbeConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `FILELINK_PROBE_TIMEOUT_SECS` | `30` | Total request timeout |
    /// | `FILELINK_PROBE_CONNECT_TIMEOUT_SECS` | `10` | Connect timeout |
    /// | `FILELINK_PROBE_MAX_REDIRECTS` | `10` | Redirect hop limit |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let timeout_secs = std::env::var("FILELINK_PROBE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_secs);

        let connect_timeout_secs = std::env::var("FILELINK_PROBE_CONNECT_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.connect_timeout_secs);

        let max_redirects = std::env::var("FILELINK_PROBE_MAX_REDIRECTS")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.max_redirects);

        Self {
            timeout_secs,
            connect_timeout_secs,
            max_redirects,
        }
    }

    /// Set the total request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the redirect hop limit.
    pub fn with_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }
}

/// Remote probe backed by an HTTP client.
///
/// Issues a HEAD request first; when the server omits `Content-Length` on a
/// supported response, escalates to a full GET and measures the body.
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// Create a probe with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(ProbeConfig::default())
    }

    /// Create a probe with custom configuration.
    pub fn with_config(config: ProbeConfig) -> Result<Self> {
        let max_redirects = config.max_redirects;
        // Strict redirect handling: exceeding the hop limit is a transport
        // failure, and an https -> http hop is never followed silently (the
        // chain stops and the redirect response itself is reported).
        let policy = redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() > max_redirects {
                return attempt.error("too many redirects");
            }
            let downgraded = attempt
                .previous()
                .last()
                .map(|prev| prev.scheme() == "https")
                .unwrap_or(false)
                && attempt.url().scheme() == "http";
            if downgraded {
                attempt.stop()
            } else {
                attempt.follow()
            }
        });

        let client = Client::builder()
            .redirect(policy)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build probe client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, uri: &str) -> ProbeOutcome {
        let started = Instant::now();

        let head = match self.client.head(uri).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(uri, error = %e, "probe transport failure");
                return ProbeOutcome::TransportError {
                    message: e.to_string(),
                };
            }
        };

        let status = head.status().as_u16();
        let content_type = head
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        // Read the header directly: reqwest's content_length() reflects the
        // decoded body, not what the server advertised.
        let content_length = head
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let supported = matches!(status, 200 | 301 | 302);

        if supported && content_length.is_none() {
            debug!(uri, status, "no content-length header, measuring via full fetch");
            let body = match self.client.get(uri).send().await {
                Ok(response) => response.bytes().await,
                Err(e) => Err(e),
            };
            return match body {
                Ok(bytes) => {
                    debug!(
                        uri,
                        status,
                        size = bytes.len(),
                        duration_ms = started.elapsed().as_millis() as u64,
                        "probe complete (full fetch)"
                    );
                    ProbeOutcome::Response(ProbeResponse {
                        status,
                        content_type,
                        content_length: Some(bytes.len() as u64),
                        fetched_full_body: true,
                    })
                }
                Err(e) => {
                    warn!(uri, error = %e, "full fetch transport failure");
                    ProbeOutcome::TransportError {
                        message: e.to_string(),
                    }
                }
            };
        }

        debug!(
            uri,
            status,
            duration_ms = started.elapsed().as_millis() as u64,
            "probe complete"
        );
        ProbeOutcome::Response(ProbeResponse {
            status,
            content_type,
            content_length,
            fetched_full_body: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = ProbeConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.max_redirects, 10);
    }

    #[test]
    fn config_builder() {
        let config = ProbeConfig::default().with_timeout(5).with_max_redirects(2);
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.max_redirects, 2);
    }

    #[test]
    fn probe_builds_with_defaults() {
        assert!(HttpProbe::new().is_ok());
    }
}
