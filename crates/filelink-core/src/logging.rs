//! Structured logging schema and field name constants for filelink.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, absorbed failure (transport error, failed save) |
//! | INFO  | Lifecycle events, drain summaries |
//! | DEBUG | Decision points (deferral, dedup skip, item drops) |
//! | TRACE | Per-value iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "probe", "resolver", "store", "jobs"
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name.
/// Examples: "probe", "resolve", "process_item", "drain"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Owning record type.
pub const RECORD_TYPE: &str = "record_type";

/// Owning record id.
pub const RECORD_ID: &str = "record_id";

/// Record revision id.
pub const REVISION_ID: &str = "revision_id";

/// Language code of the values being resolved.
pub const LANGCODE: &str = "langcode";

/// URI being probed.
pub const URI: &str = "uri";

/// Work-item dedup key.
pub const ITEM_KEY: &str = "item_key";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// HTTP status code of a probe response.
pub const STATUS: &str = "status";

/// Number of claimable items in the queue.
pub const QUEUE_DEPTH: &str = "queue_depth";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Initialize a tracing subscriber for embedders and tests.
///
/// Reads `RUST_LOG` for the filter (default `filelink=debug`). Safe to call
/// more than once; later calls are no-ops.
pub fn init() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "filelink=debug".into());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init();
}
