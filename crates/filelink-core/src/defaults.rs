//! Centralized default constants for the filelink system.
//!
//! **This module is the single source of truth** for all shared default
//! values. Crates reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// PROBING
// =============================================================================

/// Total request timeout for one probe in seconds.
pub const PROBE_TIMEOUT_SECS: u64 = 30;

/// Connect timeout for one probe in seconds.
pub const PROBE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Maximum redirect hops followed by a probe.
pub const PROBE_MAX_REDIRECTS: usize = 10;

// =============================================================================
// WORKER
// =============================================================================

/// Time budget for one queue drain in seconds.
///
/// Mirrors the periodic trigger's contract: process items until the queue
/// is empty or this much wall-clock time has elapsed.
pub const WORKER_TIME_BUDGET_SECS: u64 = 60;

/// Worker event broadcast channel capacity.
pub const EVENT_BUS_CAPACITY: usize = 256;

// =============================================================================
// LANGUAGES
// =============================================================================

/// Language code used for records without a specified language.
pub const LANGCODE_NOT_SPECIFIED: &str = "und";
