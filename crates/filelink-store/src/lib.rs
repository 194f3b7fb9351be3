//! # filelink-store
//!
//! In-memory implementations of filelink's storage contracts: the owning
//! record store and the deferred work queue. The production system plugs a
//! real storage engine and queue backend into the same
//! [`filelink_core::RecordStore`] / [`filelink_core::WorkQueue`] traits;
//! these implementations carry the tests and small deployments.

pub mod queue;
pub mod records;

// Test fixtures for integration tests in dependent crates.
// Always compiled so tests/ directories can use the scripted probe.
pub mod test_fixtures;

// Re-export core types
pub use filelink_core::*;

pub use queue::MemoryQueue;
pub use records::MemoryRecordStore;
