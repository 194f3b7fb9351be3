//! # filelink-jobs
//!
//! Background worker for filelink's deferred metadata resolution.
//!
//! This crate provides:
//! - Work-item processing (reload, staleness check, re-save under the
//!   processing guard)
//! - A queue drain loop bounded by a wall-clock budget
//! - Worker events via broadcast channels
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use filelink_core::{ResolutionContext, ResolverSettings};
//! use filelink_jobs::{MetadataUpdateWorker, WorkerConfig};
//! use filelink_probe::HttpProbe;
//! use filelink_resolver::{MetadataResolver, SaveLifecycle};
//! use filelink_store::{MemoryQueue, MemoryRecordStore};
//!
//! let store = Arc::new(MemoryRecordStore::new());
//! let queue = Arc::new(MemoryQueue::new());
//! let probe = Arc::new(HttpProbe::new()?);
//! let settings = ResolverSettings::from_env();
//! let resolver = MetadataResolver::new(probe, settings);
//! let lifecycle = Arc::new(SaveLifecycle::new(
//!     store,
//!     queue,
//!     resolver,
//!     Arc::new(ResolutionContext::new()),
//! ));
//!
//! let worker = MetadataUpdateWorker::new(lifecycle, WorkerConfig::from_env());
//!
//! // Invoked by the periodic trigger: drain until empty or out of budget.
//! let summary = worker.drain().await?;
//! println!("processed {}", summary.processed);
//! ```

pub mod worker;

// Re-export core types
pub use filelink_core::*;

pub use worker::{
    DrainSummary, DropReason, ItemOutcome, MetadataUpdateWorker, WorkerConfig, WorkerEvent,
};
