//! # filelink-core
//!
//! Core types, traits, and abstractions for filelink.
//!
//! This crate provides the foundational data structures and trait
//! definitions that the other filelink crates depend on: link values and
//! their resolution states, work items and their dedup keys, the
//! per-operation resolution context, and the contracts for the external
//! record store, work queue, and remote probe.

pub mod context;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod settings;
pub mod traits;

// Re-export commonly used types at crate root
pub use context::{ProcessingGuard, ResolutionContext};
pub use error::{Error, Result};
pub use models::{
    format_is_empty, size_is_empty, ClaimedItem, Document, LinkValue, MetadataUpdateItem,
    ProbeOutcome, ProbeResponse,
};
pub use settings::ResolverSettings;
pub use traits::{Probe, RecordStore, WorkQueue};
