//! # filelink-resolver
//!
//! The metadata-resolution core of filelink: the per-value decision policy
//! ([`MetadataResolver`]) and the record save path that embeds it
//! ([`SaveLifecycle`]).
//!
//! A save runs every link value through the resolver, which either keeps
//! current metadata, probes the remote target inline, or clears the value
//! and defers the probe to the background worker via a deduplicated work
//! item. The worker re-enters the same save path with the operation
//! context marked as processing, which is what finally performs the
//! deferred probes.

pub mod lifecycle;
pub mod resolver;

pub use lifecycle::SaveLifecycle;
pub use resolver::{MetadataResolver, ResolutionDecision};
