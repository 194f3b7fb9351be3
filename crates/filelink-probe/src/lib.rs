//! # filelink-probe
//!
//! HTTP implementation of filelink's remote metadata probe.
//!
//! A probe performs a lightweight HEAD request against a link target to
//! discover its content type and size, escalating to a full GET only when
//! the server does not advertise a length. Transport failures are reported
//! as data ([`filelink_core::ProbeOutcome::TransportError`]), never raised.

pub mod http;

pub use http::{HttpProbe, ProbeConfig};
