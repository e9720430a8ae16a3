#![forbid(unsafe_code)]
#![warn(
    unused,
    clippy::cognitive_complexity,
    unused_crate_dependencies,
    unused_extern_crates,
    clippy::unused_self,
    missing_debug_implementations,
    rust_2018_idioms
)]
#![allow(clippy::type_complexity)]

//! # Core — the SOA fabric
//!
//! Three abstractions compose the whole bondwire pipeline:
//!
//! - [`Service`] — a keyed, in-memory store with a listener list.
//! - [`Connector`] — a boundary adapter: subscribe-only connectors parse external
//!   input and call [`Service::on_message`]; publish-only connectors accept service
//!   values and write them outward. `subscribe`/`publish` default to no-ops so a
//!   connector only implements the direction it needs.
//! - [`ServiceListener`] — a sink for add/remove/update events from a service,
//!   typically bridging into another service's `on_message` or a derived action.
//!
//! Every `Service::on_message` runs to completion (listeners fire synchronously, in
//! registration order) before the next input record is read — there is no
//! concurrency to reason about, only call-graph depth.

pub mod error;
pub mod io;
pub mod link;
pub mod logging;
pub mod service;

pub use error::PipelineError;
pub use link::Forward;
pub use service::{Connector, Service, ServiceListener};
