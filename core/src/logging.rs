//! Standardised `tracing` setup for the bondwire pipeline.
//!
//! ## Usage
//! ```rust,ignore
//! use bondwire_core::logging::init_logging;
//!
//! fn main() {
//!     init_logging();
//!     tracing::info!("pipeline started");
//! }
//! ```
//!
//! `RUST_LOG` controls per-module level, e.g. `RUST_LOG=bondwire_execution=debug`.
//! Defaults to `INFO`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialises human-readable logging. Call once from `main`.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer())
        .init()
}
