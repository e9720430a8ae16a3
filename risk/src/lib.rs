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

//! # Risk
//!
//! `TradeBooking -> Position -> Risk`: per-book position keeping and the PV01
//! dollar-risk figure derived from it, plus bucketed-sector roll-ups for coarse
//! reporting.

pub mod position;
pub mod risk;

pub use position::{Position, PositionService};
pub use risk::{BucketedSector, Pv01, RiskService};
