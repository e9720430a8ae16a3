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

//! # Data
//!
//! The two services that sit directly on the external price/depth feeds:
//! [`pricing::PricingService`] and [`market_data::MarketDataService`], plus the
//! subscribe-only connectors that parse their input files.

pub mod market_data;
pub mod pricing;

pub use market_data::{BidOffer, MarketDataConnector, MarketDataService, Order, OrderBook, LEVELS};
pub use pricing::{Price, PricingConnector, PricingService};
