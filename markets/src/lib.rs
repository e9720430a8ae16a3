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

//! # Markets
//!
//! The bond product model: the fixed CUSIP reference table ([`bond`]), the
//! fractional-32nds price codec ([`price`]), and the side/book enums every domain
//! crate keys off of ([`side`]).

pub mod bond;
pub mod price;
pub mod side;

pub use bond::Bond;
pub use bondwire_core::PipelineError;
pub use side::{Book, OrderType, PricingSide, Side};

/// Minimum interface every domain entity's product type must expose. The pipeline
/// runs with a single concrete `P = Bond`, but every service is written against
/// this trait so the product type stays a parameter, not a hardcoded type.
pub trait Product {
    fn product_id(&self) -> &str;
}

impl Product for Bond {
    fn product_id(&self) -> &str {
        self.product_id()
    }
}
