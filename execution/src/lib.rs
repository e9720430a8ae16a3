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

//! # Execution
//!
//! `MarketData -> AlgoExecution -> Execution -> TradeBooking` and the
//! `Execution -> TradeBooking` back-edge: decides when to aggress a tight book,
//! turns the decision into an `ExecutionOrder`, and books the resulting fill as a
//! `Trade` that feeds `Position`.

pub mod algo_execution;
pub mod execution;
pub mod trade_booking;

pub use algo_execution::{AlgoExecution, AlgoExecutionService, MIN_SPREAD};
pub use execution::ExecutionService;
pub use trade_booking::{Trade, TradeBookingConnector, TradeBookingService};

use bondwire_markets::{OrderType, PricingSide};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One order the algo emits — always `orderType=MARKET` in this pipeline, but the
/// full field set is kept since downstream (the historical executions journal)
/// round-trips every field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOrder {
    pub product: bondwire_markets::Bond,
    pub side: PricingSide,
    pub order_id: String,
    pub order_type: OrderType,
    pub price: Decimal,
    pub visible_qty: i64,
    pub hidden_qty: i64,
    pub parent_order_id: String,
    pub is_child: bool,
}

impl ExecutionOrder {
    pub fn product_id(&self) -> &str {
        self.product.product_id()
    }
}

impl fmt::Display for ExecutionOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} px={} vis={} hid={}",
            self.product_id(),
            self.side,
            self.order_id,
            self.order_type,
            self.price,
            self.visible_qty,
            self.hidden_qty
        )
    }
}
