//! `AlgoExecutionService`: decides whether to aggress a tight book.

use crate::ExecutionOrder;
use bondwire_core::{io, PipelineError, Service, ServiceListener};
use bondwire_data::OrderBook;
use bondwire_markets::{OrderType, PricingSide};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The minimum tick: `1/128 = 0.0078125`, exact in the codec's 256ths basis.
pub const MIN_SPREAD: Decimal = dec!(0.0078125);

/// The value `AlgoExecutionService` stores and fans out; wraps an [`ExecutionOrder`]
/// the same way `streaming::AlgoStream` wraps a `PriceStream`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgoExecution {
    pub execution_order: ExecutionOrder,
}

impl AlgoExecution {
    pub fn product_id(&self) -> &str {
        self.execution_order.product_id()
    }
}

/// Listens to [`OrderBook`] updates; aggresses only when the top-of-book spread is
/// exactly [`MIN_SPREAD`], alternating which side it takes by a local counter.
pub struct AlgoExecutionService {
    store: IndexMap<String, AlgoExecution>,
    listeners: Vec<Box<dyn ServiceListener<AlgoExecution>>>,
    counter: u64,
}

impl fmt::Debug for AlgoExecutionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgoExecutionService")
            .field("executions", &self.store.len())
            .field("counter", &self.counter)
            .finish()
    }
}

impl Default for AlgoExecutionService {
    fn default() -> Self {
        Self {
            store: IndexMap::new(),
            listeners: Vec::new(),
            counter: 0,
        }
    }
}

impl AlgoExecutionService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<String, AlgoExecution> for AlgoExecutionService {
    fn get_data(&self, key: &String) -> Option<&AlgoExecution> {
        self.store.get(key)
    }

    fn on_message(&mut self, value: AlgoExecution) -> Result<(), PipelineError> {
        let key = value.product_id().to_string();
        self.store.insert(key, value.clone());
        for listener in &mut self.listeners {
            listener.process_add(&value)?;
        }
        Ok(())
    }

    fn add_listener(&mut self, listener: Box<dyn ServiceListener<AlgoExecution>>) {
        self.listeners.push(listener);
    }
}

impl ServiceListener<OrderBook> for AlgoExecutionService {
    fn process_add(&mut self, book: &OrderBook) -> Result<(), PipelineError> {
        let Some(bbo) = book.best_bid_offer() else {
            return Ok(());
        };
        let spread = bbo.best_offer.price - bbo.best_bid.price;
        if spread != MIN_SPREAD {
            return Ok(());
        }

        let lift_offer = self.counter % 2 == 0;
        self.counter += 1;

        let (side, price, qty) = if lift_offer {
            (PricingSide::Offer, bbo.best_offer.price, bbo.best_offer.quantity)
        } else {
            (PricingSide::Bid, bbo.best_bid.price, bbo.best_bid.quantity)
        };

        let execution_order = ExecutionOrder {
            product: book.product.clone(),
            side,
            order_id: io::timestamp(),
            order_type: OrderType::Market,
            price,
            visible_qty: qty,
            hidden_qty: 0,
            parent_order_id: String::new(),
            is_child: false,
        };

        self.on_message(AlgoExecution { execution_order })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bondwire_data::Order;

    fn bond() -> bondwire_markets::Bond {
        bondwire_markets::bond::lookup("91282CAX9").unwrap()
    }

    fn book(bid_px: Decimal, offer_px: Decimal) -> OrderBook {
        OrderBook {
            product: bond(),
            bid_stack: vec![Order { price: bid_px, quantity: 1_000_000, side: PricingSide::Bid }],
            offer_stack: vec![Order { price: offer_px, quantity: 1_000_000, side: PricingSide::Offer }],
        }
    }

    #[test]
    fn aggresses_tight_book_alternating_sides() {
        let mut svc = AlgoExecutionService::new();
        let tight = book(dec!(100), dec!(100) + MIN_SPREAD);

        svc.process_add(&tight).unwrap();
        let first = svc.get_data(&"91282CAX9".to_string()).unwrap();
        assert_eq!(first.execution_order.side, PricingSide::Offer);
        assert_eq!(first.execution_order.price, dec!(100) + MIN_SPREAD);

        svc.process_add(&tight).unwrap();
        let second = svc.get_data(&"91282CAX9".to_string()).unwrap();
        assert_eq!(second.execution_order.side, PricingSide::Bid);
        assert_eq!(second.execution_order.price, dec!(100));
    }

    #[test]
    fn does_not_aggress_wide_book() {
        let mut svc = AlgoExecutionService::new();
        let wide = book(dec!(99.96875), dec!(100));
        svc.process_add(&wide).unwrap();
        assert!(svc.get_data(&"91282CAX9".to_string()).is_none());
    }
}
