//! `TradeBookingService`: books trades from `trades.txt` and from the
//! `Execution -> TradeBooking` back-edge.

use crate::ExecutionOrder;
use bondwire_core::{Connector, PipelineError, Service, ServiceListener};
use bondwire_markets::{price, Bond, Book, PricingSide, Side};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A booked fill, keyed by `tradeId`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub product: Bond,
    pub trade_id: String,
    pub price: Decimal,
    pub book: Book,
    pub quantity: i64,
    pub side: Side,
}

impl Trade {
    pub fn product_id(&self) -> &str {
        self.product.product_id()
    }
}

/// Stores the latest [`Trade`] per `tradeId` and fans out to [`Position`]-building
/// listeners. Two producers feed it: the `trades.txt` connector and the
/// `Execution -> TradeBooking` back-edge (`ServiceListener<ExecutionOrder>`), which
/// keeps its own round-robin book counter.
pub struct TradeBookingService {
    store: IndexMap<String, Trade>,
    listeners: Vec<Box<dyn ServiceListener<Trade>>>,
    back_edge_counter: u64,
}

impl fmt::Debug for TradeBookingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TradeBookingService")
            .field("trades", &self.store.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for TradeBookingService {
    fn default() -> Self {
        Self {
            store: IndexMap::new(),
            listeners: Vec::new(),
            back_edge_counter: 0,
        }
    }
}

impl TradeBookingService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<String, Trade> for TradeBookingService {
    fn get_data(&self, key: &String) -> Option<&Trade> {
        self.store.get(key)
    }

    fn on_message(&mut self, value: Trade) -> Result<(), PipelineError> {
        let key = value.trade_id.clone();
        self.store.insert(key, value.clone());
        for listener in &mut self.listeners {
            listener.process_add(&value)?;
        }
        Ok(())
    }

    fn add_listener(&mut self, listener: Box<dyn ServiceListener<Trade>>) {
        self.listeners.push(listener);
    }
}

/// The back-edge: every `ExecutionOrder` Execution hands us becomes a synthesized
/// Trade. `side` follows BID->SELL / OFFER->BUY (we hit a bid to sell, lifted an
/// offer to buy). The book counter is pre-incremented before the round-robin
/// lookup, so the first trade booked through this edge lands in TRSY2.
impl ServiceListener<ExecutionOrder> for TradeBookingService {
    fn process_add(&mut self, execution_order: &ExecutionOrder) -> Result<(), PipelineError> {
        self.back_edge_counter += 1;
        let book = Book::round_robin(self.back_edge_counter);
        let side = match execution_order.side {
            PricingSide::Bid => Side::Sell,
            PricingSide::Offer => Side::Buy,
        };

        let trade = Trade {
            product: execution_order.product.clone(),
            trade_id: execution_order.order_id.clone(),
            price: execution_order.price,
            book,
            quantity: execution_order.visible_qty + execution_order.hidden_qty,
            side,
        };

        self.on_message(trade)
    }
}

/// Subscribe-only connector: parses `productId tradeId priceFrac book quantity side`
/// lines and feeds them to the [`TradeBookingService`] it holds a shared handle to.
pub struct TradeBookingConnector {
    service: Rc<RefCell<TradeBookingService>>,
}

impl TradeBookingConnector {
    pub fn new(service: Rc<RefCell<TradeBookingService>>) -> Self {
        Self { service }
    }
}

impl Connector<Trade> for TradeBookingConnector {
    fn subscribe(&mut self, lines: &mut dyn Iterator<Item = String>) -> Result<(), PipelineError> {
        for line in lines {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [cusip, trade_id, price_frac, book, quantity, side] = fields[..] else {
                tracing::warn!(%line, "malformed trade record, skipping");
                continue;
            };

            let product = match bondwire_markets::bond::lookup(cusip) {
                Ok(product) => product,
                Err(err) => {
                    tracing::warn!(%cusip, %err, "unknown product, skipping trade record");
                    continue;
                }
            };
            let price = match price::decode(price_frac) {
                Ok(v) => v,
                Err(err) => {
                    tracing::warn!(%line, %err, "malformed price, skipping");
                    continue;
                }
            };
            let book: Book = match book.parse() {
                Ok(v) => v,
                Err(_) => {
                    tracing::warn!(%line, "malformed book, skipping");
                    continue;
                }
            };
            let quantity: i64 = match quantity.parse() {
                Ok(v) => v,
                Err(_) => {
                    tracing::warn!(%line, "malformed quantity, skipping");
                    continue;
                }
            };
            let side: Side = match side.parse() {
                Ok(v) => v,
                Err(_) => {
                    tracing::warn!(%line, "malformed side, skipping");
                    continue;
                }
            };

            self.service.borrow_mut().on_message(Trade {
                product,
                trade_id: trade_id.to_string(),
                price,
                book,
                quantity,
                side,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bondwire_markets::OrderType;
    use rust_decimal_macros::dec;

    fn bond() -> Bond {
        bondwire_markets::bond::lookup("91282CAX9").unwrap()
    }

    fn exec_order(side: PricingSide) -> ExecutionOrder {
        crate::ExecutionOrder {
            product: bond(),
            side,
            order_id: "T1".to_string(),
            order_type: OrderType::Market,
            price: dec!(100),
            visible_qty: 1_000_000,
            hidden_qty: 2_000_000,
            parent_order_id: String::new(),
            is_child: false,
        }
    }

    #[test]
    fn back_edge_starts_round_robin_at_trsy2() {
        let mut svc = TradeBookingService::new();
        svc.process_add(&exec_order(PricingSide::Offer)).unwrap();
        let first = svc.get_data(&"T1".to_string()).unwrap();
        assert_eq!(first.book, Book::Trsy2);
        assert_eq!(first.side, Side::Buy);
        assert_eq!(first.quantity, 3_000_000);
    }

    #[test]
    fn back_edge_maps_bid_to_sell() {
        let mut svc = TradeBookingService::new();
        svc.process_add(&exec_order(PricingSide::Bid)).unwrap();
        let first = svc.get_data(&"T1".to_string()).unwrap();
        assert_eq!(first.side, Side::Sell);
    }

    #[test]
    fn connector_parses_lines_and_feeds_shared_service() {
        let service = Rc::new(RefCell::new(TradeBookingService::new()));
        let mut connector = TradeBookingConnector::new(service.clone());
        let mut lines = vec!["91282CAX9 T2 100-000 TRSY1 1000000 BUY".to_string()].into_iter();

        connector.subscribe(&mut lines).unwrap();

        let stored = service.borrow();
        let trade = stored.get_data(&"T2".to_string()).unwrap();
        assert_eq!(trade.quantity, 1_000_000);
        assert_eq!(trade.side, Side::Buy);
    }
}
