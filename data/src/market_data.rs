//! `MarketDataService`: depth ingress and aggregation from `marketdata.txt`.

use bondwire_core::{Connector, PipelineError, Service, ServiceListener};
use bondwire_markets::{price, Bond, PricingSide};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Number of levels per side a single `OrderBook` snapshot carries.
pub const LEVELS: usize = 5;

/// One L2 price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub price: Decimal,
    pub quantity: i64,
    pub side: PricingSide,
}

/// The best bid and best offer at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidOffer {
    pub best_bid: Order,
    pub best_offer: Order,
}

/// A full depth snapshot for one product: up to [`LEVELS`] price levels per side,
/// replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    pub product: Bond,
    pub bid_stack: Vec<Order>,
    pub offer_stack: Vec<Order>,
}

impl OrderBook {
    pub fn product_id(&self) -> &str {
        self.product.product_id()
    }

    /// Maximum-price bid and minimum-price offer from the raw (non-aggregated)
    /// stacks, ties broken by first-seen (strict `>`/`<` comparisons preserve
    /// whichever equal-priced level arrived first).
    pub fn best_bid_offer(&self) -> Option<BidOffer> {
        let best_bid = self
            .bid_stack
            .iter()
            .copied()
            .reduce(|best, candidate| if candidate.price > best.price { candidate } else { best });
        let best_offer = self
            .offer_stack
            .iter()
            .copied()
            .reduce(|best, candidate| if candidate.price < best.price { candidate } else { best });

        match (best_bid, best_offer) {
            (Some(best_bid), Some(best_offer)) => Some(BidOffer { best_bid, best_offer }),
            _ => None,
        }
    }

    /// Collapses duplicate prices on each side by summing quantities, ordered
    /// ascending by price within each stack.
    pub fn aggregate_depth(&self) -> OrderBook {
        OrderBook {
            product: self.product.clone(),
            bid_stack: aggregate_side(&self.bid_stack),
            offer_stack: aggregate_side(&self.offer_stack),
        }
    }
}

fn aggregate_side(levels: &[Order]) -> Vec<Order> {
    let mut by_price: IndexMap<Decimal, Order> = IndexMap::new();
    for level in levels {
        by_price
            .entry(level.price)
            .and_modify(|existing| existing.quantity += level.quantity)
            .or_insert(*level);
    }
    let mut aggregated: Vec<Order> = by_price.into_values().collect();
    aggregated.sort_by(|a, b| a.price.cmp(&b.price));
    aggregated
}

/// Accumulates raw depth rows into [`OrderBook`] snapshots: every `2 * LEVELS` rows
/// seen for a productId assembles one book, calls `on_message`, and resets.
pub struct MarketDataService {
    store: IndexMap<String, OrderBook>,
    pending: IndexMap<String, Vec<Order>>,
    products: IndexMap<String, Bond>,
    listeners: Vec<Box<dyn ServiceListener<OrderBook>>>,
}

impl fmt::Debug for MarketDataService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketDataService")
            .field("books", &self.store.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for MarketDataService {
    fn default() -> Self {
        Self {
            store: IndexMap::new(),
            pending: IndexMap::new(),
            products: IndexMap::new(),
            listeners: Vec::new(),
        }
    }
}

impl MarketDataService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulates one depth row for `product_id`. Once `2 * LEVELS` rows have
    /// accumulated, assembles the `OrderBook`, runs it through `on_message`, and
    /// resets the accumulator for that product.
    pub fn accept_row(
        &mut self,
        product: Bond,
        order: Order,
    ) -> Result<(), PipelineError> {
        if order.quantity <= 0 {
            return Err(PipelineError::InvariantViolation(format!(
                "{}: depth quantity must be positive, got {}",
                product.product_id(),
                order.quantity
            )));
        }

        let product_id = product.product_id().to_string();
        self.products.entry(product_id.clone()).or_insert(product);
        let rows = self.pending.entry(product_id.clone()).or_default();
        rows.push(order);

        if rows.len() == 2 * LEVELS {
            let rows = self.pending.shift_remove(&product_id).unwrap_or_default();
            let bid_stack = rows.iter().copied().filter(|o| o.side == PricingSide::Bid).collect();
            let offer_stack = rows.iter().copied().filter(|o| o.side == PricingSide::Offer).collect();
            let product = self.products.get(&product_id).cloned().expect("product registered above");
            let book = OrderBook { product, bid_stack, offer_stack };
            self.on_message(book)?;
        }
        Ok(())
    }
}

impl Service<String, OrderBook> for MarketDataService {
    fn get_data(&self, key: &String) -> Option<&OrderBook> {
        self.store.get(key)
    }

    fn on_message(&mut self, value: OrderBook) -> Result<(), PipelineError> {
        if let Some(bbo) = value.best_bid_offer() {
            if bbo.best_bid.price >= bbo.best_offer.price {
                return Err(PipelineError::InvariantViolation(format!(
                    "{}: crossed book, bestBid {} >= bestOffer {}",
                    value.product_id(),
                    bbo.best_bid.price,
                    bbo.best_offer.price
                )));
            }
        }

        let key = value.product_id().to_string();
        self.store.insert(key, value.clone());
        for listener in &mut self.listeners {
            listener.process_add(&value)?;
        }
        Ok(())
    }

    fn add_listener(&mut self, listener: Box<dyn ServiceListener<OrderBook>>) {
        self.listeners.push(listener);
    }
}

/// Subscribe-only connector: parses `productId priceFrac quantity side` lines, in
/// runs of `2 * LEVELS` per productId, and feeds each row to the [`MarketDataService`]
/// it holds a shared handle to.
pub struct MarketDataConnector {
    service: Rc<RefCell<MarketDataService>>,
}

impl MarketDataConnector {
    pub fn new(service: Rc<RefCell<MarketDataService>>) -> Self {
        Self { service }
    }
}

impl Connector<OrderBook> for MarketDataConnector {
    fn subscribe(&mut self, lines: &mut dyn Iterator<Item = String>) -> Result<(), PipelineError> {
        for line in lines {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [cusip, price_frac, quantity, side] = fields[..] else {
                tracing::warn!(%line, "malformed market data record, skipping");
                continue;
            };

            let product = match bondwire_markets::bond::lookup(cusip) {
                Ok(product) => product,
                Err(err) => {
                    tracing::warn!(%cusip, %err, "unknown product, skipping market data record");
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
            let quantity: i64 = match quantity.parse() {
                Ok(v) => v,
                Err(_) => {
                    tracing::warn!(%line, "malformed quantity, skipping");
                    continue;
                }
            };
            let side = match side {
                "BID" => PricingSide::Bid,
                "OFFER" => PricingSide::Offer,
                _ => {
                    tracing::warn!(%line, "malformed side, skipping");
                    continue;
                }
            };

            self.service.borrow_mut().accept_row(product, Order { price, quantity, side })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bond() -> Bond {
        bondwire_markets::bond::lookup("91282CAX9").unwrap()
    }

    fn order(price: Decimal, qty: i64, side: PricingSide) -> Order {
        Order { price, quantity: qty, side }
    }

    #[test]
    fn assembles_book_after_ten_rows() {
        let mut svc = MarketDataService::new();
        for i in 0..5 {
            svc.accept_row(bond(), order(dec!(100) - Decimal::from(i), 1_000_000, PricingSide::Bid))
                .unwrap();
        }
        assert!(svc.get_data(&"91282CAX9".to_string()).is_none());
        for i in 0..5 {
            svc.accept_row(bond(), order(dec!(101) + Decimal::from(i), 1_000_000, PricingSide::Offer))
                .unwrap();
        }
        let book = svc.get_data(&"91282CAX9".to_string()).unwrap();
        assert_eq!(book.bid_stack.len(), 5);
        assert_eq!(book.offer_stack.len(), 5);
    }

    #[test]
    fn best_bid_offer_picks_extremes_with_first_seen_ties() {
        let book = OrderBook {
            product: bond(),
            bid_stack: vec![
                order(dec!(100), 1, PricingSide::Bid),
                order(dec!(100), 2, PricingSide::Bid),
                order(dec!(99), 3, PricingSide::Bid),
            ],
            offer_stack: vec![order(dec!(101), 1, PricingSide::Offer), order(dec!(102), 2, PricingSide::Offer)],
        };
        let bbo = book.best_bid_offer().unwrap();
        assert_eq!(bbo.best_bid.quantity, 1);
        assert_eq!(bbo.best_offer.price, dec!(101));
    }

    #[test]
    fn aggregate_depth_sums_duplicate_prices_ascending() {
        let book = OrderBook {
            product: bond(),
            bid_stack: vec![order(dec!(100), 1, PricingSide::Bid), order(dec!(99), 2, PricingSide::Bid), order(dec!(100), 3, PricingSide::Bid)],
            offer_stack: vec![],
        };
        let aggregated = book.aggregate_depth();
        assert_eq!(aggregated.bid_stack.len(), 2);
        assert_eq!(aggregated.bid_stack[0].price, dec!(99));
        assert_eq!(aggregated.bid_stack[1].price, dec!(100));
        assert_eq!(aggregated.bid_stack[1].quantity, 4);
    }

    #[test]
    fn accept_row_rejects_nonpositive_quantity() {
        let mut svc = MarketDataService::new();
        let err = svc.accept_row(bond(), order(dec!(100), 0, PricingSide::Bid)).unwrap_err();
        assert!(matches!(err, PipelineError::InvariantViolation(_)));
    }

    #[test]
    fn on_message_rejects_crossed_book() {
        let mut svc = MarketDataService::new();
        let book = OrderBook {
            product: bond(),
            bid_stack: vec![order(dec!(100), 1, PricingSide::Bid)],
            offer_stack: vec![order(dec!(99), 1, PricingSide::Offer)],
        };
        let err = svc.on_message(book).unwrap_err();
        assert!(matches!(err, PipelineError::InvariantViolation(_)));
    }

    #[test]
    fn connector_parses_lines_and_feeds_shared_service() {
        let service = Rc::new(RefCell::new(MarketDataService::new()));
        let mut connector = MarketDataConnector::new(service.clone());
        let mut lines = vec![
            "91282CAX9 100-000 1000000 BID".to_string(),
            "91282CAX9 99-310 2000000 BID".to_string(),
            "91282CAX9 99-300 3000000 BID".to_string(),
            "91282CAX9 99-290 4000000 BID".to_string(),
            "91282CAX9 99-280 5000000 BID".to_string(),
            "91282CAX9 100-020 1000000 OFFER".to_string(),
            "91282CAX9 100-030 2000000 OFFER".to_string(),
            "91282CAX9 100-040 3000000 OFFER".to_string(),
            "91282CAX9 100-050 4000000 OFFER".to_string(),
            "91282CAX9 100-060 5000000 OFFER".to_string(),
        ]
        .into_iter();

        connector.subscribe(&mut lines).unwrap();

        let stored = service.borrow();
        let book = stored.get_data(&"91282CAX9".to_string()).unwrap();
        assert_eq!(book.bid_stack.len(), 5);
        assert_eq!(book.offer_stack.len(), 5);
    }
}
