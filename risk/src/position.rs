//! `PositionService`: per-book position keeping.

use bondwire_core::{PipelineError, Service, ServiceListener};
use bondwire_execution::Trade;
use bondwire_markets::{Bond, Book, Side};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A product's position, broken down by book. `aggregate` is always the sum of
/// `per_book`'s values — an invariant enforced by only ever mutating through
/// [`Position::add`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub product: Bond,
    pub per_book: IndexMap<Book, i64>,
}

impl Position {
    pub fn new(product: Bond) -> Self {
        Self {
            product,
            per_book: IndexMap::new(),
        }
    }

    pub fn product_id(&self) -> &str {
        self.product.product_id()
    }

    pub fn add(&mut self, book: Book, delta: i64) {
        *self.per_book.entry(book).or_insert(0) += delta;
    }

    pub fn aggregate(&self) -> i64 {
        self.per_book.values().sum()
    }
}

/// Maintains a [`Position`] per productId, updated on each [`Trade`] and fanned out
/// to Risk and the positions journal.
pub struct PositionService {
    store: IndexMap<String, Position>,
    listeners: Vec<Box<dyn ServiceListener<Position>>>,
}

impl fmt::Debug for PositionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PositionService")
            .field("positions", &self.store.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for PositionService {
    fn default() -> Self {
        Self {
            store: IndexMap::new(),
            listeners: Vec::new(),
        }
    }
}

impl PositionService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<String, Position> for PositionService {
    fn get_data(&self, key: &String) -> Option<&Position> {
        self.store.get(key)
    }

    fn on_message(&mut self, value: Position) -> Result<(), PipelineError> {
        let key = value.product_id().to_string();
        self.store.insert(key, value.clone());
        for listener in &mut self.listeners {
            listener.process_add(&value)?;
        }
        Ok(())
    }

    fn add_listener(&mut self, listener: Box<dyn ServiceListener<Position>>) {
        self.listeners.push(listener);
    }
}

impl ServiceListener<Trade> for PositionService {
    fn process_add(&mut self, trade: &Trade) -> Result<(), PipelineError> {
        let key = trade.product_id().to_string();
        let mut position = self
            .store
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Position::new(trade.product.clone()));

        let delta = match trade.side {
            Side::Buy => trade.quantity,
            Side::Sell => -trade.quantity,
        };
        position.add(trade.book, delta);

        self.on_message(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bond() -> Bond {
        bondwire_markets::bond::lookup("91282CAX9").unwrap()
    }

    fn trade(book: Book, quantity: i64, side: Side) -> Trade {
        Trade {
            product: bond(),
            trade_id: format!("T-{book:?}-{quantity}"),
            price: dec!(100),
            book,
            quantity,
            side,
        }
    }

    #[test]
    fn aggregate_tracks_signed_quantity_across_books() {
        let mut svc = PositionService::new();
        svc.process_add(&trade(Book::Trsy1, 1_000_000, Side::Buy)).unwrap();
        let pos = svc.get_data(&"91282CAX9".to_string()).unwrap();
        assert_eq!(pos.aggregate(), 1_000_000);

        svc.process_add(&trade(Book::Trsy2, 500_000, Side::Sell)).unwrap();
        let pos = svc.get_data(&"91282CAX9".to_string()).unwrap();
        assert_eq!(pos.aggregate(), 500_000);
        assert_eq!(pos.per_book[&Book::Trsy1], 1_000_000);
        assert_eq!(pos.per_book[&Book::Trsy2], -500_000);
    }
}
