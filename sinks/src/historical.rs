//! Generic historical-data fan-out sink. One `HistoricalDataService<V>` per output
//! file; the encoding for `V` is fixed by [`HistoricalRecord`].

use bondwire_core::{io, PipelineError, Service, ServiceListener};
use bondwire_execution::ExecutionOrder;
use bondwire_inquiry::Inquiry;
use bondwire_markets::price;
use bondwire_risk::{Position, Pv01};
use bondwire_streaming::PriceStream;
use indexmap::IndexMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Encodes a domain value into the whitespace-joined fields one journal record
/// holds, and the key the in-memory store keeps it under.
pub trait HistoricalRecord {
    fn record_key(&self) -> String;
    fn record_fields(&self) -> Vec<String>;
}

impl HistoricalRecord for Position {
    fn record_key(&self) -> String {
        self.product_id().to_string()
    }

    /// `productId book1 qty1 book2 qty2 ...`, books in first-touched order.
    fn record_fields(&self) -> Vec<String> {
        let mut fields = vec![self.product_id().to_string()];
        for (book, quantity) in &self.per_book {
            fields.push(book.to_string());
            fields.push(quantity.to_string());
        }
        fields
    }
}

impl HistoricalRecord for Pv01 {
    fn record_key(&self) -> String {
        self.product_id().to_string()
    }

    /// `productId pv01 quantity`.
    fn record_fields(&self) -> Vec<String> {
        vec![
            self.product_id().to_string(),
            self.pv01.to_string(),
            self.quantity.to_string(),
        ]
    }
}

impl HistoricalRecord for ExecutionOrder {
    fn record_key(&self) -> String {
        self.order_id.clone()
    }

    /// `productId side orderId orderType price visibleQty hiddenQty parentOrderId
    /// isChild`.
    fn record_fields(&self) -> Vec<String> {
        vec![
            self.product_id().to_string(),
            self.side.to_string(),
            self.order_id.clone(),
            self.order_type.to_string(),
            price::encode(self.price),
            self.visible_qty.to_string(),
            self.hidden_qty.to_string(),
            self.parent_order_id.clone(),
            self.is_child.to_string(),
        ]
    }
}

impl HistoricalRecord for PriceStream {
    fn record_key(&self) -> String {
        self.product_id().to_string()
    }

    /// `productId bidPx bidVisQty bidHidQty BID offerPx offerVisQty offerHidQty
    /// OFFER`.
    fn record_fields(&self) -> Vec<String> {
        vec![
            self.product_id().to_string(),
            price::encode(self.bid_order.price),
            self.bid_order.visible_qty.to_string(),
            self.bid_order.hidden_qty.to_string(),
            self.bid_order.side.to_string(),
            price::encode(self.offer_order.price),
            self.offer_order.visible_qty.to_string(),
            self.offer_order.hidden_qty.to_string(),
            self.offer_order.side.to_string(),
        ]
    }
}

impl HistoricalRecord for Inquiry {
    fn record_key(&self) -> String {
        self.inquiry_id.clone()
    }

    /// `inquiryId productId side quantity price state`.
    fn record_fields(&self) -> Vec<String> {
        vec![
            self.inquiry_id.clone(),
            self.product_id().to_string(),
            self.side.to_string(),
            self.quantity.to_string(),
            price::encode(self.price),
            self.state.to_string(),
        ]
    }
}

/// Journals every value it is handed to `path`, timestamp-prefixed and append-only.
/// Doubles as a [`Service`] keyed by [`HistoricalRecord::record_key`] so the latest
/// journaled value per key is queryable in-process, even though nothing in this
/// pipeline currently listens downstream of a historical sink.
pub struct HistoricalDataService<V> {
    path: PathBuf,
    store: IndexMap<String, V>,
    listeners: Vec<Box<dyn ServiceListener<V>>>,
}

impl<V> fmt::Debug for HistoricalDataService<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoricalDataService")
            .field("path", &self.path)
            .field("records", &self.store.len())
            .finish()
    }
}

impl<V> HistoricalDataService<V> {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            store: IndexMap::new(),
            listeners: Vec::new(),
        }
    }
}

impl<V: HistoricalRecord + Clone> Service<String, V> for HistoricalDataService<V> {
    fn get_data(&self, key: &String) -> Option<&V> {
        self.store.get(key)
    }

    fn on_message(&mut self, value: V) -> Result<(), PipelineError> {
        io::append_record(&self.path, &value.record_fields())?;
        tracing::debug!(path = %self.path.display(), key = %value.record_key(), "journaled record");
        self.store.insert(value.record_key(), value.clone());
        for listener in &mut self.listeners {
            listener.process_add(&value)?;
        }
        Ok(())
    }

    fn add_listener(&mut self, listener: Box<dyn ServiceListener<V>>) {
        self.listeners.push(listener);
    }
}

impl<V: HistoricalRecord + Clone> ServiceListener<V> for HistoricalDataService<V> {
    fn process_add(&mut self, value: &V) -> Result<(), PipelineError> {
        self.on_message(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bondwire_markets::Book;
    use rust_decimal_macros::dec;
    use std::fs;

    #[test]
    fn position_fields_list_books_in_first_touched_order() {
        let mut position = Position::new(bondwire_markets::bond::lookup("91282CAX9").unwrap());
        position.add(Book::Trsy2, 5);
        position.add(Book::Trsy1, 10);
        assert_eq!(
            position.record_fields(),
            vec!["91282CAX9", "TRSY2", "5", "TRSY1", "10"]
        );
    }

    #[test]
    fn on_message_journals_and_stores_by_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("risk.txt");
        let mut svc: HistoricalDataService<Pv01> = HistoricalDataService::new(&path);

        svc.on_message(Pv01 {
            product_id: "91282CAX9".to_string(),
            pv01: dec!(1.998126079),
            quantity: 1_000_000,
        })
        .unwrap();

        assert!(svc.get_data(&"91282CAX9".to_string()).is_some());
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("91282CAX9 1.998126079 1000000"));
    }
}
