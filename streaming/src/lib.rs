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

//! # Streaming
//!
//! `Pricing -> AlgoStreaming -> Streaming`: turns a raw two-way price into a
//! two-way algo quote centered on the mid, alternating visible size, then forwards
//! it downstream unchanged.

use bondwire_core::{PipelineError, Service, ServiceListener};
use bondwire_data::Price;
use bondwire_markets::{Bond, PricingSide};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The visible size alternates between these two constants on every emission,
/// starting with the larger size.
pub const VISIBLE_QTY_LARGE: i64 = 10_000_000;
pub const VISIBLE_QTY_SMALL: i64 = 2_000_000;

/// One side of a two-way algo quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceStreamOrder {
    pub price: Decimal,
    pub visible_qty: i64,
    pub hidden_qty: i64,
    pub side: PricingSide,
}

/// A two-way quote for one product, replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceStream {
    pub product: Bond,
    pub bid_order: PriceStreamOrder,
    pub offer_order: PriceStreamOrder,
}

impl PriceStream {
    pub fn product_id(&self) -> &str {
        self.product.product_id()
    }
}

/// The value `AlgoStreamingService` stores and fans out; a thin wrapper so
/// `StreamingService` has a distinct type to subscribe to even though it only ever
/// forwards the inner [`PriceStream`] unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgoStream {
    pub price_stream: PriceStream,
}

impl AlgoStream {
    pub fn product_id(&self) -> &str {
        self.price_stream.product_id()
    }
}

/// Listens to [`Price`] events, emits a two-way [`AlgoStream`] centered on the mid,
/// and stores/fans out the latest one per productId.
pub struct AlgoStreamingService {
    store: IndexMap<String, AlgoStream>,
    listeners: Vec<Box<dyn ServiceListener<AlgoStream>>>,
    counter: u64,
}

impl fmt::Debug for AlgoStreamingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgoStreamingService")
            .field("streams", &self.store.len())
            .field("counter", &self.counter)
            .finish()
    }
}

impl Default for AlgoStreamingService {
    fn default() -> Self {
        Self {
            store: IndexMap::new(),
            listeners: Vec::new(),
            counter: 0,
        }
    }
}

impl AlgoStreamingService {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_visible_qty(&mut self) -> i64 {
        let qty = if self.counter % 2 == 0 {
            VISIBLE_QTY_LARGE
        } else {
            VISIBLE_QTY_SMALL
        };
        self.counter += 1;
        qty
    }
}

impl Service<String, AlgoStream> for AlgoStreamingService {
    fn get_data(&self, key: &String) -> Option<&AlgoStream> {
        self.store.get(key)
    }

    fn on_message(&mut self, value: AlgoStream) -> Result<(), PipelineError> {
        let key = value.product_id().to_string();
        self.store.insert(key, value.clone());
        for listener in &mut self.listeners {
            listener.process_add(&value)?;
        }
        Ok(())
    }

    fn add_listener(&mut self, listener: Box<dyn ServiceListener<AlgoStream>>) {
        self.listeners.push(listener);
    }
}

impl ServiceListener<Price> for AlgoStreamingService {
    fn process_add(&mut self, price: &Price) -> Result<(), PipelineError> {
        let half_spread = price.bid_offer_spread / dec!(2);
        let bid_price = price.mid - half_spread;
        let offer_price = price.mid + half_spread;
        let visible_qty = self.next_visible_qty();
        let hidden_qty = 2 * visible_qty;

        let price_stream = PriceStream {
            product: price.product.clone(),
            bid_order: PriceStreamOrder {
                price: bid_price,
                visible_qty,
                hidden_qty,
                side: PricingSide::Bid,
            },
            offer_order: PriceStreamOrder {
                price: offer_price,
                visible_qty,
                hidden_qty,
                side: PricingSide::Offer,
            },
        };
        tracing::debug!(
            product_id = price.product.product_id(),
            visible_qty,
            hidden_qty,
            "emitting algo stream"
        );
        self.on_message(AlgoStream { price_stream })
    }
}

/// Passive forwarder: stores and fans out the [`PriceStream`] inside every
/// [`AlgoStream`] it is handed.
pub struct StreamingService {
    store: IndexMap<String, PriceStream>,
    listeners: Vec<Box<dyn ServiceListener<PriceStream>>>,
}

impl fmt::Debug for StreamingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingService")
            .field("streams", &self.store.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for StreamingService {
    fn default() -> Self {
        Self {
            store: IndexMap::new(),
            listeners: Vec::new(),
        }
    }
}

impl StreamingService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<String, PriceStream> for StreamingService {
    fn get_data(&self, key: &String) -> Option<&PriceStream> {
        self.store.get(key)
    }

    fn on_message(&mut self, value: PriceStream) -> Result<(), PipelineError> {
        let key = value.product_id().to_string();
        self.store.insert(key, value.clone());
        for listener in &mut self.listeners {
            listener.process_add(&value)?;
        }
        Ok(())
    }

    fn add_listener(&mut self, listener: Box<dyn ServiceListener<PriceStream>>) {
        self.listeners.push(listener);
    }
}

impl ServiceListener<AlgoStream> for StreamingService {
    fn process_add(&mut self, value: &AlgoStream) -> Result<(), PipelineError> {
        self.on_message(value.price_stream.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bond() -> Bond {
        bondwire_markets::bond::lookup("91282CAX9").unwrap()
    }

    #[test]
    fn centers_quote_on_mid_and_alternates_visible_qty() {
        let mut svc = AlgoStreamingService::new();
        let price = Price::new(bond(), dec!(99.5), dec!(99.53125));

        svc.process_add(&price).unwrap();
        let first = svc.get_data(&"91282CAX9".to_string()).unwrap();
        assert_eq!(first.price_stream.bid_order.visible_qty, VISIBLE_QTY_LARGE);
        assert_eq!(first.price_stream.offer_order.visible_qty, VISIBLE_QTY_LARGE);
        assert_eq!(first.price_stream.bid_order.hidden_qty, 2 * VISIBLE_QTY_LARGE);
        assert_eq!(
            first.price_stream.bid_order.price + first.price_stream.offer_order.price,
            dec!(2) * price.mid
        );

        svc.process_add(&price).unwrap();
        let second = svc.get_data(&"91282CAX9".to_string()).unwrap();
        assert_eq!(second.price_stream.bid_order.visible_qty, VISIBLE_QTY_SMALL);
    }

    #[test]
    fn streaming_service_forwards_inner_price_stream() {
        let mut streaming = StreamingService::new();
        let stream = PriceStream {
            product: bond(),
            bid_order: PriceStreamOrder {
                price: dec!(99.5),
                visible_qty: VISIBLE_QTY_LARGE,
                hidden_qty: 2 * VISIBLE_QTY_LARGE,
                side: PricingSide::Bid,
            },
            offer_order: PriceStreamOrder {
                price: dec!(99.53125),
                visible_qty: VISIBLE_QTY_LARGE,
                hidden_qty: 2 * VISIBLE_QTY_LARGE,
                side: PricingSide::Offer,
            },
        };
        streaming
            .process_add(&AlgoStream { price_stream: stream.clone() })
            .unwrap();
        assert_eq!(streaming.get_data(&"91282CAX9".to_string()).unwrap(), &stream);
    }
}
