//! `PricingService`: the entry point for `prices.txt`.

use bondwire_core::{Connector, PipelineError, Service, ServiceListener};
use bondwire_markets::{price, Bond};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A product's latest two-way price, derived from a raw bid/offer pair. `mid` and
/// `bid_offer_spread` are computed once at construction, never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub product: Bond,
    pub mid: Decimal,
    pub bid_offer_spread: Decimal,
}

impl Price {
    pub fn new(product: Bond, bid: Decimal, offer: Decimal) -> Self {
        Price {
            product,
            mid: (bid + offer) / dec!(2),
            bid_offer_spread: offer - bid,
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mid={} spread={}",
            self.product.product_id(),
            self.mid,
            self.bid_offer_spread
        )
    }
}

/// Upserts the latest [`Price`] per productId and fans out to listeners. Quotes are
/// not validated for monotonicity — last write wins, matching the source.
#[derive(Default)]
pub struct PricingService {
    store: IndexMap<String, Price>,
    listeners: Vec<Box<dyn ServiceListener<Price>>>,
}

impl fmt::Debug for PricingService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PricingService")
            .field("products", &self.store.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl PricingService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<String, Price> for PricingService {
    fn get_data(&self, key: &String) -> Option<&Price> {
        self.store.get(key)
    }

    fn on_message(&mut self, value: Price) -> Result<(), PipelineError> {
        let key = value.product.product_id().to_string();
        self.store.insert(key, value.clone());
        for listener in &mut self.listeners {
            listener.process_add(&value)?;
        }
        Ok(())
    }

    fn add_listener(&mut self, listener: Box<dyn ServiceListener<Price>>) {
        self.listeners.push(listener);
    }
}

/// Subscribe-only connector: parses `productId bidPriceFrac offerPriceFrac` lines and
/// feeds them to the [`PricingService`] it holds a shared handle to.
pub struct PricingConnector {
    service: Rc<RefCell<PricingService>>,
}

impl PricingConnector {
    pub fn new(service: Rc<RefCell<PricingService>>) -> Self {
        Self { service }
    }
}

impl Connector<Price> for PricingConnector {
    fn subscribe(&mut self, lines: &mut dyn Iterator<Item = String>) -> Result<(), PipelineError> {
        for line in lines {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [cusip, bid, offer] = fields[..] else {
                tracing::warn!(%line, "malformed price record, skipping");
                continue;
            };

            let product = match bondwire_markets::bond::lookup(cusip) {
                Ok(product) => product,
                Err(err) => {
                    tracing::warn!(%cusip, %err, "unknown product, skipping price record");
                    continue;
                }
            };
            let bid = match price::decode(bid) {
                Ok(v) => v,
                Err(err) => {
                    tracing::warn!(%line, %err, "malformed bid price, skipping");
                    continue;
                }
            };
            let offer = match price::decode(offer) {
                Ok(v) => v,
                Err(err) => {
                    tracing::warn!(%line, %err, "malformed offer price, skipping");
                    continue;
                }
            };

            self.service.borrow_mut().on_message(Price::new(product, bid, offer))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bond() -> Bond {
        bondwire_markets::bond::lookup("91282CAX9").unwrap()
    }

    #[test]
    fn computes_mid_and_spread() {
        let price = Price::new(bond(), price::decode("99-160").unwrap(), price::decode("99-170").unwrap());
        assert_eq!(price.mid, dec!(99.515625));
        assert_eq!(price.bid_offer_spread, dec!(1) / dec!(32));
    }

    #[test]
    fn on_message_upserts_and_fans_out() {
        struct Counter(usize);
        impl ServiceListener<Price> for Counter {
            fn process_add(&mut self, _value: &Price) -> Result<(), PipelineError> {
                self.0 += 1;
                Ok(())
            }
        }

        let mut service = PricingService::new();
        service.add_listener(Box::new(Counter(0)));
        let p1 = Price::new(bond(), dec!(99.5), dec!(99.6));
        service.on_message(p1).unwrap();
        assert!(service.get_data(&"91282CAX9".to_string()).is_some());
    }

    #[test]
    fn connector_parses_lines_and_feeds_shared_service() {
        let service = Rc::new(RefCell::new(PricingService::new()));
        let mut connector = PricingConnector::new(service.clone());
        let mut lines = vec!["91282CAX9 99-160 99-170".to_string()].into_iter();

        connector.subscribe(&mut lines).unwrap();

        let stored = service.borrow();
        let price = stored.get_data(&"91282CAX9".to_string()).unwrap();
        assert_eq!(price.mid, dec!(99.515625));
    }
}
