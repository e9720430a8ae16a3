//! `RiskService`: PV01 dollar-risk per product, plus bucketed-sector roll-ups.

use crate::Position;
use bondwire_core::{PipelineError, Service, ServiceListener};
use bondwire_markets::bond;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// PV01 (price value of one basis point) for a product or a bucketed sector.
/// `pv01` is per-unit when `product_id` names a single product, and a summed dollar
/// figure when it names a [`BucketedSector`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pv01 {
    pub product_id: String,
    pub pv01: Decimal,
    pub quantity: i64,
}

impl Pv01 {
    pub fn product_id(&self) -> &str {
        &self.product_id
    }
}

/// A named, fixed set of productIds whose PV01s are summed for coarse risk
/// reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketedSector {
    pub name: String,
    pub product_ids: Vec<String>,
}

impl BucketedSector {
    pub fn new(name: impl Into<String>, product_ids: Vec<String>) -> Self {
        Self {
            name: name.into(),
            product_ids,
        }
    }
}

/// Keyed by productId. On each [`Position`] update, looks up the product's
/// per-unit PV01 from the reference table, stores `Pv01{quantity = aggregate
/// position}`, and fans out to listeners (the risk journal).
#[derive(Default)]
pub struct RiskService {
    store: IndexMap<String, Pv01>,
    listeners: Vec<Box<dyn ServiceListener<Pv01>>>,
}

impl fmt::Debug for RiskService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RiskService")
            .field("products", &self.store.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl RiskService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synthetic bucketed-sector PV01: `pv01` is `Σ pv01_per_unit · |quantity|`
    /// across the sector's constituents. Opposing positions in different books
    /// don't net out their capital-at-risk, so this is a dollar magnitude, not a
    /// signed figure; `quantity` stays a plain signed sum so a long/short hedge
    /// still nets toward zero.
    pub fn bucketed_risk(&self, sector: &BucketedSector) -> Pv01 {
        let mut pv01_sum = Decimal::ZERO;
        let mut quantity_sum: i64 = 0;
        for product_id in &sector.product_ids {
            if let Some(row) = self.store.get(product_id) {
                pv01_sum += row.pv01 * Decimal::from(row.quantity.abs());
                quantity_sum += row.quantity;
            }
        }
        Pv01 {
            product_id: sector.name.clone(),
            pv01: pv01_sum,
            quantity: quantity_sum,
        }
    }
}

impl Service<String, Pv01> for RiskService {
    fn get_data(&self, key: &String) -> Option<&Pv01> {
        self.store.get(key)
    }

    fn on_message(&mut self, value: Pv01) -> Result<(), PipelineError> {
        let key = value.product_id().to_string();
        self.store.insert(key, value.clone());
        for listener in &mut self.listeners {
            listener.process_add(&value)?;
        }
        Ok(())
    }

    fn add_listener(&mut self, listener: Box<dyn ServiceListener<Pv01>>) {
        self.listeners.push(listener);
    }
}

impl ServiceListener<Position> for RiskService {
    fn process_add(&mut self, position: &Position) -> Result<(), PipelineError> {
        let pv01_per_unit = bond::pv01(position.product_id())?;
        let quantity = position.aggregate();
        tracing::debug!(
            product_id = position.product_id(),
            %pv01_per_unit,
            quantity,
            "recomputed pv01"
        );
        let pv01 = Pv01 {
            product_id: position.product_id().to_string(),
            pv01: pv01_per_unit,
            quantity,
        };
        self.on_message(pv01)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bondwire_markets::Book;
    use rust_decimal_macros::dec;

    fn bond(cusip: &str) -> bondwire_markets::Bond {
        bond::lookup(cusip).unwrap()
    }

    fn position(cusip: &str, qty: i64) -> Position {
        let mut position = Position::new(bond(cusip));
        position.add(Book::Trsy1, qty);
        position
    }

    #[test]
    fn stores_pv01_per_unit_with_aggregate_quantity() {
        let mut svc = RiskService::new();
        svc.process_add(&position("91282CAX9", 1_000_000)).unwrap();
        let pv01 = svc.get_data(&"91282CAX9".to_string()).unwrap();
        assert_eq!(pv01.pv01, dec!(1.998126079));
        assert_eq!(pv01.quantity, 1_000_000);
    }

    #[test]
    fn bucketed_risk_sums_dollar_magnitude_and_signed_quantity() {
        let mut svc = RiskService::new();
        svc.process_add(&position("91282CAX9", 1_000_000)).unwrap();
        svc.process_add(&position("91282CBA8", -500_000)).unwrap();

        let sector = BucketedSector::new(
            "belly",
            vec!["91282CAX9".to_string(), "91282CBA8".to_string()],
        );
        let bucketed = svc.bucketed_risk(&sector);
        assert_eq!(bucketed.product_id, "belly");
        assert_eq!(bucketed.quantity, 500_000);
        assert_eq!(
            bucketed.pv01,
            dec!(1.998126079) * dec!(1000000) + dec!(2.995311964) * dec!(500000)
        );
    }
}
