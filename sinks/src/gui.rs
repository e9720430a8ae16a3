//! `GuiService`: throttled price sink for `gui.txt`.

use bondwire_core::{io, PipelineError, ServiceListener};
use bondwire_data::Price;
use bondwire_markets::price;
use chrono::Local;
use rust_decimal_macros::dec;
use std::path::{Path, PathBuf};

/// Minimum interval between two records GUI will accept; events inside the window
/// are dropped, not queued.
pub const THROTTLE_MS: i64 = 300;

/// Holds a rolling last-written timestamp and drops any [`Price`] event that arrives
/// inside [`THROTTLE_MS`] of it.
pub struct GuiService {
    path: PathBuf,
    throttle_ms: i64,
    last_written_ms: Option<i64>,
}

impl std::fmt::Debug for GuiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuiService")
            .field("path", &self.path)
            .field("throttle_ms", &self.throttle_ms)
            .field("last_written_ms", &self.last_written_ms)
            .finish()
    }
}

impl GuiService {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            throttle_ms: THROTTLE_MS,
            last_written_ms: None,
        }
    }

    /// Handles one price event at an explicit wall-clock reading, so the throttle
    /// can be driven deterministically in tests without sleeping.
    /// [`ServiceListener::process_add`] is the production entry point and reads the
    /// real clock.
    pub fn on_price_at(&mut self, price: &Price, now_ms: i64) -> Result<(), PipelineError> {
        if let Some(last) = self.last_written_ms {
            if now_ms - last < self.throttle_ms {
                return Ok(());
            }
        }
        self.last_written_ms = Some(now_ms);
        io::append_record(&self.path, &price_fields(price))
    }
}

impl ServiceListener<Price> for GuiService {
    fn process_add(&mut self, value: &Price) -> Result<(), PipelineError> {
        self.on_price_at(value, Local::now().timestamp_millis())
    }
}

/// `productId bidPx offerPx` — the same two price legs `streaming.txt` carries per
/// side, reconstructed from `mid`/`bid_offer_spread` since `GuiService` listens
/// directly on [`Price`], not the algo's already-split quote.
fn price_fields(price: &Price) -> Vec<String> {
    let half_spread = price.bid_offer_spread / dec!(2);
    let bid = price.mid - half_spread;
    let offer = price.mid + half_spread;
    vec![
        price.product.product_id().to_string(),
        price::encode(bid),
        price::encode(offer),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;

    fn price() -> Price {
        Price::new(
            bondwire_markets::bond::lookup("91282CAX9").unwrap(),
            dec!(99.5),
            dec!(99.53125),
        )
    }

    #[test]
    fn throttle_drops_events_inside_window_and_allows_outside_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gui.txt");
        let mut svc = GuiService::new(&path);

        svc.on_price_at(&price(), 1_000).unwrap();
        svc.on_price_at(&price(), 1_100).unwrap(); // +100ms, suppressed
        svc.on_price_at(&price(), 1_250).unwrap(); // +250ms total, still suppressed
        svc.on_price_at(&price(), 1_301).unwrap(); // +301ms, admitted

        let lines: Vec<_> = fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect();
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn thousand_events_in_250ms_yield_at_most_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gui.txt");
        let mut svc = GuiService::new(&path);

        for ms in 0..1000 {
            svc.on_price_at(&price(), ms / 4).unwrap(); // spans 0..=249ms
        }

        let contents = fs::read_to_string(&path).unwrap_or_default();
        assert_eq!(contents.lines().count(), 1);
    }
}
