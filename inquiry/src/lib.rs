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

//! # Inquiry
//!
//! `Inquiry` negotiation: a customer inquiry moves monotonically RECEIVED ->
//! QUOTED -> DONE, or sideways to a terminal REJECTED / CUSTOMER_REJECTED, driven
//! by the bidirectional [`InquiryConnector`].

use bondwire_core::{Connector, PipelineError, Service, ServiceListener};
use bondwire_markets::{Bond, Side};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Negotiation state. Transitions are monotone along `Received -> Quoted -> Done`,
/// or sideways to a terminal state; no backward moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InquiryState {
    Received,
    Quoted,
    Done,
    Rejected,
    CustomerRejected,
}

impl InquiryState {
    /// `Done`, `Rejected` and `CustomerRejected` accept no further transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, InquiryState::Done | InquiryState::Rejected | InquiryState::CustomerRejected)
    }
}

impl fmt::Display for InquiryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InquiryState::Received => write!(f, "RECEIVED"),
            InquiryState::Quoted => write!(f, "QUOTED"),
            InquiryState::Done => write!(f, "DONE"),
            InquiryState::Rejected => write!(f, "REJECTED"),
            InquiryState::CustomerRejected => write!(f, "CUSTOMER_REJECTED"),
        }
    }
}

impl std::str::FromStr for InquiryState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RECEIVED" => Ok(InquiryState::Received),
            "QUOTED" => Ok(InquiryState::Quoted),
            "DONE" => Ok(InquiryState::Done),
            "REJECTED" => Ok(InquiryState::Rejected),
            "CUSTOMER_REJECTED" => Ok(InquiryState::CustomerRejected),
            other => Err(format!("unknown inquiry state: {other}")),
        }
    }
}

/// A customer inquiry, keyed by `inquiryId`. `state` and `price` are the only fields
/// mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inquiry {
    pub inquiry_id: String,
    pub product: Bond,
    pub side: Side,
    pub quantity: i64,
    pub price: Decimal,
    pub state: InquiryState,
}

impl Inquiry {
    pub fn product_id(&self) -> &str {
        self.product.product_id()
    }
}

/// Drives the RECEIVED -> QUOTED -> DONE negotiation inline on `on_message`, bounded
/// at two further advances past whatever state arrives and expressed as an explicit
/// loop rather than literal call-stack recursion. `send_quote` and
/// `reject_inquiry` are the two operations the negotiation can also be driven by
/// out of band.
#[derive(Default)]
pub struct InquiryService {
    store: IndexMap<String, Inquiry>,
    listeners: Vec<Box<dyn ServiceListener<Inquiry>>>,
}

impl fmt::Debug for InquiryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InquiryService")
            .field("inquiries", &self.store.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl InquiryService {
    pub fn new() -> Self {
        Self::default()
    }

    fn store_and_fan_out(&mut self, value: &Inquiry) -> Result<(), PipelineError> {
        self.store.insert(value.inquiry_id.clone(), value.clone());
        for listener in &mut self.listeners {
            listener.process_add(value)?;
        }
        Ok(())
    }

    /// Re-prices a non-terminal inquiry without moving its state.
    pub fn send_quote(&mut self, inquiry_id: &str, price: Decimal) -> Result<(), PipelineError> {
        let mut inquiry = self.store.get(inquiry_id).cloned().ok_or_else(|| {
            PipelineError::InvariantViolation(format!("send_quote: unknown inquiry {inquiry_id}"))
        })?;
        inquiry.price = price;
        self.store_and_fan_out(&inquiry)
    }

    /// Moves a non-terminal inquiry to REJECTED.
    pub fn reject_inquiry(&mut self, inquiry_id: &str) -> Result<(), PipelineError> {
        let mut inquiry = self.store.get(inquiry_id).cloned().ok_or_else(|| {
            PipelineError::InvariantViolation(format!("reject_inquiry: unknown inquiry {inquiry_id}"))
        })?;
        if inquiry.state.is_terminal() {
            return Err(PipelineError::InvariantViolation(format!(
                "reject_inquiry: inquiry {inquiry_id} is already terminal ({})",
                inquiry.state
            )));
        }
        inquiry.state = InquiryState::Rejected;
        self.store_and_fan_out(&inquiry)
    }
}

impl Service<String, Inquiry> for InquiryService {
    fn get_data(&self, key: &String) -> Option<&Inquiry> {
        self.store.get(key)
    }

    /// Advances RECEIVED -> QUOTED -> DONE in a loop bounded at two further advances
    /// past whatever state arrives, storing every intermediate state but fanning out
    /// to listeners only once, with the final state — only the negotiation's settled
    /// outcome is worth journaling, not every intermediate hop through it.
    fn on_message(&mut self, value: Inquiry) -> Result<(), PipelineError> {
        let mut current = value;
        loop {
            self.store.insert(current.inquiry_id.clone(), current.clone());
            current.state = match current.state {
                InquiryState::Received => InquiryState::Quoted,
                InquiryState::Quoted => InquiryState::Done,
                _ => break,
            };
        }
        for listener in &mut self.listeners {
            listener.process_add(&current)?;
        }
        Ok(())
    }

    fn add_listener(&mut self, listener: Box<dyn ServiceListener<Inquiry>>) {
        self.listeners.push(listener);
    }
}

/// Bidirectional connector for `inquiries.txt`. `subscribe` parses each row and
/// hands it to [`InquiryService::on_message`], which drives the RECEIVED ->
/// QUOTED -> DONE loop inline; `publish` is the default no-op since this pipeline
/// never re-renders an inquiry back out as an input row.
pub struct InquiryConnector {
    service: Rc<RefCell<InquiryService>>,
}

impl InquiryConnector {
    pub fn new(service: Rc<RefCell<InquiryService>>) -> Self {
        Self { service }
    }
}

impl Connector<Inquiry> for InquiryConnector {
    fn subscribe(&mut self, lines: &mut dyn Iterator<Item = String>) -> Result<(), PipelineError> {
        for line in lines {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let [inquiry_id, cusip, side, quantity, price_frac, state] = fields[..] else {
                tracing::warn!(%line, "malformed inquiry record, skipping");
                continue;
            };

            let product = match bondwire_markets::bond::lookup(cusip) {
                Ok(product) => product,
                Err(err) => {
                    tracing::warn!(%cusip, %err, "unknown product, skipping inquiry record");
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
            let quantity: i64 = match quantity.parse() {
                Ok(v) => v,
                Err(_) => {
                    tracing::warn!(%line, "malformed quantity, skipping");
                    continue;
                }
            };
            let price = match bondwire_markets::price::decode(price_frac) {
                Ok(v) => v,
                Err(err) => {
                    tracing::warn!(%line, %err, "malformed price, skipping");
                    continue;
                }
            };
            let state: InquiryState = match state.parse() {
                Ok(v) => v,
                Err(_) => {
                    tracing::warn!(%line, "malformed state, skipping");
                    continue;
                }
            };

            self.service.borrow_mut().on_message(Inquiry {
                inquiry_id: inquiry_id.to_string(),
                product,
                side,
                quantity,
                price,
                state,
            })?;
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

    fn received(id: &str) -> Inquiry {
        Inquiry {
            inquiry_id: id.to_string(),
            product: bond(),
            side: Side::Buy,
            quantity: 1_000_000,
            price: dec!(99),
            state: InquiryState::Received,
        }
    }

    #[test]
    fn received_inquiry_drives_straight_to_done_with_one_fan_out() {
        use std::{cell::RefCell, rc::Rc};

        struct Log(Rc<RefCell<Vec<InquiryState>>>);
        impl ServiceListener<Inquiry> for Log {
            fn process_add(&mut self, value: &Inquiry) -> Result<(), PipelineError> {
                self.0.borrow_mut().push(value.state);
                Ok(())
            }
        }

        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut svc = InquiryService::new();
        svc.add_listener(Box::new(Log(seen.clone())));
        svc.on_message(received("INQ1")).unwrap();

        let stored = svc.get_data(&"INQ1".to_string()).unwrap();
        assert_eq!(stored.state, InquiryState::Done);
        assert_eq!(stored.price, dec!(99));
        // Exactly one record, not one per intermediate state.
        assert_eq!(*seen.borrow(), vec![InquiryState::Done]);
    }

    #[test]
    fn quoted_inquiry_advances_to_done_and_is_then_terminal() {
        let mut svc = InquiryService::new();
        let mut quoted = received("INQ2");
        quoted.state = InquiryState::Quoted;
        svc.on_message(quoted).unwrap();

        assert_eq!(svc.get_data(&"INQ2".to_string()).unwrap().state, InquiryState::Done);
        assert!(svc.reject_inquiry("INQ2").is_err());
    }

    #[test]
    fn reject_inquiry_moves_non_terminal_to_rejected() {
        let mut svc = InquiryService::new();
        svc.store_and_fan_out(&received("INQ3")).unwrap();
        svc.reject_inquiry("INQ3").unwrap();
        assert_eq!(svc.get_data(&"INQ3".to_string()).unwrap().state, InquiryState::Rejected);
    }

    #[test]
    fn connector_parses_lines_and_feeds_shared_service() {
        let service = Rc::new(RefCell::new(InquiryService::new()));
        let mut connector = InquiryConnector::new(service.clone());
        let mut lines = vec!["INQ4 91282CAX9 BUY 1000000 99-000 RECEIVED".to_string()].into_iter();

        connector.subscribe(&mut lines).unwrap();

        let stored = service.borrow();
        assert_eq!(stored.get_data(&"INQ4".to_string()).unwrap().state, InquiryState::Done);
    }
}
