//! Side enums shared by every domain crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The side of a [`crate::Trade`] or [`crate::Inquiry`]-equivalent customer order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Which side of a two-way quote an [`Order`](crate::Order)/`PriceStreamOrder` sits
/// on. Distinct from [`Side`]: a quote is BID/OFFER, a fill is BUY/SELL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PricingSide {
    Bid,
    Offer,
}

impl fmt::Display for PricingSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingSide::Bid => write!(f, "BID"),
            PricingSide::Offer => write!(f, "OFFER"),
        }
    }
}

/// Internal ledger partition a trade accrues position against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Book {
    Trsy1,
    Trsy2,
    Trsy3,
}

impl Book {
    /// Round-robins `TRSY1 -> TRSY2 -> TRSY3 -> TRSY1 -> ...` by a zero-based
    /// event counter, as the trade-booking back-edge requires.
    pub fn round_robin(counter: u64) -> Self {
        match counter % 3 {
            0 => Book::Trsy1,
            1 => Book::Trsy2,
            _ => Book::Trsy3,
        }
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Book::Trsy1 => write!(f, "TRSY1"),
            Book::Trsy2 => write!(f, "TRSY2"),
            Book::Trsy3 => write!(f, "TRSY3"),
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(format!("unknown side: {other}")),
        }
    }
}

impl std::str::FromStr for Book {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRSY1" => Ok(Book::Trsy1),
            "TRSY2" => Ok(Book::Trsy2),
            "TRSY3" => Ok(Book::Trsy3),
            other => Err(format!("unknown book: {other}")),
        }
    }
}

/// Execution order type. Only `MARKET` is ever produced by this pipeline's
/// algo-execution service, but the full enum is kept because it is part of the
/// `ExecutionOrder` wire shape consumed downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrderType {
    Fok,
    Ioc,
    Market,
    Limit,
    Stop,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Fok => write!(f, "FOK"),
            OrderType::Ioc => write!(f, "IOC"),
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::Stop => write!(f, "STOP"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_round_robins_trsy1_trsy2_trsy3() {
        assert_eq!(Book::round_robin(0), Book::Trsy1);
        assert_eq!(Book::round_robin(1), Book::Trsy2);
        assert_eq!(Book::round_robin(2), Book::Trsy3);
        assert_eq!(Book::round_robin(3), Book::Trsy1);
    }
}
