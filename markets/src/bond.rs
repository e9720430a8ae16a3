//! Bond product type and the fixed CUSIP reference table.

use crate::PipelineError;
use chrono::NaiveDate;
use derive_more::Display;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A US Treasury bond, identified by CUSIP. Every field other than the CUSIP is
/// looked up from the fixed reference table in [`lookup`] — the pipeline never
/// receives bond reference data over the wire, only CUSIPs.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[display("{cusip} ({ticker})")]
pub struct Bond {
    pub cusip: String,
    pub ticker: String,
    pub coupon: Decimal,
    pub maturity: NaiveDate,
}

impl Bond {
    /// The key every `Service<K, V>` indexing bond-flavoured values uses.
    pub fn product_id(&self) -> &str {
        &self.cusip
    }
}

/// PV01 (price value of one basis point) per unit of face, used by the risk crate to
/// convert a position quantity into a dollarized bucketed risk figure.
pub fn pv01(cusip: &str) -> Result<Decimal, PipelineError> {
    reference_row(cusip).map(|row| row.pv01)
}

/// Resolves a CUSIP into its full [`Bond`]. An unrecognized CUSIP is a hard
/// [`PipelineError::UnknownProduct`] rather than a sentinel zero-PV01 bond, so a typo
/// in a feed fails loudly instead of booking risk against an empty product.
pub fn lookup(cusip: &str) -> Result<Bond, PipelineError> {
    let row = reference_row(cusip)?;
    Ok(Bond {
        cusip: cusip.to_string(),
        ticker: row.ticker.to_string(),
        coupon: row.coupon,
        maturity: row.maturity,
    })
}

struct ReferenceRow {
    ticker: &'static str,
    coupon: Decimal,
    maturity: NaiveDate,
    pv01: Decimal,
}

fn reference_row(cusip: &str) -> Result<ReferenceRow, PipelineError> {
    let row = match cusip {
        "91282CAX9" => ReferenceRow {
            ticker: "US2Y",
            coupon: dec!(0.125),
            maturity: NaiveDate::from_ymd_opt(2022, 11, 30).unwrap(),
            pv01: dec!(1.998126079),
        },
        "91282CBA8" => ReferenceRow {
            ticker: "US3Y",
            coupon: dec!(0.125),
            maturity: NaiveDate::from_ymd_opt(2023, 12, 15).unwrap(),
            pv01: dec!(2.995311964),
        },
        "91282CAZ4" => ReferenceRow {
            ticker: "US5Y",
            coupon: dec!(0.375),
            maturity: NaiveDate::from_ymd_opt(2025, 11, 30).unwrap(),
            pv01: dec!(4.958072114),
        },
        "91282CAY7" => ReferenceRow {
            ticker: "US7Y",
            coupon: dec!(0.625),
            maturity: NaiveDate::from_ymd_opt(2027, 11, 30).unwrap(),
            pv01: dec!(6.859835619),
        },
        "91282CAV3" => ReferenceRow {
            ticker: "US10Y",
            coupon: dec!(0.875),
            maturity: NaiveDate::from_ymd_opt(2030, 12, 15).unwrap(),
            pv01: dec!(9.594924967),
        },
        "912810ST6" => ReferenceRow {
            ticker: "US20Y",
            coupon: dec!(1.375),
            maturity: NaiveDate::from_ymd_opt(2040, 11, 30).unwrap(),
            pv01: dec!(17.52797647),
        },
        "912810SS8" => ReferenceRow {
            ticker: "US30Y",
            coupon: dec!(1.625),
            maturity: NaiveDate::from_ymd_opt(2050, 12, 15).unwrap(),
            pv01: dec!(23.82649737),
        },
        other => return Err(PipelineError::UnknownProduct(other.to_string())),
    };
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_cusip() {
        let bond = lookup("91282CAX9").unwrap();
        assert_eq!(bond.ticker, "US2Y");
        assert_eq!(bond.coupon, dec!(0.125));
        assert_eq!(pv01("91282CAX9").unwrap(), dec!(1.998126079));
    }

    #[test]
    fn rejects_unknown_cusip() {
        let err = lookup("NOTREAL123").unwrap_err();
        assert!(matches!(err, PipelineError::UnknownProduct(_)));
    }
}
