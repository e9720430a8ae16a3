//! Fractional-32nds Treasury price codec.
//!
//! A price like `99-16+` means `99 + 16/32 + 4/256`: whole points, then a two-digit
//! 32nds component, then a single eighths-of-a-32nd digit — except that digit is
//! rendered `+` instead of `4`, a Treasury-market convention this codec must
//! round-trip exactly.

use crate::PipelineError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Renders `price` in `whole-32nds{256ths}` form. `price` must be non-negative;
/// callers parse it from [`rust_decimal::Decimal`] so no float rounding is involved.
pub fn encode(price: Decimal) -> String {
    let whole = price.floor();
    let remainder = price - whole;
    let frac32 = (remainder * dec!(32)).floor();
    let frac256 = ((remainder * dec!(32) - frac32) * dec!(8)).floor();

    let frac32_i = frac32.to_string().parse::<u32>().unwrap_or(0);
    let frac256_i = frac256.to_string().parse::<u32>().unwrap_or(0);
    let digit = if frac256_i == 4 {
        '+'.to_string()
    } else {
        frac256_i.to_string()
    };

    format!("{whole}-{frac32_i:02}{digit}")
}

/// Parses the `whole-32nds{256ths}` form back into an exact [`Decimal`].
pub fn decode(text: &str) -> Result<Decimal, PipelineError> {
    let (whole_part, rest) = text
        .split_once('-')
        .ok_or_else(|| PipelineError::Parse(format!("malformed price '{text}': missing '-'")))?;
    if rest.len() != 3 {
        return Err(PipelineError::Parse(format!(
            "malformed price '{text}': expected 2 32nds digits + 1 256ths digit"
        )));
    }
    let whole: Decimal = whole_part
        .parse()
        .map_err(|_| PipelineError::Parse(format!("malformed price '{text}': bad whole part")))?;
    let (frac32_part, digit_part) = rest.split_at(2);
    let frac32: Decimal = frac32_part
        .parse()
        .map_err(|_| PipelineError::Parse(format!("malformed price '{text}': bad 32nds part")))?;
    let frac256 = match digit_part {
        "+" => dec!(4),
        d => d
            .parse::<Decimal>()
            .map_err(|_| PipelineError::Parse(format!("malformed price '{text}': bad 256ths digit")))?,
    };

    Ok(whole + frac32 / dec!(32) + frac256 / dec!(256))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_plus_digit() {
        let price = decode("99-16+").unwrap();
        assert_eq!(encode(price), "99-16+");
    }

    #[test]
    fn round_trips_ordinary_digit() {
        let price = decode("100-010").unwrap();
        assert_eq!(encode(price), "100-010");
    }

    #[test]
    fn encodes_exact_whole_price() {
        assert_eq!(encode(dec!(100)), "100-000");
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(decode("99.16").is_err());
        assert!(decode("99-1").is_err());
    }
}
