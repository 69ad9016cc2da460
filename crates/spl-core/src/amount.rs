//! Conversion between decimal (human) amounts and raw (fixed-point) amounts.
//!
//! A mint with `decimals = d` stores balances as integers in units of
//! `10^-d`. The ledger only ever sees raw amounts; decimal amounts exist for
//! callers.

use crate::error::TokenError;

/// Lamports in one SOL. SOL behaves like a 9-decimal token.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Decimal precision of the native asset.
pub const SOL_DECIMALS: u8 = 9;

/// Convert a decimal amount to raw units: `floor(amount * 10^decimals)`.
///
/// Truncates toward zero. A product that sits within a few ulps of an
/// integer is taken as that integer, so amounts that are exact at this
/// scale (`0.29` at 2 decimals) survive the float multiplication intact.
pub fn to_raw(amount: f64, decimals: u8) -> Result<u64, TokenError> {
    if !amount.is_finite() {
        return Err(TokenError::InvalidAmount(format!(
            "amount must be finite, got {amount}"
        )));
    }
    if amount < 0.0 {
        return Err(TokenError::InvalidAmount(format!(
            "amount must be non-negative, got {amount}"
        )));
    }

    let scaled = amount * scale(decimals);
    // 2^64 is exactly representable; u64::MAX is not.
    if !scaled.is_finite() || scaled >= 18_446_744_073_709_551_616.0 {
        return Err(TokenError::InvalidAmount(format!(
            "{amount} at {decimals} decimals does not fit in a u64"
        )));
    }

    let nearest = scaled.round();
    let tolerance = scaled * f64::EPSILON * 4.0;
    let raw = if (scaled - nearest).abs() <= tolerance {
        nearest
    } else {
        scaled.floor()
    };

    Ok(raw as u64)
}

/// Convert raw units back to a decimal amount: `raw / 10^decimals`.
pub fn to_decimal(raw: u64, decimals: u8) -> f64 {
    raw as f64 / scale(decimals)
}

pub fn sol_to_lamports(sol: f64) -> Result<u64, TokenError> {
    to_raw(sol, SOL_DECIMALS)
}

pub fn lamports_to_sol(lamports: u64) -> f64 {
    to_decimal(lamports, SOL_DECIMALS)
}

fn scale(decimals: u8) -> f64 {
    10f64.powi(i32::from(decimals))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenth_at_two_decimals() {
        assert_eq!(to_raw(0.1, 2).unwrap(), 10);
    }

    #[test]
    fn negative_amount_rejected() {
        let err = to_raw(-1.0, 2).unwrap_err();
        assert!(matches!(err, TokenError::InvalidAmount(_)));
    }

    #[test]
    fn non_finite_amounts_rejected() {
        assert!(to_raw(f64::NAN, 6).is_err());
        assert!(to_raw(f64::INFINITY, 6).is_err());
        assert!(to_raw(f64::NEG_INFINITY, 6).is_err());
    }

    #[test]
    fn overflow_rejected() {
        assert!(to_raw(1e20, 0).is_err());
        assert!(to_raw(20.0, 18).is_err());
    }

    #[test]
    fn whole_amounts() {
        assert_eq!(to_raw(15.0, 6).unwrap(), 15_000_000);
        assert_eq!(to_raw(5.0, 0).unwrap(), 5);
        assert_eq!(to_raw(0.0, 9).unwrap(), 0);
    }

    #[test]
    fn exact_values_survive_float_error() {
        // 0.29 * 100 == 28.999999999999996 in f64.
        assert_eq!(to_raw(0.29, 2).unwrap(), 29);
        assert_eq!(to_raw(1.005, 3).unwrap(), 1005);
    }

    #[test]
    fn excess_precision_truncates() {
        assert_eq!(to_raw(1.239, 2).unwrap(), 123);
        assert_eq!(to_raw(0.0000019, 6).unwrap(), 1);
    }

    #[test]
    fn negative_zero_is_zero() {
        assert_eq!(to_raw(-0.0, 4).unwrap(), 0);
    }

    #[test]
    fn raw_to_decimal() {
        assert_eq!(to_decimal(15_000_000, 6), 15.0);
        assert_eq!(to_decimal(10, 2), 0.1);
        assert_eq!(to_decimal(7, 0), 7.0);
    }

    #[test]
    fn sol_conversion() {
        assert_eq!(sol_to_lamports(1.0).unwrap(), LAMPORTS_PER_SOL);
        assert_eq!(sol_to_lamports(0.5).unwrap(), 500_000_000);
        assert_eq!(lamports_to_sol(250_000_000), 0.25);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn roundtrip_within_one_unit(x in 0.0f64..1_000_000.0, d in 0u8..=6) {
                let raw = to_raw(x, d).unwrap();
                let back = to_decimal(raw, d);
                let unit = 10f64.powi(-i32::from(d));
                prop_assert!((back - x).abs() <= unit * (1.0 + 1e-9) + 1e-9);
            }

            #[test]
            fn exact_raw_values_roundtrip(raw in 0u64..1_000_000_000_000, d in 0u8..=9) {
                prop_assert_eq!(to_raw(to_decimal(raw, d), d).unwrap(), raw);
            }

            #[test]
            fn never_rounds_up_past_input(x in 0.0f64..1_000.0, d in 0u8..=6) {
                let raw = to_raw(x, d).unwrap();
                prop_assert!(to_decimal(raw, d) <= x + x * 1e-12);
            }
        }
    }
}
