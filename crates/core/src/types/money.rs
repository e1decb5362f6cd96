//! Money helpers for ticket prices.
//!
//! Prices are plain [`Decimal`] values in euros. Totals are computed
//! exactly over line items and rounded to 2 decimals exactly once, at the
//! point the total is produced.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round an amount to 2 decimal places, half away from zero.
///
/// `123.456` becomes `123.46`, `0.125` becomes `0.13`.
#[must_use]
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use rust_decimal::dec;

    use super::*;

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(dec!(123.456)), dec!(123.46));
        assert_eq!(round2(dec!(0.125)), dec!(0.13));
        assert_eq!(round2(dec!(2.344)), dec!(2.34));
    }

    #[test]
    fn test_round2_integral_amounts_unchanged() {
        assert_eq!(round2(dec!(25)), dec!(25));
        assert_eq!(round2(dec!(10.50)), dec!(10.50));
    }
}
