//! Monetary helpers
//!
//! All amounts are [`Decimal`]. Rounding happens once, at the point a
//! quote leaves the resolver.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places in every returned amount
pub const SCALE: u32 = 2;

/// Round to two decimal places, half-up
///
/// # Examples
/// ```
/// use rust_decimal::Decimal;
/// use shipcascade::money::round2;
/// assert_eq!(round2(Decimal::new(10005, 3)), Decimal::new(1001, 2));
/// assert_eq!(round2(Decimal::new(10004, 3)), Decimal::new(1000, 2));
/// ```
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse a user-supplied amount such as `"1500"` or `"12.50"`
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    raw.trim().parse::<Decimal>().ok()
}
