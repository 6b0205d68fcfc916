//! Discount Calculator

use rust_decimal::Decimal;
use crate::domain::aggregates::DiscountType;

/// Monetary discount for `eligible_base`, clamped into `[0, cart_total]`.
///
/// Percentages are taken of the eligible base and then capped by `max_discount`.
/// A fixed discount is the flat `value` regardless of how many items matched.
pub fn compute_discount(
    discount_type: DiscountType,
    value: Decimal,
    eligible_base: Decimal,
    max_discount: Option<Decimal>,
    cart_total: Decimal,
) -> Decimal {
    let raw = match discount_type {
        DiscountType::Percentage => {
            // divide first only when the product itself would overflow
            let pct = eligible_base.checked_mul(value)
                .map(|p| p / Decimal::ONE_HUNDRED)
                .unwrap_or_else(|| (eligible_base / Decimal::ONE_HUNDRED).saturating_mul(value));
            max_discount.map_or(pct, |cap| pct.min(cap))
        }
        DiscountType::Fixed => value,
    };
    raw.min(cart_total).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_percentage_respects_cap() {
        assert_eq!(compute_discount(DiscountType::Percentage, dec!(50), dec!(1000), Some(dec!(100)), dec!(1000)), dec!(100));
        assert_eq!(compute_discount(DiscountType::Percentage, dec!(10), dec!(1000), None, dec!(1000)), dec!(100));
    }

    #[test]
    fn test_fixed_is_flat() {
        assert_eq!(compute_discount(DiscountType::Fixed, dec!(300), dec!(2000), None, dec!(2000)), dec!(300));
        // max_discount only caps percentages
        assert_eq!(compute_discount(DiscountType::Fixed, dec!(300), dec!(2000), Some(dec!(10)), dec!(2000)), dec!(300));
    }

    #[test]
    fn test_never_exceeds_cart_total() {
        assert_eq!(compute_discount(DiscountType::Percentage, dec!(1500), dec!(80), None, dec!(80)), dec!(80));
        assert_eq!(compute_discount(DiscountType::Percentage, dec!(50), dec!(80), Some(Decimal::ZERO), dec!(80)), Decimal::ZERO);
        assert_eq!(compute_discount(DiscountType::Fixed, dec!(50), Decimal::ZERO, None, Decimal::ZERO), Decimal::ZERO);
        assert_eq!(compute_discount(DiscountType::Fixed, dec!(500), dec!(60), None, dec!(160)), dec!(160));
    }

    #[test]
    fn test_huge_base_does_not_overflow() {
        let total = Decimal::from_i128_with_scale(7 * 10i128.pow(27), 0);
        assert_eq!(compute_discount(DiscountType::Percentage, dec!(100), total, None, total), total);
        assert_eq!(compute_discount(DiscountType::Percentage, dec!(1000), Decimal::MAX, None, dec!(50)), dec!(50));
    }
}
