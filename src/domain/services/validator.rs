//! Coupon Validator
//!
//! Evaluates one coupon code against a proposed cart. Business-rule failures
//! come back as [`ValidationOutcome::Invalid`]; only store failures are errors.
//! Validation is read-only: it never reserves a use or touches `used_count`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use crate::domain::aggregates::{checked_sum, AppliedCoupon, AppliesTo, CartLine, Coupon, DiscountType};
use crate::domain::services::calculator::compute_discount;
use crate::domain::value_objects::{CouponCode, CouponCodeError};
use crate::store::CouponStore;
use crate::Result;

/// Why a coupon was turned down. The `Display` text is shown to the shopper.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Rejection {
    #[error("Invalid request")]
    MalformedRequest,
    #[error("No coupon code provided")]
    MissingCode,
    #[error("Invalid coupon code")]
    UnknownCode,
    #[error("This coupon is no longer active")]
    Inactive,
    #[error("This coupon is not yet valid")]
    NotYetValid,
    #[error("This coupon has expired")]
    Expired,
    #[error("Coupon usage limit exceeded")]
    UsageLimitReached,
    #[error("Minimum order of {0} required")]
    BelowMinimumOrder(Decimal),
    #[error("Coupon is not applicable to items in your cart")]
    NotApplicable,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppliedDiscount {
    pub code: CouponCode,
    pub discount_type: DiscountType,
    pub eligible_base: Decimal,
    pub discount_amount: Decimal,
    pub new_total: Decimal,
}

impl AppliedDiscount {
    /// What the cart keeps once the shopper applies this result.
    pub fn to_applied_coupon(&self) -> AppliedCoupon {
        AppliedCoupon { code: self.code.clone(), discount_amount: self.discount_amount, discount_type: self.discount_type }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ValidationOutcome {
    Valid(AppliedDiscount),
    Invalid(Rejection),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool { matches!(self, Self::Valid(_)) }
}

/// Runs the eligibility gate for an already-loaded coupon. Checks short-circuit
/// in a fixed order so the shopper always sees the first failing rule.
pub fn evaluate(coupon: &Coupon, lines: &[CartLine], cart_total: Decimal, now: DateTime<Utc>) -> ValidationOutcome {
    use ValidationOutcome::Invalid;

    if !coupon.is_active { return Invalid(Rejection::Inactive); }
    if !coupon.has_started(now) { return Invalid(Rejection::NotYetValid); }
    if coupon.has_ended(now) { return Invalid(Rejection::Expired); }
    if coupon.is_exhausted() { return Invalid(Rejection::UsageLimitReached); }
    if cart_total < coupon.min_order_value { return Invalid(Rejection::BelowMinimumOrder(coupon.min_order_value)); }

    let eligible_base = match &coupon.applies_to {
        AppliesTo::All => cart_total,
        AppliesTo::Products(ids) => {
            let mut matched = lines.iter().filter(|l| ids.contains(&l.product_id)).peekable();
            if matched.peek().is_none() { return Invalid(Rejection::NotApplicable); }
            let Some(base) = checked_sum(matched) else { return Invalid(Rejection::MalformedRequest) };
            base
        }
    };

    let discount_amount = compute_discount(coupon.discount_type, coupon.discount_value, eligible_base, coupon.max_discount, cart_total);
    ValidationOutcome::Valid(AppliedDiscount {
        code: coupon.code.clone(),
        discount_type: coupon.discount_type,
        eligible_base,
        discount_amount,
        new_total: cart_total - discount_amount,
    })
}

#[derive(Clone)]
pub struct CouponValidator {
    store: Arc<dyn CouponStore>,
}

impl CouponValidator {
    pub fn new(store: Arc<dyn CouponStore>) -> Self { Self { store } }

    #[tracing::instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn validate(&self, code: Option<&str>, lines: &[CartLine], cart_total: Decimal, now: DateTime<Utc>) -> Result<ValidationOutcome> {
        let code = match code.map(CouponCode::new) {
            None | Some(Err(CouponCodeError::Empty)) => return Ok(ValidationOutcome::Invalid(Rejection::MissingCode)),
            Some(Err(CouponCodeError::TooLong)) => return Ok(ValidationOutcome::Invalid(Rejection::UnknownCode)),
            Some(Ok(code)) => code,
        };
        let Some(coupon) = self.store.find_by_code(&code).await? else {
            debug!(%code, "unknown coupon code");
            return Ok(ValidationOutcome::Invalid(Rejection::UnknownCode));
        };
        let outcome = evaluate(&coupon, lines, cart_total, now);
        if let ValidationOutcome::Invalid(reason) = &outcome {
            debug!(%code, %reason, "coupon rejected");
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCouponStore;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn coupon(code: &str, discount_type: DiscountType, value: Decimal) -> Coupon {
        Coupon::create(CouponCode::new(code).unwrap(), discount_type, value)
    }

    fn validator(coupons: Vec<Coupon>) -> CouponValidator {
        CouponValidator::new(Arc::new(MemoryCouponStore::with_coupons(coupons)))
    }

    #[tokio::test]
    async fn test_save10_capped() {
        let mut c = coupon("SAVE10", DiscountType::Percentage, dec!(10));
        c.min_order_value = dec!(500);
        c.max_discount = Some(dec!(150));
        let outcome = validator(vec![c]).validate(Some("save10"), &[CartLine::new(1, dec!(1000), 2)], dec!(2000), Utc::now()).await.unwrap();
        let ValidationOutcome::Valid(applied) = outcome else { panic!("expected valid outcome") };
        assert_eq!(applied.code.as_str(), "SAVE10");
        assert_eq!(applied.eligible_base, dec!(2000));
        assert_eq!(applied.discount_amount, dec!(150));
        assert_eq!(applied.new_total, dec!(1850));
    }

    #[tokio::test]
    async fn test_flat50_targeted() {
        let mut c = coupon("FLAT50", DiscountType::Fixed, dec!(50));
        c.applies_to = AppliesTo::from_ids([7]);
        let lines = [CartLine::new(7, dec!(30), 2), CartLine::new(9, dec!(100), 1)];
        let outcome = validator(vec![c]).validate(Some("FLAT50"), &lines, dec!(160), Utc::now()).await.unwrap();
        let ValidationOutcome::Valid(applied) = outcome else { panic!("expected valid outcome") };
        assert_eq!(applied.eligible_base, dec!(60));
        assert_eq!(applied.discount_amount, dec!(50));
        assert_eq!(applied.new_total, dec!(110));
    }

    #[tokio::test]
    async fn test_missing_and_unknown_code() {
        let v = validator(vec![]);
        let now = Utc::now();
        assert_eq!(v.validate(None, &[], dec!(10), now).await.unwrap(), ValidationOutcome::Invalid(Rejection::MissingCode));
        assert_eq!(v.validate(Some("  "), &[], dec!(10), now).await.unwrap(), ValidationOutcome::Invalid(Rejection::MissingCode));
        assert_eq!(v.validate(Some("NOPE"), &[], dec!(10), now).await.unwrap(), ValidationOutcome::Invalid(Rejection::UnknownCode));
    }

    #[test]
    fn test_gate_order() {
        let now = Utc::now();
        let lines = [CartLine::new(1, dec!(10), 1)];
        let mut c = coupon("GATE", DiscountType::Fixed, dec!(5));
        c.is_active = false;
        c.valid_from = Some(now + Duration::days(1));
        c.valid_until = Some(now - Duration::days(1));
        c.usage_limit = Some(1);
        c.used_count = 1;
        c.min_order_value = dec!(100);
        c.applies_to = AppliesTo::from_ids([99]);

        assert_eq!(evaluate(&c, &lines, dec!(10), now), ValidationOutcome::Invalid(Rejection::Inactive));
        c.is_active = true;
        assert_eq!(evaluate(&c, &lines, dec!(10), now), ValidationOutcome::Invalid(Rejection::NotYetValid));
        c.valid_from = None;
        assert_eq!(evaluate(&c, &lines, dec!(10), now), ValidationOutcome::Invalid(Rejection::Expired));
        c.valid_until = None;
        assert_eq!(evaluate(&c, &lines, dec!(10), now), ValidationOutcome::Invalid(Rejection::UsageLimitReached));
        c.usage_limit = None;
        assert_eq!(evaluate(&c, &lines, dec!(10), now), ValidationOutcome::Invalid(Rejection::BelowMinimumOrder(dec!(100))));
        c.min_order_value = Decimal::ZERO;
        assert_eq!(evaluate(&c, &lines, dec!(10), now), ValidationOutcome::Invalid(Rejection::NotApplicable));
        c.applies_to = AppliesTo::All;
        assert!(evaluate(&c, &lines, dec!(10), now).is_valid());
    }

    #[test]
    fn test_targeted_percentage_uses_matched_lines() {
        let mut c = coupon("PCT10", DiscountType::Percentage, dec!(10));
        c.applies_to = AppliesTo::from_ids([7]);
        let lines = [CartLine::new(7, dec!(30), 2), CartLine::new(9, dec!(100), 1)];
        let ValidationOutcome::Valid(applied) = evaluate(&c, &lines, dec!(160), Utc::now()) else { panic!("expected valid outcome") };
        assert_eq!(applied.eligible_base, dec!(60));
        assert_eq!(applied.discount_amount, dec!(6));
        assert_eq!(applied.new_total, dec!(154));
    }

    #[test]
    fn test_overflowing_targeted_lines_rejected() {
        let mut c = coupon("BIG", DiscountType::Percentage, dec!(10));
        c.applies_to = AppliesTo::from_ids([1]);
        let lines = [CartLine::new(1, Decimal::MAX, 2)];
        assert_eq!(evaluate(&c, &lines, dec!(10), Utc::now()), ValidationOutcome::Invalid(Rejection::MalformedRequest));
    }

    #[test]
    fn test_fixed_not_scaled_by_matches() {
        let mut c = coupon("FIX300", DiscountType::Fixed, dec!(300));
        c.applies_to = AppliesTo::from_ids([1, 2]);
        let lines = [CartLine::new(1, dec!(500), 2), CartLine::new(2, dec!(1000), 1)];
        let ValidationOutcome::Valid(applied) = evaluate(&c, &lines, dec!(2000), Utc::now()) else { panic!("expected valid outcome") };
        assert_eq!(applied.eligible_base, dec!(2000));
        assert_eq!(applied.discount_amount, dec!(300));
    }

    #[test]
    fn test_adversarial_values_stay_in_range() {
        let now = Utc::now();
        for (kind, value, cap, total) in [
            (DiscountType::Percentage, dec!(1500), None, dec!(80)),
            (DiscountType::Percentage, dec!(40), Some(Decimal::ZERO), dec!(80)),
            (DiscountType::Fixed, dec!(999), None, Decimal::ZERO),
        ] {
            let mut c = coupon("EDGE", kind, value);
            c.max_discount = cap;
            let ValidationOutcome::Valid(applied) = evaluate(&c, &[], total, now) else { panic!("expected valid outcome") };
            assert!(applied.discount_amount >= Decimal::ZERO && applied.discount_amount <= total);
            assert!(applied.new_total >= Decimal::ZERO);
        }
    }
}
