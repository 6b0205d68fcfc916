//! Wire types. Field names are part of the storefront contract.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};
use crate::domain::aggregates::{checked_sum, AppliesTo, CartLine, Coupon, DiscountType};
use crate::domain::services::{BestOffer, Rejection, ValidationOutcome};
use crate::domain::value_objects::{CouponCode, ProductId};
use crate::{CouponError, Result};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub cart_items: Vec<CartLine>,
    /// Falls back to the sum of `cart_items` when omitted.
    #[serde(default)]
    pub cart_total: Option<Decimal>,
}

impl ValidateCouponRequest {
    /// `None` when the submitted lines overflow.
    pub fn cart_total(&self) -> Option<Decimal> {
        self.cart_total.or_else(|| checked_sum(&self.cart_items))
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCouponResponse {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<CouponCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_type: Option<DiscountType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_total: Option<Decimal>,
}

impl ValidateCouponResponse {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self { valid: false, message: message.into(), code: None, discount_type: None, discount_amount: None, new_total: None }
    }
}

impl From<Rejection> for ValidateCouponResponse {
    fn from(reason: Rejection) -> Self { Self::rejected(reason.to_string()) }
}

impl From<ValidationOutcome> for ValidateCouponResponse {
    fn from(outcome: ValidationOutcome) -> Self {
        match outcome {
            ValidationOutcome::Invalid(reason) => reason.into(),
            ValidationOutcome::Valid(applied) => Self {
                valid: true,
                message: "Coupon applied successfully".to_string(),
                code: Some(applied.code),
                discount_type: Some(applied.discount_type),
                discount_amount: Some(applied.discount_amount),
                new_total: Some(applied.new_total),
            },
        }
    }
}

/// A coupon with its targeting flattened to `productIds` (empty = whole cart).
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponView {
    pub id: Uuid,
    pub code: CouponCode,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_order_value: Decimal,
    pub max_discount: Option<Decimal>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub product_ids: Vec<ProductId>,
}

impl From<&Coupon> for CouponView {
    fn from(c: &Coupon) -> Self {
        Self {
            id: c.id, code: c.code.clone(), discount_type: c.discount_type, discount_value: c.discount_value,
            min_order_value: c.min_order_value, max_discount: c.max_discount, valid_from: c.valid_from,
            valid_until: c.valid_until, is_active: c.is_active, usage_limit: c.usage_limit, used_count: c.used_count,
            created_at: c.created_at, updated_at: c.updated_at, product_ids: c.applies_to.product_ids(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestOfferQuery {
    pub product_id: ProductId,
    pub price: Decimal,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestOfferResponse {
    pub best_coupon: Option<CouponView>,
    pub savings: Decimal,
}

impl From<BestOffer<'_>> for BestOfferResponse {
    fn from(offer: BestOffer<'_>) -> Self {
        Self { best_coupon: offer.coupon.map(CouponView::from), savings: offer.savings }
    }
}

/// Admin create/update payload.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_coupon_input", skip_on_field_errors = false))]
pub struct CouponInput {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    #[serde(default)]
    pub min_order_value: Decimal,
    pub max_discount: Option<Decimal>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[validate(range(min = 0))]
    pub usage_limit: Option<i32>,
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
}

fn default_active() -> bool { true }

/// Amounts are stored as NUMERIC(12, 2).
const MAX_SCALE: u32 = 2;

fn validate_coupon_input(input: &CouponInput) -> std::result::Result<(), ValidationError> {
    let amounts = [Some(input.discount_value), Some(input.min_order_value), input.max_discount];
    if amounts.iter().flatten().any(|a| a.scale() > MAX_SCALE) { return Err(ValidationError::new("too_many_decimal_places")); }
    if input.discount_value.is_sign_negative() { return Err(ValidationError::new("negative_discount_value")); }
    if input.discount_type == DiscountType::Percentage && input.discount_value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::new("percentage_over_100"));
    }
    if input.min_order_value.is_sign_negative() { return Err(ValidationError::new("negative_min_order_value")); }
    if input.max_discount.map_or(false, |m| m.is_sign_negative()) { return Err(ValidationError::new("negative_max_discount")); }
    if let (Some(from), Some(until)) = (input.valid_from, input.valid_until) {
        if from > until { return Err(ValidationError::new("valid_from_after_valid_until")); }
    }
    Ok(())
}

impl CouponInput {
    fn checked(&self) -> Result<CouponCode> {
        self.validate().map_err(|e| CouponError::InvalidCoupon(e.to_string()))?;
        CouponCode::new(&self.code).map_err(|e| CouponError::InvalidCoupon(e.to_string()))
    }

    pub fn into_coupon(self) -> Result<Coupon> {
        let code = self.checked()?;
        let mut coupon = Coupon::create(code, self.discount_type, self.discount_value);
        self.write_to(&mut coupon);
        Ok(coupon)
    }

    /// Overwrites every admin-editable field; `used_count` and timestamps are kept.
    pub fn apply_to(self, coupon: &mut Coupon) -> Result<()> {
        coupon.code = self.checked()?;
        coupon.discount_type = self.discount_type;
        coupon.discount_value = self.discount_value;
        self.write_to(coupon);
        coupon.touch();
        Ok(())
    }

    fn write_to(self, coupon: &mut Coupon) {
        coupon.min_order_value = self.min_order_value;
        coupon.max_discount = self.max_discount;
        coupon.valid_from = self.valid_from;
        coupon.valid_until = self.valid_until;
        coupon.is_active = self.is_active;
        coupon.usage_limit = self.usage_limit;
        coupon.applies_to = AppliesTo::from_ids(self.product_ids);
    }
}
