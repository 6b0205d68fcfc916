//! Coupon Aggregate

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use uuid::Uuid;
use crate::domain::value_objects::{CouponCode, ProductId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType { Percentage, Fixed }

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Percentage => "PERCENTAGE", Self::Fixed => "FIXED" }
    }
}

impl FromStr for DiscountType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PERCENTAGE" => Ok(Self::Percentage),
            "FIXED" => Ok(Self::Fixed),
            other => Err(format!("unknown discount type {other:?}")),
        }
    }
}

/// Which products a coupon may discount.
///
/// Stored and sent over the wire as a plain list of product ids where an empty
/// list means the whole cart. `All` and `Products` keep that convention explicit
/// inside the engine; `Products` is never empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AppliesTo {
    #[default]
    All,
    Products(BTreeSet<ProductId>),
}

impl AppliesTo {
    pub fn from_ids(ids: impl IntoIterator<Item = ProductId>) -> Self {
        let ids: BTreeSet<_> = ids.into_iter().collect();
        if ids.is_empty() { Self::All } else { Self::Products(ids) }
    }

    pub fn includes(&self, product_id: ProductId) -> bool {
        match self { Self::All => true, Self::Products(ids) => ids.contains(&product_id) }
    }

    /// Wire form: empty for `All`.
    pub fn product_ids(&self) -> Vec<ProductId> {
        match self { Self::All => vec![], Self::Products(ids) => ids.iter().copied().collect() }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Coupon {
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
    pub applies_to: AppliesTo,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    pub fn create(code: CouponCode, discount_type: DiscountType, discount_value: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(), code, discount_type, discount_value,
            min_order_value: Decimal::ZERO, max_discount: None, valid_from: None, valid_until: None,
            is_active: true, usage_limit: None, used_count: 0, applies_to: AppliesTo::All,
            created_at: now, updated_at: now,
        }
    }

    pub fn has_started(&self, now: DateTime<Utc>) -> bool { self.valid_from.map_or(true, |from| from <= now) }
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool { self.valid_until.map_or(false, |until| until < now) }

    /// Active flag set and `now` inside the (inclusive) validity window.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.has_started(now) && !self.has_ended(now)
    }

    pub fn is_exhausted(&self) -> bool { self.usage_limit.map_or(false, |limit| self.used_count >= limit) }

    pub fn touch(&mut self) { self.updated_at = Utc::now(); }
}
