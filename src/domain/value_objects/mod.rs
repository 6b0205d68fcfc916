//! Value Objects for coupons

use serde::{Deserialize, Serialize};
use std::fmt;

/// Storefront product identifier, as stored in the catalog's `products` table.
pub type ProductId = i64;

/// Coupon code value object. Codes are case-insensitive and always held uppercased.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CouponCode(String);

impl CouponCode {
    pub const MAX_LEN: usize = 50;

    pub fn new(value: impl AsRef<str>) -> Result<Self, CouponCodeError> {
        let value = value.as_ref().trim().to_uppercase();
        if value.is_empty() { return Err(CouponCodeError::Empty); }
        if value.len() > Self::MAX_LEN { return Err(CouponCodeError::TooLong); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl TryFrom<String> for CouponCode {
    type Error = CouponCodeError;
    fn try_from(value: String) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<CouponCode> for String {
    fn from(code: CouponCode) -> Self { code.0 }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CouponCodeError { Empty, TooLong }
impl std::error::Error for CouponCodeError {}
impl fmt::Display for CouponCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Empty => write!(f, "coupon code empty"), Self::TooLong => write!(f, "coupon code too long") }
    }
}
