//! OpenSASE Coupons
//!
//! Coupon and discount evaluation for the OpenSASE storefront.
//!
//! ## Features
//! - Coupon validation against a proposed cart
//! - Active coupon catalog and per-product best offer
//! - Client-side cart discount state
//! - Admin coupon management with product targeting

use thiserror::Error;

pub mod config;
pub mod domain;
pub mod http;
pub mod store;

pub use domain::aggregates::{AppliedCoupon, AppliesTo, Cart, CartDiscount, CartLine, Coupon, DiscountType};
pub use domain::services::{ActiveCouponCatalog, AppliedDiscount, BestOffer, CouponValidator, Rejection, ValidationOutcome};
pub use domain::value_objects::{CouponCode, ProductId};
pub use store::{CouponStore, MemoryCouponStore, PgCouponStore};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CouponError {
    #[error("Coupon not found")]
    CouponNotFound,

    #[error("Coupon code already exists")]
    DuplicateCode,

    #[error("Invalid coupon: {0}")]
    InvalidCoupon(String),

    #[error("Storage error: {0}")]
    StorageError(String),
}

impl From<sqlx::Error> for CouponError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => CouponError::DuplicateCode,
            _ => CouponError::StorageError(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CouponError>;
