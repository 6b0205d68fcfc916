//! Aggregates module
pub mod coupon;
pub mod cart;

pub use coupon::{AppliesTo, Coupon, DiscountType};
pub use cart::{checked_sum, AppliedCoupon, Cart, CartDiscount, CartError, CartLine};
