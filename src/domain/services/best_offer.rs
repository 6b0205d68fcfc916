//! Best-Offer Selector

use rust_decimal::Decimal;
use crate::domain::aggregates::Coupon;
use crate::domain::services::calculator::compute_discount;
use crate::domain::value_objects::ProductId;

#[derive(Clone, Debug, PartialEq)]
pub struct BestOffer<'a> {
    pub coupon: Option<&'a Coupon>,
    pub savings: Decimal,
}

/// Picks the coupon saving the most on one unit of `product_id` at `price`.
///
/// A candidate only replaces the current best when its savings are strictly
/// greater, so on a tie the coupon listed first wins and a coupon saving
/// nothing is never offered.
pub fn select_best(coupons: &[Coupon], price: Decimal, product_id: ProductId) -> BestOffer<'_> {
    let mut best = BestOffer { coupon: None, savings: Decimal::ZERO };
    for coupon in coupons {
        if !coupon.applies_to.includes(product_id) || price < coupon.min_order_value { continue; }
        let savings = compute_discount(coupon.discount_type, coupon.discount_value, price, coupon.max_discount, price).min(price);
        if savings > best.savings {
            best = BestOffer { coupon: Some(coupon), savings };
        }
    }
    best
}
