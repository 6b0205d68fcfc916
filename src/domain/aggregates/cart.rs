//! Cart Aggregate
//!
//! The storefront's in-process cart and its single applied-coupon slot. The
//! applied discount is whatever the last validation returned; it is not
//! re-validated when totals are computed, so a coupon that expires mid-session
//! keeps applying until the shopper applies a code again.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::domain::aggregates::coupon::DiscountType;
use crate::domain::value_objects::{CouponCode, ProductId};

/// One line of a proposed cart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    #[serde(alias = "price")]
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    pub fn new(product_id: ProductId, unit_price: Decimal, quantity: u32) -> Self { Self { product_id, unit_price, quantity } }
    /// `None` when the line total does not fit in a `Decimal`.
    pub fn checked_line_total(&self) -> Option<Decimal> { self.unit_price.checked_mul(Decimal::from(self.quantity)) }
    pub fn line_total(&self) -> Decimal { self.unit_price.saturating_mul(Decimal::from(self.quantity)) }
}

/// Sum of line totals, `None` on overflow.
pub fn checked_sum<'a>(lines: impl IntoIterator<Item = &'a CartLine>) -> Option<Decimal> {
    lines.into_iter().try_fold(Decimal::ZERO, |acc, l| acc.checked_add(l.checked_line_total()?))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCoupon {
    pub code: CouponCode,
    pub discount_amount: Decimal,
    pub discount_type: DiscountType,
}

/// At most one coupon is ever applied; applying another replaces it.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CartDiscount {
    #[default]
    None,
    Applied(AppliedCoupon),
}

#[derive(Clone, Debug, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    discount: CartDiscount,
}

impl Cart {
    pub fn new() -> Self { Self::default() }

    pub fn lines(&self) -> &[CartLine] { &self.lines }
    pub fn discount(&self) -> &CartDiscount { &self.discount }
    pub fn is_empty(&self) -> bool { self.lines.is_empty() }

    pub fn applied_coupon(&self) -> Option<&AppliedCoupon> {
        match &self.discount { CartDiscount::Applied(c) => Some(c), CartDiscount::None => None }
    }

    pub fn add_line(&mut self, line: CartLine) {
        if let Some(existing) = self.lines.iter_mut().find(|l| l.product_id == line.product_id) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
        } else {
            self.lines.push(line);
        }
    }

    pub fn update_quantity(&mut self, product_id: ProductId, quantity: u32) -> Result<(), CartError> {
        let line = self.lines.iter_mut().find(|l| l.product_id == product_id).ok_or(CartError::ItemNotFound)?;
        if quantity == 0 { self.lines.retain(|l| l.product_id != product_id); }
        else { line.quantity = quantity; }
        Ok(())
    }

    pub fn remove_line(&mut self, product_id: ProductId) -> Result<(), CartError> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() == before { return Err(CartError::ItemNotFound); }
        Ok(())
    }

    pub fn clear(&mut self) { self.lines.clear(); self.discount = CartDiscount::None; }

    pub fn apply_coupon(&mut self, coupon: AppliedCoupon) { self.discount = CartDiscount::Applied(coupon); }
    pub fn remove_coupon(&mut self) { self.discount = CartDiscount::None; }

    pub fn subtotal(&self) -> Decimal { self.lines.iter().fold(Decimal::ZERO, |acc, l| acc.saturating_add(l.line_total())) }

    pub fn total(&self) -> Decimal {
        match &self.discount {
            CartDiscount::None => self.subtotal(),
            CartDiscount::Applied(c) => (self.subtotal() - c.discount_amount).max(Decimal::ZERO),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CartError { ItemNotFound }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "Item not found") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn applied(code: &str, amount: Decimal) -> AppliedCoupon {
        AppliedCoupon { code: CouponCode::new(code).unwrap(), discount_amount: amount, discount_type: DiscountType::Fixed }
    }

    #[test]
    fn test_cart_operations() {
        let mut cart = Cart::new();
        cart.add_line(CartLine::new(1, dec!(10), 2));
        cart.add_line(CartLine::new(1, dec!(10), 1));
        assert_eq!(cart.lines()[0].quantity, 3); // Merged
        cart.add_line(CartLine::new(2, dec!(5.50), 2));
        assert_eq!(cart.subtotal(), dec!(41));
        cart.update_quantity(2, 0).unwrap();
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.remove_line(9), Err(CartError::ItemNotFound));
    }

    #[test]
    fn test_huge_lines_saturate() {
        let mut cart = Cart::new();
        cart.add_line(CartLine::new(1, dec!(1), u32::MAX));
        cart.add_line(CartLine::new(1, dec!(1), 5));
        assert_eq!(cart.lines()[0].quantity, u32::MAX);
        cart.add_line(CartLine::new(2, Decimal::MAX, 2));
        assert_eq!(cart.subtotal(), Decimal::MAX);
        assert_eq!(checked_sum(cart.lines()), None);
        assert_eq!(CartLine::new(3, dec!(2.5), 4).checked_line_total(), Some(dec!(10)));
    }

    #[test]
    fn test_apply_then_remove_restores_total() {
        let mut cart = Cart::new();
        cart.add_line(CartLine::new(7, dec!(30), 2));
        cart.add_line(CartLine::new(9, dec!(100), 1));
        let before = cart.total();
        cart.apply_coupon(applied("FLAT50", dec!(50)));
        assert_eq!(cart.total(), dec!(110));
        cart.remove_coupon();
        assert_eq!(cart.total(), before);
        assert_eq!(cart.discount(), &CartDiscount::None);
    }

    #[test]
    fn test_apply_replaces_and_total_never_negative() {
        let mut cart = Cart::new();
        cart.add_line(CartLine::new(1, dec!(20), 1));
        cart.apply_coupon(applied("FIRST", dec!(5)));
        cart.apply_coupon(applied("SECOND", dec!(500)));
        assert_eq!(cart.applied_coupon().unwrap().code.as_str(), "SECOND");
        assert_eq!(cart.total(), Decimal::ZERO);
    }
}
