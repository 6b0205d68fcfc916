//! Active-Coupon Catalog

use chrono::{DateTime, Utc};
use std::sync::Arc;
use crate::domain::aggregates::Coupon;
use crate::store::CouponStore;
use crate::Result;

/// Coupons currently on offer, for surfacing without a code.
///
/// Only the active flag and validity window are applied here. Usage limits and
/// minimum order values depend on the cart and are left to the validator and
/// the best-offer selector. Ordering is unspecified.
#[derive(Clone)]
pub struct ActiveCouponCatalog {
    store: Arc<dyn CouponStore>,
}

impl ActiveCouponCatalog {
    pub fn new(store: Arc<dyn CouponStore>) -> Self { Self { store } }

    #[tracing::instrument(skip(self))]
    pub async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<Coupon>> {
        self.store.list_live(now).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::DiscountType;
    use crate::domain::value_objects::CouponCode;
    use crate::store::MemoryCouponStore;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_lists_only_live_coupons() {
        let now = Utc::now();
        let make = |code: &str| Coupon::create(CouponCode::new(code).unwrap(), DiscountType::Percentage, dec!(10));
        let open = make("OPEN");
        let mut inactive = make("OFF");
        inactive.is_active = false;
        let mut future = make("SOON");
        future.valid_from = Some(now + Duration::hours(1));
        let mut expired = make("OLD");
        expired.valid_until = Some(now - Duration::hours(1));
        let mut exhausted = make("USEDUP");
        exhausted.usage_limit = Some(0);
        exhausted.min_order_value = dec!(10000);

        let catalog = ActiveCouponCatalog::new(Arc::new(MemoryCouponStore::with_coupons([open, inactive, future, expired, exhausted])));
        let mut codes: Vec<_> = catalog.list_active(now).await.unwrap().into_iter().map(|c| c.code.to_string()).collect();
        codes.sort();
        assert_eq!(codes, vec!["OPEN", "USEDUP"]);
    }
}
