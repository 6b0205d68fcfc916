//! Coupon Record Store
//!
//! Persistence port for coupons and their product targeting. Every coupon handed
//! out carries its full set of targeted product ids.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;
use crate::domain::aggregates::Coupon;
use crate::domain::value_objects::CouponCode;
use crate::Result;

mod memory;
mod postgres;

pub use memory::MemoryCouponStore;
pub use postgres::PgCouponStore;

#[async_trait]
pub trait CouponStore: Send + Sync {
    async fn find_by_code(&self, code: &CouponCode) -> Result<Option<Coupon>>;

    /// Coupons that are active with `now` inside their validity window.
    async fn list_live(&self, now: DateTime<Utc>) -> Result<Vec<Coupon>>;

    async fn list_all(&self) -> Result<Vec<Coupon>>;

    async fn get(&self, id: Uuid) -> Result<Option<Coupon>>;

    async fn insert(&self, coupon: &Coupon) -> Result<()>;

    /// Overwrites the coupon and replaces its whole targeting set.
    async fn update(&self, coupon: &Coupon) -> Result<()>;

    /// Returns `false` when no coupon had that id.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
