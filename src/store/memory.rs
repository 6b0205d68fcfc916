//! In-memory store for tests and local development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;
use super::CouponStore;
use crate::domain::aggregates::Coupon;
use crate::domain::value_objects::CouponCode;
use crate::{CouponError, Result};

#[derive(Default)]
pub struct MemoryCouponStore {
    coupons: RwLock<HashMap<Uuid, Coupon>>,
}

impl MemoryCouponStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_coupons(coupons: impl IntoIterator<Item = Coupon>) -> Self {
        Self { coupons: RwLock::new(coupons.into_iter().map(|c| (c.id, c)).collect()) }
    }
}

#[async_trait]
impl CouponStore for MemoryCouponStore {
    async fn find_by_code(&self, code: &CouponCode) -> Result<Option<Coupon>> {
        Ok(self.coupons.read().await.values().find(|c| &c.code == code).cloned())
    }

    async fn list_live(&self, now: DateTime<Utc>) -> Result<Vec<Coupon>> {
        Ok(self.coupons.read().await.values().filter(|c| c.is_live(now)).cloned().collect())
    }

    async fn list_all(&self) -> Result<Vec<Coupon>> {
        let mut all: Vec<_> = self.coupons.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Coupon>> {
        Ok(self.coupons.read().await.get(&id).cloned())
    }

    async fn insert(&self, coupon: &Coupon) -> Result<()> {
        let mut coupons = self.coupons.write().await;
        if coupons.values().any(|c| c.code == coupon.code) { return Err(CouponError::DuplicateCode); }
        coupons.insert(coupon.id, coupon.clone());
        Ok(())
    }

    async fn update(&self, coupon: &Coupon) -> Result<()> {
        let mut coupons = self.coupons.write().await;
        if !coupons.contains_key(&coupon.id) { return Err(CouponError::CouponNotFound); }
        if coupons.values().any(|c| c.id != coupon.id && c.code == coupon.code) { return Err(CouponError::DuplicateCode); }
        coupons.insert(coupon.id, coupon.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.coupons.write().await.remove(&id).is_some())
    }
}
