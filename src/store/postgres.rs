//! Postgres-backed coupon store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;
use super::CouponStore;
use crate::domain::aggregates::{AppliesTo, Coupon, DiscountType};
use crate::domain::value_objects::{CouponCode, ProductId};
use crate::{CouponError, Result};

const COUPON_COLUMNS: &str = "id, code, discount_type, discount_value, min_order_value, max_discount, valid_from, valid_until, is_active, usage_limit, used_count, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct CouponRow {
    id: Uuid, code: String, discount_type: String, discount_value: Decimal, min_order_value: Decimal,
    max_discount: Option<Decimal>, valid_from: Option<DateTime<Utc>>, valid_until: Option<DateTime<Utc>>,
    is_active: bool, usage_limit: Option<i32>, used_count: i32,
    created_at: DateTime<Utc>, updated_at: DateTime<Utc>,
}

impl CouponRow {
    fn into_coupon(self, product_ids: Vec<ProductId>) -> Result<Coupon> {
        let code = CouponCode::new(&self.code).map_err(|e| CouponError::StorageError(format!("malformed coupon row {}: {e}", self.id)))?;
        let discount_type = self.discount_type.parse::<DiscountType>().map_err(|e| CouponError::StorageError(format!("malformed coupon row {}: {e}", self.id)))?;
        Ok(Coupon {
            id: self.id, code, discount_type, discount_value: self.discount_value, min_order_value: self.min_order_value,
            max_discount: self.max_discount, valid_from: self.valid_from, valid_until: self.valid_until,
            is_active: self.is_active, usage_limit: self.usage_limit, used_count: self.used_count,
            applies_to: AppliesTo::from_ids(product_ids), created_at: self.created_at, updated_at: self.updated_at,
        })
    }
}

#[derive(Clone)]
pub struct PgCouponStore { db: PgPool }

impl PgCouponStore {
    pub fn new(db: PgPool) -> Self { Self { db } }

    /// Loads targeting rows for all `rows` in one round-trip and assembles coupons.
    async fn hydrate(&self, rows: Vec<CouponRow>) -> Result<Vec<Coupon>> {
        if rows.is_empty() { return Ok(vec![]); }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let links: Vec<(Uuid, i64)> = sqlx::query_as("SELECT coupon_id, product_id FROM coupon_products WHERE coupon_id = ANY($1)")
            .bind(&ids).fetch_all(&self.db).await?;
        let mut targets: HashMap<Uuid, Vec<ProductId>> = HashMap::new();
        for (coupon_id, product_id) in links { targets.entry(coupon_id).or_default().push(product_id); }
        rows.into_iter().map(|r| { let ids = targets.remove(&r.id).unwrap_or_default(); r.into_coupon(ids) }).collect()
    }

    async fn replace_targets(tx: &mut Transaction<'_, Postgres>, coupon: &Coupon) -> Result<()> {
        sqlx::query("DELETE FROM coupon_products WHERE coupon_id = $1").bind(coupon.id).execute(&mut **tx).await?;
        let ids = coupon.applies_to.product_ids();
        if !ids.is_empty() {
            sqlx::query("INSERT INTO coupon_products (coupon_id, product_id) SELECT $1, UNNEST($2::BIGINT[])")
                .bind(coupon.id).bind(&ids).execute(&mut **tx).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl CouponStore for PgCouponStore {
    #[tracing::instrument(skip(self))]
    async fn find_by_code(&self, code: &CouponCode) -> Result<Option<Coupon>> {
        let row = sqlx::query_as::<_, CouponRow>(&format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE code = $1"))
            .bind(code.as_str()).fetch_optional(&self.db).await?;
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn list_live(&self, now: DateTime<Utc>) -> Result<Vec<Coupon>> {
        let rows = sqlx::query_as::<_, CouponRow>(&format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE is_active AND (valid_from IS NULL OR valid_from <= $1) AND (valid_until IS NULL OR valid_until >= $1)"))
            .bind(now).fetch_all(&self.db).await?;
        self.hydrate(rows).await
    }

    async fn list_all(&self) -> Result<Vec<Coupon>> {
        let rows = sqlx::query_as::<_, CouponRow>(&format!("SELECT {COUPON_COLUMNS} FROM coupons ORDER BY created_at DESC"))
            .fetch_all(&self.db).await?;
        self.hydrate(rows).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Coupon>> {
        let row = sqlx::query_as::<_, CouponRow>(&format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE id = $1"))
            .bind(id).fetch_optional(&self.db).await?;
        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn insert(&self, c: &Coupon) -> Result<()> {
        let mut tx = self.db.begin().await?;
        sqlx::query(&format!("INSERT INTO coupons ({COUPON_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"))
            .bind(c.id).bind(c.code.as_str()).bind(c.discount_type.as_str()).bind(c.discount_value).bind(c.min_order_value)
            .bind(c.max_discount).bind(c.valid_from).bind(c.valid_until).bind(c.is_active).bind(c.usage_limit).bind(c.used_count)
            .bind(c.created_at).bind(c.updated_at)
            .execute(&mut *tx).await?;
        Self::replace_targets(&mut tx, c).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, c: &Coupon) -> Result<()> {
        let mut tx = self.db.begin().await?;
        let updated = sqlx::query("UPDATE coupons SET code = $2, discount_type = $3, discount_value = $4, min_order_value = $5, max_discount = $6, valid_from = $7, valid_until = $8, is_active = $9, usage_limit = $10, updated_at = $11 WHERE id = $1")
            .bind(c.id).bind(c.code.as_str()).bind(c.discount_type.as_str()).bind(c.discount_value).bind(c.min_order_value)
            .bind(c.max_discount).bind(c.valid_from).bind(c.valid_until).bind(c.is_active).bind(c.usage_limit).bind(c.updated_at)
            .execute(&mut *tx).await?;
        if updated.rows_affected() == 0 { return Err(CouponError::CouponNotFound); }
        Self::replace_targets(&mut tx, c).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let res = sqlx::query("DELETE FROM coupons WHERE id = $1").bind(id).execute(&self.db).await?;
        Ok(res.rows_affected() > 0)
    }
}
