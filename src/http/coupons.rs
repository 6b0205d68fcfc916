//! Storefront coupon endpoints.

use axum::{extract::{rejection::JsonRejection, Query, State}, http::StatusCode, Json};
use chrono::Utc;
use tracing::debug;
use super::dto::{BestOfferQuery, BestOfferResponse, CouponView, ValidateCouponRequest, ValidateCouponResponse};
use super::{ApiError, AppState};
use crate::domain::services::{select_best, Rejection};

/// Business rejections are 200s; only a failed store lookup is a 500.
pub(super) async fn validate_coupon(
    State(s): State<AppState>,
    payload: Result<Json<ValidateCouponRequest>, JsonRejection>,
) -> (StatusCode, Json<ValidateCouponResponse>) {
    let Json(r) = match payload {
        Ok(r) => r,
        Err(e) => {
            debug!(error = %e, "malformed coupon validation request");
            return (StatusCode::OK, Json(Rejection::MalformedRequest.into()));
        }
    };
    let Some(cart_total) = r.cart_total() else {
        debug!("cart total overflowed");
        return (StatusCode::OK, Json(Rejection::MalformedRequest.into()));
    };
    match s.validator.validate(r.code.as_deref(), &r.cart_items, cart_total, Utc::now()).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome.into())),
        Err(e) => {
            tracing::error!(error = %e, "coupon validation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ValidateCouponResponse::rejected("Failed to validate coupon")))
        }
    }
}

pub(super) async fn list_active(State(s): State<AppState>) -> Result<Json<Vec<CouponView>>, ApiError> {
    let coupons = s.catalog.list_active(Utc::now()).await?;
    Ok(Json(coupons.iter().map(CouponView::from).collect()))
}

pub(super) async fn best_offer(State(s): State<AppState>, Query(q): Query<BestOfferQuery>) -> Result<Json<BestOfferResponse>, ApiError> {
    let mut coupons = s.catalog.list_active(Utc::now()).await?;
    // oldest first, so equal savings resolve to the longest-running offer
    coupons.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.code.as_str().cmp(b.code.as_str())));
    Ok(Json(select_best(&coupons, q.price, q.product_id).into()))
}
