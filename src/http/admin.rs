//! Admin console endpoints. Mutations raise [`CouponEvent`]s.

use axum::{extract::{Path, Request, State}, http::{header, StatusCode}, middleware::Next, response::{IntoResponse, Response}, Json};
use tracing::info;
use uuid::Uuid;
use super::dto::{CouponInput, CouponView};
use super::{ApiError, AppState};
use crate::domain::events::CouponEvent;
use crate::CouponError;

/// Requires `Authorization: Bearer <ADMIN_TOKEN>` when a token is configured.
pub(super) async fn require_admin(State(s): State<AppState>, req: Request, next: Next) -> Response {
    if let Some(token) = s.admin_token.as_deref() {
        let presented = req.headers().get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()).and_then(|v| v.strip_prefix("Bearer "));
        if presented != Some(token) {
            return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({"error": "Unauthorized"}))).into_response();
        }
    }
    next.run(req).await
}

pub(super) async fn list_coupons(State(s): State<AppState>) -> Result<Json<Vec<CouponView>>, ApiError> {
    let coupons = s.store.list_all().await?;
    Ok(Json(coupons.iter().map(CouponView::from).collect()))
}

pub(super) async fn get_coupon(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CouponView>, ApiError> {
    let coupon = s.store.get(id).await?.ok_or(CouponError::CouponNotFound)?;
    Ok(Json(CouponView::from(&coupon)))
}

pub(super) async fn create_coupon(State(s): State<AppState>, Json(r): Json<CouponInput>) -> Result<(StatusCode, Json<CouponView>), ApiError> {
    let coupon = r.into_coupon()?;
    s.store.insert(&coupon).await?;
    info!(coupon_id = %coupon.id, code = %coupon.code, "coupon created");
    s.publish(CouponEvent::Created { coupon_id: coupon.id, code: coupon.code.clone() }).await;
    Ok((StatusCode::CREATED, Json(CouponView::from(&coupon))))
}

pub(super) async fn update_coupon(State(s): State<AppState>, Path(id): Path<Uuid>, Json(r): Json<CouponInput>) -> Result<Json<CouponView>, ApiError> {
    let mut coupon = s.store.get(id).await?.ok_or(CouponError::CouponNotFound)?;
    r.apply_to(&mut coupon)?;
    s.store.update(&coupon).await?;
    info!(coupon_id = %coupon.id, code = %coupon.code, "coupon updated");
    s.publish(CouponEvent::Updated { coupon_id: coupon.id, code: coupon.code.clone() }).await;
    Ok(Json(CouponView::from(&coupon)))
}

pub(super) async fn delete_coupon(State(s): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    if !s.store.delete(id).await? { return Err(CouponError::CouponNotFound.into()); }
    info!(coupon_id = %id, "coupon deleted");
    s.publish(CouponEvent::Deleted { coupon_id: id }).await;
    Ok(StatusCode::NO_CONTENT)
}
