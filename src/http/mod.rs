//! HTTP surface: storefront coupon endpoints plus the admin console API.

use axum::{http::StatusCode, middleware, response::{IntoResponse, Response}, routing::{get, post}, Json, Router};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;
use crate::domain::events::CouponEvent;
use crate::domain::services::{ActiveCouponCatalog, CouponValidator};
use crate::store::CouponStore;
use crate::CouponError;

mod admin;
mod coupons;
pub mod dto;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CouponStore>,
    pub validator: CouponValidator,
    pub catalog: ActiveCouponCatalog,
    pub nats: Option<async_nats::Client>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(store: Arc<dyn CouponStore>, nats: Option<async_nats::Client>, admin_token: Option<String>) -> Self {
        Self {
            validator: CouponValidator::new(store.clone()),
            catalog: ActiveCouponCatalog::new(store.clone()),
            store, nats, admin_token,
        }
    }

    /// Best-effort: a failed publish is logged and never fails the request.
    pub async fn publish(&self, event: CouponEvent) {
        let Some(nats) = &self.nats else { return };
        let payload = match serde_json::to_vec(&event) {
            Ok(p) => p,
            Err(e) => { warn!(error = %e, "failed to encode coupon event"); return; }
        };
        if let Err(e) = nats.publish(event.subject().to_string(), payload.into()).await {
            warn!(error = %e, subject = event.subject(), "failed to publish coupon event");
        }
    }
}

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/api/v1/admin/coupons", get(admin::list_coupons).post(admin::create_coupon))
        .route("/api/v1/admin/coupons/:id", get(admin::get_coupon).put(admin::update_coupon).delete(admin::delete_coupon))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin::require_admin));

    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "opensase-coupons"})) }))
        .route("/api/v1/coupons/validate", post(coupons::validate_coupon))
        .route("/api/v1/coupons/active", get(coupons::list_active))
        .route("/api/v1/coupons/best-offer", get(coupons::best_offer))
        .merge(admin)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}

/// Maps library errors onto HTTP responses. Storage details are logged, not returned.
pub struct ApiError(pub CouponError);

impl From<CouponError> for ApiError {
    fn from(e: CouponError) -> Self { Self(e) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            CouponError::CouponNotFound => StatusCode::NOT_FOUND,
            CouponError::DuplicateCode => StatusCode::CONFLICT,
            CouponError::InvalidCoupon(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CouponError::StorageError(e) => {
                tracing::error!(error = %e, "coupon storage failure");
                return (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({"error": "Internal server error"}))).into_response();
            }
        };
        (status, Json(serde_json::json!({"error": self.0.to_string()}))).into_response()
    }
}
