//! Domain events
use crate::domain::value_objects::CouponCode;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouponEvent {
    Created { coupon_id: Uuid, code: CouponCode },
    Updated { coupon_id: Uuid, code: CouponCode },
    Deleted { coupon_id: Uuid },
}

impl CouponEvent {
    /// NATS subject the event is published on.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::Created { .. } => "coupons.created",
            Self::Updated { .. } => "coupons.updated",
            Self::Deleted { .. } => "coupons.deleted",
        }
    }
}
