//! Discount evaluation services
pub mod best_offer;
pub mod calculator;
pub mod catalog;
pub mod validator;

pub use best_offer::{select_best, BestOffer};
pub use calculator::compute_discount;
pub use catalog::ActiveCouponCatalog;
pub use validator::{AppliedDiscount, CouponValidator, Rejection, ValidationOutcome};
