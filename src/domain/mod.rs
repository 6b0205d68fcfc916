//! Coupon domain: value objects, aggregates, events and the evaluation services.
pub mod aggregates;
pub mod events;
pub mod services;
pub mod value_objects;
