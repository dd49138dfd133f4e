//! Points
//!
//! Request orchestration on top of the wallet engine and the idempotency
//! coordinator.

pub mod data;
pub mod errors;
pub mod models;
pub mod service;

pub use errors::PointsServiceError;
pub use service::*;
