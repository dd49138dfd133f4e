//! Tally Domain Concerns

pub mod coupons;
pub mod idempotency;
pub mod points;
pub mod users;
pub mod wallets;
