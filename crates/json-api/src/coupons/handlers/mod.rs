//! Coupon Handlers

pub(crate) mod claim;
pub(crate) mod create;
pub(crate) mod index;
pub(crate) mod use_coupon;
