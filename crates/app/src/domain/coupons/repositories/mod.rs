//! Coupon Repositories

mod coupons;
mod user_coupons;

pub(crate) use coupons::PgCouponsRepository;
pub(crate) use user_coupons::PgUserCouponsRepository;
