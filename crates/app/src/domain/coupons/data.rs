//! Coupon Data

use jiff::Timestamp;

use crate::domain::coupons::records::CouponUuid;

/// New Coupon Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewCoupon {
    pub uuid: CouponUuid,
    pub code: String,
    pub title: String,
    pub discount_value: u64,
    pub expires_at: Timestamp,
    /// `None` for an unlimited coupon.
    pub total_quantity: Option<u32>,
}

/// Claim Request Data
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimCoupon {
    /// Code of the coupon to claim.
    pub code: String,

    /// Client idempotency key, stored on the issuance.
    pub request_id: Option<String>,
}
