//! User Coupons Index Handler

use std::string::ToString;

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tally_app::domain::coupons::records::IssuedCoupon;

use crate::{coupons::errors::into_status_error, extensions::*};

/// Issued Coupon Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UserCouponResponse {
    /// The unique identifier of the issuance
    pub uuid: Uuid,

    /// The coupon this issuance grants
    pub coupon_uuid: Uuid,

    /// Coupon code
    pub code: String,

    /// Coupon title
    pub title: String,

    /// Discount granted by the coupon
    pub discount_value: u64,

    /// ISSUED or USED
    pub status: String,

    /// The date and time the coupon was issued
    pub issued_at: String,

    /// The date and time the coupon was used
    pub used_at: Option<String>,

    /// The date and time the coupon expires
    pub expires_at: String,

    /// Idempotency key of the claim that issued the coupon
    pub request_id: Option<String>,
}

impl From<IssuedCoupon> for UserCouponResponse {
    fn from(issued: IssuedCoupon) -> Self {
        let IssuedCoupon { issuance, coupon } = issued;

        Self {
            uuid: issuance.uuid.into_uuid(),
            coupon_uuid: coupon.uuid.into_uuid(),
            code: coupon.code,
            title: coupon.title,
            discount_value: coupon.discount_value,
            status: issuance.status.to_string(),
            issued_at: issuance.issued_at.to_string(),
            used_at: issuance.used_at.as_ref().map(ToString::to_string),
            expires_at: coupon.expires_at.to_string(),
            request_id: issuance.request_id,
        }
    }
}

/// User Coupons Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UserCouponsResponse {
    /// Issuances, newest first
    pub coupons: Vec<UserCouponResponse>,
}

/// User Coupons Index Handler
///
/// Returns the coupons issued to a user.
#[endpoint(tags("coupons"), summary = "List User Coupons")]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<UserCouponsResponse>, StatusError> {
    let state = depot.app_state()?;

    let coupons = state
        .coupons
        .list_user_coupons(user.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(UserCouponsResponse {
        coupons: coupons.into_iter().map(Into::into).collect(),
    }))
}
