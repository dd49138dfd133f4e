//! Use Coupon Handler

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    coupons::{errors::into_status_error, index::UserCouponResponse},
    extensions::*,
};

/// Use Coupon Handler
///
/// Marks an issued coupon as used. A coupon can be used once.
#[endpoint(
    tags("coupons"),
    summary = "Use Coupon",
    responses(
        (status_code = StatusCode::OK, description = "Coupon used"),
        (status_code = StatusCode::NOT_FOUND, description = "Issuance not found for this user"),
        (status_code = StatusCode::CONFLICT, description = "Coupon expired or already used"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    user_coupon: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<UserCouponResponse>, StatusError> {
    let state = depot.app_state()?;

    let used = state
        .coupons
        .use_coupon(user.into_inner().into(), user_coupon.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(used.into()))
}
