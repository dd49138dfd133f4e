//! Redeem Points Handler

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tally_app::domain::points::{data::RedeemPoints, models::RedeemReceipt};

use crate::{extensions::*, points::errors::into_status_error};

/// Redeem Points Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RedeemRequest {
    /// Points to remove; must be positive
    pub amount: i64,

    /// Free-form note stored on the ledger entry
    pub memo: Option<String>,

    /// Idempotency key, used when the `Idempotency-Key` header is absent
    pub request_id: Option<String>,
}

/// Redeem Response
///
/// Retries with the same key receive this body again, unchanged.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RedeemResponse {
    /// The wallet owner
    pub user_uuid: Uuid,

    /// Points removed
    pub redeemed_amount: u64,

    /// Balance after the redeem
    pub balance_after: u64,

    /// Note stored on the ledger entry
    pub memo: Option<String>,
}

impl From<RedeemReceipt> for RedeemResponse {
    fn from(receipt: RedeemReceipt) -> Self {
        Self {
            user_uuid: receipt.user_uuid.into_uuid(),
            redeemed_amount: receipt.redeemed_amount,
            balance_after: receipt.balance_after,
            memo: receipt.memo,
        }
    }
}

/// Redeem Points Handler
///
/// Applies the redeem at most once per idempotency key. The key is read from
/// the `Idempotency-Key` header, falling back to `request_id` in the body.
#[endpoint(
    tags("points"),
    summary = "Redeem Points",
    responses(
        (status_code = StatusCode::OK, description = "Points redeemed, or the first result replayed"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid amount or missing idempotency key"),
        (status_code = StatusCode::NOT_FOUND, description = "User or wallet not found"),
        (status_code = StatusCode::CONFLICT, description = "Insufficient balance, or the key is in progress, failed or reused"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    json: JsonBody<RedeemRequest>,
    req: &mut Request,
    depot: &mut Depot,
) -> Result<Json<RedeemResponse>, StatusError> {
    let state = depot.app_state()?;
    let body = json.into_inner();

    let redeem = RedeemPoints {
        amount: body.amount,
        memo: body.memo,
        request_id: req
            .idempotency_key()
            .or(body.request_id)
            .unwrap_or_default(),
    };

    let receipt = state
        .points
        .redeem(user.into_inner().into(), redeem)
        .await
        .map_err(into_status_error)?;

    Ok(Json(receipt.into()))
}
