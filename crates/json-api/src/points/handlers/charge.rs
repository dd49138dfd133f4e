//! Charge Points Handler

use salvo::{
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tally_app::domain::points::{data::ChargePoints, models::ChargeReceipt};

use crate::{extensions::*, points::errors::into_status_error};

/// Charge Points Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ChargeRequest {
    /// Points to add; must be positive
    pub amount: i64,

    /// Free-form note stored on the ledger entry
    pub memo: Option<String>,
}

impl From<ChargeRequest> for ChargePoints {
    fn from(request: ChargeRequest) -> Self {
        ChargePoints {
            amount: request.amount,
            memo: request.memo,
        }
    }
}

/// Charge Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ChargeResponse {
    /// The wallet owner
    pub user_uuid: Uuid,

    /// Points added
    pub charged_amount: u64,

    /// Balance after the charge
    pub balance_after: u64,

    /// Note stored on the ledger entry
    pub memo: Option<String>,
}

impl From<ChargeReceipt> for ChargeResponse {
    fn from(receipt: ChargeReceipt) -> Self {
        Self {
            user_uuid: receipt.user_uuid.into_uuid(),
            charged_amount: receipt.charged_amount,
            balance_after: receipt.balance_after,
            memo: receipt.memo,
        }
    }
}

/// Charge Points Handler
#[endpoint(
    tags("points"),
    summary = "Charge Points",
    responses(
        (status_code = StatusCode::OK, description = "Points charged"),
        (status_code = StatusCode::BAD_REQUEST, description = "Invalid amount"),
        (status_code = StatusCode::NOT_FOUND, description = "User or wallet not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    json: JsonBody<ChargeRequest>,
    depot: &mut Depot,
) -> Result<Json<ChargeResponse>, StatusError> {
    let state = depot.app_state()?;

    let receipt = state
        .points
        .charge(user.into_inner().into(), json.into_inner().into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(receipt.into()))
}
