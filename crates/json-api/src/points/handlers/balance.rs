//! Point Balance Handler

use salvo::{
    oapi::{ToSchema, extract::PathParam},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{extensions::*, points::errors::into_status_error};

/// Balance Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct BalanceResponse {
    /// The wallet owner
    pub user_uuid: Uuid,

    /// Current point balance
    pub balance: u64,
}

/// Point Balance Handler
///
/// Reads without locking; a user without a wallet reads as zero.
#[endpoint(tags("points"), summary = "Get Point Balance")]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<BalanceResponse>, StatusError> {
    let state = depot.app_state()?;
    let user_uuid = user.into_inner();

    let balance = state
        .points
        .balance(user_uuid.into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(BalanceResponse { user_uuid, balance }))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use tally_app::domain::points::MockPointsService;

    use crate::test_helpers::points_service;

    use super::*;

    #[tokio::test]
    async fn test_balance_returns_200() -> TestResult {
        let user = Uuid::now_v7();
        let mut points = MockPointsService::new();

        points
            .expect_balance()
            .once()
            .withf(move |u| u.into_uuid() == user)
            .return_once(|_| Ok(4_200));

        let mut res = TestClient::get(format!("http://example.com/users/{user}/points/balance"))
            .send(&points_service(
                points,
                Router::with_path("users/{user}/points/balance").get(handler),
            ))
            .await;

        let body: BalanceResponse = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.user_uuid, user);
        assert_eq!(body.balance, 4_200);

        Ok(())
    }
}
