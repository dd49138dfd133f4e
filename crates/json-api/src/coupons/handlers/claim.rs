//! Claim Coupon Handler

use salvo::{
    http::header::LOCATION,
    oapi::{
        ToSchema,
        extract::{JsonBody, PathParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tally_app::domain::coupons::data::ClaimCoupon;

use crate::{
    coupons::{errors::into_status_error, index::UserCouponResponse},
    extensions::*,
};

/// Claim Coupon Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ClaimCouponRequest {
    /// Code of the coupon to claim
    pub code: String,
}

/// Claim Coupon Handler
///
/// Issues the coupon to the user on a first-come-first-served basis. An
/// optional `Idempotency-Key` header is recorded on the issuance.
#[endpoint(
    tags("coupons"),
    summary = "Claim Coupon",
    responses(
        (status_code = StatusCode::CREATED, description = "Coupon issued"),
        (status_code = StatusCode::NOT_FOUND, description = "User or coupon not found"),
        (status_code = StatusCode::CONFLICT, description = "Coupon expired, sold out or already issued"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    json: JsonBody<ClaimCouponRequest>,
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<UserCouponResponse>, StatusError> {
    let state = depot.app_state()?;
    let user = user.into_inner();

    let claim = ClaimCoupon {
        code: json.into_inner().code,
        request_id: req.idempotency_key(),
    };

    let issued = state
        .coupons
        .claim(user.into(), claim)
        .await
        .map_err(into_status_error)?;

    res.add_header(
        LOCATION,
        format!("/users/{user}/coupons/{}", issued.issuance.uuid),
        true,
    )
    .or_500("failed to set location header")?
    .status_code(StatusCode::CREATED);

    Ok(Json(issued.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use tally_app::domain::{
        coupons::{CouponsServiceError, MockCouponsService, records::UserCouponStatus},
        users::records::UserUuid,
    };

    use crate::test_helpers::{coupons_service, make_issued_coupon};

    use super::*;

    fn make_service(coupons: MockCouponsService) -> Service {
        coupons_service(
            coupons,
            Router::with_path("users/{user}/coupons/claim").post(handler),
        )
    }

    #[tokio::test]
    async fn test_claim_returns_201_and_records_key() -> TestResult {
        let user = UserUuid::new();
        let issued = make_issued_coupon(user, UserCouponStatus::Issued);
        let issuance = issued.issuance.uuid;
        let mut coupons = MockCouponsService::new();

        coupons
            .expect_claim()
            .once()
            .withf(move |u, claim| {
                *u == user
                    && *claim
                        == ClaimCoupon {
                            code: "WELCOME10".to_owned(),
                            request_id: Some("claim-1".to_owned()),
                        }
            })
            .return_once(move |_, _| Ok(issued));

        let mut res = TestClient::post(format!("http://example.com/users/{user}/coupons/claim"))
            .add_header(IDEMPOTENCY_KEY_HEADER, "claim-1", true)
            .json(&json!({ "code": "WELCOME10" }))
            .send(&make_service(coupons))
            .await;

        let body: UserCouponResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(
            location,
            Some(format!("/users/{user}/coupons/{issuance}").as_str())
        );
        assert_eq!(body.uuid, issuance.into_uuid());
        assert_eq!(body.status, "ISSUED");

        Ok(())
    }

    #[tokio::test]
    async fn test_claim_without_key_passes_none() -> TestResult {
        let user = UserUuid::new();
        let issued = make_issued_coupon(user, UserCouponStatus::Issued);
        let mut coupons = MockCouponsService::new();

        coupons
            .expect_claim()
            .once()
            .withf(|_, claim| claim.request_id.is_none())
            .return_once(move |_, _| Ok(issued));

        let res = TestClient::post(format!("http://example.com/users/{user}/coupons/claim"))
            .json(&json!({ "code": "WELCOME10" }))
            .send(&make_service(coupons))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        Ok(())
    }

    #[tokio::test]
    async fn test_claim_rejections() -> TestResult {
        let cases: [(fn() -> CouponsServiceError, StatusCode); 5] = [
            (|| CouponsServiceError::SoldOut, StatusCode::CONFLICT),
            (|| CouponsServiceError::AlreadyIssued, StatusCode::CONFLICT),
            (|| CouponsServiceError::Expired, StatusCode::CONFLICT),
            (|| CouponsServiceError::NotFound, StatusCode::NOT_FOUND),
            (|| CouponsServiceError::UserNotFound, StatusCode::NOT_FOUND),
        ];

        for (make_error, status) in cases {
            let mut coupons = MockCouponsService::new();

            coupons
                .expect_claim()
                .once()
                .return_once(move |_, _| Err(make_error()));

            let res = TestClient::post(format!(
                "http://example.com/users/{}/coupons/claim",
                Uuid::now_v7()
            ))
            .json(&json!({ "code": "WELCOME10" }))
            .send(&make_service(coupons))
            .await;

            assert_eq!(res.status_code, Some(status));
        }

        Ok(())
    }
}
