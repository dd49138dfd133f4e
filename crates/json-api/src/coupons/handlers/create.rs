//! Create Coupon Handler

use jiff::Timestamp;
use salvo::{
    http::header::LOCATION,
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tally_app::domain::coupons::{
    data::NewCoupon,
    records::{CouponRecord, CouponUuid},
};

use crate::{coupons::errors::into_status_error, extensions::*};

/// Create Coupon Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CreateCouponRequest {
    /// Client-chosen id; generated when omitted
    pub uuid: Option<Uuid>,

    /// Unique code users claim the coupon with
    pub code: String,

    /// Human-readable title
    pub title: String,

    /// Discount granted by the coupon
    pub discount_value: u64,

    /// RFC 3339 timestamp after which the coupon can no longer be claimed or used
    pub expires_at: String,

    /// Maximum number of issuances; unlimited when omitted
    pub total_quantity: Option<u32>,
}

impl CreateCouponRequest {
    fn into_new_coupon(self) -> Result<NewCoupon, StatusError> {
        let expires_at = self
            .expires_at
            .parse::<Timestamp>()
            .or_400("INVALID_COUPON_DATA")?;

        Ok(NewCoupon {
            uuid: self.uuid.map_or_else(CouponUuid::new, CouponUuid::from_uuid),
            code: self.code,
            title: self.title,
            discount_value: self.discount_value,
            expires_at,
            total_quantity: self.total_quantity,
        })
    }
}

/// Coupon Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CouponResponse {
    /// The unique identifier of the coupon
    pub uuid: Uuid,

    /// Coupon code
    pub code: String,

    /// Coupon title
    pub title: String,

    /// Discount granted by the coupon
    pub discount_value: u64,

    /// The date and time the coupon expires
    pub expires_at: String,

    /// Maximum number of issuances; unlimited when absent
    pub total_quantity: Option<u32>,

    /// Issuances so far
    pub issued_count: u32,

    /// Issuances still available; unlimited when absent
    pub remaining: Option<u32>,
}

impl From<CouponRecord> for CouponResponse {
    fn from(coupon: CouponRecord) -> Self {
        Self {
            uuid: coupon.uuid.into_uuid(),
            remaining: coupon.remaining(),
            code: coupon.code,
            title: coupon.title,
            discount_value: coupon.discount_value,
            expires_at: coupon.expires_at.to_string(),
            total_quantity: coupon.total_quantity,
            issued_count: coupon.issued_count,
        }
    }
}

/// Create Coupon Handler
#[endpoint(
    tags("coupons"),
    summary = "Create Coupon",
    responses(
        (status_code = StatusCode::CREATED, description = "Coupon created"),
        (status_code = StatusCode::CONFLICT, description = "Coupon code already exists"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CreateCouponRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<CouponResponse>, StatusError> {
    let state = depot.app_state()?;
    let coupon = json.into_inner().into_new_coupon()?;

    let coupon = state
        .coupons
        .create_coupon(coupon)
        .await
        .map_err(into_status_error)?;

    res.add_header(LOCATION, format!("/coupons/{}", coupon.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(coupon.into()))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;

    use tally_app::domain::coupons::{CouponsServiceError, MockCouponsService};

    use crate::test_helpers::coupons_service;

    use super::*;

    fn make_service(coupons: MockCouponsService) -> Service {
        coupons_service(coupons, Router::with_path("coupons").post(handler))
    }

    fn record_from(coupon: NewCoupon) -> CouponRecord {
        CouponRecord {
            uuid: coupon.uuid,
            code: coupon.code,
            title: coupon.title,
            discount_value: coupon.discount_value,
            expires_at: coupon.expires_at,
            total_quantity: coupon.total_quantity,
            issued_count: 0,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn test_create_coupon_success() -> TestResult {
        let uuid = Uuid::now_v7();
        let expires_at: Timestamp = "2030-01-01T00:00:00Z".parse()?;
        let mut coupons = MockCouponsService::new();

        coupons
            .expect_create_coupon()
            .once()
            .withf(move |new| {
                new.uuid.into_uuid() == uuid
                    && new.code == "SPRING"
                    && new.expires_at == expires_at
                    && new.total_quantity == Some(10)
            })
            .return_once(|new| Ok(record_from(new)));

        let mut res = TestClient::post("http://example.com/coupons")
            .json(&json!({
                "uuid": uuid,
                "code": "SPRING",
                "title": "Spring sale",
                "discount_value": 500,
                "expires_at": "2030-01-01T00:00:00Z",
                "total_quantity": 10,
            }))
            .send(&make_service(coupons))
            .await;

        let body: CouponResponse = res.take_json().await?;
        let location = res.headers().get("location").and_then(|v| v.to_str().ok());

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(location, Some(format!("/coupons/{uuid}").as_str()));
        assert_eq!(body.remaining, Some(10));
        assert_eq!(body.issued_count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_coupon_bad_timestamp_returns_400() -> TestResult {
        let res = TestClient::post("http://example.com/coupons")
            .json(&json!({
                "code": "SPRING",
                "title": "Spring sale",
                "discount_value": 500,
                "expires_at": "next tuesday",
            }))
            .send(&make_service(MockCouponsService::new()))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_coupon_duplicate_code_returns_409() -> TestResult {
        let mut coupons = MockCouponsService::new();

        coupons
            .expect_create_coupon()
            .once()
            .return_once(|_| Err(CouponsServiceError::AlreadyExists));

        let res = TestClient::post("http://example.com/coupons")
            .json(&json!({
                "code": "SPRING",
                "title": "Spring sale",
                "discount_value": 500,
                "expires_at": "2030-01-01T00:00:00Z",
            }))
            .send(&make_service(coupons))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }
}
