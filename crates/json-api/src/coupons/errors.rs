//! Errors

use salvo::http::StatusError;

use tally_app::domain::coupons::CouponsServiceError;

use crate::errors::{coded, internal};

pub(crate) fn into_status_error(error: CouponsServiceError) -> StatusError {
    let (status, code) = match error {
        CouponsServiceError::NotFound => (StatusError::not_found(), "COUPON_NOT_FOUND"),
        CouponsServiceError::UserNotFound => (StatusError::not_found(), "USER_NOT_FOUND"),
        CouponsServiceError::Expired => (StatusError::conflict(), "COUPON_EXPIRED"),
        CouponsServiceError::SoldOut => (StatusError::conflict(), "COUPON_SOLD_OUT"),
        CouponsServiceError::AlreadyIssued => (StatusError::conflict(), "COUPON_ALREADY_ISSUED"),
        CouponsServiceError::AlreadyUsed => (StatusError::conflict(), "COUPON_ALREADY_USED"),
        CouponsServiceError::AlreadyExists => (StatusError::conflict(), "COUPON_ALREADY_EXISTS"),
        CouponsServiceError::InvalidData => (StatusError::bad_request(), "INVALID_COUPON_DATA"),
        CouponsServiceError::Sql(source) => return internal("coupons service failed", source),
    };

    coded(status, code, &error)
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn maps_each_kind_to_status_and_code() {
        let cases = [
            (
                CouponsServiceError::NotFound,
                StatusCode::NOT_FOUND,
                "COUPON_NOT_FOUND",
            ),
            (
                CouponsServiceError::UserNotFound,
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
            ),
            (
                CouponsServiceError::Expired,
                StatusCode::CONFLICT,
                "COUPON_EXPIRED",
            ),
            (
                CouponsServiceError::SoldOut,
                StatusCode::CONFLICT,
                "COUPON_SOLD_OUT",
            ),
            (
                CouponsServiceError::AlreadyIssued,
                StatusCode::CONFLICT,
                "COUPON_ALREADY_ISSUED",
            ),
            (
                CouponsServiceError::AlreadyUsed,
                StatusCode::CONFLICT,
                "COUPON_ALREADY_USED",
            ),
            (
                CouponsServiceError::AlreadyExists,
                StatusCode::CONFLICT,
                "COUPON_ALREADY_EXISTS",
            ),
            (
                CouponsServiceError::InvalidData,
                StatusCode::BAD_REQUEST,
                "INVALID_COUPON_DATA",
            ),
            (
                CouponsServiceError::Sql(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];

        for (error, status, code) in cases {
            let mapped = into_status_error(error);

            assert_eq!(mapped.code, status, "status for {code}");
            assert_eq!(mapped.brief, code);
        }
    }
}
