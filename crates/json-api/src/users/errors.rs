//! Errors

use salvo::http::StatusError;

use tally_app::domain::users::UsersServiceError;

use crate::errors::{coded, internal};

pub(crate) fn into_status_error(error: UsersServiceError) -> StatusError {
    match error {
        UsersServiceError::AlreadyExists => {
            coded(StatusError::conflict(), "USER_ALREADY_EXISTS", &error)
        }
        UsersServiceError::NotFound => coded(StatusError::not_found(), "USER_NOT_FOUND", &error),
        UsersServiceError::InvalidData => {
            coded(StatusError::bad_request(), "INVALID_USER_DATA", &error)
        }
        UsersServiceError::Sql(source) => internal("users service failed", source),
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use super::*;

    #[test]
    fn maps_each_kind_to_status_and_code() {
        let cases = [
            (
                UsersServiceError::AlreadyExists,
                StatusCode::CONFLICT,
                "USER_ALREADY_EXISTS",
            ),
            (
                UsersServiceError::NotFound,
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
            ),
            (
                UsersServiceError::InvalidData,
                StatusCode::BAD_REQUEST,
                "INVALID_USER_DATA",
            ),
            (
                UsersServiceError::Sql(sqlx::Error::PoolTimedOut),
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
