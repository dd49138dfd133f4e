//! Coupons service errors.

use sqlx::{Error, error::ErrorKind};
use thiserror::Error;

use crate::database::violation_kind;

#[derive(Debug, Error)]
pub enum CouponsServiceError {
    #[error("coupon not found")]
    NotFound,

    #[error("coupon has expired")]
    Expired,

    #[error("coupon is sold out")]
    SoldOut,

    #[error("coupon already issued to this user")]
    AlreadyIssued,

    #[error("coupon already used")]
    AlreadyUsed,

    #[error("user not found")]
    UserNotFound,

    #[error("coupon code already exists")]
    AlreadyExists,

    #[error("invalid coupon data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CouponsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match violation_kind(&error) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::UserNotFound,
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidData,
            Some(_) | None => Self::Sql(error),
        }
    }
}
