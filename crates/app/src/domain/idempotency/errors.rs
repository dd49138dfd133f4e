//! Idempotency service errors.

use sqlx::{Error, error::ErrorKind};
use thiserror::Error;

use crate::database::violation_kind;

#[derive(Debug, Error)]
pub enum IdempotencyServiceError {
    #[error("a request with this idempotency key is already in progress")]
    InProgress,

    #[error("a request with this idempotency key failed; use a new key")]
    Failed,

    #[error("idempotency key must be 1-64 non-blank characters")]
    InvalidKey,

    #[error("no in-progress claim exists for this idempotency key")]
    NotClaimed,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for IdempotencyServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotClaimed;
        }

        match violation_kind(&error) {
            Some(ErrorKind::CheckViolation | ErrorKind::NotNullViolation) => Self::InvalidKey,
            Some(_) | None => Self::Sql(error),
        }
    }
}
