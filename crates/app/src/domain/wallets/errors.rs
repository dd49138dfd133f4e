//! Wallets service errors.

use sqlx::{Error, error::ErrorKind};
use thiserror::Error;

use crate::database::violation_kind;

#[derive(Debug, Error)]
pub enum WalletsServiceError {
    #[error("amount must be a positive integer")]
    InvalidAmount,

    #[error("refunds must reference the object being refunded")]
    MissingReference,

    #[error("user not found")]
    UserNotFound,

    #[error("wallet not found")]
    WalletNotFound,

    #[error("insufficient balance: {available} available, {requested} requested")]
    InsufficientBalance { available: u64, requested: u64 },

    #[error("a ledger entry already exists for this request")]
    DuplicateRequest,

    #[error("invalid ledger data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for WalletsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::WalletNotFound;
        }

        match violation_kind(&error) {
            Some(ErrorKind::UniqueViolation) => Self::DuplicateRequest,
            Some(ErrorKind::ForeignKeyViolation) => Self::UserNotFound,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(_) | None => Self::Sql(error),
        }
    }
}
