//! Errors

use salvo::http::StatusError;

use tally_app::domain::{
    idempotency::IdempotencyServiceError, points::PointsServiceError,
    wallets::WalletsServiceError,
};

use crate::errors::{coded, internal};

pub(crate) fn into_status_error(error: PointsServiceError) -> StatusError {
    match error {
        PointsServiceError::MissingRequestId => coded(
            StatusError::bad_request(),
            "MISSING_IDEMPOTENCY_KEY",
            &error,
        ),
        PointsServiceError::KeyReused => {
            coded(StatusError::conflict(), "IDEMPOTENCY_KEY_REUSED", &error)
        }
        PointsServiceError::Wallet(wallet) => wallet_status_error(wallet),
        PointsServiceError::Idempotency(idempotency) => idempotency_status_error(idempotency),
        PointsServiceError::Snapshot(source) => internal("failed to handle redeem snapshot", source),
    }
}

fn wallet_status_error(error: WalletsServiceError) -> StatusError {
    match error {
        WalletsServiceError::InvalidAmount => {
            coded(StatusError::bad_request(), "INVALID_AMOUNT", &error)
        }
        WalletsServiceError::MissingReference => {
            coded(StatusError::bad_request(), "MISSING_REFERENCE", &error)
        }
        WalletsServiceError::InvalidData => {
            coded(StatusError::bad_request(), "INVALID_DATA", &error)
        }
        WalletsServiceError::UserNotFound => {
            coded(StatusError::not_found(), "USER_NOT_FOUND", &error)
        }
        WalletsServiceError::WalletNotFound => {
            coded(StatusError::not_found(), "WALLET_NOT_FOUND", &error)
        }
        WalletsServiceError::InsufficientBalance { .. } => {
            coded(StatusError::conflict(), "INSUFFICIENT_BALANCE", &error)
        }
        WalletsServiceError::DuplicateRequest => {
            coded(StatusError::conflict(), "DUPLICATE_REQUEST", &error)
        }
        WalletsServiceError::Sql(source) => internal("wallet operation failed", source),
    }
}

fn idempotency_status_error(error: IdempotencyServiceError) -> StatusError {
    match error {
        IdempotencyServiceError::InProgress => {
            coded(StatusError::conflict(), "IDEMPOTENCY_IN_PROGRESS", &error)
        }
        IdempotencyServiceError::Failed => {
            coded(StatusError::conflict(), "IDEMPOTENCY_FAILED", &error)
        }
        IdempotencyServiceError::InvalidKey => coded(
            StatusError::bad_request(),
            "INVALID_IDEMPOTENCY_KEY",
            &error,
        ),
        IdempotencyServiceError::NotClaimed => internal("idempotency bookkeeping failed", &error),
        IdempotencyServiceError::Sql(source) => internal("idempotency store failed", source),
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;

    use super::*;

    fn assert_maps(error: PointsServiceError, status: StatusCode, code: &str) {
        let mapped = into_status_error(error);

        assert_eq!(mapped.code, status, "status for {code}");
        assert_eq!(mapped.brief, code);
    }

    #[test]
    fn orchestration_errors() {
        assert_maps(
            PointsServiceError::MissingRequestId,
            StatusCode::BAD_REQUEST,
            "MISSING_IDEMPOTENCY_KEY",
        );
        assert_maps(
            PointsServiceError::KeyReused,
            StatusCode::CONFLICT,
            "IDEMPOTENCY_KEY_REUSED",
        );
    }

    #[test]
    fn wallet_errors() {
        let cases = [
            (
                WalletsServiceError::InvalidAmount,
                StatusCode::BAD_REQUEST,
                "INVALID_AMOUNT",
            ),
            (
                WalletsServiceError::UserNotFound,
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
            ),
            (
                WalletsServiceError::WalletNotFound,
                StatusCode::NOT_FOUND,
                "WALLET_NOT_FOUND",
            ),
            (
                WalletsServiceError::InsufficientBalance {
                    available: 10,
                    requested: 20,
                },
                StatusCode::CONFLICT,
                "INSUFFICIENT_BALANCE",
            ),
            (
                WalletsServiceError::Sql(sqlx::Error::PoolTimedOut),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];

        for (error, status, code) in cases {
            assert_maps(error.into(), status, code);
        }
    }

    #[test]
    fn idempotency_errors() {
        let cases = [
            (
                IdempotencyServiceError::InProgress,
                StatusCode::CONFLICT,
                "IDEMPOTENCY_IN_PROGRESS",
            ),
            (
                IdempotencyServiceError::Failed,
                StatusCode::CONFLICT,
                "IDEMPOTENCY_FAILED",
            ),
            (
                IdempotencyServiceError::InvalidKey,
                StatusCode::BAD_REQUEST,
                "INVALID_IDEMPOTENCY_KEY",
            ),
            (
                IdempotencyServiceError::NotClaimed,
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];

        for (error, status, code) in cases {
            assert_maps(error.into(), status, code);
        }
    }

    #[test]
    fn insufficient_balance_detail_names_amounts() {
        let mapped = into_status_error(
            WalletsServiceError::InsufficientBalance {
                available: 10,
                requested: 20,
            }
            .into(),
        );

        assert_eq!(
            mapped.detail.as_deref(),
            Some("insufficient balance: 10 available, 20 requested")
        );
    }
}
