//! Points service errors.

use thiserror::Error;

use crate::domain::{idempotency::IdempotencyServiceError, wallets::WalletsServiceError};

#[derive(Debug, Error)]
pub enum PointsServiceError {
    #[error("an idempotency key is required")]
    MissingRequestId,

    #[error("idempotency key was used by another request")]
    KeyReused,

    #[error(transparent)]
    Wallet(#[from] WalletsServiceError),

    #[error(transparent)]
    Idempotency(#[from] IdempotencyServiceError),

    #[error("response snapshot could not be encoded or decoded")]
    Snapshot(#[from] serde_json::Error),
}
