//! Points service.
//!
//! Redeem runs as three independent transactional episodes: claim the
//! idempotency key, apply the wallet mutation, record the outcome. No store
//! connection is held from one episode to the next.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::{error, info, warn};

use crate::{
    database::Db,
    domain::{
        idempotency::{
            IdempotencyService, PgIdempotencyService,
            data::{ClaimOutcome, IdempotencyPolicy, NewIdempotencyClaim},
            records::{IdempotencyRecord, IdempotencyStatus},
        },
        points::{
            data::{ChargePoints, REDEEM_OPERATION, RedeemPoints},
            errors::PointsServiceError,
            models::{ChargeReceipt, RedeemReceipt},
        },
        users::records::UserUuid,
        wallets::{
            PgWalletsService, WalletsService, WalletsServiceError, data::BalanceChange,
            records::LedgerEntryRecord,
        },
    },
};

#[derive(Clone)]
pub struct PgPointsService {
    wallets: Arc<dyn WalletsService>,
    idempotency: Arc<dyn IdempotencyService>,
}

impl PgPointsService {
    #[must_use]
    pub fn new(db: Db, policy: IdempotencyPolicy) -> Self {
        Self::with_services(
            Arc::new(PgWalletsService::new(db.clone())),
            Arc::new(PgIdempotencyService::new(db, policy)),
        )
    }

    #[must_use]
    pub fn with_services(
        wallets: Arc<dyn WalletsService>,
        idempotency: Arc<dyn IdempotencyService>,
    ) -> Self {
        Self {
            wallets,
            idempotency,
        }
    }

    /// Snapshot the receipt and close the key as `SUCCESS`.
    ///
    /// On failure the key stays `IN_PROGRESS`; the ledger entry carrying the
    /// request id lets a later reclaim finish it without re-applying.
    async fn record_success(
        &self,
        request_id: &str,
        receipt: &RedeemReceipt,
    ) -> Result<(), PointsServiceError> {
        let snapshot = serde_json::to_value(receipt).inspect_err(|e| {
            error!(request_id, error = %e, "failed to encode redeem receipt");
        })?;

        self.idempotency
            .mark_success(request_id, snapshot)
            .await
            .inspect_err(|e| {
                error!(
                    request_id,
                    error = %e,
                    "redeem applied but its idempotency key could not be marked successful"
                );
            })?;

        Ok(())
    }

    /// Finish a key whose redeem already reached the ledger.
    async fn recover_applied(
        &self,
        request_id: &str,
    ) -> Result<Option<RedeemReceipt>, PointsServiceError> {
        let Some(entry) = self.wallets.find_entry_by_request_id(request_id).await? else {
            return Ok(None);
        };

        info!(request_id, "recovered redeem applied by an interrupted attempt");

        let receipt = RedeemReceipt::from(&entry);

        self.record_success(request_id, &receipt).await?;

        Ok(Some(receipt))
    }
}

/// Rebuild the receipt a completed key stored.
fn replay(user: UserUuid, record: &IdempotencyRecord) -> Result<RedeemReceipt, PointsServiceError> {
    if record.user_uuid != user || record.operation != REDEEM_OPERATION {
        warn!(
            request_id = %record.request_id,
            owner = %record.user_uuid,
            caller = %user,
            "idempotency key reused by a different request"
        );

        return Err(PointsServiceError::KeyReused);
    }

    let snapshot = record.response.clone().unwrap_or_default();

    serde_json::from_value(snapshot).map_err(|e| {
        error!(request_id = %record.request_id, error = %e, "stored redeem receipt is unreadable");

        PointsServiceError::Snapshot(e)
    })
}

#[async_trait]
impl PointsService for PgPointsService {
    async fn charge(
        &self,
        user: UserUuid,
        charge: ChargePoints,
    ) -> Result<ChargeReceipt, PointsServiceError> {
        let change = BalanceChange {
            amount: charge.amount,
            memo: charge.memo,
            ..BalanceChange::default()
        };

        let entry = self.wallets.increase(user, change).await?;

        Ok(ChargeReceipt::from(&entry))
    }

    async fn redeem(
        &self,
        user: UserUuid,
        redeem: RedeemPoints,
    ) -> Result<RedeemReceipt, PointsServiceError> {
        let request_id = redeem.request_id.trim();

        if request_id.is_empty() {
            return Err(PointsServiceError::MissingRequestId);
        }

        if let Some(existing) = self.idempotency.lookup(request_id).await?
            && existing.status == IdempotencyStatus::Success
        {
            return replay(user, &existing);
        }

        let outcome = self
            .idempotency
            .claim(NewIdempotencyClaim {
                request_id: request_id.to_string(),
                user_uuid: user,
                operation: REDEEM_OPERATION.to_string(),
            })
            .await?;

        match outcome {
            ClaimOutcome::Completed(record) => return replay(user, &record),
            ClaimOutcome::Reclaimed(_) => {
                if let Some(receipt) = self.recover_applied(request_id).await? {
                    return Ok(receipt);
                }
            }
            ClaimOutcome::Acquired(_) => {}
        }

        let change = BalanceChange {
            amount: redeem.amount,
            memo: redeem.memo,
            request_id: Some(request_id.to_string()),
            reference: None,
        };

        match self.wallets.decrease(user, change).await {
            Ok(entry) => {
                let receipt = RedeemReceipt::from(&entry);

                self.record_success(request_id, &receipt).await?;

                Ok(receipt)
            }
            // The interrupted attempt committed after this one reclaimed the key.
            Err(WalletsServiceError::DuplicateRequest) => {
                match self.recover_applied(request_id).await? {
                    Some(receipt) => Ok(receipt),
                    None => Err(WalletsServiceError::DuplicateRequest.into()),
                }
            }
            Err(failure) => {
                if let Err(e) = self.idempotency.mark_failed(request_id).await {
                    error!(request_id, error = %e, "failed to mark idempotency key failed");
                }

                Err(failure.into())
            }
        }
    }

    async fn balance(&self, user: UserUuid) -> Result<u64, PointsServiceError> {
        Ok(self.wallets.get_balance(user).await?)
    }

    async fn ledger(
        &self,
        user: UserUuid,
        limit: Option<u32>,
    ) -> Result<Vec<LedgerEntryRecord>, PointsServiceError> {
        Ok(self.wallets.list_ledger(user, limit).await?)
    }
}

#[automock]
#[async_trait]
pub trait PointsService: Send + Sync {
    /// Adds points to the user's wallet.
    async fn charge(
        &self,
        user: UserUuid,
        charge: ChargePoints,
    ) -> Result<ChargeReceipt, PointsServiceError>;

    /// Removes points at most once per request id, replaying the first result
    /// for every retry.
    async fn redeem(
        &self,
        user: UserUuid,
        redeem: RedeemPoints,
    ) -> Result<RedeemReceipt, PointsServiceError>;

    /// Current balance.
    async fn balance(&self, user: UserUuid) -> Result<u64, PointsServiceError>;

    /// Recent ledger entries, newest first.
    async fn ledger(
        &self,
        user: UserUuid,
        limit: Option<u32>,
    ) -> Result<Vec<LedgerEntryRecord>, PointsServiceError>;
}
