//! Wallets service.
//!
//! Every mutation runs in its own transaction: the wallet row is locked with
//! `FOR UPDATE`, the balance is checked and written, and the ledger entry is
//! appended before commit. Concurrent mutations for one user therefore
//! serialize on the row lock, while different users never contend.

use async_trait::async_trait;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::Db,
    domain::{
        users::{records::UserUuid, repository::PgUsersRepository},
        wallets::{
            data::{BalanceChange, NewLedgerEntry, ledger_limit},
            errors::WalletsServiceError,
            records::{LedgerEntryRecord, LedgerEntryType},
            repositories::{PgLedgerRepository, PgWalletsRepository},
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgWalletsService {
    db: Db,
    users: PgUsersRepository,
    wallets: PgWalletsRepository,
    ledger: PgLedgerRepository,
}

impl PgWalletsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            users: PgUsersRepository::new(),
            wallets: PgWalletsRepository::new(),
            ledger: PgLedgerRepository::new(),
        }
    }

    async fn apply(
        &self,
        user: UserUuid,
        entry_type: LedgerEntryType,
        change: BalanceChange,
    ) -> Result<LedgerEntryRecord, WalletsServiceError> {
        let amount = validate_amount(change.amount)?;

        let mut tx = self.db.begin_transaction().await?;

        if !self.users.user_exists(&mut tx, user).await? {
            return Err(WalletsServiceError::UserNotFound);
        }

        let wallet = self.wallets.lock_wallet(&mut tx, user).await?;

        let balance_after = next_balance(wallet.balance, entry_type, amount)?;

        self.wallets
            .update_balance(&mut tx, wallet.uuid, balance_after)
            .await?;

        let entry = self
            .ledger
            .append_entry(
                &mut tx,
                NewLedgerEntry {
                    wallet_uuid: wallet.uuid,
                    user_uuid: user,
                    entry_type,
                    amount,
                    balance_after,
                    reference: change.reference,
                    request_id: change.request_id,
                    memo: change.memo,
                },
            )
            .await?;

        tx.commit().await?;

        info!(
            user = %user,
            entry_type = %entry_type,
            amount,
            balance_after,
            "wallet balance changed"
        );

        Ok(entry)
    }
}

fn validate_amount(amount: i64) -> Result<u64, WalletsServiceError> {
    if amount <= 0 {
        return Err(WalletsServiceError::InvalidAmount);
    }

    u64::try_from(amount).map_err(|_| WalletsServiceError::InvalidAmount)
}

/// Compute the post-mutation balance while the wallet row is locked.
fn next_balance(
    balance: u64,
    entry_type: LedgerEntryType,
    amount: u64,
) -> Result<u64, WalletsServiceError> {
    if entry_type.is_credit() {
        return balance
            .checked_add(amount)
            .filter(|next| i64::try_from(*next).is_ok())
            .ok_or(WalletsServiceError::InvalidAmount);
    }

    balance.checked_sub(amount).ok_or_else(|| {
        warn!(available = balance, requested = amount, "insufficient balance");

        WalletsServiceError::InsufficientBalance {
            available: balance,
            requested: amount,
        }
    })
}

#[async_trait]
impl WalletsService for PgWalletsService {
    async fn increase(
        &self,
        user: UserUuid,
        change: BalanceChange,
    ) -> Result<LedgerEntryRecord, WalletsServiceError> {
        self.apply(user, LedgerEntryType::Charge, change).await
    }

    async fn decrease(
        &self,
        user: UserUuid,
        change: BalanceChange,
    ) -> Result<LedgerEntryRecord, WalletsServiceError> {
        self.apply(user, LedgerEntryType::Redeem, change).await
    }

    async fn refund(
        &self,
        user: UserUuid,
        change: BalanceChange,
    ) -> Result<LedgerEntryRecord, WalletsServiceError> {
        if change.reference.is_none() {
            return Err(WalletsServiceError::MissingReference);
        }

        self.apply(user, LedgerEntryType::Refund, change).await
    }

    async fn get_balance(&self, user: UserUuid) -> Result<u64, WalletsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let wallet = self.wallets.get_wallet(&mut tx, user).await?;

        tx.commit().await?;

        Ok(wallet.map_or(0, |wallet| wallet.balance))
    }

    async fn list_ledger(
        &self,
        user: UserUuid,
        limit: Option<u32>,
    ) -> Result<Vec<LedgerEntryRecord>, WalletsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let entries = self
            .ledger
            .list_entries(&mut tx, user, ledger_limit(limit))
            .await?;

        tx.commit().await?;

        Ok(entries)
    }

    async fn find_entry_by_request_id(
        &self,
        request_id: &str,
    ) -> Result<Option<LedgerEntryRecord>, WalletsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let entry = self
            .ledger
            .find_entry_by_request_id(&mut tx, request_id)
            .await?;

        tx.commit().await?;

        Ok(entry)
    }
}

#[automock]
#[async_trait]
pub trait WalletsService: Send + Sync {
    /// Adds points to the user's wallet and records a CHARGE entry.
    async fn increase(
        &self,
        user: UserUuid,
        change: BalanceChange,
    ) -> Result<LedgerEntryRecord, WalletsServiceError>;

    /// Removes points from the user's wallet and records a REDEEM entry.
    ///
    /// Fails with [`WalletsServiceError::InsufficientBalance`] when the locked
    /// balance is lower than the requested amount.
    async fn decrease(
        &self,
        user: UserUuid,
        change: BalanceChange,
    ) -> Result<LedgerEntryRecord, WalletsServiceError>;

    /// Returns points to the user's wallet and records a REFUND entry. The
    /// change must reference the object being refunded.
    async fn refund(
        &self,
        user: UserUuid,
        change: BalanceChange,
    ) -> Result<LedgerEntryRecord, WalletsServiceError>;

    /// Current balance without taking the row lock. Users without a wallet read as zero.
    async fn get_balance(&self, user: UserUuid) -> Result<u64, WalletsServiceError>;

    /// Most recent ledger entries first.
    async fn list_ledger(
        &self,
        user: UserUuid,
        limit: Option<u32>,
    ) -> Result<Vec<LedgerEntryRecord>, WalletsServiceError>;

    /// The ledger entry written on behalf of `request_id`, if any.
    async fn find_entry_by_request_id(
        &self,
        request_id: &str,
    ) -> Result<Option<LedgerEntryRecord>, WalletsServiceError>;
}
