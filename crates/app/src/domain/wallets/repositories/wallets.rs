//! Wallets Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::amount_to_i64,
    domain::{
        users::records::UserUuid,
        wallets::records::{WalletRecord, WalletUuid},
    },
};

const CREATE_WALLET_SQL: &str = include_str!("../sql/create_wallet.sql");
const GET_WALLET_SQL: &str = include_str!("../sql/get_wallet.sql");
const LOCK_WALLET_SQL: &str = include_str!("../sql/lock_wallet.sql");
const UPDATE_BALANCE_SQL: &str = include_str!("../sql/update_balance.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgWalletsRepository;

impl PgWalletsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_wallet(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        wallet: WalletUuid,
        user: UserUuid,
    ) -> Result<WalletRecord, sqlx::Error> {
        query_as::<Postgres, WalletRecord>(CREATE_WALLET_SQL)
            .bind(wallet.into_uuid())
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_wallet(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Option<WalletRecord>, sqlx::Error> {
        query_as::<Postgres, WalletRecord>(GET_WALLET_SQL)
            .bind(user.into_uuid())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Load the user's wallet and hold its row lock until `tx` ends.
    pub(crate) async fn lock_wallet(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<WalletRecord, sqlx::Error> {
        query_as::<Postgres, WalletRecord>(LOCK_WALLET_SQL)
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_balance(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        wallet: WalletUuid,
        balance: u64,
    ) -> Result<WalletRecord, sqlx::Error> {
        query_as::<Postgres, WalletRecord>(UPDATE_BALANCE_SQL)
            .bind(wallet.into_uuid())
            .bind(amount_to_i64("balance", balance)?)
            .fetch_one(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for WalletRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: WalletUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            balance: try_get_amount(row, "balance")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

pub(super) fn try_get_amount(row: &PgRow, col: &str) -> Result<u64, sqlx::Error> {
    let amount_i64: i64 = row.try_get(col)?;

    u64::try_from(amount_i64).map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}
