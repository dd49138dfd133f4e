//! Ledger Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};
use uuid::Uuid;

use crate::{
    database::amount_to_i64,
    domain::{
        users::records::UserUuid,
        wallets::{
            data::NewLedgerEntry,
            records::{
                LedgerEntryRecord, LedgerEntryType, LedgerEntryUuid, LedgerReference, WalletUuid,
            },
        },
    },
};

use super::wallets::try_get_amount;

const APPEND_LEDGER_ENTRY_SQL: &str = include_str!("../sql/append_ledger_entry.sql");
const LIST_LEDGER_ENTRIES_SQL: &str = include_str!("../sql/list_ledger_entries.sql");
const FIND_LEDGER_ENTRY_BY_REQUEST_ID_SQL: &str =
    include_str!("../sql/find_ledger_entry_by_request_id.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgLedgerRepository;

impl PgLedgerRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn append_entry(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entry: NewLedgerEntry,
    ) -> Result<LedgerEntryRecord, sqlx::Error> {
        let (ref_type, ref_uuid) = match entry.reference {
            Some(reference) => (Some(reference.ref_type), Some(reference.ref_uuid)),
            None => (None, None),
        };

        query_as::<Postgres, LedgerEntryRecord>(APPEND_LEDGER_ENTRY_SQL)
            .bind(LedgerEntryUuid::new().into_uuid())
            .bind(entry.wallet_uuid.into_uuid())
            .bind(entry.user_uuid.into_uuid())
            .bind(entry.entry_type.as_str())
            .bind(amount_to_i64("amount", entry.amount)?)
            .bind(amount_to_i64("balance_after", entry.balance_after)?)
            .bind(ref_type)
            .bind(ref_uuid)
            .bind(entry.request_id)
            .bind(entry.memo)
            .fetch_one(&mut **tx)
            .await
    }

    /// Most recent entries first.
    pub(crate) async fn list_entries(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        limit: u32,
    ) -> Result<Vec<LedgerEntryRecord>, sqlx::Error> {
        query_as::<Postgres, LedgerEntryRecord>(LIST_LEDGER_ENTRIES_SQL)
            .bind(user.into_uuid())
            .bind(i64::from(limit))
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn find_entry_by_request_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request_id: &str,
    ) -> Result<Option<LedgerEntryRecord>, sqlx::Error> {
        query_as::<Postgres, LedgerEntryRecord>(FIND_LEDGER_ENTRY_BY_REQUEST_ID_SQL)
            .bind(request_id)
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for LedgerEntryRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let entry_type: String = row.try_get("entry_type")?;
        let entry_type = entry_type
            .parse::<LedgerEntryType>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "entry_type".to_string(),
                source: Box::new(e),
            })?;

        let ref_type: Option<String> = row.try_get("ref_type")?;
        let ref_uuid: Option<Uuid> = row.try_get("ref_uuid")?;

        let reference = ref_type
            .zip(ref_uuid)
            .map(|(ref_type, ref_uuid)| LedgerReference { ref_type, ref_uuid });

        Ok(Self {
            uuid: LedgerEntryUuid::from_uuid(row.try_get("uuid")?),
            sequence: row.try_get("sequence")?,
            wallet_uuid: WalletUuid::from_uuid(row.try_get("wallet_uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            entry_type,
            amount: try_get_amount(row, "amount")?,
            balance_after: try_get_amount(row, "balance_after")?,
            reference,
            request_id: row.try_get("request_id")?,
            memo: row.try_get("memo")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
