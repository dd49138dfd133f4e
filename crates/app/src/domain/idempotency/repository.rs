//! Idempotency Repository

use std::time::Duration;

use jiff_sqlx::Timestamp as SqlxTimestamp;
use serde_json::Value;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::domain::{
    idempotency::{
        data::NewIdempotencyClaim,
        records::{IdempotencyRecord, IdempotencyRecordUuid, IdempotencyStatus},
    },
    users::records::UserUuid,
};

const FIND_BY_REQUEST_ID_SQL: &str = include_str!("sql/find_by_request_id.sql");
const INSERT_CLAIM_SQL: &str = include_str!("sql/insert_claim.sql");
const RECLAIM_STALE_SQL: &str = include_str!("sql/reclaim_stale.sql");
const MARK_SUCCESS_SQL: &str = include_str!("sql/mark_success.sql");
const MARK_FAILED_SQL: &str = include_str!("sql/mark_failed.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgIdempotencyRepository;

impl PgIdempotencyRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn find_by_request_id(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request_id: &str,
    ) -> Result<Option<IdempotencyRecord>, sqlx::Error> {
        query_as::<Postgres, IdempotencyRecord>(FIND_BY_REQUEST_ID_SQL)
            .bind(request_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Insert an `IN_PROGRESS` record. A unique violation means the key is taken.
    pub(crate) async fn insert_claim(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        claim: &NewIdempotencyClaim,
    ) -> Result<IdempotencyRecord, sqlx::Error> {
        query_as::<Postgres, IdempotencyRecord>(INSERT_CLAIM_SQL)
            .bind(IdempotencyRecordUuid::new().into_uuid())
            .bind(claim.request_id.as_str())
            .bind(claim.user_uuid.into_uuid())
            .bind(claim.operation.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Refresh an `IN_PROGRESS` record untouched for longer than `reclaim_after`,
    /// judged by the store clock. Only one concurrent caller can win.
    pub(crate) async fn reclaim_stale(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        claim: &NewIdempotencyClaim,
        reclaim_after: Duration,
    ) -> Result<Option<IdempotencyRecord>, sqlx::Error> {
        query_as::<Postgres, IdempotencyRecord>(RECLAIM_STALE_SQL)
            .bind(claim.request_id.as_str())
            .bind(claim.user_uuid.into_uuid())
            .bind(claim.operation.as_str())
            .bind(reclaim_after.as_secs_f64())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn mark_success(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request_id: &str,
        response: Value,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MARK_SUCCESS_SQL)
            .bind(request_id)
            .bind(response)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn mark_failed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(MARK_FAILED_SQL)
            .bind(request_id)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for IdempotencyRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;
        let status = status
            .parse::<IdempotencyStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: IdempotencyRecordUuid::from_uuid(row.try_get("uuid")?),
            request_id: row.try_get("request_id")?,
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            operation: row.try_get("operation")?,
            status,
            response: row.try_get("response_body")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
