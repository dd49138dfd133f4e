//! User Coupons Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};

use crate::domain::{
    coupons::records::{
        CouponUuid, IssuedCoupon, UserCouponRecord, UserCouponStatus, UserCouponUuid,
    },
    users::records::UserUuid,
};

use super::coupons::read_coupon;

const ISSUANCE_EXISTS_SQL: &str = include_str!("../sql/issuance_exists.sql");
const CREATE_ISSUANCE_SQL: &str = include_str!("../sql/create_issuance.sql");
const LOCK_ISSUANCE_SQL: &str = include_str!("../sql/lock_issuance.sql");
const MARK_ISSUANCE_USED_SQL: &str = include_str!("../sql/mark_issuance_used.sql");
const LIST_USER_COUPONS_SQL: &str = include_str!("../sql/list_user_coupons.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgUserCouponsRepository;

impl PgUserCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn issuance_exists(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        coupon: CouponUuid,
    ) -> Result<bool, sqlx::Error> {
        query_scalar::<Postgres, bool>(ISSUANCE_EXISTS_SQL)
            .bind(user.into_uuid())
            .bind(coupon.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_issuance(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        coupon: CouponUuid,
        request_id: Option<String>,
    ) -> Result<UserCouponRecord, sqlx::Error> {
        query_as::<Postgres, UserCouponRecord>(CREATE_ISSUANCE_SQL)
            .bind(UserCouponUuid::new().into_uuid())
            .bind(user.into_uuid())
            .bind(coupon.into_uuid())
            .bind(request_id)
            .fetch_one(&mut **tx)
            .await
    }

    /// Load an issuance owned by `user` and hold its row lock until `tx` ends.
    pub(crate) async fn lock_issuance(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        issuance: UserCouponUuid,
        user: UserUuid,
    ) -> Result<UserCouponRecord, sqlx::Error> {
        query_as::<Postgres, UserCouponRecord>(LOCK_ISSUANCE_SQL)
            .bind(issuance.into_uuid())
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn mark_used(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        issuance: UserCouponUuid,
    ) -> Result<UserCouponRecord, sqlx::Error> {
        query_as::<Postgres, UserCouponRecord>(MARK_ISSUANCE_USED_SQL)
            .bind(issuance.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_user_coupons(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<IssuedCoupon>, sqlx::Error> {
        query_as::<Postgres, IssuedCoupon>(LIST_USER_COUPONS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for UserCouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let status: String = row.try_get("status")?;
        let status = status
            .parse::<UserCouponStatus>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "status".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            uuid: UserCouponUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            coupon_uuid: CouponUuid::from_uuid(row.try_get("coupon_uuid")?),
            status,
            issued_at: row.try_get::<SqlxTimestamp, _>("issued_at")?.to_jiff(),
            used_at: row
                .try_get::<Option<SqlxTimestamp>, _>("used_at")?
                .map(SqlxTimestamp::to_jiff),
            request_id: row.try_get("request_id")?,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for IssuedCoupon {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        // `coupon_uuid` doubles as the joined coupon's key.
        Ok(Self {
            issuance: UserCouponRecord::from_row(row)?,
            coupon: read_coupon(row, "coupon_")?,
        })
    }
}
