//! Coupons Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};

use crate::{
    database::amount_to_i64,
    domain::coupons::{
        data::NewCoupon,
        records::{CouponRecord, CouponUuid},
    },
};

const CREATE_COUPON_SQL: &str = include_str!("../sql/create_coupon.sql");
const FIND_COUPON_BY_CODE_SQL: &str = include_str!("../sql/find_coupon_by_code.sql");
const GET_COUPON_SQL: &str = include_str!("../sql/get_coupon.sql");
const INCREMENT_ISSUED_COUNT_SQL: &str = include_str!("../sql/increment_issued_count.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCouponsRepository;

impl PgCouponsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: NewCoupon,
    ) -> Result<CouponRecord, sqlx::Error> {
        let total_quantity = coupon
            .total_quantity
            .map(|total| quantity_to_i32("total_quantity", total))
            .transpose()?;

        query_as::<Postgres, CouponRecord>(CREATE_COUPON_SQL)
            .bind(coupon.uuid.into_uuid())
            .bind(coupon.code)
            .bind(coupon.title)
            .bind(amount_to_i64("discount_value", coupon.discount_value)?)
            .bind(SqlxTimestamp::from(coupon.expires_at))
            .bind(total_quantity)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_coupon_by_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
    ) -> Result<CouponRecord, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(FIND_COUPON_BY_CODE_SQL)
            .bind(code)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_coupon(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<CouponRecord, sqlx::Error> {
        query_as::<Postgres, CouponRecord>(GET_COUPON_SQL)
            .bind(coupon.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Take one unit of capacity. Returns `false` when the coupon is sold out.
    ///
    /// The conditional `UPDATE` is the only place capacity is consumed; the
    /// row lock it takes is held until `tx` ends.
    pub(crate) async fn increment_issued_count(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        coupon: CouponUuid,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(INCREMENT_ISSUED_COUNT_SQL)
            .bind(coupon.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }
}

impl<'r> FromRow<'r, PgRow> for CouponRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        read_coupon(row, "")
    }
}

/// Decode a coupon whose columns carry `prefix`, so joined queries can reuse it.
pub(super) fn read_coupon(row: &PgRow, prefix: &str) -> sqlx::Result<CouponRecord> {
    let col = |name: &str| format!("{prefix}{name}");

    let discount_value: i64 = row.try_get(col("discount_value").as_str())?;
    let total_quantity: Option<i32> = row.try_get(col("total_quantity").as_str())?;
    let issued_count: i32 = row.try_get(col("issued_count").as_str())?;

    Ok(CouponRecord {
        uuid: CouponUuid::from_uuid(row.try_get(col("uuid").as_str())?),
        code: row.try_get(col("code").as_str())?,
        title: row.try_get(col("title").as_str())?,
        discount_value: decode_unsigned(&col("discount_value"), discount_value)?,
        expires_at: row
            .try_get::<SqlxTimestamp, _>(col("expires_at").as_str())?
            .to_jiff(),
        total_quantity: total_quantity
            .map(|total| decode_unsigned(&col("total_quantity"), total))
            .transpose()?,
        issued_count: decode_unsigned(&col("issued_count"), issued_count)?,
        created_at: row
            .try_get::<SqlxTimestamp, _>(col("created_at").as_str())?
            .to_jiff(),
        updated_at: row
            .try_get::<SqlxTimestamp, _>(col("updated_at").as_str())?
            .to_jiff(),
    })
}

fn decode_unsigned<S, U>(column: &str, value: S) -> Result<U, sqlx::Error>
where
    U: TryFrom<S, Error = std::num::TryFromIntError>,
{
    U::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn quantity_to_i32(column: &str, quantity: u32) -> Result<i32, sqlx::Error> {
    i32::try_from(quantity).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}
