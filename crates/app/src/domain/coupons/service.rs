//! Coupons service.
//!
//! Capacity is consumed by a single conditional `UPDATE` and the issuance is
//! inserted in the same transaction, so a claim that loses the (user, coupon)
//! uniqueness race rolls its capacity back with it.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::{info, warn};

use crate::{
    database::{Db, is_unique_violation},
    domain::{
        coupons::{
            data::{ClaimCoupon, NewCoupon},
            errors::CouponsServiceError,
            records::{CouponRecord, IssuedCoupon, UserCouponStatus, UserCouponUuid},
            repositories::{PgCouponsRepository, PgUserCouponsRepository},
        },
        users::{records::UserUuid, repository::PgUsersRepository},
    },
};

const MAX_CODE_LEN: usize = 50;
const MAX_TITLE_LEN: usize = 100;
const MAX_REQUEST_ID_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct PgCouponsService {
    db: Db,
    users: PgUsersRepository,
    coupons: PgCouponsRepository,
    user_coupons: PgUserCouponsRepository,
}

impl PgCouponsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            users: PgUsersRepository::new(),
            coupons: PgCouponsRepository::new(),
            user_coupons: PgUserCouponsRepository::new(),
        }
    }
}

fn validate_new_coupon(coupon: &NewCoupon) -> Result<(), CouponsServiceError> {
    let code = coupon.code.trim();
    let title = coupon.title.trim();

    let valid = !code.is_empty()
        && code.chars().count() <= MAX_CODE_LEN
        && !title.is_empty()
        && title.chars().count() <= MAX_TITLE_LEN
        && i64::try_from(coupon.discount_value).is_ok()
        && coupon
            .total_quantity
            .is_none_or(|total| i32::try_from(total).is_ok());

    if valid {
        Ok(())
    } else {
        Err(CouponsServiceError::InvalidData)
    }
}

fn normalize_request_id(request_id: Option<String>) -> Result<Option<String>, CouponsServiceError> {
    let Some(request_id) = request_id else {
        return Ok(None);
    };

    let trimmed = request_id.trim();

    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.chars().count() > MAX_REQUEST_ID_LEN {
        return Err(CouponsServiceError::InvalidData);
    }

    Ok(Some(trimmed.to_string()))
}

#[async_trait]
impl CouponsService for PgCouponsService {
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError> {
        validate_new_coupon(&coupon)?;

        let mut tx = self.db.begin_transaction().await?;

        let created = self.coupons.create_coupon(&mut tx, coupon).await?;

        tx.commit().await?;

        info!(coupon = %created.uuid, code = %created.code, "coupon created");

        Ok(created)
    }

    async fn claim(
        &self,
        user: UserUuid,
        claim: ClaimCoupon,
    ) -> Result<IssuedCoupon, CouponsServiceError> {
        let request_id = normalize_request_id(claim.request_id)?;
        let now = Timestamp::now();

        let mut tx = self.db.begin_transaction().await?;

        if !self.users.user_exists(&mut tx, user).await? {
            return Err(CouponsServiceError::UserNotFound);
        }

        let coupon = self
            .coupons
            .find_coupon_by_code(&mut tx, claim.code.trim())
            .await?;

        if coupon.is_expired(now) {
            return Err(CouponsServiceError::Expired);
        }

        // Fast path only; the unique constraint below is authoritative.
        if self
            .user_coupons
            .issuance_exists(&mut tx, user, coupon.uuid)
            .await?
        {
            return Err(CouponsServiceError::AlreadyIssued);
        }

        if coupon.total_quantity.is_some()
            && !self
                .coupons
                .increment_issued_count(&mut tx, coupon.uuid)
                .await?
        {
            warn!(coupon = %coupon.uuid, code = %coupon.code, "coupon sold out");

            return Err(CouponsServiceError::SoldOut);
        }

        let issuance = match self
            .user_coupons
            .create_issuance(&mut tx, user, coupon.uuid, request_id)
            .await
        {
            Ok(issuance) => issuance,
            Err(error) if is_unique_violation(&error) => {
                return Err(CouponsServiceError::AlreadyIssued);
            }
            Err(error) => return Err(error.into()),
        };

        // Re-read so the returned coupon reflects the capacity just taken.
        let coupon = self.coupons.get_coupon(&mut tx, coupon.uuid).await?;

        tx.commit().await?;

        info!(
            user = %user,
            coupon = %coupon.uuid,
            issuance = %issuance.uuid,
            "coupon issued"
        );

        Ok(IssuedCoupon { issuance, coupon })
    }

    async fn use_coupon(
        &self,
        user: UserUuid,
        issuance: UserCouponUuid,
    ) -> Result<IssuedCoupon, CouponsServiceError> {
        let now = Timestamp::now();

        let mut tx = self.db.begin_transaction().await?;

        let locked = self
            .user_coupons
            .lock_issuance(&mut tx, issuance, user)
            .await?;

        match locked.status {
            UserCouponStatus::Used => return Err(CouponsServiceError::AlreadyUsed),
            UserCouponStatus::Issued => {}
        }

        let coupon = self.coupons.get_coupon(&mut tx, locked.coupon_uuid).await?;

        if coupon.is_expired(now) {
            return Err(CouponsServiceError::Expired);
        }

        let used = self.user_coupons.mark_used(&mut tx, locked.uuid).await?;

        tx.commit().await?;

        info!(user = %user, issuance = %used.uuid, "coupon used");

        Ok(IssuedCoupon {
            issuance: used,
            coupon,
        })
    }

    async fn list_user_coupons(
        &self,
        user: UserUuid,
    ) -> Result<Vec<IssuedCoupon>, CouponsServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let issued = self.user_coupons.list_user_coupons(&mut tx, user).await?;

        tx.commit().await?;

        Ok(issued)
    }
}

#[automock]
#[async_trait]
pub trait CouponsService: Send + Sync {
    /// Defines a new coupon.
    async fn create_coupon(&self, coupon: NewCoupon) -> Result<CouponRecord, CouponsServiceError>;

    /// Issues the coupon identified by `claim.code` to the user.
    async fn claim(
        &self,
        user: UserUuid,
        claim: ClaimCoupon,
    ) -> Result<IssuedCoupon, CouponsServiceError>;

    /// Marks one of the user's issuances as used.
    async fn use_coupon(
        &self,
        user: UserUuid,
        issuance: UserCouponUuid,
    ) -> Result<IssuedCoupon, CouponsServiceError>;

    /// The user's issuances, newest first.
    async fn list_user_coupons(
        &self,
        user: UserUuid,
    ) -> Result<Vec<IssuedCoupon>, CouponsServiceError>;
}
