//! Coupon Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{domain::users::records::UserUuid, uuids::TypedUuid};

/// Coupon UUID
pub type CouponUuid = TypedUuid<CouponRecord>;

/// User Coupon (issuance) UUID
pub type UserCouponUuid = TypedUuid<UserCouponRecord>;

/// Coupon Record
#[derive(Debug, Clone)]
pub struct CouponRecord {
    pub uuid: CouponUuid,
    pub code: String,
    pub title: String,
    pub discount_value: u64,
    pub expires_at: Timestamp,
    /// `None` means unlimited.
    pub total_quantity: Option<u32>,
    pub issued_count: u32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CouponRecord {
    /// Whether `now` is past the coupon's expiry.
    #[must_use]
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at < now
    }

    /// Issuances still available, or `None` when unlimited.
    #[must_use]
    pub fn remaining(&self) -> Option<u32> {
        self.total_quantity
            .map(|total| total.saturating_sub(self.issued_count))
    }
}

/// User Coupon Record
///
/// One per (user, coupon) pair. Moves from `Issued` to `Used` exactly once.
#[derive(Debug, Clone)]
pub struct UserCouponRecord {
    pub uuid: UserCouponUuid,
    pub user_uuid: UserUuid,
    pub coupon_uuid: CouponUuid,
    pub status: UserCouponStatus,
    pub issued_at: Timestamp,
    pub used_at: Option<Timestamp>,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserCouponStatus {
    Issued,
    Used,
}

impl UserCouponStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Issued => "ISSUED",
            Self::Used => "USED",
        }
    }
}

impl fmt::Display for UserCouponStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown user coupon status: {0}")]
pub struct UnknownUserCouponStatus(String);

impl FromStr for UserCouponStatus {
    type Err = UnknownUserCouponStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ISSUED" => Ok(Self::Issued),
            "USED" => Ok(Self::Used),
            other => Err(UnknownUserCouponStatus(other.to_string())),
        }
    }
}

/// An issuance together with the coupon it binds.
#[derive(Debug, Clone)]
pub struct IssuedCoupon {
    pub issuance: UserCouponRecord,
    pub coupon: CouponRecord,
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};

    use super::*;

    fn coupon(expires_at: Timestamp, total_quantity: Option<u32>, issued_count: u32) -> CouponRecord {
        CouponRecord {
            uuid: CouponUuid::new(),
            code: "WELCOME".to_string(),
            title: "Welcome".to_string(),
            discount_value: 1_000,
            expires_at,
            total_quantity,
            issued_count,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn coupon_is_expired_only_after_expiry() {
        let now = Timestamp::now();

        let later = coupon(now + SignedDuration::from_secs(60), None, 0);
        let earlier = coupon(now - SignedDuration::from_secs(60), None, 0);
        let exact = coupon(now, None, 0);

        assert!(!later.is_expired(now));
        assert!(earlier.is_expired(now));
        assert!(!exact.is_expired(now));
    }

    #[test]
    fn remaining_is_none_for_unlimited_coupons() {
        let now = Timestamp::now();

        assert_eq!(coupon(now, None, 7).remaining(), None);
        assert_eq!(coupon(now, Some(10), 7).remaining(), Some(3));
    }

    #[test]
    fn status_parses_storage_text() {
        assert_eq!("ISSUED".parse::<UserCouponStatus>().ok(), Some(UserCouponStatus::Issued));
        assert_eq!("USED".parse::<UserCouponStatus>().ok(), Some(UserCouponStatus::Used));
        assert!("EXPIRED".parse::<UserCouponStatus>().is_err());
    }
}
