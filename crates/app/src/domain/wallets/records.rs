//! Wallet Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{domain::users::records::UserUuid, uuids::TypedUuid};

/// Wallet UUID
pub type WalletUuid = TypedUuid<WalletRecord>;

/// Ledger Entry UUID
pub type LedgerEntryUuid = TypedUuid<LedgerEntryRecord>;

/// Wallet Record
#[derive(Debug, Clone)]
pub struct WalletRecord {
    pub uuid: WalletUuid,
    pub user_uuid: UserUuid,
    pub balance: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Ledger Entry Record
///
/// Entries are append-only. `sequence` is assigned by the store and gives the
/// exact creation order within the table.
#[derive(Debug, Clone)]
pub struct LedgerEntryRecord {
    pub uuid: LedgerEntryUuid,
    pub sequence: i64,
    pub wallet_uuid: WalletUuid,
    pub user_uuid: UserUuid,
    pub entry_type: LedgerEntryType,
    pub amount: u64,
    pub balance_after: u64,
    pub reference: Option<LedgerReference>,
    pub request_id: Option<String>,
    pub memo: Option<String>,
    pub created_at: Timestamp,
}

/// Kind of balance mutation an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerEntryType {
    Charge,
    Redeem,
    Refund,
}

impl LedgerEntryType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Charge => "CHARGE",
            Self::Redeem => "REDEEM",
            Self::Refund => "REFUND",
        }
    }

    /// Whether the entry added to the balance.
    #[must_use]
    pub const fn is_credit(self) -> bool {
        matches!(self, Self::Charge | Self::Refund)
    }

    /// The entry's effect on the balance, signed.
    #[must_use]
    pub fn signed_amount(self, amount: u64) -> i128 {
        if self.is_credit() {
            i128::from(amount)
        } else {
            -i128::from(amount)
        }
    }
}

impl fmt::Display for LedgerEntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown ledger entry type: {0}")]
pub struct UnknownLedgerEntryType(String);

impl FromStr for LedgerEntryType {
    type Err = UnknownLedgerEntryType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CHARGE" => Ok(Self::Charge),
            "REDEEM" => Ok(Self::Redeem),
            "REFUND" => Ok(Self::Refund),
            other => Err(UnknownLedgerEntryType(other.to_string())),
        }
    }
}

/// The object that caused a balance mutation, e.g. the order being refunded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReference {
    pub ref_type: String,
    pub ref_uuid: Uuid,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_type_round_trips_through_storage_text() {
        for entry_type in [
            LedgerEntryType::Charge,
            LedgerEntryType::Redeem,
            LedgerEntryType::Refund,
        ] {
            assert_eq!(entry_type.as_str().parse::<LedgerEntryType>().ok(), Some(entry_type));
        }
    }

    #[test]
    fn unknown_entry_type_is_rejected() {
        assert!("ADJUST".parse::<LedgerEntryType>().is_err());
    }

    #[test]
    fn redeem_is_the_only_debit() {
        assert_eq!(LedgerEntryType::Charge.signed_amount(10), 10);
        assert_eq!(LedgerEntryType::Refund.signed_amount(10), 10);
        assert_eq!(LedgerEntryType::Redeem.signed_amount(10), -10);
    }
}
