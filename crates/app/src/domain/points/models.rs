//! Points Models

use serde::{Deserialize, Serialize};

use crate::domain::{users::records::UserUuid, wallets::records::LedgerEntryRecord};

/// Result of a charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeReceipt {
    pub user_uuid: UserUuid,
    pub charged_amount: u64,
    pub balance_after: u64,
    pub memo: Option<String>,
}

impl From<&LedgerEntryRecord> for ChargeReceipt {
    fn from(entry: &LedgerEntryRecord) -> Self {
        Self {
            user_uuid: entry.user_uuid,
            charged_amount: entry.amount,
            balance_after: entry.balance_after,
            memo: entry.memo.clone(),
        }
    }
}

/// Result of a redeem. This is the snapshot replayed for a repeated key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemReceipt {
    pub user_uuid: UserUuid,
    pub redeemed_amount: u64,
    pub balance_after: u64,
    pub memo: Option<String>,
}

impl From<&LedgerEntryRecord> for RedeemReceipt {
    fn from(entry: &LedgerEntryRecord) -> Self {
        Self {
            user_uuid: entry.user_uuid,
            redeemed_amount: entry.amount,
            balance_after: entry.balance_after,
            memo: entry.memo.clone(),
        }
    }
}
