//! Wallet Data

use crate::domain::{
    users::records::UserUuid,
    wallets::records::{LedgerEntryType, LedgerReference, WalletUuid},
};

/// Number of ledger entries returned when the caller does not ask for a limit.
pub const DEFAULT_LEDGER_LIMIT: u32 = 20;

/// Upper bound on a single ledger page.
pub const MAX_LEDGER_LIMIT: u32 = 100;

/// A requested balance mutation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceChange {
    /// Points to add or remove. Must be positive.
    pub amount: i64,

    /// Free-form note stored on the ledger entry.
    pub memo: Option<String>,

    /// Idempotency key of the request that caused this change.
    pub request_id: Option<String>,

    /// Object that caused the change. Required for refunds.
    pub reference: Option<LedgerReference>,
}

impl BalanceChange {
    #[must_use]
    pub fn new(amount: i64) -> Self {
        Self {
            amount,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    #[must_use]
    pub fn with_reference(mut self, reference: LedgerReference) -> Self {
        self.reference = Some(reference);
        self
    }
}

/// Clamp a requested ledger page size into `1..=MAX_LEDGER_LIMIT`.
#[must_use]
pub fn ledger_limit(requested: Option<u32>) -> u32 {
    requested
        .unwrap_or(DEFAULT_LEDGER_LIMIT)
        .clamp(1, MAX_LEDGER_LIMIT)
}

pub(crate) struct NewLedgerEntry {
    pub wallet_uuid: WalletUuid,
    pub user_uuid: UserUuid,
    pub entry_type: LedgerEntryType,
    pub amount: u64,
    pub balance_after: u64,
    pub reference: Option<LedgerReference>,
    pub request_id: Option<String>,
    pub memo: Option<String>,
}
