//! Idempotency Data

use std::time::Duration;

use crate::domain::{idempotency::records::IdempotencyRecord, users::records::UserUuid};

/// How long an `IN_PROGRESS` claim may sit untouched before another attempt
/// with the same key may take it over.
pub const DEFAULT_RECLAIM_AFTER: Duration = Duration::from_secs(300);

/// Longest request id the store accepts.
pub const MAX_REQUEST_ID_LEN: usize = 64;

/// A request to take the execution right for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIdempotencyClaim {
    pub request_id: String,
    pub user_uuid: UserUuid,
    pub operation: String,
}

/// Result of a successful claim.
#[derive(Debug, Clone)]
pub enum ClaimOutcome {
    /// The key was new; the caller must execute and then mark the outcome.
    Acquired(IdempotencyRecord),

    /// A stale `IN_PROGRESS` claim was taken over. An earlier attempt may
    /// already have applied its effect.
    Reclaimed(IdempotencyRecord),

    /// The key already completed successfully; replay its response.
    Completed(IdempotencyRecord),
}

impl ClaimOutcome {
    #[must_use]
    pub fn record(&self) -> &IdempotencyRecord {
        match self {
            Self::Acquired(record) | Self::Reclaimed(record) | Self::Completed(record) => record,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdempotencyPolicy {
    /// Age after which an `IN_PROGRESS` claim may be reclaimed. Zero disables reclaim.
    pub reclaim_after: Duration,
}

impl IdempotencyPolicy {
    #[must_use]
    pub const fn new(reclaim_after: Duration) -> Self {
        Self { reclaim_after }
    }

    /// A policy under which a stuck claim stays stuck.
    #[must_use]
    pub const fn never_reclaim() -> Self {
        Self::new(Duration::ZERO)
    }

    #[must_use]
    pub const fn reclaim_enabled(&self) -> bool {
        !self.reclaim_after.is_zero()
    }
}

impl Default for IdempotencyPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RECLAIM_AFTER)
    }
}
