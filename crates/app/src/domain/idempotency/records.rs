//! Idempotency Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{domain::users::records::UserUuid, uuids::TypedUuid};

/// Idempotency Record UUID
pub type IdempotencyRecordUuid = TypedUuid<IdempotencyRecord>;

/// Idempotency Record
///
/// At most one exists per request id. Created `InProgress`, then moved to
/// exactly one terminal state.
#[derive(Debug, Clone)]
pub struct IdempotencyRecord {
    pub uuid: IdempotencyRecordUuid,
    pub request_id: String,
    pub user_uuid: UserUuid,
    pub operation: String,
    pub status: IdempotencyStatus,
    /// Present only when `status` is `Success`.
    pub response: Option<Value>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdempotencyStatus {
    InProgress,
    Success,
    Failed,
}

impl IdempotencyStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

impl fmt::Display for IdempotencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown idempotency status: {0}")]
pub struct UnknownIdempotencyStatus(String);

impl FromStr for IdempotencyStatus {
    type Err = UnknownIdempotencyStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN_PROGRESS" => Ok(Self::InProgress),
            "SUCCESS" => Ok(Self::Success),
            "FAILED" => Ok(Self::Failed),
            other => Err(UnknownIdempotencyStatus(other.to_string())),
        }
    }
}
