//! Point Ledger Handler

use salvo::{
    oapi::{
        ToSchema,
        extract::{PathParam, QueryParam},
    },
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tally_app::domain::wallets::records::LedgerEntryRecord;

use crate::{extensions::*, points::errors::into_status_error};

/// Ledger Entry Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LedgerEntryResponse {
    /// The unique identifier of the entry
    pub uuid: Uuid,

    /// Position in the ledger; higher is newer
    pub sequence: i64,

    /// CHARGE, REDEEM or REFUND
    pub entry_type: String,

    /// Points moved by this entry
    pub amount: u64,

    /// Wallet balance once the entry applied
    pub balance_after: u64,

    /// Kind of object a refund points at
    pub reference_type: Option<String>,

    /// Id of the object a refund points at
    pub reference_uuid: Option<Uuid>,

    /// Idempotency key that produced the entry
    pub request_id: Option<String>,

    /// Free-form note
    pub memo: Option<String>,

    /// The date and time the entry was written
    pub created_at: String,
}

impl From<LedgerEntryRecord> for LedgerEntryResponse {
    fn from(entry: LedgerEntryRecord) -> Self {
        let (reference_type, reference_uuid) = entry
            .reference
            .map(|reference| (reference.ref_type, reference.ref_uuid))
            .unzip();

        Self {
            uuid: entry.uuid.into_uuid(),
            sequence: entry.sequence,
            entry_type: entry.entry_type.to_string(),
            amount: entry.amount,
            balance_after: entry.balance_after,
            reference_type,
            reference_uuid,
            request_id: entry.request_id,
            memo: entry.memo,
            created_at: entry.created_at.to_string(),
        }
    }
}

/// Ledger Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct LedgerResponse {
    /// Most recent entries first
    pub entries: Vec<LedgerEntryResponse>,
}

/// Point Ledger Handler
///
/// Returns the most recent ledger entries. `limit` defaults to 20 and is
/// capped at 100.
#[endpoint(tags("points"), summary = "List Ledger Entries")]
pub(crate) async fn handler(
    user: PathParam<Uuid>,
    limit: QueryParam<u32, false>,
    depot: &mut Depot,
) -> Result<Json<LedgerResponse>, StatusError> {
    let state = depot.app_state()?;

    let entries = state
        .points
        .ledger(user.into_inner().into(), limit.into_inner())
        .await
        .map_err(into_status_error)?;

    Ok(Json(LedgerResponse {
        entries: entries.into_iter().map(Into::into).collect(),
    }))
}
