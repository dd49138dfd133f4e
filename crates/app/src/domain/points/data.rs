//! Points Data

/// Operation name recorded against redeem idempotency keys.
pub const REDEEM_OPERATION: &str = "points.redeem";

/// Charge Request Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargePoints {
    pub amount: i64,
    pub memo: Option<String>,
}

/// Redeem Request Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemPoints {
    pub amount: i64,
    pub memo: Option<String>,

    /// Client idempotency key. Required.
    pub request_id: String,
}
