//! Point Handlers

pub(crate) mod balance;
pub(crate) mod charge;
pub(crate) mod ledger;
pub(crate) mod redeem;
