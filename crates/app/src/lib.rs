//! Point wallets, first-come-first-served coupons and idempotent request
//! handling on top of `PostgreSQL`.

pub mod context;
pub mod database;
pub mod domain;

#[cfg(test)]
mod test;

pub mod uuids;
