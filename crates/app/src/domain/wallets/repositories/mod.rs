//! Wallet Repositories

mod ledger;
mod wallets;

pub(crate) use ledger::PgLedgerRepository;
pub(crate) use wallets::PgWalletsRepository;
