//! Wallets

pub mod data;
pub mod errors;
pub mod records;
pub(crate) mod repositories;
pub mod service;

pub use errors::WalletsServiceError;
pub use service::*;
