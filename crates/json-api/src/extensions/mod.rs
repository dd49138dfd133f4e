//! Extension traits

mod depot;
mod request;
mod result;

pub(crate) use depot::DepotExt as _;
#[cfg(test)]
pub(crate) use request::IDEMPOTENCY_KEY_HEADER;
pub(crate) use request::RequestExt as _;
pub(crate) use result::ResultExt as _;
