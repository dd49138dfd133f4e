//! Test Infrastructure

mod context;

pub(crate) use context::TestContext;
