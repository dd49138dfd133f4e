//! Error response helpers.
//!
//! Every error response carries a stable code as its brief so clients can
//! branch on it without parsing messages.

use std::fmt::Display;

use salvo::http::StatusError;
use tracing::error;

use crate::observability::observe_error_code;

pub(crate) const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// Tag a client-facing error with its code and a readable detail.
pub(crate) fn coded(status: StatusError, code: &'static str, detail: impl Display) -> StatusError {
    observe_error_code(code);

    status.brief(code).detail(detail.to_string())
}

/// Log the failure and answer with an opaque 500.
pub(crate) fn internal(context: &str, source: impl Display) -> StatusError {
    error!("{context}: {source}");
    observe_error_code(INTERNAL_ERROR);

    StatusError::internal_server_error().brief(INTERNAL_ERROR)
}
