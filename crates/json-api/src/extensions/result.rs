//! Result helper extensions for HTTP handlers.

use std::fmt::Display;

use salvo::prelude::StatusError;

use crate::errors::{coded, internal};

pub(crate) trait ResultExt<T> {
    /// Map any error to a logged, opaque internal server error.
    fn or_500(self, context: &str) -> Result<T, StatusError>;

    /// Map any error to a bad request tagged with `code`.
    fn or_400(self, code: &'static str) -> Result<T, StatusError>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Display,
{
    fn or_500(self, context: &str) -> Result<T, StatusError> {
        self.map_err(|error| internal(context, error))
    }

    fn or_400(self, code: &'static str) -> Result<T, StatusError> {
        self.map_err(|error| coded(StatusError::bad_request(), code, error))
    }
}
