//! Request helper extensions.

use salvo::Request;

/// Header carrying the client's idempotency key.
pub(crate) const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

pub(crate) trait RequestExt {
    /// The trimmed `Idempotency-Key` header, if present and not blank.
    fn idempotency_key(&self) -> Option<String>;
}

impl RequestExt for Request {
    fn idempotency_key(&self) -> Option<String> {
        self.header::<String>(IDEMPOTENCY_KEY_HEADER)
            .map(|key| key.trim().to_owned())
            .filter(|key| !key.is_empty())
    }
}
