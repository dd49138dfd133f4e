//! Idempotency Config

use std::time::Duration;

use clap::Args;

use tally_app::domain::idempotency::data::{DEFAULT_RECLAIM_AFTER, IdempotencyPolicy};

/// Idempotency key settings.
#[derive(Debug, Args)]
pub struct IdempotencyConfig {
    /// Seconds after which an in-progress key may be taken over by a retry (0 disables)
    #[arg(
        long,
        env = "IDEMPOTENCY_RECLAIM_AFTER_SECS",
        default_value_t = DEFAULT_RECLAIM_AFTER.as_secs()
    )]
    pub idempotency_reclaim_after_secs: u64,
}

impl IdempotencyConfig {
    /// Reclaim policy handed to the points service.
    #[must_use]
    pub fn policy(&self) -> IdempotencyPolicy {
        IdempotencyPolicy::new(Duration::from_secs(self.idempotency_reclaim_after_secs))
    }
}
