//! Observability lifecycle.

use tracing::info;

use crate::config::ServerConfig;

use super::{ObservabilityError, logging, settings};

/// Install the global subscriber and apply request logging settings.
pub(crate) fn init(config: &ServerConfig) -> Result<(), ObservabilityError> {
    settings::apply_runtime_config(config);
    logging::init_subscriber(config)?;

    info!(
        slow_request_threshold_ms = config.observability.slow_request_threshold_ms,
        metrics_enabled = config.observability.metrics_enabled,
        "observability initialised"
    );

    Ok(())
}
