//! Depot helper extensions.

use std::sync::Arc;

use salvo::prelude::{Depot, StatusError};
use tracing::error;

use crate::state::State;

/// Access to the injected application state.
pub(crate) trait DepotExt {
    /// The shared [`State`], or a 500 when the router forgot to inject it.
    fn app_state(&self) -> Result<&Arc<State>, StatusError>;
}

impl DepotExt for Depot {
    fn app_state(&self) -> Result<&Arc<State>, StatusError> {
        self.obtain::<Arc<State>>().map_err(|_ignored| {
            error!("application state missing from depot");

            StatusError::internal_server_error()
        })
    }
}

#[cfg(test)]
mod tests {
    use salvo::{prelude::*, test::TestClient};
    use testresult::TestResult;

    use super::*;

    #[handler]
    async fn needs_state(depot: &mut Depot) -> Result<&'static str, StatusError> {
        depot.app_state()?;

        Ok("ok")
    }

    #[tokio::test]
    async fn missing_state_is_a_500() -> TestResult {
        let service = Service::new(Router::with_path("state").get(needs_state));

        let res = TestClient::get("http://example.com/state")
            .send(&service)
            .await;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));

        Ok(())
    }
}
