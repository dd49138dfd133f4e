//! State

use std::sync::Arc;

use tally_app::{
    context::AppContext,
    domain::{coupons::CouponsService, points::PointsService, users::UsersService},
};

/// Services shared by every handler, injected into the depot once per request.
#[derive(Clone)]
pub(crate) struct State {
    pub(crate) users: Arc<dyn UsersService>,
    pub(crate) points: Arc<dyn PointsService>,
    pub(crate) coupons: Arc<dyn CouponsService>,
}

impl State {
    #[must_use]
    pub(crate) fn from_app_context(app: AppContext) -> Arc<Self> {
        Arc::new(Self::from(app))
    }
}

impl From<AppContext> for State {
    fn from(app: AppContext) -> Self {
        Self {
            users: app.users,
            points: app.points,
            coupons: app.coupons,
        }
    }
}
