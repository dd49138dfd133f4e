//! App Router

use salvo::Router;

use crate::{coupons, healthcheck, points, users};

pub(crate) fn app_router() -> Router {
    Router::new()
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(Router::with_path("coupons").post(coupons::create::handler))
        .push(
            Router::with_path("users").post(users::create::handler).push(
                Router::with_path("{user}")
                    .get(users::get::handler)
                    .push(
                        Router::with_path("points")
                            .push(Router::with_path("balance").get(points::balance::handler))
                            .push(Router::with_path("ledger").get(points::ledger::handler))
                            .push(Router::with_path("charge").post(points::charge::handler))
                            .push(Router::with_path("redeem").post(points::redeem::handler)),
                    )
                    .push(
                        Router::with_path("coupons")
                            .get(coupons::index::handler)
                            .push(Router::with_path("claim").post(coupons::claim::handler))
                            .push(
                                Router::with_path("{user_coupon}/use")
                                    .post(coupons::use_coupon::handler),
                            ),
                    ),
            ),
        )
}
