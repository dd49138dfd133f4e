//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};

use tally_app::domain::{
    coupons::{
        MockCouponsService,
        records::{
            CouponRecord, CouponUuid, IssuedCoupon, UserCouponRecord, UserCouponStatus,
            UserCouponUuid,
        },
    },
    points::MockPointsService,
    users::{MockUsersService, records::UserUuid},
};

use crate::state::State;

/// Mocks panic on any call without a matching expectation, so the services a
/// test does not configure act as tripwires.
fn state(
    users: MockUsersService,
    points: MockPointsService,
    coupons: MockCouponsService,
) -> Arc<State> {
    Arc::new(State {
        users: Arc::new(users),
        points: Arc::new(points),
        coupons: Arc::new(coupons),
    })
}

fn service(state: Arc<State>, route: Router) -> Service {
    Service::new(Router::new().hoop(inject(state)).push(route))
}

pub(crate) fn users_service(users: MockUsersService, route: Router) -> Service {
    service(
        state(users, MockPointsService::new(), MockCouponsService::new()),
        route,
    )
}

pub(crate) fn points_service(points: MockPointsService, route: Router) -> Service {
    service(
        state(MockUsersService::new(), points, MockCouponsService::new()),
        route,
    )
}

pub(crate) fn coupons_service(coupons: MockCouponsService, route: Router) -> Service {
    service(
        state(MockUsersService::new(), MockPointsService::new(), coupons),
        route,
    )
}

pub(crate) fn make_issued_coupon(user: UserUuid, status: UserCouponStatus) -> IssuedCoupon {
    let coupon = CouponRecord {
        uuid: CouponUuid::new(),
        code: "WELCOME10".to_owned(),
        title: "Welcome".to_owned(),
        discount_value: 1_000,
        expires_at: Timestamp::MAX,
        total_quantity: Some(100),
        issued_count: 1,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    };

    let used_at = (status == UserCouponStatus::Used).then_some(Timestamp::UNIX_EPOCH);

    IssuedCoupon {
        issuance: UserCouponRecord {
            uuid: UserCouponUuid::new(),
            user_uuid: user,
            coupon_uuid: coupon.uuid,
            status,
            issued_at: Timestamp::UNIX_EPOCH,
            used_at,
            request_id: None,
        },
        coupon,
    }
}
