//! Test context for service-level integration tests.

use sqlx::query;

use crate::{
    database::Db,
    domain::{
        coupons::PgCouponsService,
        idempotency::{PgIdempotencyService, data::IdempotencyPolicy},
        points::{PgPointsService, PointsService, PointsServiceError, data::ChargePoints, models::ChargeReceipt},
        users::{PgUsersService, UsersService, data::NewUser, records::UserUuid},
        wallets::PgWalletsService,
    },
};

use super::db::TestDb;

pub struct TestContext {
    pub db: TestDb,
    pub users: PgUsersService,
    pub wallets: PgWalletsService,
    pub coupons: PgCouponsService,
    pub idempotency: PgIdempotencyService,
    pub points: PgPointsService,
}

impl TestContext {
    pub async fn new() -> Self {
        let test_db = TestDb::new().await;
        let db = Db::new(test_db.pool().clone());
        let policy = IdempotencyPolicy::default();

        Self {
            users: PgUsersService::new(db.clone()),
            wallets: PgWalletsService::new(db.clone()),
            coupons: PgCouponsService::new(db.clone()),
            idempotency: PgIdempotencyService::new(db.clone(), policy),
            points: PgPointsService::new(db, policy),
            db: test_db,
        }
    }

    /// A [`Db`] handle on this test's database, for building extra services.
    pub fn app_db(&self) -> Db {
        Db::new(self.db.pool().clone())
    }

    /// Create a user with an empty wallet.
    pub async fn create_user(&self, name: &str) -> UserUuid {
        let uuid = UserUuid::new();

        self.users
            .create_user(NewUser {
                uuid,
                name: name.to_string(),
            })
            .await
            .expect("Failed to create test user");

        uuid
    }

    /// Create a user row directly, skipping wallet provisioning.
    pub async fn create_user_without_wallet(&self, name: &str) -> UserUuid {
        let uuid = UserUuid::new();

        query("INSERT INTO users (uuid, name) VALUES ($1, $2)")
            .bind(uuid.into_uuid())
            .bind(name)
            .execute(self.db.pool())
            .await
            .expect("Failed to insert walletless user");

        uuid
    }

    pub async fn charge(
        &self,
        user: UserUuid,
        amount: i64,
    ) -> Result<ChargeReceipt, PointsServiceError> {
        self.points
            .charge(user, ChargePoints { amount, memo: None })
            .await
    }

    /// Age an idempotency claim so it looks abandoned.
    pub async fn backdate_idempotency_claim(
        &self,
        request_id: &str,
        seconds: i32,
    ) -> Result<(), sqlx::Error> {
        query(
            "UPDATE idempotency_requests \
             SET updated_at = now() - make_interval(secs => $2) \
             WHERE request_id = $1",
        )
        .bind(request_id)
        .bind(f64::from(seconds))
        .execute(self.db.pool())
        .await?;

        Ok(())
    }
}
