//! App Context

use std::sync::Arc;

use sqlx::migrate::MigrateError;
use thiserror::Error;
use tracing::info;

use crate::{
    database::{self, Db},
    domain::{
        coupons::{CouponsService, PgCouponsService},
        idempotency::data::IdempotencyPolicy,
        points::{PgPointsService, PointsService},
        users::{PgUsersService, UsersService},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),

    #[error("failed to apply database migrations")]
    Migrate(#[source] MigrateError),
}

/// Settings needed to build an [`AppContext`].
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub database_url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
    pub idempotency: IdempotencyPolicy,
}

#[derive(Clone)]
pub struct AppContext {
    pub users: Arc<dyn UsersService>,
    pub points: Arc<dyn PointsService>,
    pub coupons: Arc<dyn CouponsService>,
}

impl AppContext {
    /// Build application context from connection settings.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection or applying
    /// migrations fails.
    pub async fn connect(settings: &AppSettings) -> Result<Self, AppInitError> {
        let pool = database::connect(&settings.database_url, settings.max_connections)
            .await
            .map_err(AppInitError::Database)?;

        if settings.run_migrations {
            database::migrate(&pool)
                .await
                .map_err(AppInitError::Migrate)?;

            info!("database migrations applied");
        }

        Ok(Self::from_db(Db::new(pool), settings.idempotency))
    }

    #[must_use]
    pub fn from_db(db: Db, policy: IdempotencyPolicy) -> Self {
        Self {
            users: Arc::new(PgUsersService::new(db.clone())),
            points: Arc::new(PgPointsService::new(db.clone(), policy)),
            coupons: Arc::new(PgCouponsService::new(db)),
        }
    }
}
