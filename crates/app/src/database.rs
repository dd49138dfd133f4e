//! Database connection management

use sqlx::{
    PgPool, Postgres, Transaction,
    error::{DatabaseError, ErrorKind},
    migrate::MigrateError,
    postgres::PgPoolOptions,
};

/// Pool size used when the caller has no opinion.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction on its own pooled connection.
    ///
    /// Each call is an independent transactional scope: committing or rolling
    /// back one never affects another. Dropping the transaction without
    /// committing rolls it back and releases any row locks it acquired.
    ///
    /// # Errors
    ///
    /// Returns an error when no connection can be acquired or `BEGIN` fails.
    pub async fn begin_transaction(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Apply pending schema migrations.
///
/// # Errors
///
/// Returns an error if a migration fails or the applied history diverges.
pub async fn migrate(pool: &PgPool) -> Result<(), MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// Classify a store error by the constraint kind it violated, if any.
pub(crate) fn violation_kind(error: &sqlx::Error) -> Option<ErrorKind> {
    error.as_database_error().map(DatabaseError::kind)
}

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(violation_kind(error), Some(ErrorKind::UniqueViolation))
}

/// Convert an unsigned amount into the signed `BIGINT` the schema stores.
pub(crate) fn amount_to_i64(column: &str, amount: u64) -> Result<i64, sqlx::Error> {
    i64::try_from(amount).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}
