//! Idempotency service.
//!
//! Each method runs in its own transaction and commits before returning, so a
//! claim is visible to concurrent racers immediately and an outcome, once
//! marked, survives whatever the caller does next.

use async_trait::async_trait;
use mockall::automock;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    database::{Db, is_unique_violation},
    domain::idempotency::{
        data::{ClaimOutcome, IdempotencyPolicy, MAX_REQUEST_ID_LEN, NewIdempotencyClaim},
        errors::IdempotencyServiceError,
        records::{IdempotencyRecord, IdempotencyStatus},
        repository::PgIdempotencyRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgIdempotencyService {
    db: Db,
    repository: PgIdempotencyRepository,
    policy: IdempotencyPolicy,
}

impl PgIdempotencyService {
    #[must_use]
    pub fn new(db: Db, policy: IdempotencyPolicy) -> Self {
        Self {
            db,
            repository: PgIdempotencyRepository::new(),
            policy,
        }
    }

    /// Resolve a claim that collided with an existing record.
    async fn resolve_conflict(
        &self,
        claim: &NewIdempotencyClaim,
    ) -> Result<ClaimOutcome, IdempotencyServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let Some(existing) = self
            .repository
            .find_by_request_id(&mut tx, &claim.request_id)
            .await?
        else {
            // The winning claim is not visible yet; report it as running.
            return Err(IdempotencyServiceError::InProgress);
        };

        let outcome = match existing.status {
            IdempotencyStatus::Success => Ok(ClaimOutcome::Completed(existing)),
            IdempotencyStatus::Failed => Err(IdempotencyServiceError::Failed),
            IdempotencyStatus::InProgress if self.policy.reclaim_enabled() => self
                .repository
                .reclaim_stale(&mut tx, claim, self.policy.reclaim_after)
                .await?
                .map(|record| {
                    warn!(
                        request_id = %record.request_id,
                        user = %record.user_uuid,
                        operation = %record.operation,
                        "reclaimed stale in-progress idempotency claim"
                    );

                    ClaimOutcome::Reclaimed(record)
                })
                .ok_or(IdempotencyServiceError::InProgress),
            IdempotencyStatus::InProgress => Err(IdempotencyServiceError::InProgress),
        };

        tx.commit().await?;

        outcome
    }
}

fn validate_request_id(request_id: &str) -> Result<(), IdempotencyServiceError> {
    if request_id.trim().is_empty() || request_id.chars().count() > MAX_REQUEST_ID_LEN {
        return Err(IdempotencyServiceError::InvalidKey);
    }

    Ok(())
}

#[async_trait]
impl IdempotencyService for PgIdempotencyService {
    async fn lookup(
        &self,
        request_id: &str,
    ) -> Result<Option<IdempotencyRecord>, IdempotencyServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let record = self
            .repository
            .find_by_request_id(&mut tx, request_id)
            .await?;

        tx.commit().await?;

        Ok(record)
    }

    async fn claim(
        &self,
        claim: NewIdempotencyClaim,
    ) -> Result<ClaimOutcome, IdempotencyServiceError> {
        validate_request_id(&claim.request_id)?;

        let mut tx = self.db.begin_transaction().await?;

        match self.repository.insert_claim(&mut tx, &claim).await {
            Ok(record) => {
                tx.commit().await?;

                debug!(request_id = %record.request_id, "idempotency key claimed");

                Ok(ClaimOutcome::Acquired(record))
            }
            Err(error) if is_unique_violation(&error) => {
                // The failed insert aborted `tx`; read back in a fresh one.
                drop(tx);

                self.resolve_conflict(&claim).await
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn mark_success(
        &self,
        request_id: &str,
        response: Value,
    ) -> Result<(), IdempotencyServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self
            .repository
            .mark_success(&mut tx, request_id, response)
            .await?;

        if rows_affected == 0 {
            return Err(IdempotencyServiceError::NotClaimed);
        }

        tx.commit().await?;

        Ok(())
    }

    async fn mark_failed(&self, request_id: &str) -> Result<(), IdempotencyServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self.repository.mark_failed(&mut tx, request_id).await?;

        if rows_affected == 0 {
            return Err(IdempotencyServiceError::NotClaimed);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait IdempotencyService: Send + Sync {
    /// The record stored under `request_id`, if any. Takes no locks.
    async fn lookup(
        &self,
        request_id: &str,
    ) -> Result<Option<IdempotencyRecord>, IdempotencyServiceError>;

    /// Takes the execution right for a key.
    ///
    /// Fails with [`IdempotencyServiceError::InProgress`] while another attempt
    /// holds the key and with [`IdempotencyServiceError::Failed`] once the key
    /// has failed terminally.
    async fn claim(
        &self,
        claim: NewIdempotencyClaim,
    ) -> Result<ClaimOutcome, IdempotencyServiceError>;

    /// Moves an `IN_PROGRESS` record to `SUCCESS` with its response snapshot.
    async fn mark_success(
        &self,
        request_id: &str,
        response: Value,
    ) -> Result<(), IdempotencyServiceError>;

    /// Moves an `IN_PROGRESS` record to `FAILED`.
    async fn mark_failed(&self, request_id: &str) -> Result<(), IdempotencyServiceError>;
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;
    use tokio::task::JoinSet;

    use crate::{domain::users::records::UserUuid, test::TestContext};

    use super::*;

    fn new_claim(request_id: &str, user: UserUuid) -> NewIdempotencyClaim {
        NewIdempotencyClaim {
            request_id: request_id.to_string(),
            user_uuid: user,
            operation: "test.operation".to_string(),
        }
    }

    #[test]
    fn validate_request_id_rejects_blank_and_oversized_keys() {
        assert!(validate_request_id("key-1").is_ok());
        assert!(validate_request_id("   ").is_err());
        assert!(validate_request_id(&"k".repeat(65)).is_err());
    }

    #[tokio::test]
    async fn lookup_unknown_key_returns_none() -> TestResult {
        let ctx = TestContext::new().await;

        assert!(ctx.idempotency.lookup("nope").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn first_claim_is_acquired_in_progress() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();

        let outcome = ctx.idempotency.claim(new_claim("key-1", user)).await?;

        assert!(matches!(outcome, ClaimOutcome::Acquired(_)));
        assert_eq!(outcome.record().status, IdempotencyStatus::InProgress);
        assert!(outcome.record().response.is_none());

        let stored = ctx.idempotency.lookup("key-1").await?;

        assert_eq!(stored.map(|record| record.user_uuid), Some(user));

        Ok(())
    }

    #[tokio::test]
    async fn claim_while_in_progress_returns_in_progress() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();

        ctx.idempotency.claim(new_claim("key-1", user)).await?;

        let result = ctx.idempotency.claim(new_claim("key-1", user)).await;

        assert!(
            matches!(result, Err(IdempotencyServiceError::InProgress)),
            "expected InProgress, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn claim_after_failure_returns_failed() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();

        ctx.idempotency.claim(new_claim("key-1", user)).await?;
        ctx.idempotency.mark_failed("key-1").await?;

        let result = ctx.idempotency.claim(new_claim("key-1", user)).await;

        assert!(
            matches!(result, Err(IdempotencyServiceError::Failed)),
            "expected Failed, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn claim_after_success_returns_completed_with_snapshot() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let snapshot = json!({ "balance_after": 42 });

        ctx.idempotency.claim(new_claim("key-1", user)).await?;
        ctx.idempotency.mark_success("key-1", snapshot.clone()).await?;

        let outcome = ctx.idempotency.claim(new_claim("key-1", user)).await?;

        assert!(matches!(outcome, ClaimOutcome::Completed(_)));
        assert_eq!(outcome.record().status, IdempotencyStatus::Success);
        assert_eq!(outcome.record().response.as_ref(), Some(&snapshot));

        Ok(())
    }

    #[tokio::test]
    async fn terminal_records_cannot_be_marked_again() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();

        ctx.idempotency.claim(new_claim("key-1", user)).await?;
        ctx.idempotency.mark_success("key-1", json!({})).await?;

        let again = ctx.idempotency.mark_failed("key-1").await;
        let missing = ctx.idempotency.mark_success("unknown", json!({})).await;

        assert!(matches!(again, Err(IdempotencyServiceError::NotClaimed)));
        assert!(matches!(missing, Err(IdempotencyServiceError::NotClaimed)));

        let stored = ctx.idempotency.lookup("key-1").await?;

        assert_eq!(
            stored.map(|record| record.status),
            Some(IdempotencyStatus::Success)
        );

        Ok(())
    }

    #[tokio::test]
    async fn stale_claim_is_reclaimed_by_same_user() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();

        ctx.idempotency.claim(new_claim("key-1", user)).await?;
        ctx.backdate_idempotency_claim("key-1", 600).await?;

        let outcome = ctx.idempotency.claim(new_claim("key-1", user)).await?;

        assert!(matches!(outcome, ClaimOutcome::Reclaimed(_)));

        // The refreshed claim is no longer stale.
        let result = ctx.idempotency.claim(new_claim("key-1", user)).await;

        assert!(matches!(result, Err(IdempotencyServiceError::InProgress)));

        Ok(())
    }

    #[tokio::test]
    async fn stale_claim_of_other_user_is_not_reclaimed() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.idempotency
            .claim(new_claim("key-1", UserUuid::new()))
            .await?;
        ctx.backdate_idempotency_claim("key-1", 600).await?;

        let result = ctx
            .idempotency
            .claim(new_claim("key-1", UserUuid::new()))
            .await;

        assert!(matches!(result, Err(IdempotencyServiceError::InProgress)));

        Ok(())
    }

    #[tokio::test]
    async fn reclaim_disabled_leaves_stale_claim_in_progress() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let service = PgIdempotencyService::new(ctx.app_db(), IdempotencyPolicy::never_reclaim());

        service.claim(new_claim("key-1", user)).await?;
        ctx.backdate_idempotency_claim("key-1", 86_400).await?;

        let result = service.claim(new_claim("key-1", user)).await;

        assert!(matches!(result, Err(IdempotencyServiceError::InProgress)));

        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_claims_have_exactly_one_winner() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();

        let mut tasks = JoinSet::new();

        for _ in 0..25 {
            let idempotency = ctx.idempotency.clone();

            tasks.spawn(async move { idempotency.claim(new_claim("shared", user)).await });
        }

        let mut acquired = 0;

        while let Some(joined) = tasks.join_next().await {
            match joined? {
                Ok(ClaimOutcome::Acquired(_)) => acquired += 1,
                Err(IdempotencyServiceError::InProgress) => {}
                other => panic!("unexpected claim result: {other:?}"),
            }
        }

        assert_eq!(acquired, 1);

        Ok(())
    }
}
