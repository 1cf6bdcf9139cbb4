//! The job progress protocol.
//!
//! Many workers finish at unpredictable, overlapping times and all
//! mutate one shared record. Nothing here holds a lock: every mutation
//! is a read-compute-conditional-write cycle gated on the version
//! token observed at read time, retried a bounded number of times with
//! a short delay when another writer wins the race. Exhausting the
//! budget surfaces [`CoreError::ProgressUpdateFailed`] -- the record
//! then permanently understates progress by one unit, and callers log
//! that loudly rather than hide it.

use std::sync::Arc;
use std::time::Duration;

use skylark_core::error::CoreError;
use skylark_core::job::{increment_transition, install_transition, JobRecord, VersionedJob};
use skylark_core::store::RecordStore;

/// Retry budget for one conditional update.
pub const MAX_UPDATE_ATTEMPTS: u32 = 10;

/// Delay between attempts, to shed contention between racing writers.
pub const CONFLICT_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Owns the job record lifecycle: create, read, total-install, and the
/// concurrency-safe completion increment.
#[derive(Clone)]
pub struct JobStatusService {
    store: Arc<dyn RecordStore>,
}

impl JobStatusService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        JobStatusService { store }
    }

    /// Insert a fresh `Pending` record with zero totals.
    pub async fn create(&self, job_id: &str) -> Result<JobRecord, CoreError> {
        let record = JobRecord::new(job_id.to_string());
        self.store.insert(&record).await?;
        Ok(record)
    }

    /// Point-in-time snapshot of one job.
    pub async fn get(&self, job_id: &str) -> Result<JobRecord, CoreError> {
        Ok(self.store.get(job_id).await?.record)
    }

    /// Install the authoritative unit total resolved by the dispatcher.
    ///
    /// Must complete before the first fan-out message is sent -- an
    /// increment that observed `total == 0` would otherwise read as
    /// "reached" and finish the job prematurely.
    pub async fn install_total(&self, job_id: &str, total: u32) -> Result<JobRecord, CoreError> {
        self.update_with_retry(job_id, |record| Some(install_transition(record, total)))
            .await
    }

    /// Record one completed unit, flipping the job to `Completed` when
    /// the increment reaches the installed total.
    ///
    /// A duplicate delivery arriving after the job already reached its
    /// total is a no-op. Retry exhaustion returns
    /// [`CoreError::ProgressUpdateFailed`].
    pub async fn increment_completed(&self, job_id: &str) -> Result<JobRecord, CoreError> {
        self.update_with_retry(job_id, increment_transition).await
    }

    /// The optimistic-concurrency loop shared by all mutations.
    ///
    /// `transition` computes the replacement record from the latest
    /// snapshot, or `None` for "already at the target state" (no write
    /// issued). A `Conflict` from the store means another writer
    /// committed after our read; re-read and try again.
    async fn update_with_retry<F>(&self, job_id: &str, transition: F) -> Result<JobRecord, CoreError>
    where
        F: Fn(&JobRecord) -> Option<JobRecord>,
    {
        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let VersionedJob { record, token } = self.store.get(job_id).await?;

            let Some(next) = transition(&record) else {
                tracing::debug!(job_id, "record already at target state, nothing to write");
                return Ok(record);
            };

            match self.store.update(&next, &token).await {
                Ok(_) => return Ok(next),
                Err(CoreError::Conflict) => {
                    tracing::warn!(
                        job_id,
                        attempt,
                        max_attempts = MAX_UPDATE_ATTEMPTS,
                        "version token went stale under a concurrent writer, retrying"
                    );
                    tokio::time::sleep(CONFLICT_RETRY_DELAY).await;
                }
                Err(other) => return Err(other),
            }
        }

        Err(CoreError::ProgressUpdateFailed {
            job_id: job_id.to_string(),
            attempts: MAX_UPDATE_ATTEMPTS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU32, Ordering};

    use assert_matches::assert_matches;
    use async_trait::async_trait;

    use skylark_cloud::MemoryRecordStore;
    use skylark_core::job::{JobStatus, VersionToken};

    fn service() -> JobStatusService {
        JobStatusService::new(Arc::new(MemoryRecordStore::new()))
    }

    /// Record store wrapper that fails a set number of conditional
    /// writes with `Conflict` before letting them through, simulating
    /// stale reads under contention.
    struct ContendedStore {
        inner: MemoryRecordStore,
        conflicts_left: AtomicU32,
    }

    impl ContendedStore {
        fn new(conflicts: u32) -> Self {
            ContendedStore {
                inner: MemoryRecordStore::new(),
                conflicts_left: AtomicU32::new(conflicts),
            }
        }
    }

    #[async_trait]
    impl RecordStore for ContendedStore {
        async fn insert(&self, record: &JobRecord) -> Result<(), CoreError> {
            self.inner.insert(record).await
        }

        async fn get(&self, job_id: &str) -> Result<VersionedJob, CoreError> {
            self.inner.get(job_id).await
        }

        async fn update(
            &self,
            record: &JobRecord,
            expected: &VersionToken,
        ) -> Result<VersionToken, CoreError> {
            if self
                .conflicts_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(CoreError::Conflict);
            }
            self.inner.update(record, expected).await
        }
    }

    #[tokio::test]
    async fn create_inserts_pending_record() {
        let service = service();
        let record = service.create("j1").await.unwrap();
        assert_eq!(record.status, JobStatus::Pending);
        assert_eq!((record.total_units, record.completed_units), (0, 0));

        let fetched = service.get("j1").await.unwrap();
        assert_eq!(fetched, record);
    }

    #[tokio::test]
    async fn create_rejects_taken_id() {
        let service = service();
        service.create("j1").await.unwrap();
        assert_matches!(service.create("j1").await, Err(CoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn get_unknown_job_is_not_found() {
        assert_matches!(service().get("ghost").await, Err(CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn pending_install_then_increments_complete_the_job() {
        let service = service();
        service.create("j1").await.unwrap();

        let installed = service.install_total("j1", 3).await.unwrap();
        assert_eq!(installed.status, JobStatus::Processing);
        assert_eq!((installed.completed_units, installed.total_units), (0, 3));

        for expected in 1..=3 {
            let record = service.increment_completed("j1").await.unwrap();
            assert_eq!(record.completed_units, expected);
        }

        let record = service.get("j1").await.unwrap();
        assert_eq!(record.status, JobStatus::Completed);
        assert_eq!((record.completed_units, record.total_units), (3, 3));
    }

    #[tokio::test]
    async fn install_of_zero_units_completes_the_job() {
        let service = service();
        service.create("j1").await.unwrap();
        let record = service.install_total("j1", 0).await.unwrap();
        assert_eq!(record.status, JobStatus::Completed);
        assert_eq!(record.total_units, 0);
    }

    #[tokio::test]
    async fn increment_before_install_counts_but_stays_pending() {
        let service = service();
        service.create("j1").await.unwrap();

        // The fan-out message overtook the total installation.
        let record = service.increment_completed("j1").await.unwrap();
        assert_eq!(record.completed_units, 1);
        assert_eq!(record.status, JobStatus::Pending);

        // The late install recomputes status from both counts.
        let record = service.install_total("j1", 1).await.unwrap();
        assert_eq!(record.status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn duplicate_delivery_after_completion_is_a_noop() {
        let service = service();
        service.create("j1").await.unwrap();
        service.install_total("j1", 1).await.unwrap();
        service.increment_completed("j1").await.unwrap();

        let record = service.increment_completed("j1").await.unwrap();
        assert_eq!(record.completed_units, 1);
        assert_eq!(record.status, JobStatus::Completed);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_increments_lose_no_updates() {
        const WORKERS: u32 = 10;

        let service = service();
        service.create("j1").await.unwrap();
        service.install_total("j1", WORKERS).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..WORKERS {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.increment_completed("j1").await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let record = service.get("j1").await.unwrap();
        assert_eq!(record.completed_units, WORKERS);
        assert_eq!(record.status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn transient_conflicts_are_absorbed_by_the_retry_budget() {
        let service = JobStatusService::new(Arc::new(ContendedStore::new(3)));
        service.create("j1").await.unwrap();
        service.install_total("j1", 2).await.unwrap();

        // 3 injected conflicts burned by install; increments still land.
        let record = service.increment_completed("j1").await.unwrap();
        assert_eq!(record.completed_units, 1);
    }

    #[tokio::test]
    async fn exhausted_retry_budget_is_an_explicit_failure() {
        let service = JobStatusService::new(Arc::new(ContendedStore::new(u32::MAX)));
        service.create("j1").await.unwrap();

        let err = service.increment_completed("j1").await.unwrap_err();
        assert_matches!(
            err,
            CoreError::ProgressUpdateFailed { attempts, .. } if attempts == MAX_UPDATE_ATTEMPTS
        );

        // The dropped update is visible: the record still reads zero.
        assert_eq!(service.get("j1").await.unwrap().completed_units, 0);
    }
}
