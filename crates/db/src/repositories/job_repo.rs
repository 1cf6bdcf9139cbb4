//! Postgres implementation of the durable record store.
//!
//! The conditional write is a single `UPDATE ... WHERE job_id = $n AND
//! version = $m`. Zero affected rows means another writer committed
//! first (stale token) or the row is gone; the two cases are
//! distinguished with a follow-up existence probe so callers see
//! `Conflict` vs `NotFound` accurately.

use async_trait::async_trait;
use sqlx::PgPool;

use skylark_core::error::CoreError;
use skylark_core::job::{JobRecord, VersionToken, VersionedJob};
use skylark_core::store::RecordStore;

use crate::models::job::{JobRow, JOB_PARTITION};

/// Column list for `jobs` queries.
const COLUMNS: &str =
    "partition, job_id, status, total_units, completed_units, created_at, version";

/// PostgreSQL unique-violation error code.
const PG_UNIQUE_VIOLATION: &str = "23505";

/// Record store backed by the `jobs` table.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        PgRecordStore { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, record: &JobRecord) -> Result<(), CoreError> {
        let result = sqlx::query(
            "INSERT INTO jobs \
                 (partition, job_id, status, total_units, completed_units, created_at, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(JOB_PARTITION)
        .bind(&record.job_id)
        .bind(record.status.as_str())
        .bind(record.total_units as i32)
        .bind(record.completed_units as i32)
        .bind(record.created_at)
        .bind(VersionToken::fresh().as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(PG_UNIQUE_VIOLATION) =>
            {
                Err(CoreError::AlreadyExists(record.job_id.clone()))
            }
            Err(err) => Err(CoreError::Storage(err.to_string())),
        }
    }

    async fn get(&self, job_id: &str) -> Result<VersionedJob, CoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM jobs WHERE partition = $1 AND job_id = $2"
        );
        let row = sqlx::query_as::<_, JobRow>(&query)
            .bind(JOB_PARTITION)
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| CoreError::Storage(err.to_string()))?
            .ok_or_else(|| CoreError::NotFound(job_id.to_string()))?;

        row.into_versioned()
    }

    async fn update(
        &self,
        record: &JobRecord,
        expected: &VersionToken,
    ) -> Result<VersionToken, CoreError> {
        let next = VersionToken::fresh();

        let result = sqlx::query(
            "UPDATE jobs \
             SET status = $1, total_units = $2, completed_units = $3, version = $4 \
             WHERE partition = $5 AND job_id = $6 AND version = $7",
        )
        .bind(record.status.as_str())
        .bind(record.total_units as i32)
        .bind(record.completed_units as i32)
        .bind(next.as_str())
        .bind(JOB_PARTITION)
        .bind(&record.job_id)
        .bind(expected.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| CoreError::Storage(err.to_string()))?;

        if result.rows_affected() > 0 {
            return Ok(next);
        }

        // Stale token or vanished row -- probe to tell the caller which.
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM jobs WHERE partition = $1 AND job_id = $2)",
        )
        .bind(JOB_PARTITION)
        .bind(&record.job_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| CoreError::Storage(err.to_string()))?;

        if exists {
            Err(CoreError::Conflict)
        } else {
            Err(CoreError::NotFound(record.job_id.clone()))
        }
    }
}
