//! Row model for the `jobs` table and conversions into domain types.

use sqlx::FromRow;

use skylark_core::error::CoreError;
use skylark_core::job::{JobRecord, JobStatus, VersionToken, VersionedJob};
use skylark_core::types::Timestamp;

/// Fixed partition discriminator for all job rows.
pub const JOB_PARTITION: &str = "job";

/// A row from the `jobs` table.
#[derive(Debug, Clone, FromRow)]
pub struct JobRow {
    pub partition: String,
    pub job_id: String,
    pub status: String,
    pub total_units: i32,
    pub completed_units: i32,
    pub created_at: Timestamp,
    pub version: String,
}

impl JobRow {
    /// Convert a row into a domain record plus its version token.
    ///
    /// A status string the domain does not know means the row was
    /// written by something other than this system -- surfaced as a
    /// storage error, not silently coerced.
    pub fn into_versioned(self) -> Result<VersionedJob, CoreError> {
        let status = JobStatus::parse(&self.status).ok_or_else(|| {
            CoreError::Storage(format!(
                "job {} has unknown status '{}'",
                self.job_id, self.status
            ))
        })?;

        Ok(VersionedJob {
            record: JobRecord {
                job_id: self.job_id,
                status,
                total_units: self.total_units.max(0) as u32,
                completed_units: self.completed_units.max(0) as u32,
                created_at: self.created_at,
            },
            token: VersionToken::from(self.version),
        })
    }
}
