//! The job progress record and its pure state transitions.
//!
//! All status math lives here so the optimistic-concurrency retry loop
//! in `skylark-pipeline` stays a pure read-compute-conditional-write
//! cycle over these functions. No I/O, no clocks beyond record
//! creation.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{JobId, Timestamp};

/// Lifecycle status of a job.
///
/// `Pending` from creation until the dispatcher installs the unit
/// total, `Processing` while units are outstanding, `Completed` once
/// `completed_units` reaches `total_units` (or immediately, for a job
/// that resolves to zero units).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::Processing => "Processing",
            JobStatus::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(JobStatus::Pending),
            "Processing" => Some(JobStatus::Processing),
            "Completed" => Some(JobStatus::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque concurrency token. Changes on every committed write; a
/// conditional write proves it observed the latest version by
/// presenting the token it read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionToken(String);

impl VersionToken {
    /// Mint a fresh token for a new committed write.
    pub fn fresh() -> Self {
        VersionToken(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for VersionToken {
    fn from(s: String) -> Self {
        VersionToken(s)
    }
}

/// The shared job progress record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_id: JobId,
    pub status: JobStatus,
    pub total_units: u32,
    pub completed_units: u32,
    pub created_at: Timestamp,
}

impl JobRecord {
    /// A freshly submitted job: `Pending`, zero totals.
    pub fn new(job_id: JobId) -> Self {
        JobRecord {
            job_id,
            status: JobStatus::Pending,
            total_units: 0,
            completed_units: 0,
            created_at: Utc::now(),
        }
    }
}

/// A record as read from the store, paired with the version token
/// observed at read time.
#[derive(Debug, Clone)]
pub struct VersionedJob {
    pub record: JobRecord,
    pub token: VersionToken,
}

/// Apply a total-install to a record.
///
/// Status is recomputed from the counts rather than forced, so a
/// redelivered start signal re-installing over an already-finished
/// record leaves it `Completed`. A total of zero completes the job
/// immediately -- an empty fan-out has nothing left to wait for.
pub fn install_transition(record: &JobRecord, total: u32) -> JobRecord {
    let mut next = record.clone();
    next.total_units = total;
    next.status = if total == 0 || next.completed_units >= total {
        JobStatus::Completed
    } else {
        JobStatus::Processing
    };
    next
}

/// Apply one unit-completion increment to a record.
///
/// Returns `None` when the job has already reached its installed total
/// (a duplicate at-least-once delivery): writing would push
/// `completed_units` past `total_units`, so the increment is a no-op.
///
/// An increment that runs before any total is installed
/// (`total_units == 0`) records the count but leaves the status
/// untouched: the record stays `Pending` until the install, and only
/// a real installed total can be "reached".
pub fn increment_transition(record: &JobRecord) -> Option<JobRecord> {
    if record.total_units > 0 && record.completed_units >= record.total_units {
        return None;
    }

    let mut next = record.clone();
    next.completed_units += 1;
    if next.total_units > 0 {
        next.status = if next.completed_units >= next.total_units {
            JobStatus::Completed
        } else {
            JobStatus::Processing
        };
    }
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: JobStatus, total: u32, completed: u32) -> JobRecord {
        JobRecord {
            job_id: "j1".into(),
            status,
            total_units: total,
            completed_units: completed,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn new_record_is_pending_with_zero_counts() {
        let r = JobRecord::new("j1".into());
        assert_eq!(r.status, JobStatus::Pending);
        assert_eq!(r.total_units, 0);
        assert_eq!(r.completed_units, 0);
    }

    #[test]
    fn install_moves_pending_to_processing() {
        let next = install_transition(&record(JobStatus::Pending, 0, 0), 3);
        assert_eq!(next.status, JobStatus::Processing);
        assert_eq!(next.total_units, 3);
        assert_eq!(next.completed_units, 0);
    }

    #[test]
    fn install_of_zero_units_completes_immediately() {
        let next = install_transition(&record(JobStatus::Pending, 0, 0), 0);
        assert_eq!(next.status, JobStatus::Completed);
        assert_eq!(next.total_units, 0);
    }

    #[test]
    fn reinstall_over_finished_record_stays_completed() {
        let next = install_transition(&record(JobStatus::Completed, 3, 3), 3);
        assert_eq!(next.status, JobStatus::Completed);
    }

    #[test]
    fn increment_below_total_stays_processing() {
        let next = increment_transition(&record(JobStatus::Processing, 3, 1)).unwrap();
        assert_eq!(next.completed_units, 2);
        assert_eq!(next.status, JobStatus::Processing);
    }

    #[test]
    fn increment_reaching_total_completes() {
        let next = increment_transition(&record(JobStatus::Processing, 3, 2)).unwrap();
        assert_eq!(next.completed_units, 3);
        assert_eq!(next.status, JobStatus::Completed);
    }

    #[test]
    fn increment_before_install_counts_but_stays_pending() {
        let next = increment_transition(&record(JobStatus::Pending, 0, 0)).unwrap();
        assert_eq!(next.completed_units, 1);
        assert_eq!(next.status, JobStatus::Pending);
    }

    #[test]
    fn install_over_early_increments_recomputes_status() {
        // Two units finished before the total landed.
        let next = install_transition(&record(JobStatus::Pending, 0, 2), 3);
        assert_eq!(next.status, JobStatus::Processing);

        let next = install_transition(&record(JobStatus::Pending, 0, 2), 2);
        assert_eq!(next.status, JobStatus::Completed);
    }

    #[test]
    fn increment_past_total_is_a_noop() {
        assert!(increment_transition(&record(JobStatus::Completed, 3, 3)).is_none());
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in [JobStatus::Pending, JobStatus::Processing, JobStatus::Completed] {
            assert_eq!(JobStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(JobStatus::parse("Running"), None);
    }

    #[test]
    fn fresh_tokens_are_unique() {
        assert_ne!(VersionToken::fresh(), VersionToken::fresh());
    }
}
