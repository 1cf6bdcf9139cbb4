use chrono::{DateTime, Utc};

/// Job identifier. UUIDv4, assigned once at submission, never reused.
pub type JobId = String;

/// UTC timestamp used across all records and messages.
pub type Timestamp = DateTime<Utc>;
