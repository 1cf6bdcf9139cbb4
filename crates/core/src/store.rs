//! Collaborator traits for the pipeline's three external stores.
//!
//! Handles are constructed once in each binary's `main` and passed
//! explicitly as `Arc<dyn Trait>` -- no ambient singletons. Concrete
//! implementations live in `skylark-db` (Postgres record store) and
//! `skylark-cloud` (S3, SQS, and the in-memory test doubles).

use std::time::Duration;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::job::{JobRecord, VersionToken, VersionedJob};

/// Durable keyed record store with conditional (optimistic) updates.
///
/// The store holds exactly one [`JobRecord`] per job id together with
/// an opaque version token that changes on every committed write.
/// There is no mutual exclusion anywhere: a writer proves it saw the
/// latest version by presenting the token it read, and loses with
/// [`CoreError::Conflict`] when another writer committed first.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a brand-new record. Fails with `AlreadyExists` when the
    /// id is taken.
    async fn insert(&self, record: &JobRecord) -> Result<(), CoreError>;

    /// Read a record and the version token observed at read time.
    /// Fails with `NotFound` for unknown ids.
    async fn get(&self, job_id: &str) -> Result<VersionedJob, CoreError>;

    /// Conditionally replace a record, gated on `expected` being the
    /// latest committed token. Fails with `Conflict` when it is stale
    /// and `NotFound` when the record has vanished.
    async fn update(
        &self,
        record: &JobRecord,
        expected: &VersionToken,
    ) -> Result<VersionToken, CoreError>;
}

/// Append-only artifact store, enumerable by key prefix.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store one artifact under `key`. Keys are never overwritten in
    /// practice -- every put uses a fresh unique suffix.
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<(), CoreError>;

    /// List all keys starting with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, CoreError>;

    /// Issue a time-limited read-only URL for one stored artifact.
    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String, CoreError>;
}

/// One message as handed to a consumer. The receipt acknowledges
/// (deletes) the delivery; an unacknowledged message is redelivered.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    pub body: String,
    pub receipt: String,
}

/// Message queue with at-least-once delivery.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    async fn send(&self, body: &str) -> Result<(), CoreError>;

    /// Receive up to `max` messages. May return fewer, including none.
    async fn receive(&self, max: usize) -> Result<Vec<QueueMessage>, CoreError>;

    /// Acknowledge one delivery so it is not redelivered.
    async fn delete(&self, receipt: &str) -> Result<(), CoreError>;
}
