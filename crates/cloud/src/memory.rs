//! In-process implementations of the collaborator traits.
//!
//! Semantics mirror the real backends: the record store enforces the
//! version-token conditional write, the object store is append-only
//! and prefix-listable, and the queue tracks in-flight deliveries so
//! an unacknowledged message can be redelivered. Used by tests and by
//! local single-process runs.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use skylark_core::error::CoreError;
use skylark_core::job::{JobRecord, VersionToken, VersionedJob};
use skylark_core::store::{MessageQueue, ObjectStore, QueueMessage, RecordStore};

// ---------------------------------------------------------------------------
// MemoryRecordStore
// ---------------------------------------------------------------------------

/// Keyed record store with optimistic conditional updates.
#[derive(Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<String, (JobRecord, VersionToken)>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, record: &JobRecord) -> Result<(), CoreError> {
        let mut records = self.records.lock().await;
        if records.contains_key(&record.job_id) {
            return Err(CoreError::AlreadyExists(record.job_id.clone()));
        }
        records.insert(record.job_id.clone(), (record.clone(), VersionToken::fresh()));
        Ok(())
    }

    async fn get(&self, job_id: &str) -> Result<VersionedJob, CoreError> {
        let records = self.records.lock().await;
        let (record, token) = records
            .get(job_id)
            .ok_or_else(|| CoreError::NotFound(job_id.to_string()))?;
        Ok(VersionedJob {
            record: record.clone(),
            token: token.clone(),
        })
    }

    async fn update(
        &self,
        record: &JobRecord,
        expected: &VersionToken,
    ) -> Result<VersionToken, CoreError> {
        let mut records = self.records.lock().await;
        let entry = records
            .get_mut(&record.job_id)
            .ok_or_else(|| CoreError::NotFound(record.job_id.clone()))?;

        if &entry.1 != expected {
            return Err(CoreError::Conflict);
        }

        let next = VersionToken::fresh();
        *entry = (record.clone(), next.clone());
        Ok(next)
    }
}

// ---------------------------------------------------------------------------
// MemoryObjectStore
// ---------------------------------------------------------------------------

/// Append-only object store. `BTreeMap` keeps listing order stable.
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects (test inspection).
    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    /// Raw object bytes (test inspection).
    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().await.get(key).cloned()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, body: Vec<u8>, _content_type: &str) -> Result<(), CoreError> {
        self.objects.lock().await.insert(key.to_string(), body);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, CoreError> {
        let objects = self.objects.lock().await;
        Ok(objects
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn signed_url(&self, key: &str, expires_in: Duration) -> Result<String, CoreError> {
        let objects = self.objects.lock().await;
        if !objects.contains_key(key) {
            return Err(CoreError::Storage(format!("no such object: {key}")));
        }
        // Shape mirrors a presigned URL: stable path, fresh signature.
        Ok(format!(
            "https://objects.invalid/{key}?expires={}&sig={}",
            expires_in.as_secs(),
            Uuid::new_v4().simple(),
        ))
    }
}

// ---------------------------------------------------------------------------
// MemoryQueue
// ---------------------------------------------------------------------------

#[derive(Default)]
struct QueueState {
    ready: VecDeque<(String, String)>,
    in_flight: HashMap<String, String>,
}

/// In-process queue with explicit acknowledgement.
///
/// A received message moves to the in-flight set under a fresh receipt;
/// `delete` acknowledges it, and [`MemoryQueue::redeliver_in_flight`]
/// plays the role of a visibility-timeout expiry for tests.
#[derive(Default)]
pub struct MemoryQueue {
    state: Mutex<QueueState>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages ready for delivery (test inspection).
    pub async fn ready_len(&self) -> usize {
        self.state.lock().await.ready.len()
    }

    /// Return all unacknowledged deliveries to the ready set.
    pub async fn redeliver_in_flight(&self) {
        let mut state = self.state.lock().await;
        let bodies: Vec<String> = state.in_flight.drain().map(|(_, body)| body).collect();
        for body in bodies {
            let id = Uuid::new_v4().to_string();
            state.ready.push_back((id, body));
        }
    }
}

#[async_trait]
impl MessageQueue for MemoryQueue {
    async fn send(&self, body: &str) -> Result<(), CoreError> {
        let mut state = self.state.lock().await;
        state
            .ready
            .push_back((Uuid::new_v4().to_string(), body.to_string()));
        Ok(())
    }

    async fn receive(&self, max: usize) -> Result<Vec<QueueMessage>, CoreError> {
        let mut state = self.state.lock().await;
        let mut messages = Vec::new();
        while messages.len() < max {
            let Some((receipt, body)) = state.ready.pop_front() else {
                break;
            };
            state.in_flight.insert(receipt.clone(), body.clone());
            messages.push(QueueMessage { body, receipt });
        }
        Ok(messages)
    }

    async fn delete(&self, receipt: &str) -> Result<(), CoreError> {
        self.state.lock().await.in_flight.remove(receipt);
        Ok(())
    }
}
