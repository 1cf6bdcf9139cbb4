//! Fan-out message processing: one artifact per work unit.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use skylark_core::error::CoreError;
use skylark_core::messages::ProcessUnitMessage;
use skylark_core::store::ObjectStore;

use crate::render;
use crate::status::JobStatusService;
use crate::MessageConsumer;

pub struct UnitProcessor {
    objects: Arc<dyn ObjectStore>,
    status: JobStatusService,
}

impl UnitProcessor {
    pub fn new(objects: Arc<dyn ObjectStore>, status: JobStatusService) -> Self {
        UnitProcessor { objects, status }
    }

    /// Process one work unit: render the station card, store it under
    /// a fresh key in the job's prefix, then increment job progress.
    ///
    /// A failure before the put propagates and the message is
    /// redelivered. Retry exhaustion in the increment is logged and
    /// swallowed instead: the artifact already exists, and redelivering
    /// would duplicate it. The job record then understates progress by
    /// this one unit.
    pub async fn handle_unit(&self, msg: &ProcessUnitMessage) -> Result<(), CoreError> {
        let card = render::station_card(&msg.unit_name, &msg.derived_value);
        let key = format!("{}/{}.svg", msg.job_id, Uuid::new_v4());

        self.objects
            .put(&key, card.into_bytes(), render::CONTENT_TYPE)
            .await?;

        tracing::info!(job_id = %msg.job_id, key = %key, "stored station card");

        match self.status.increment_completed(&msg.job_id).await {
            Ok(record) => {
                tracing::info!(
                    job_id = %msg.job_id,
                    completed = record.completed_units,
                    total = record.total_units,
                    "progress updated"
                );
                Ok(())
            }
            Err(err @ CoreError::ProgressUpdateFailed { .. }) => {
                tracing::error!(
                    job_id = %msg.job_id,
                    key = %key,
                    error = %err,
                    "progress update exhausted its retry budget; artifact stored but never counted"
                );
                Ok(())
            }
            Err(other) => Err(other),
        }
    }
}

#[async_trait]
impl MessageConsumer for UnitProcessor {
    async fn process(&self, body: &str) -> Result<(), CoreError> {
        let msg: ProcessUnitMessage = serde_json::from_str(body)?;
        self.handle_unit(&msg).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;

    use skylark_cloud::{MemoryObjectStore, MemoryRecordStore};
    use skylark_core::job::JobStatus;

    fn msg(job_id: &str, name: &str) -> ProcessUnitMessage {
        ProcessUnitMessage {
            job_id: job_id.into(),
            unit_name: name.into(),
            derived_value: "12.3".into(),
        }
    }

    async fn setup() -> (UnitProcessor, JobStatusService, Arc<MemoryObjectStore>) {
        let status = JobStatusService::new(Arc::new(MemoryRecordStore::new()));
        let objects = Arc::new(MemoryObjectStore::new());
        let processor = UnitProcessor::new(objects.clone(), status.clone());
        (processor, status, objects)
    }

    #[tokio::test]
    async fn stores_artifact_under_job_prefix_and_increments() {
        let (processor, status, objects) = setup().await;
        status.create("j1").await.unwrap();
        status.install_total("j1", 2).await.unwrap();

        processor.handle_unit(&msg("j1", "De Bilt")).await.unwrap();

        let keys = objects.list("j1/").await.unwrap();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].ends_with(".svg"));

        let record = status.get("j1").await.unwrap();
        assert_eq!(record.completed_units, 1);
        assert_eq!(record.status, JobStatus::Processing);
    }

    #[tokio::test]
    async fn final_unit_completes_the_job() {
        let (processor, status, _) = setup().await;
        status.create("j1").await.unwrap();
        status.install_total("j1", 1).await.unwrap();

        processor.handle_unit(&msg("j1", "De Bilt")).await.unwrap();

        assert_eq!(status.get("j1").await.unwrap().status, JobStatus::Completed);
    }

    #[tokio::test]
    async fn every_artifact_gets_a_distinct_key() {
        let (processor, status, objects) = setup().await;
        status.create("j1").await.unwrap();
        status.install_total("j1", 2).await.unwrap();

        processor.handle_unit(&msg("j1", "De Bilt")).await.unwrap();
        processor.handle_unit(&msg("j1", "De Bilt")).await.unwrap();

        assert_eq!(objects.list("j1/").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_job_record_propagates_for_redelivery() {
        let (processor, _, objects) = setup().await;

        let err = processor.handle_unit(&msg("ghost", "De Bilt")).await;
        assert_matches!(err, Err(CoreError::NotFound(_)));

        // The artifact was stored before the increment failed; it is
        // orphaned until redelivery reconciles the record.
        assert_eq!(objects.len().await, 1);
    }

    #[tokio::test]
    async fn garbage_body_is_malformed() {
        let (processor, _, _) = setup().await;
        assert_matches!(
            processor.process("{\"job_id\": 7}").await,
            Err(CoreError::Malformed(_))
        );
    }
}
