//! Start-signal dispatcher.
//!
//! Consumes one start message, resolves the authoritative unit list
//! from the station feed, installs the surviving count on the job
//! record, and fans out one message per unit. Install strictly
//! precedes the first send: a worker increment that observed
//! `total == 0` could never legitimately complete the job, so the
//! total must be durable before any worker can race ahead.

use std::sync::Arc;

use async_trait::async_trait;

use skylark_core::error::CoreError;
use skylark_core::messages::{ProcessUnitMessage, StartJobMessage};
use skylark_core::store::MessageQueue;

use crate::source::StationSource;
use crate::status::JobStatusService;
use crate::MessageConsumer;

pub struct Dispatcher {
    source: Arc<dyn StationSource>,
    status: JobStatusService,
    fanout: Arc<dyn MessageQueue>,
}

impl Dispatcher {
    pub fn new(
        source: Arc<dyn StationSource>,
        status: JobStatusService,
        fanout: Arc<dyn MessageQueue>,
    ) -> Self {
        Dispatcher {
            source,
            status,
            fanout,
        }
    }

    /// Handle one start signal.
    ///
    /// An unreachable feed or a missing job record is fatal for this
    /// invocation; the message stays unacknowledged and queue
    /// redelivery (and eventually its dead-letter policy) takes over.
    pub async fn handle_start(&self, msg: &StartJobMessage) -> Result<(), CoreError> {
        let units = self.source.fetch_units().await?;

        tracing::info!(
            job_id = %msg.job_id,
            unit_count = units.len(),
            "resolved station units"
        );

        self.status
            .install_total(&msg.job_id, units.len() as u32)
            .await?;

        for unit in units {
            let fanout_msg = ProcessUnitMessage {
                job_id: msg.job_id.clone(),
                unit_name: unit.name,
                derived_value: unit.derived_value,
            };
            self.fanout.send(&serde_json::to_string(&fanout_msg)?).await?;
        }

        tracing::info!(job_id = %msg.job_id, "fan-out complete");
        Ok(())
    }
}

#[async_trait]
impl MessageConsumer for Dispatcher {
    async fn process(&self, body: &str) -> Result<(), CoreError> {
        let msg: StartJobMessage = serde_json::from_str(body)?;
        self.handle_start(&msg).await
    }
}
