use std::time::Duration;

/// Worker configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Upstream station feed URL.
    pub station_source_url: String,
    /// S3 bucket holding rendered station cards.
    pub artifact_bucket: String,
    /// Queue carrying start signals.
    pub start_queue_url: String,
    /// Queue carrying fan-out messages.
    pub unit_queue_url: String,
    /// Pause between polls that return no messages (default: 1s).
    pub poll_interval: Duration,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    ///
    /// `STATION_SOURCE_URL`, `ARTIFACT_BUCKET`, `JOB_START_QUEUE_URL`
    /// and `UNIT_QUEUE_URL` are required; `POLL_INTERVAL_SECS`
    /// defaults to 1.
    pub fn from_env() -> Self {
        let station_source_url =
            std::env::var("STATION_SOURCE_URL").expect("STATION_SOURCE_URL must be set");
        let artifact_bucket =
            std::env::var("ARTIFACT_BUCKET").expect("ARTIFACT_BUCKET must be set");
        let start_queue_url =
            std::env::var("JOB_START_QUEUE_URL").expect("JOB_START_QUEUE_URL must be set");
        let unit_queue_url = std::env::var("UNIT_QUEUE_URL").expect("UNIT_QUEUE_URL must be set");

        let poll_interval_secs: u64 = std::env::var("POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("POLL_INTERVAL_SECS must be a valid u64");

        Self {
            station_source_url,
            artifact_bucket,
            start_queue_url,
            unit_queue_url,
            poll_interval: Duration::from_secs(poll_interval_secs),
        }
    }
}
