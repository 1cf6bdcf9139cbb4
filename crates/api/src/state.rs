use std::sync::Arc;

use skylark_core::store::{MessageQueue, ObjectStore};
use skylark_pipeline::status::JobStatusService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Collaborator handles are constructed once in `main` (or the test
/// harness) and injected here; handlers never reach for globals. This
/// is cheaply cloneable -- everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Job record lifecycle service over the durable record store.
    pub status: JobStatusService,
    /// Queue carrying start signals to the dispatcher.
    pub start_queue: Arc<dyn MessageQueue>,
    /// Artifact store queried for listings and signed URLs.
    pub objects: Arc<dyn ObjectStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
