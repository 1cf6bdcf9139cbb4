//! Skylark job pipeline.
//!
//! The moving parts between the HTTP surface and the collaborator
//! stores:
//!
//! - [`status::JobStatusService`] -- the lock-free progress protocol
//!   over the record store's conditional writes.
//! - [`dispatch::Dispatcher`] -- start-signal consumer: resolves the
//!   unit list, installs the total, fans out one message per unit.
//! - [`process::UnitProcessor`] -- fan-out consumer: renders and stores
//!   one artifact, then increments job progress.
//! - [`source`] -- the upstream station feed collaborator.
//! - [`render`] -- station card artifact rendering.

pub mod dispatch;
pub mod process;
pub mod render;
pub mod source;
pub mod status;

use async_trait::async_trait;

use skylark_core::error::CoreError;

/// A queue consumer processing one raw message body at a time.
///
/// The worker poll loop drives implementations of this trait. Returning
/// [`CoreError::Malformed`] drops the message (logged, acknowledged);
/// any other error leaves it unacknowledged for redelivery.
#[async_trait]
pub trait MessageConsumer: Send + Sync {
    async fn process(&self, body: &str) -> Result<(), CoreError>;
}
