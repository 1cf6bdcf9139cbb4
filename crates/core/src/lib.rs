//! Skylark domain core.
//!
//! Shared building blocks for the station-snapshot job pipeline:
//!
//! - [`job`] -- the job progress record and its pure state transitions.
//! - [`store`] -- collaborator traits for the durable record store,
//!   artifact object store, and message queue.
//! - [`station`] -- resolution of upstream station measurements into
//!   dispatchable work units.
//! - [`messages`] -- queue message schemas.
//! - [`error`] -- the shared error taxonomy.

pub mod error;
pub mod job;
pub mod messages;
pub mod station;
pub mod store;
pub mod types;

pub use error::CoreError;
