//! Cloud collaborator implementations.
//!
//! Concrete adapters for the traits in `skylark_core::store`:
//!
//! - [`S3ObjectStore`] -- artifact storage with presigned read URLs.
//! - [`SqsQueue`] -- at-least-once message queue.
//! - [`memory`] -- in-process implementations of all three collaborator
//!   traits, used by tests and local single-process runs.

pub mod memory;
pub mod object;
pub mod queue;

pub use memory::{MemoryObjectStore, MemoryQueue, MemoryRecordStore};
pub use object::S3ObjectStore;
pub use queue::SqsQueue;
