//! Skylark worker library.
//!
//! The worker binary runs two queue poll loops: the dispatcher
//! (start signals) and the unit processor (fan-out messages). The loop
//! itself lives in [`consumer`] so tests can drive it directly.

pub mod config;
pub mod consumer;
