//! Row models for the `jobs` table.

pub mod job;

pub use job::JobRow;
