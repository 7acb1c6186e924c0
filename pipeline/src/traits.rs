//! Trait definitions with mockall annotations for testing
//!
//! The store, the file system and the artifact build are the I/O seams of
//! the pipeline.
//! Production code uses [`SqliteResultStore`](crate::services::SqliteResultStore)
//! and [`RealFileSystem`](crate::services::RealFileSystem); tests substitute the
//! generated mocks or an in-memory store.

use std::path::Path;

use shared::{Objective, RunKey, RunResult};

use crate::error::PipelineResult;

/// Outcome of inserting a record into the result store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was stored
    Inserted,
    /// A record with the same natural key already exists; nothing was stored
    Duplicate,
}

/// Persistent store of ingested run results
///
/// This is the query seam consumed by the derived metric layer, the feedback
/// generator and the reports.
#[mockall::automock]
pub trait ResultStore {
    /// Drop every stored record and recreate an empty schema
    fn rebuild(&mut self) -> PipelineResult<()>;

    /// Store one record unless its natural key is already present
    fn insert(&mut self, record: &RunResult) -> PipelineResult<InsertOutcome>;

    /// Exact-key lookup; `None` means the run has not been computed yet
    fn lookup_one(&self, key: &RunKey) -> PipelineResult<Option<RunResult>>;

    /// Smallest fairness coefficient stored for the filter, if any row matches
    fn min_fairness_coefficient(
        &self,
        instance_name: &str,
        num_vehicles: u32,
        objective: Objective,
    ) -> PipelineResult<Option<f64>>;

    /// Largest fairness coefficient stored for the filter, if any row matches
    fn max_fairness_coefficient(
        &self,
        instance_name: &str,
        num_vehicles: u32,
        objective: Objective,
    ) -> PipelineResult<Option<f64>>;

    /// Number of stored records
    fn count(&self) -> PipelineResult<usize>;

    /// All records of one instance and vehicle count, in insertion order
    fn records_for(&self, instance_name: &str, num_vehicles: u32) -> PipelineResult<Vec<RunResult>>;
}

/// File system operations needed to materialize a run batch
#[mockall::automock]
pub trait BatchFileSystem {
    /// Whether a file or directory exists
    fn exists(&self, path: &Path) -> bool;

    /// Create a directory and all missing parents
    fn create_dir_all(&self, path: &Path) -> PipelineResult<()>;

    /// Copy a file, overwriting the destination
    fn copy_file(&self, from: &Path, to: &Path) -> PipelineResult<()>;

    /// Write a file, overwriting the destination
    fn write_file(&self, path: &Path, content: &[u8]) -> PipelineResult<()>;
}

/// Builds the solver artifact batches are materialized from
#[mockall::automock]
pub trait ArtifactBuilder {
    /// Run the build; a failed build is a configuration error
    fn build(&self) -> PipelineResult<()>;
}
