//! Service implementations
//!
//! Real implementations of the store, file system and artifact build traits,
//! plus the services that drive them: ingestion, batch materialization and
//! reports.

pub mod artifact;
pub mod batch;
pub mod file_system;
pub mod ingestion;
pub mod reports;
pub mod solver_env;
pub mod sqlite_store;

#[cfg(test)]
mod tests;

pub use artifact::CommandArtifactBuilder;
pub use batch::{BatchLayout, BatchMaterializer, RunBatch};
pub use file_system::RealFileSystem;
pub use ingestion::{IngestReport, IngestionConfig, IngestionEngine, MalformedFile};
pub use reports::ReportWriter;
pub use solver_env::SolverEnvironment;
pub use sqlite_store::SqliteResultStore;
