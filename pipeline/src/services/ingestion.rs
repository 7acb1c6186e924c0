//! Result ingestion
//!
//! Walks a results directory whose subdirectories are named after objective
//! kinds and rebuilds the result store from the JSON files found there.
//! Bad files are logged and skipped; storage failures abort the run, which
//! is always safe to repeat because the files remain the source of truth.

use std::fs;
use std::path::{Path, PathBuf};

use shared::{decode_result, stage_debug, stage_info, stage_warn, RunResult};

use crate::core::ExperimentGrid;
use crate::error::{PipelineError, PipelineResult};
use crate::traits::{InsertOutcome, ResultStore};

/// Subdirectories read during ingestion, in reading order
///
/// `COF` holds aggregate runs of mixed objectives; each file carries its own
/// objective, so it is read like any other directory.
pub const OBJECTIVE_DIRECTORIES: &[&str] = &[
    "min",
    "min-max",
    "minmax",
    "p-norm",
    "pNorm",
    "eps-fair",
    "epsFair",
    "delta-fair",
    "deltaFair",
    "COF",
];

/// Vehicle counts the legacy store kept a partition for
pub const DEFAULT_VEHICLE_PARTITIONS: [u32; 3] = [3, 4, 5];

/// Ingestion settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionConfig {
    /// Vehicle counts accepted into the store; empty accepts every count
    pub vehicle_partitions: Vec<u32>,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            vehicle_partitions: DEFAULT_VEHICLE_PARTITIONS.to_vec(),
        }
    }
}

impl IngestionConfig {
    /// Accept exactly the vehicle counts an experiment grid covers
    pub fn for_grid(grid: &ExperimentGrid) -> Self {
        Self {
            vehicle_partitions: grid.vehicle_counts.clone(),
        }
    }
}

/// A result file that could not be ingested
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Summary of one ingestion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub files_seen: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub vehicle_mismatches: usize,
    pub malformed: Vec<MalformedFile>,
}

/// Rebuilds a [`ResultStore`] from a results directory tree
#[derive(Debug, Clone, Default)]
pub struct IngestionEngine {
    config: IngestionConfig,
}

impl IngestionEngine {
    pub fn new(config: IngestionConfig) -> Self {
        Self { config }
    }

    /// Drop the store contents and ingest every result file under `root`
    pub fn ingest<S: ResultStore + ?Sized>(&self, root: &Path, store: &mut S) -> PipelineResult<IngestReport> {
        if !root.is_dir() {
            return Err(PipelineError::config(
                "results_dir",
                format!("{} is not a directory", root.display()),
            ));
        }

        store.rebuild()?;
        let mut report = IngestReport::default();

        for name in OBJECTIVE_DIRECTORIES {
            let dir = root.join(name);
            if !dir.is_dir() {
                stage_debug!("No {} directory under {}", name, root.display());
                continue;
            }
            for path in Self::result_files(&dir)? {
                report.files_seen += 1;
                self.ingest_file(&path, store, &mut report)?;
            }
        }

        stage_info!(
            "📥 Ingested {} of {} result files ({} duplicates, {} vehicle mismatches, {} malformed)",
            report.inserted,
            report.files_seen,
            report.duplicates,
            report.vehicle_mismatches,
            report.malformed.len()
        );
        Ok(report)
    }

    /// `*.json` files of one directory, sorted by file name
    fn result_files(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
        let entries = fs::read_dir(dir).map_err(PipelineError::fs("read_dir", dir))?;
        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(PipelineError::fs("read_dir", dir))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn ingest_file<S: ResultStore + ?Sized>(
        &self,
        path: &Path,
        store: &mut S,
        report: &mut IngestReport,
    ) -> PipelineResult<()> {
        let record = match Self::read_record(path) {
            Ok(record) => record,
            Err(reason) => {
                stage_warn!("⚠️ Skipping malformed result {}: {}", path.display(), reason);
                report.malformed.push(MalformedFile {
                    path: path.to_path_buf(),
                    reason,
                });
                return Ok(());
            }
        };

        if !self.accepts_vehicle_count(record.key.num_vehicles) {
            stage_debug!(
                "Skipping {}: {} vehicles has no partition",
                path.display(),
                record.key.num_vehicles
            );
            report.vehicle_mismatches += 1;
            return Ok(());
        }

        match store.insert(&record)? {
            InsertOutcome::Inserted => {
                report.inserted += 1;
                stage_debug!("added results for {}", path.display());
            }
            InsertOutcome::Duplicate => {
                report.duplicates += 1;
                stage_warn!("⚠️ Duplicate run {} in {}, keeping the first", record.key, path.display());
            }
        }
        Ok(())
    }

    fn read_record(path: &Path) -> Result<RunResult, String> {
        let bytes = fs::read(path).map_err(|e| format!("unreadable: {e}"))?;
        decode_result(&bytes).map_err(|e| e.to_string())
    }

    fn accepts_vehicle_count(&self, num_vehicles: u32) -> bool {
        self.config.vehicle_partitions.is_empty() || self.config.vehicle_partitions.contains(&num_vehicles)
    }
}
