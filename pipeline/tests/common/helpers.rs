//! Workspace builder and pipeline helpers for integration tests

use std::path::{Path, PathBuf};

use pipeline::services::{BatchMaterializer, IngestionEngine, RealFileSystem, SqliteResultStore};
use pipeline::{ExperimentGrid, ExperimentPipeline, FeedbackRunGenerator, PipelinePaths, SolverCommand};
use tempfile::TempDir;

use super::fixtures::{ResultFixture, TestFixtures};

pub type TestPipeline = ExperimentPipeline<SqliteResultStore, RealFileSystem>;

/// A scratch experiment checkout with solver artifact, scripts and instance files
pub struct ExperimentWorkspace {
    pub temp: TempDir,
    pub paths: PipelinePaths,
}

impl ExperimentWorkspace {
    pub fn new(instances: &[&str]) -> Self {
        let temp = TempDir::new().unwrap();
        let paths = PipelinePaths::from_base(temp.path());

        std::fs::create_dir_all(paths.solver_artifact.parent().unwrap()).unwrap();
        std::fs::write(&paths.solver_artifact, b"PK").unwrap();
        std::fs::create_dir_all(&paths.scripts_dir).unwrap();
        for script in ["submit-batch.sh", "slurm-batch-job.sh"] {
            std::fs::write(paths.scripts_dir.join(script), "#!/bin/bash\n").unwrap();
        }
        std::fs::create_dir_all(&paths.data_dir).unwrap();
        for instance in instances {
            std::fs::write(paths.data_dir.join(instance), format!("NAME : {instance}\n")).unwrap();
        }
        std::fs::create_dir_all(&paths.results_dir).unwrap();

        Self { temp, paths }
    }

    /// Write a result file into the objective's results subdirectory
    pub fn add_result(&self, fixture: &ResultFixture) -> PathBuf {
        self.add_raw(fixture.objective.as_str(), &fixture.file_name(), &fixture.to_json())
    }

    pub fn add_raw(&self, directory: &str, file_name: &str, body: &str) -> PathBuf {
        let dir = self.paths.results_dir.join(directory);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(file_name);
        std::fs::write(&path, body).unwrap();
        path
    }

    pub fn batch_dir(&self, name: &str) -> PathBuf {
        self.paths.runs_dir.join(name)
    }

    pub fn pipeline(&self, grid: ExperimentGrid) -> TestPipeline {
        TestHelpers::pipeline(&self.paths, grid)
    }
}

pub struct TestHelpers;

impl TestHelpers {
    /// Pipeline over the workspace's on-disk store
    pub fn pipeline(paths: &PipelinePaths, grid: ExperimentGrid) -> TestPipeline {
        ExperimentPipeline::new(
            SqliteResultStore::open(&paths.database).unwrap(),
            IngestionEngine::default(),
            FeedbackRunGenerator::new(grid, 7200),
            BatchMaterializer::new(
                RealFileSystem::new(),
                paths.batch_layout(),
                SolverCommand::new(TestFixtures::LIBRARY_PATH),
            ),
            paths.results_dir.clone(),
        )
    }

    pub fn grid(instances: &[&str], vehicles: &[u32]) -> ExperimentGrid {
        ExperimentGrid {
            instances: instances.iter().map(|s| s.to_string()).collect(),
            vehicle_counts: vehicles.to_vec(),
            ..ExperimentGrid::default()
        }
    }

    pub fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }
}
