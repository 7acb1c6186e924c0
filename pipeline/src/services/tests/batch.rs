//! Batch materializer tests with mocked and real file systems

use std::path::Path;

use assert_matches::assert_matches;
use shared::{Objective, RunConfiguration};
use tempfile::TempDir;

use crate::core::SolverCommand;
use crate::error::PipelineError;
use crate::services::batch::{BatchLayout, BatchMaterializer};
use crate::services::RealFileSystem;
use crate::traits::{MockArtifactBuilder, MockBatchFileSystem};

fn configuration(instance: &str, objective: Objective, fc: f64) -> RunConfiguration {
    RunConfiguration {
        instance_name: instance.to_string(),
        num_vehicles: 4,
        objective,
        p_norm: 1,
        fairness_coefficient: fc,
        time_limit_seconds: 7200,
    }
}

fn layout(base: &Path) -> BatchLayout {
    BatchLayout::new(
        base.join("runs"),
        base.join("data"),
        base.join("build/libs/uber.jar"),
        base.join("scripts"),
    )
}

/// Lay out the batch inputs on disk
fn seed_inputs(base: &Path, instances: &[&str]) {
    std::fs::create_dir_all(base.join("build/libs")).unwrap();
    std::fs::write(base.join("build/libs/uber.jar"), b"jar").unwrap();
    std::fs::create_dir_all(base.join("scripts")).unwrap();
    std::fs::write(base.join("scripts/submit-batch.sh"), "#!/bin/bash\n").unwrap();
    std::fs::write(base.join("scripts/slurm-batch-job.sh"), "#!/bin/bash\n").unwrap();
    std::fs::create_dir_all(base.join("data")).unwrap();
    for instance in instances {
        std::fs::write(base.join("data").join(instance), "NAME: test\n").unwrap();
    }
}

#[test]
fn test_materialize_builds_full_layout() {
    let temp = TempDir::new().unwrap();
    seed_inputs(temp.path(), &["bays29.tsp", "eil51.tsp", "unused.tsp"]);
    let materializer = BatchMaterializer::new(RealFileSystem::new(), layout(temp.path()), SolverCommand::new("/lib"));

    let batch = materializer
        .materialize(
            "feedback-min-max",
            vec![
                configuration("bays29.tsp", Objective::EpsFair, 0.8),
                configuration("bays29.tsp", Objective::DeltaFair, 0.2001),
                configuration("eil51.tsp", Objective::EpsFair, 0.75),
            ],
        )
        .unwrap();

    let dir = temp.path().join("runs/feedback-min-max");
    assert_eq!(batch.directory, dir);
    assert_eq!(batch.manifest_path, dir.join("feedback-min-max_runs.txt"));
    for entry in ["uber.jar", "submit-batch.sh", "slurm-batch-job.sh", "data/bays29.tsp", "data/eil51.tsp"] {
        assert!(dir.join(entry).is_file(), "missing {entry}");
    }
    for entry in ["results", "logs", "output"] {
        assert!(dir.join(entry).is_dir(), "missing {entry}/");
    }
    assert!(!dir.join("data/unused.tsp").exists());

    let manifest = std::fs::read_to_string(&batch.manifest_path).unwrap();
    assert_eq!(manifest.lines().count(), 3);
}

#[test]
fn test_regeneration_overwrites_and_keeps_extra_files() {
    let temp = TempDir::new().unwrap();
    seed_inputs(temp.path(), &["bays29.tsp"]);
    let materializer = BatchMaterializer::new(RealFileSystem::new(), layout(temp.path()), SolverCommand::new("/lib"));
    let configs = vec![configuration("bays29.tsp", Objective::EpsFair, 0.8)];

    let first = materializer.materialize("eps-fair", configs.clone()).unwrap();
    let first_manifest = std::fs::read(&first.manifest_path).unwrap();
    std::fs::write(first.directory.join("results/old.json"), "{}").unwrap();
    let second = materializer.materialize("eps-fair", configs).unwrap();

    assert_eq!(std::fs::read(&second.manifest_path).unwrap(), first_manifest);
    assert!(second.directory.join("results/old.json").exists());
}

#[test]
fn test_missing_solver_artifact_writes_nothing() {
    let mut fs = MockBatchFileSystem::new();
    fs.expect_exists()
        .withf(|path| path == Path::new("/base/build/libs/uber.jar"))
        .returning(|_| false);
    fs.expect_create_dir_all().never();
    fs.expect_write_file().never();
    let materializer = BatchMaterializer::new(fs, layout(Path::new("/base")), SolverCommand::new("/lib"));

    let err = materializer.materialize("min", vec![]).unwrap_err();

    assert_matches!(err, PipelineError::ConfigurationError { field, .. } if field == "solver_artifact");
}

#[test]
fn test_missing_instance_file_is_reported() {
    let temp = TempDir::new().unwrap();
    seed_inputs(temp.path(), &[]);
    let materializer = BatchMaterializer::new(RealFileSystem::new(), layout(temp.path()), SolverCommand::new("/lib"));

    let err = materializer
        .materialize("min", vec![configuration("ghost.tsp", Objective::Min, 0.0)])
        .unwrap_err();

    assert_matches!(err, PipelineError::ConfigurationError { field, .. } if field == "data_dir");
    assert!(!temp.path().join("runs/min").exists());
}

#[test]
fn test_write_failure_propagates() {
    let mut fs = MockBatchFileSystem::new();
    fs.expect_exists().returning(|_| true);
    fs.expect_create_dir_all().returning(|_| Ok(()));
    fs.expect_copy_file().returning(|_, _| Ok(()));
    fs.expect_write_file().returning(|path, _| {
        Err(PipelineError::FileSystemError {
            operation: "write".to_string(),
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    });
    let materializer = BatchMaterializer::new(fs, layout(Path::new("/base")), SolverCommand::new("/lib"));

    let err = materializer
        .materialize("min", vec![configuration("eil51.tsp", Objective::Min, 0.0)])
        .unwrap_err();

    assert_matches!(err, PipelineError::FileSystemError { operation, .. } if operation == "write");
}

#[test]
fn test_prepare_artifact_after_successful_build() {
    let mut builder = MockArtifactBuilder::new();
    builder.expect_build().times(1).returning(|| Ok(()));
    let mut fs = MockBatchFileSystem::new();
    fs.expect_exists()
        .withf(|path| path == Path::new("/base/build/libs/uber.jar"))
        .returning(|_| true);
    let materializer = BatchMaterializer::new(fs, layout(Path::new("/base")), SolverCommand::new("/lib"));

    assert!(materializer.prepare_artifact(&builder).is_ok());
}

#[test]
fn test_failed_build_stops_before_artifact_check() {
    let mut builder = MockArtifactBuilder::new();
    builder
        .expect_build()
        .returning(|| Err(PipelineError::config("build_command", "`gradle uberjar` exited with 1")));
    let mut fs = MockBatchFileSystem::new();
    fs.expect_exists().never();
    let materializer = BatchMaterializer::new(fs, layout(Path::new("/base")), SolverCommand::new("/lib"));

    let err = materializer.prepare_artifact(&builder).unwrap_err();

    assert_matches!(err, PipelineError::ConfigurationError { field, .. } if field == "build_command");
}

#[test]
fn test_build_without_artifact_is_reported() {
    let mut builder = MockArtifactBuilder::new();
    builder.expect_build().returning(|| Ok(()));
    let mut fs = MockBatchFileSystem::new();
    fs.expect_exists().returning(|_| false);
    let materializer = BatchMaterializer::new(fs, layout(Path::new("/base")), SolverCommand::new("/lib"));

    let err = materializer.prepare_artifact(&builder).unwrap_err();

    assert_matches!(
        err,
        PipelineError::ConfigurationError { field, message } if field == "solver_artifact" && message.contains("uberjar build failed")
    );
}
