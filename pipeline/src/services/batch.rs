//! Batch materialization
//!
//! A batch is a self-contained directory that can be copied to the cluster
//! and submitted as is:
//!
//! ```text
//! runs/<batch>/
//!   uber.jar               solver artifact
//!   <batch>_runs.txt       manifest, one command line per run
//!   submit-batch.sh        cluster scripts
//!   slurm-batch-job.sh
//!   data/                  instance files referenced by the manifest
//!   results/ logs/ output/ empty, filled by the solver
//! ```
//!
//! Regenerating a batch overwrites the manifest and the copied files but
//! never removes anything else. A failure part way through leaves the
//! partially built directory behind.

use std::collections::BTreeSet;
use std::path::PathBuf;

use shared::{stage_debug, stage_info, RunConfiguration};

use crate::core::manifest::{render_manifest, SolverCommand};
use crate::error::{PipelineError, PipelineResult};
use crate::traits::{ArtifactBuilder, BatchFileSystem};

/// Cluster scripts copied into every batch
pub const DEFAULT_SCRIPT_NAMES: [&str; 2] = ["submit-batch.sh", "slurm-batch-job.sh"];

/// Subdirectories created empty in every batch
pub const OUTPUT_DIRECTORIES: [&str; 3] = ["results", "logs", "output"];

/// Where batch inputs come from and where batches go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchLayout {
    pub runs_dir: PathBuf,
    pub data_dir: PathBuf,
    pub solver_artifact: PathBuf,
    pub scripts_dir: PathBuf,
    pub script_names: Vec<String>,
}

impl BatchLayout {
    pub fn new(runs_dir: PathBuf, data_dir: PathBuf, solver_artifact: PathBuf, scripts_dir: PathBuf) -> Self {
        Self {
            runs_dir,
            data_dir,
            solver_artifact,
            scripts_dir,
            script_names: DEFAULT_SCRIPT_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn batch_dir(&self, batch_name: &str) -> PathBuf {
        self.runs_dir.join(batch_name)
    }
}

/// A materialized batch
#[derive(Debug, Clone, PartialEq)]
pub struct RunBatch {
    pub name: String,
    pub configurations: Vec<RunConfiguration>,
    pub directory: PathBuf,
    pub manifest_path: PathBuf,
}

pub fn manifest_file_name(batch_name: &str) -> String {
    format!("{batch_name}_runs.txt")
}

/// Writes batches through a [`BatchFileSystem`]
pub struct BatchMaterializer<F: BatchFileSystem> {
    file_system: F,
    layout: BatchLayout,
    command: SolverCommand,
}

impl<F: BatchFileSystem> BatchMaterializer<F> {
    pub fn new(file_system: F, layout: BatchLayout, command: SolverCommand) -> Self {
        Self {
            file_system,
            layout,
            command,
        }
    }

    pub fn file_system(&self) -> &F {
        &self.file_system
    }

    /// Run the artifact build, then require the solver artifact to exist
    pub fn prepare_artifact<B: ArtifactBuilder + ?Sized>(&self, builder: &B) -> PipelineResult<()> {
        builder.build()?;
        if !self.file_system.exists(&self.layout.solver_artifact) {
            return Err(PipelineError::config(
                "solver_artifact",
                format!("uberjar build failed: {} not found", self.layout.solver_artifact.display()),
            ));
        }
        stage_info!("🔨 Prepared solver artifact {}", self.layout.solver_artifact.display());
        Ok(())
    }

    /// Build the batch directory for `configurations`
    pub fn materialize(&self, batch_name: &str, configurations: Vec<RunConfiguration>) -> PipelineResult<RunBatch> {
        let instances: BTreeSet<&str> = configurations.iter().map(|c| c.instance_name.as_str()).collect();
        self.check_inputs(&instances)?;

        let directory = self.layout.batch_dir(batch_name);
        self.file_system.create_dir_all(&directory)?;

        self.file_system.copy_file(
            &self.layout.solver_artifact,
            &directory.join(&self.command.artifact_name),
        )?;

        let manifest_path = directory.join(manifest_file_name(batch_name));
        let manifest = render_manifest(&self.command, &configurations);
        self.file_system.write_file(&manifest_path, manifest.as_bytes())?;

        for script in &self.layout.script_names {
            self.file_system
                .copy_file(&self.layout.scripts_dir.join(script), &directory.join(script))?;
        }

        let data_dir = directory.join("data");
        self.file_system.create_dir_all(&data_dir)?;
        for instance in &instances {
            self.file_system
                .copy_file(&self.layout.data_dir.join(instance), &data_dir.join(instance))?;
        }

        for name in OUTPUT_DIRECTORIES {
            self.file_system.create_dir_all(&directory.join(name))?;
        }

        stage_info!(
            "📦 Materialized batch {} with {} runs over {} instances at {}",
            batch_name,
            configurations.len(),
            instances.len(),
            directory.display()
        );

        Ok(RunBatch {
            name: batch_name.to_string(),
            configurations,
            directory,
            manifest_path,
        })
    }

    /// Solver artifact, scripts and referenced instances must exist before anything is written
    fn check_inputs(&self, instances: &BTreeSet<&str>) -> PipelineResult<()> {
        let required = std::iter::once(("solver_artifact", self.layout.solver_artifact.clone()))
            .chain(
                self.layout
                    .script_names
                    .iter()
                    .map(|name| ("scripts_dir", self.layout.scripts_dir.join(name))),
            )
            .chain(instances.iter().map(|instance| ("data_dir", self.layout.data_dir.join(instance))));
        for (field, path) in required {
            if !self.file_system.exists(&path) {
                return Err(PipelineError::config(field, format!("{} not found", path.display())));
            }
            stage_debug!("Found {}", path.display());
        }
        Ok(())
    }
}
