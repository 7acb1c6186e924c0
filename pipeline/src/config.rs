//! Filesystem layout of an experiment checkout
//!
//! Everything is resolved from one base directory, taken from
//! `FAIRMTSP_BASE_DIR` (process environment or `.env`) or the current
//! directory:
//!
//! | path                   | purpose                          |
//! |------------------------|----------------------------------|
//! | `results/`             | solver result files by objective |
//! | `results/results.db`   | result store                     |
//! | `data/`                | instance files                   |
//! | `build/libs/uber.jar`  | solver artifact                  |
//! | `scripts/`             | cluster submission scripts       |
//! | `runs/`                | generated batches                |
//! | `reports/`             | CSV reports                      |

use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};
use crate::services::BatchLayout;

pub const BASE_DIR_VAR: &str = "FAIRMTSP_BASE_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    pub base_dir: PathBuf,
    pub results_dir: PathBuf,
    pub database: PathBuf,
    pub data_dir: PathBuf,
    pub solver_artifact: PathBuf,
    pub scripts_dir: PathBuf,
    pub runs_dir: PathBuf,
    pub reports_dir: PathBuf,
}

impl PipelinePaths {
    pub fn from_base(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let results_dir = base_dir.join("results");
        Self {
            database: results_dir.join("results.db"),
            results_dir,
            data_dir: base_dir.join("data"),
            solver_artifact: base_dir.join("build").join("libs").join("uber.jar"),
            scripts_dir: base_dir.join("scripts"),
            runs_dir: base_dir.join("runs"),
            reports_dir: base_dir.join("reports"),
            base_dir,
        }
    }

    /// Resolve the base directory from the environment, else the working directory
    pub fn from_env() -> PipelineResult<Self> {
        let _ = dotenv::dotenv();
        let base = match std::env::var_os(BASE_DIR_VAR) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => std::env::current_dir().map_err(PipelineError::fs("current_dir", Path::new(".")))?,
        };
        Ok(Self::from_base(base))
    }

    /// Use a different database file than `results/results.db`
    pub fn with_database(mut self, database: impl Into<PathBuf>) -> Self {
        self.database = database.into();
        self
    }

    pub fn batch_layout(&self) -> BatchLayout {
        BatchLayout::new(
            self.runs_dir.clone(),
            self.data_dir.clone(),
            self.solver_artifact.clone(),
            self.scripts_dir.clone(),
        )
    }
}
