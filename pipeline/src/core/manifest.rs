//! Batch manifest rendering
//!
//! A manifest is a plain text file with one complete solver command line
//! per run. The cluster submission script reads it line by line, so the
//! output must be stable: the same configurations always render to the
//! same bytes.

use std::path::PathBuf;

use shared::RunConfiguration;

/// File name of the solver artifact inside a batch directory
pub const SOLVER_ARTIFACT_NAME: &str = "uber.jar";

/// Fixed parts of the solver invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverCommand {
    /// Directory holding the native optimizer library
    pub library_path: PathBuf,
    pub artifact_name: String,
    pub initial_heap: String,
    pub max_heap: String,
}

impl SolverCommand {
    pub fn new(library_path: impl Into<PathBuf>) -> Self {
        Self {
            library_path: library_path.into(),
            artifact_name: SOLVER_ARTIFACT_NAME.to_string(),
            initial_heap: "32m".to_string(),
            max_heap: "32g".to_string(),
        }
    }

    /// `java ... -jar ./uber.jar`, the part shared by every manifest line
    pub fn prefix(&self) -> String {
        format!(
            "java -Xms{} -Xmx{} -Djava.library.path={} -jar ./{}",
            self.initial_heap,
            self.max_heap,
            self.library_path.display(),
            self.artifact_name
        )
    }

    /// Full command line for one run, relative to the batch directory
    pub fn render_line(&self, config: &RunConfiguration) -> String {
        // {:?} prints the shortest representation that round-trips (0.8, 0.2001, 0.0)
        format!(
            "{} -n {} -path ./data/ -r ./results/ -v {} -obj {} -fc {:?} -p {} -t {}",
            self.prefix(),
            config.instance_name,
            config.num_vehicles,
            config.objective,
            config.fairness_coefficient,
            config.p_norm,
            config.time_limit_seconds
        )
    }
}

/// Render every configuration, one newline-terminated line each
pub fn render_manifest(command: &SolverCommand, configurations: &[RunConfiguration]) -> String {
    configurations
        .iter()
        .map(|config| command.render_line(config) + "\n")
        .collect()
}
