//! Solver artifact build
//!
//! Runs the solver's build in the experiment base directory before a batch
//! is materialized, so every batch ships a jar built from the current
//! sources. The build is an external command (gradle by default); its
//! output is captured and only surfaced in logs.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use shared::{stage_debug, stage_error, stage_info};

use crate::error::{PipelineError, PipelineResult};
use crate::traits::ArtifactBuilder;

/// Build invocation producing `build/libs/uber.jar`
pub const DEFAULT_BUILD_COMMAND: &str = "gradle clean cleanlogs uberjar";

/// Runs a build command as a child process
#[derive(Debug, Clone)]
pub struct CommandArtifactBuilder {
    base_dir: PathBuf,
    program: String,
    args: Vec<String>,
}

impl CommandArtifactBuilder {
    /// Parse a whitespace separated command line to run in `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>, command_line: &str) -> PipelineResult<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| PipelineError::config("build_command", "build command is empty"))?;
        Ok(Self {
            base_dir: base_dir.into(),
            program,
            args: parts.collect(),
        })
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ArtifactBuilder for CommandArtifactBuilder {
    fn build(&self) -> PipelineResult<()> {
        let command_line = self.command_line();
        stage_info!("🔨 Building solver artifact: {} in {}", command_line, self.base_dir.display());

        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&self.base_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| PipelineError::config("build_command", format!("failed to run `{command_line}`: {e}")))?;

        for line in String::from_utf8_lossy(&output.stdout).lines() {
            stage_debug!("[build] {}", line);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            for line in stderr.lines() {
                stage_error!("[build] {}", line);
            }
            return Err(PipelineError::config(
                "build_command",
                format!("`{command_line}` exited with {}", output.status),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    #[test]
    fn test_parse_command_line() {
        let builder = CommandArtifactBuilder::new("/base", DEFAULT_BUILD_COMMAND).unwrap();
        assert_eq!(builder.program, "gradle");
        assert_eq!(builder.args, vec!["clean", "cleanlogs", "uberjar"]);
        assert_eq!(builder.command_line(), DEFAULT_BUILD_COMMAND);
    }

    #[test]
    fn test_empty_command_rejected() {
        assert_matches!(
            CommandArtifactBuilder::new("/base", "   "),
            Err(PipelineError::ConfigurationError { .. })
        );
    }

    #[test]
    fn test_build_runs_in_base_dir() {
        let temp = TempDir::new().unwrap();
        let builder = CommandArtifactBuilder::new(temp.path(), "touch built.marker").unwrap();

        builder.build().unwrap();

        assert!(temp.path().join("built.marker").is_file());
    }

    #[test]
    fn test_nonzero_exit_is_configuration_error() {
        let temp = TempDir::new().unwrap();
        let builder = CommandArtifactBuilder::new(temp.path(), "false").unwrap();

        assert_matches!(
            builder.build(),
            Err(PipelineError::ConfigurationError { field, .. }) if field == "build_command"
        );
    }

    #[test]
    fn test_missing_program_is_configuration_error() {
        let temp = TempDir::new().unwrap();
        let builder = CommandArtifactBuilder::new(temp.path(), "fairmtsp-no-such-build-tool").unwrap();

        assert_matches!(builder.build(), Err(PipelineError::ConfigurationError { .. }));
    }
}
