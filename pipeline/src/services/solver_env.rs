//! Solver environment discovery
//!
//! The manifest needs the directory of the native optimizer library. It is
//! looked up in this order:
//! 1. `FAIRMTSP_SOLVER_LIB_PATH` from the process environment or a `.env` file
//! 2. the `cplexLibPath` entry of `~/.gradle/gradle.properties`, which is
//!    where the solver build already expects it
//!
//! Environment variables take precedence over `.env` file values.

use std::path::{Path, PathBuf};

use shared::stage_debug;

use crate::error::{PipelineError, PipelineResult};

pub const SOLVER_LIB_PATH_VAR: &str = "FAIRMTSP_SOLVER_LIB_PATH";

/// Key of the library path in the gradle properties file
pub const GRADLE_LIB_PATH_KEY: &str = "cplexLibPath";

/// Environment-backed solver settings
pub struct SolverEnvironment;

impl SolverEnvironment {
    /// Load a `.env` file if present; already set variables win
    fn init_env() {
        let _ = dotenv::dotenv();
    }

    /// Resolve the solver library path from the environment and gradle properties
    pub fn library_path() -> PipelineResult<PathBuf> {
        Self::init_env();
        let from_env = std::env::var(SOLVER_LIB_PATH_VAR).ok();
        let properties = std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".gradle").join("gradle.properties"))
            .and_then(|path| Self::read_properties(&path));
        resolve_library_path(from_env.as_deref(), properties.as_deref())
    }

    fn read_properties(path: &Path) -> Option<String> {
        match std::fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) => {
                stage_debug!("No gradle properties at {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Pick the library path from an environment value or a properties file body
pub fn resolve_library_path(env_value: Option<&str>, gradle_properties: Option<&str>) -> PipelineResult<PathBuf> {
    if let Some(value) = env_value.map(str::trim).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(value));
    }
    gradle_properties
        .and_then(|content| property_value(content, GRADLE_LIB_PATH_KEY))
        .map(PathBuf::from)
        .ok_or_else(|| {
            PipelineError::config(
                "solver_lib_path",
                format!("set {SOLVER_LIB_PATH_VAR} or {GRADLE_LIB_PATH_KEY} in ~/.gradle/gradle.properties"),
            )
        })
}

/// Value of `key` in a `key=value` properties body, ignoring comments
pub fn property_value(content: &str, key: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with('!'))
        .filter_map(|line| line.split_once('='))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
