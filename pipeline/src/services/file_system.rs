//! Real file system service implementation
//!
//! Backs batch materialization with `std::fs`, tagging every failure with
//! the operation and the path it was applied to.

use std::fs;
use std::path::Path;

use shared::stage_debug;

use crate::error::{PipelineError, PipelineResult};
use crate::traits::BatchFileSystem;

/// Real file system implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl BatchFileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> PipelineResult<()> {
        fs::create_dir_all(path).map_err(PipelineError::fs("create_dir_all", path))?;
        stage_debug!("📁 Created directory: {}", path.display());
        Ok(())
    }

    fn copy_file(&self, from: &Path, to: &Path) -> PipelineResult<()> {
        fs::copy(from, to).map_err(|source| {
            // a readable source means the destination side failed
            let path = if from.is_file() { to } else { from };
            PipelineError::fs("copy", path)(source)
        })?;
        stage_debug!("📄 Copied {} -> {}", from.display(), to.display());
        Ok(())
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> PipelineResult<()> {
        fs::write(path, content).map_err(PipelineError::fs("write", path))?;
        stage_debug!("📝 Wrote file: {}", path.display());
        Ok(())
    }
}
