//! Per-entry working directories.

use super::source::new_temp_dir;
use crate::error::{CertifyError, Result};
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;

/// Temporary directory exclusively owned by one entry's validation attempt.
///
/// Released exactly once: by [`close`](Self::close), or by drop on any
/// early exit.
#[derive(Debug)]
pub struct WorkArea {
    dir: TempDir,
}

impl WorkArea {
    /// Create a fresh directory, under `parent` when given
    pub fn allocate(parent: Option<&Path>) -> Result<Self> {
        let dir = new_temp_dir("apicert-", parent)?;
        tracing::debug!("Created working directory {}", dir.path().display());
        Ok(Self { dir })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Copy `root/definition_path` into the area under its base name,
    /// overwriting any previous copy. Returns the destination path.
    pub fn copy_spec(&self, root: &Path, definition_path: &str) -> Result<PathBuf> {
        let relative = Path::new(definition_path);
        if relative.is_absolute()
            || relative
                .components()
                .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(CertifyError::file_resolution(
                definition_path,
                "'definition-path' must stay inside the repository",
            ));
        }

        let source = root.join(relative);
        if !source.is_file() {
            return Err(CertifyError::source_missing(definition_path));
        }

        let file_name = relative.file_name().ok_or_else(|| {
            CertifyError::file_resolution(definition_path, "'definition-path' names no file")
        })?;
        let destination = self.path().join(file_name);
        std::fs::copy(&source, &destination).map_err(|e| CertifyError::io(&source, e))?;
        tracing::debug!(
            "Copied {} to {}",
            source.display(),
            destination.display()
        );
        Ok(destination)
    }

    /// Remove the directory, reporting failures
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(|e| CertifyError::io(path, e))
    }
}
