use std::path::{Path, PathBuf};

use crate::error::DriverError;

/// The process-managed root instrumented files are written under. An
/// owned handle whose destructor performs recursive delete, realised
/// with `tempfile::TempDir`'s own `Drop` rather than a hand-rolled one.
pub struct TempRoot {
    dir: Option<tempfile::TempDir>,
}

impl TempRoot {
    pub fn new() -> Result<Self, DriverError> {
        let dir = tempfile::Builder::new()
            .prefix("lucov-")
            .tempdir()
            .map_err(|source| DriverError::Io {
                path: std::env::temp_dir(),
                source,
            })?;
        Ok(Self { dir: Some(dir) })
    }

    pub fn path(&self) -> &Path {
        self.dir
            .as_ref()
            .expect("TempRoot used after shutdown")
            .path()
    }

    /// Resolve where `original_path` lands under this root, mirroring
    /// its suffix structure so two files of the same basename don't
    /// collide. A leading `/` is stripped before joining.
    pub fn resolve_instrumented_path(&self, original_path: &str) -> PathBuf {
        let sanitized = original_path.trim_start_matches('/');
        self.path().join("instrumented").join(sanitized)
    }

    /// Remove the root now instead of waiting for process exit / drop.
    pub fn shutdown(mut self) -> Result<(), DriverError> {
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            dir.close().map_err(|source| DriverError::Io { path, source })?;
        }
        Ok(())
    }

    /// Persist the root past this handle's lifetime, for debugging.
    pub fn keep(mut self) -> PathBuf {
        self.dir
            .take()
            .expect("TempRoot used after shutdown")
            .into_path()
    }
}
