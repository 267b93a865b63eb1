//! Per-invocation scratch space.
//!
//! Each invocation gets its own directory under the scratch root. File names
//! inside it come from a random token, never from the object key, so keys
//! with `/`, `..` or other special characters cannot escape the directory or
//! collide with a concurrent invocation.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::trace;
use uuid::Uuid;

use crate::error::CleanupError;

/// A scratch directory removed by [`Scratch::close`] or, failing that, on drop.
#[derive(Debug)]
pub struct Scratch {
    dir: TempDir,
    token: Uuid,
}

impl Scratch {
    /// Create a fresh scratch directory under `root`, creating `root` if needed.
    pub fn create(root: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(root)?;
        let token = Uuid::new_v4();
        let dir = tempfile::Builder::new()
            .prefix(&format!("imgflow-{}-", token.simple()))
            .tempdir_in(root)?;
        trace!(path = %dir.path().display(), "created scratch directory");
        Ok(Self { dir, token })
    }

    /// The random token naming this invocation's files.
    #[must_use]
    pub fn token(&self) -> Uuid {
        self.token
    }

    /// The scratch directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the fetched source object is stored.
    #[must_use]
    pub fn source_path(&self) -> PathBuf {
        self.dir.path().join(format!("{}.source", self.token.simple()))
    }

    /// Remove the directory and everything in it.
    pub fn close(self) -> Result<(), CleanupError> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .map_err(|source| CleanupError { path: path.clone(), source })?;
        trace!(path = %path.display(), "removed scratch directory");
        Ok(())
    }
}
