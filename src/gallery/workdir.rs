//! Scoped working-directory changes.
//!
//! Notebooks resolve relative data and figure paths against the process
//! working directory, so execution moves into each tutorial directory.
//! `WorkdirGuard` remembers where the batch started and puts the process
//! back there when dropped, on success, error and unwind alike.

use std::env;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{GalleryError, Result};

/// Restores the original working directory on drop.
#[derive(Debug)]
pub struct WorkdirGuard {
    original: PathBuf,
}

impl WorkdirGuard {
    /// Captures the current working directory.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the current directory cannot be determined.
    pub fn capture() -> Result<Self> {
        let original = env::current_dir()?;
        Ok(Self { original })
    }

    /// Changes the process working directory to `dir`.
    ///
    /// The original directory is still restored when the guard drops.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if `dir` cannot be entered.
    pub fn enter(&self, dir: &Path) -> Result<()> {
        env::set_current_dir(dir).map_err(|e| GalleryError::io_at("enter directory", dir, &e))?;
        debug!(dir = %dir.display(), "changed working directory");
        Ok(())
    }

    /// Directory that will be restored.
    #[must_use]
    pub fn original(&self) -> &Path {
        &self.original
    }
}

impl Drop for WorkdirGuard {
    fn drop(&mut self) {
        if let Err(e) = env::set_current_dir(&self.original) {
            warn!(
                dir = %self.original.display(),
                error = %e,
                "failed to restore working directory"
            );
        }
    }
}
