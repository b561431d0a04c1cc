use crate::error::PipelineError;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

const SCRATCH_PREFIX: &str = "song-similarity-";

/// Per-invocation temporary directory for staged clips.
///
/// The directory and everything in it is removed exactly once: by `close`
/// on success, or on drop when an invocation bails out early.
#[derive(Debug)]
pub struct ScratchSpace {
    dir: Option<TempDir>,
    path: PathBuf,
    next_file: AtomicUsize,
}

impl ScratchSpace {
    /// Create a fresh directory under `root`, or under the system temp dir
    pub fn create(root: Option<&Path>) -> Result<Self, PipelineError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);

        let dir = match root {
            Some(root) => {
                std::fs::create_dir_all(root).map_err(PipelineError::Scratch)?;
                builder.tempdir_in(root)
            }
            None => builder.tempdir(),
        }
        .map_err(PipelineError::Scratch)?;

        tracing::debug!("Created scratch space {:?}", dir.path());
        Ok(Self {
            path: dir.path().to_owned(),
            dir: Some(dir),
            next_file: AtomicUsize::new(0),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A file name inside the scratch space that no other caller of this
    /// instance will receive
    pub fn reserve(&self, extension: Option<&str>) -> PathBuf {
        let index = self.next_file.fetch_add(1, Ordering::Relaxed);
        let name = match extension {
            Some(ext) => format!("clip-{}.{}", index, ext),
            None => format!("clip-{}", index),
        };
        self.path.join(name)
    }

    /// Remove the directory now
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(dir) = self.dir.take() {
            match dir.close() {
                Ok(()) => tracing::debug!("Removed scratch space {:?}", self.path),
                Err(e) => tracing::warn!("Failed to remove scratch space {:?}: {}", self.path, e),
            }
        }
    }
}

impl Drop for ScratchSpace {
    fn drop(&mut self) {
        self.release();
    }
}
