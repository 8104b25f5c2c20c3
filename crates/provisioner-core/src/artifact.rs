use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Scoped ownership of the transient model file.
///
/// The file is removed when the guard is dropped, including when the future
/// holding it is cancelled. Removal never fails the run.
#[derive(Debug)]
pub struct ModelArtifact {
    path: PathBuf,
}

impl ModelArtifact {
    /// Take ownership of `path`, discarding any leftover from an earlier run
    /// that did not get to clean up.
    pub fn claim(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        if path.exists() {
            warn!(path = %path.display(), "removing stale model artifact");
            remove_quietly(&path);
        }
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Remove the file now.
    pub fn release(self) {
        debug!(path = %self.path.display(), "releasing model artifact");
        drop(self);
    }
}

impl Drop for ModelArtifact {
    fn drop(&mut self) {
        remove_quietly(&self.path);
    }
}

fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "model artifact removed"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "could not remove model artifact"),
    }
}
