//! Persistent list of files to delete if a transfer is abandoned.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::FileOpsError;

/// File name used by [`RemovalList::in_dir`].
pub const DEFAULT_REMOVAL_FILE: &str = "ferry-marked-files.txt";

/// A newline-separated list of paths, stored on disk, that are deleted
/// together by [`RemovalList::remove_marked`].
///
/// The list survives a crash, so partial files left behind by an
/// interrupted process can be cleaned up on the next run.
#[derive(Debug, Clone)]
pub struct RemovalList {
    list_path: PathBuf,
}

impl RemovalList {
    /// Uses `list_path` as the backing file. It is created on first mark.
    pub fn new(list_path: impl Into<PathBuf>) -> Self {
        Self {
            list_path: list_path.into(),
        }
    }

    /// Uses [`DEFAULT_REMOVAL_FILE`] inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(DEFAULT_REMOVAL_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.list_path
    }

    /// Appends `path` to the list.
    pub fn mark(&self, path: &Path) -> Result<(), FileOpsError> {
        let line = path
            .to_str()
            .ok_or_else(|| FileOpsError::InvalidPath(format!("not UTF-8: {}", path.display())))?;
        if line.is_empty() || line.contains(['\n', '\r']) {
            return Err(FileOpsError::InvalidPath(format!("{line:?}")));
        }

        let mut file = self.open_for_append().map_err(|e| self.io_err(e))?;
        writeln!(file, "{line}").map_err(|e| self.io_err(e))?;

        tracing::debug!(path = %path.display(), list = %self.list_path.display(), "marked file for removal");
        Ok(())
    }

    /// Returns the marked paths in the order they were added.
    ///
    /// A list that was never written is empty.
    pub fn marked(&self) -> Result<Vec<PathBuf>, FileOpsError> {
        let file = match File::open(&self.list_path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_err(e)),
        };

        let mut paths = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| self.io_err(e))?;
            if !line.is_empty() {
                paths.push(PathBuf::from(line));
            }
        }
        Ok(paths)
    }

    /// Deletes every marked file, then the list itself.
    ///
    /// Returns how many files were actually removed. Entries that are
    /// already gone are skipped; other failures are logged and do not stop
    /// the sweep.
    pub fn remove_marked(&self) -> Result<usize, FileOpsError> {
        let paths = self.marked()?;
        let mut removed = 0;

        for path in &paths {
            match std::fs::remove_file(path) {
                Ok(()) => {
                    tracing::trace!(path = %path.display(), "removed marked file");
                    removed += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to remove marked file");
                }
            }
        }

        match std::fs::remove_file(&self.list_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(self.io_err(e)),
        }

        if removed > 0 {
            tracing::info!(removed, list = %self.list_path.display(), "cleaned up marked files");
        }
        Ok(removed)
    }

    fn open_for_append(&self) -> io::Result<File> {
        let mut opts = OpenOptions::new();
        opts.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o600);
        }
        opts.open(&self.list_path)
    }

    fn io_err(&self, source: io::Error) -> FileOpsError {
        FileOpsError::Io {
            path: self.list_path.clone(),
            source,
        }
    }
}
