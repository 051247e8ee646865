//! Run-scoped temporary workspace
//!
//! One unique root per invocation; each package owns `<root>/<file stem>`
//! and its bundle lands at `<root>/<file stem>.d.ts`. Isolation is by path:
//! package file stems are checked for uniqueness before any task starts.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::domain::value_objects::PackageName;
use crate::error::{TsflowError, TsflowResult};

const PREFIX: &str = "tsflow-";

#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    keep: bool,
}

impl Workspace {
    /// Create a fresh root under `parent`, or the system temp dir
    pub fn create(parent: Option<&Path>, keep: bool) -> TsflowResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(PREFIX);
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(TsflowError::Workspace)?;

        debug!(root = %dir.path().display(), "created workspace");
        Ok(Self { dir, keep })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// The directory the compiler writes one package's declarations into
    pub fn package_dir(&self, package: &PackageName) -> PathBuf {
        self.root().join(package.file_stem())
    }

    pub fn keeps_files(&self) -> bool {
        self.keep
    }

    /// Release the workspace: removed, or left on disk and its path returned
    pub fn finish(self) -> Option<PathBuf> {
        if self.keep {
            Some(self.dir.keep())
        } else {
            let root = self.dir.path().to_path_buf();
            if let Err(err) = self.dir.close() {
                debug!(root = %root.display(), error = %err, "failed to remove workspace");
            }
            None
        }
    }
}
