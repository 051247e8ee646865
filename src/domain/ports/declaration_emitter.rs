//! DeclarationEmitter port - runs the external declaration compiler

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::PackageName;
use crate::error::EmissionError;

/// Typed outcome of one compiler run
///
/// An `Emission` is only handed out once `artifact` has been confirmed on
/// disk; a run that leaves no artifact is an [`EmissionError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emission {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// The primary declaration file
    pub artifact: PathBuf,
    /// Whatever the compiler printed
    pub diagnostics: String,
}

impl Emission {
    pub fn is_clean_exit(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Produces declaration files for one entry point
///
/// Implementations:
/// - `TscEmitter` - spawns `tsc` (or a configured stand-in)
pub trait DeclarationEmitter: Send + Sync {
    /// Emit declarations for `entry` into `out_dir`
    ///
    /// `out_dir` is the package's own directory inside the run workspace.
    fn emit(
        &self,
        package: &PackageName,
        entry: &Path,
        out_dir: &Path,
    ) -> impl Future<Output = Result<Emission, EmissionError>> + Send;
}

/// Where the compiler puts the primary declaration for `entry`
///
/// `<out_dir>/<entry file name without .ts/.tsx>.d.ts`, computed up front
/// because the compiler reports success only through its exit status.
pub fn declaration_path(entry: &Path, out_dir: &Path) -> PathBuf {
    let file_name = entry
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name
        .strip_suffix(".tsx")
        .or_else(|| file_name.strip_suffix(".ts"))
        .unwrap_or(&file_name);
    out_dir.join(format!("{}.d.ts", stem))
}
