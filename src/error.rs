//! Error types for tsflow
//!
//! Every stage of the pipeline has its own error type; `TsflowError` folds
//! them together so a package outcome can carry whichever one ended it.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for tsflow operations
pub type TsflowResult<T> = Result<T, TsflowError>;

/// Main error type for tsflow operations
#[derive(Error, Debug)]
pub enum TsflowError {
    /// No entry file could be found for a package path
    #[error("can't resolve entry point from package: {package_path}")]
    Resolution { package_path: String },

    /// The resolved entry is not a TypeScript source file
    #[error("entry file must be a .ts source file: {path}")]
    InvalidEntry { path: PathBuf },

    /// The resolved entry does not exist on disk
    #[error("entry file does not exist: {path}")]
    MissingFile { path: PathBuf },

    /// Package manifest could not be read or parsed
    #[error("invalid package manifest {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    #[error(transparent)]
    Emission(#[from] EmissionError),

    #[error(transparent)]
    Bundle(#[from] BundleError),

    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Drift(#[from] DriftError),

    /// Two input paths map to the same package file name
    #[error("duplicate package name '{name}' for {first} and {second}")]
    DuplicatePackage {
        name: String,
        first: String,
        second: String,
    },

    /// Configuration file is malformed
    #[error("invalid config in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// The run-scoped temporary workspace could not be created
    #[error("failed to create temporary workspace: {0}")]
    Workspace(#[source] std::io::Error),

    /// IO error on a specific file
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A package task panicked before reaching a terminal state
    #[error("generation task for {package_path} panicked: {message}")]
    TaskPanicked {
        package_path: String,
        message: String,
    },
}

impl TsflowError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Taxonomy kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            TsflowError::Resolution { .. } | TsflowError::Manifest { .. } => ErrorKind::Resolution,
            TsflowError::InvalidEntry { .. } => ErrorKind::InvalidEntry,
            TsflowError::MissingFile { .. } => ErrorKind::MissingFile,
            TsflowError::Emission(_) => ErrorKind::Emission,
            TsflowError::Bundle(_) => ErrorKind::Bundle,
            TsflowError::Projection(_) => ErrorKind::Projection,
            TsflowError::Drift(_) => ErrorKind::Drift,
            TsflowError::DuplicatePackage { .. } => ErrorKind::DuplicatePackage,
            TsflowError::Config { .. } => ErrorKind::Config,
            TsflowError::Workspace(_) => ErrorKind::Workspace,
            TsflowError::Io { .. } => ErrorKind::Io,
            TsflowError::TaskPanicked { .. } => ErrorKind::TaskPanicked,
        }
    }
}

/// Error classification used in reports and JSON events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Resolution,
    InvalidEntry,
    MissingFile,
    Emission,
    Bundle,
    Projection,
    Drift,
    DuplicatePackage,
    Config,
    Workspace,
    Io,
    TaskPanicked,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Resolution => "ResolutionError",
            ErrorKind::InvalidEntry => "InvalidEntryError",
            ErrorKind::MissingFile => "MissingFileError",
            ErrorKind::Emission => "EmissionError",
            ErrorKind::Bundle => "BundleError",
            ErrorKind::Projection => "ProjectionError",
            ErrorKind::Drift => "DriftError",
            ErrorKind::DuplicatePackage => "DuplicatePackageError",
            ErrorKind::Config => "ConfigError",
            ErrorKind::Workspace => "WorkspaceError",
            ErrorKind::Io => "IoError",
            ErrorKind::TaskPanicked => "TaskPanicked",
        }
    }
}

/// Failure of the external declaration compiler
#[derive(Error, Debug)]
pub enum EmissionError {
    /// The process could not be started at all
    #[error("failed to start declaration compiler `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but the expected declaration file is absent
    #[error("declaration compiler {} without producing {}{}", describe_exit(.exit_code), .artifact.display(), format_diagnostics(.diagnostics))]
    MissingArtifact {
        artifact: PathBuf,
        /// `None` when the process was terminated by a signal
        exit_code: Option<i32>,
        diagnostics: String,
    },

    /// The process did not terminate within the configured timeout
    #[error("declaration compiler for {package} timed out after {secs}s")]
    TimedOut { package: String, secs: u64 },
}

fn describe_exit(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!("exited with status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

fn format_diagnostics(diagnostics: &str) -> String {
    let trimmed = diagnostics.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(":\n{}", trimmed)
    }
}

/// Failure while collapsing declaration files into one bundle
#[derive(Error, Debug)]
pub enum BundleError {
    /// The primary declaration file does not exist
    #[error("declaration file not found: {path}")]
    MissingEntry { path: PathBuf },

    /// A relative import could not be resolved to a declaration file
    #[error("cannot resolve '{specifier}' imported from {from}")]
    UnresolvedImport { specifier: String, from: PathBuf },

    /// A declaration file could not be read as declaration syntax
    #[error("malformed declaration file {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure while projecting a bundled declaration into Flow
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{path}:{line}:{column}: {message}")]
pub struct ProjectionError {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Verify-mode mismatch between the committed output and a fresh projection
#[derive(Error, Debug)]
#[error("{} {}", .path.display(), .reason)]
pub struct DriftError {
    pub path: PathBuf,
    pub reason: DriftReason,
    /// Content currently on disk, when the file exists
    pub existing: Option<String>,
    /// Freshly projected content
    pub generated: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftReason {
    Missing,
    Changed,
}

impl std::fmt::Display for DriftReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DriftReason::Missing => f.write_str("is missing; run without --verify to generate it"),
            DriftReason::Changed => {
                f.write_str("is out of date; run without --verify to regenerate it")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_resolution_names_package_path() {
        let err = TsflowError::Resolution {
            package_path: "packages/missing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "can't resolve entry point from package: packages/missing"
        );
        assert_eq!(err.kind().as_str(), "ResolutionError");
    }

    #[test]
    fn test_error_display_invalid_entry() {
        let err = TsflowError::InvalidEntry {
            path: PathBuf::from("pkg/index.js"),
        };
        assert_eq!(
            err.to_string(),
            "entry file must be a .ts source file: pkg/index.js"
        );
    }

    #[test]
    fn test_error_display_drift_names_file() {
        let err: TsflowError = DriftError {
            path: PathBuf::from("flow-typed/pkg.js.flow"),
            reason: DriftReason::Changed,
            existing: Some("old".to_string()),
            generated: "new".to_string(),
        }
        .into();
        assert!(err.to_string().starts_with("flow-typed/pkg.js.flow is out of date"));
        assert_eq!(err.kind(), ErrorKind::Drift);
    }

    #[test]
    fn test_error_display_projection_has_position() {
        let err = ProjectionError {
            path: PathBuf::from("tmp/pkg.d.ts"),
            line: 3,
            column: 7,
            message: "expected ';'".to_string(),
        };
        assert_eq!(err.to_string(), "tmp/pkg.d.ts:3:7: expected ';'");
    }

    #[test]
    fn test_emission_error_includes_diagnostics() {
        let err = EmissionError::TimedOut {
            package: "widgets".to_string(),
            secs: 5,
        };
        assert_eq!(
            err.to_string(),
            "declaration compiler for widgets timed out after 5s"
        );
        assert_eq!(format_diagnostics("  \n"), "");
        assert_eq!(format_diagnostics("error TS1"), ":\nerror TS1");
    }

    #[test]
    fn test_missing_artifact_names_exit_and_path() {
        let err = EmissionError::MissingArtifact {
            artifact: PathBuf::from("/tmp/tsflow-x/widgets/index.d.ts"),
            exit_code: Some(2),
            diagnostics: "index.ts(1,1): error TS1005".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "declaration compiler exited with status 2 without producing /tmp/tsflow-x/widgets/index.d.ts:\nindex.ts(1,1): error TS1005"
        );
    }
}
