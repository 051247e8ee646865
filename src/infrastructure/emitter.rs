//! Declaration emission through the TypeScript compiler
//!
//! The compiler is an external process. It is run with the package's
//! workspace directory as `--outDir`, and success is judged by whether the
//! primary declaration file shows up there, not by the exit status alone:
//! `tsc` exits non-zero on type errors while still emitting declarations.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::EmitterConfig;
use crate::domain::ports::{declaration_path, DeclarationEmitter, Emission};
use crate::domain::value_objects::PackageName;
use crate::error::EmissionError;

/// Runs `tsc -d --emitDeclarationOnly <entry> --outDir <dir>`
#[derive(Debug, Clone)]
pub struct TscEmitter {
    program: String,
    args: Vec<String>,
    extra_args: Vec<String>,
    timeout: Option<Duration>,
}

impl TscEmitter {
    /// `program` followed by `args`, then the generated arguments
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            extra_args: Vec::new(),
            timeout: None,
        }
    }

    pub fn from_config(config: &EmitterConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
            .with_extra_args(config.extra_args.clone())
            .with_timeout(config.timeout())
    }

    pub fn with_extra_args(mut self, extra_args: Vec<String>) -> Self {
        self.extra_args = extra_args;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program for one entry
    pub fn command_line(&self, entry: &Path, out_dir: &Path) -> Vec<String> {
        let mut args = self.args.clone();
        args.extend([
            "-d".to_string(),
            "--emitDeclarationOnly".to_string(),
            entry.display().to_string(),
            "--outDir".to_string(),
            out_dir.display().to_string(),
        ]);
        args.extend(self.extra_args.iter().cloned());
        args
    }

    async fn check_artifact(
        &self,
        package: &PackageName,
        artifact: PathBuf,
        exit_code: Option<i32>,
        diagnostics: String,
    ) -> Result<Emission, EmissionError> {
        let emitted = tokio::fs::metadata(&artifact)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !emitted {
            return Err(EmissionError::MissingArtifact {
                artifact,
                exit_code,
                diagnostics,
            });
        }

        let emission = Emission {
            exit_code,
            artifact,
            diagnostics,
        };
        if !emission.is_clean_exit() {
            warn!(
                package = %package,
                exit_code = ?emission.exit_code,
                "declaration compiler reported errors but emitted declarations"
            );
        }
        Ok(emission)
    }
}

impl Default for TscEmitter {
    fn default() -> Self {
        Self::from_config(&EmitterConfig::default())
    }
}

impl DeclarationEmitter for TscEmitter {
    async fn emit(
        &self,
        package: &PackageName,
        entry: &Path,
        out_dir: &Path,
    ) -> Result<Emission, EmissionError> {
        let args = self.command_line(entry, out_dir);
        info!(package = %package, "{} {}", self.program, args.join(" "));

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|source| EmissionError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let waited = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, waited).await.map_err(|_| {
                EmissionError::TimedOut {
                    package: package.to_string(),
                    secs: limit.as_secs(),
                }
            })?,
            None => waited.await,
        }
        .map_err(|source| EmissionError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
        diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));
        debug!(
            package = %package,
            exit_code = ?output.status.code(),
            "declaration compiler finished"
        );

        let artifact = declaration_path(entry, out_dir);
        self.check_artifact(package, artifact, output.status.code(), diagnostics)
            .await
    }
}
