//! Output reconciliation
//!
//! Write mode persists the projected text. Verify mode compares it
//! byte-for-byte with what is on disk and never writes.

use std::io;
use std::path::Path;

use tokio::fs;
use tracing::debug;

use crate::error::{DriftError, DriftReason, TsflowError, TsflowResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileMode {
    #[default]
    Write,
    Verify,
}

/// What happened to one output file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Write mode: content was written (it may have been identical)
    Written,
    /// Verify mode: content on disk matches
    Verified,
}

impl Reconciliation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reconciliation::Written => "written",
            Reconciliation::Verified => "verified",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputReconciler {
    mode: ReconcileMode,
}

impl OutputReconciler {
    pub fn new(mode: ReconcileMode) -> Self {
        Self { mode }
    }

    pub async fn reconcile(&self, target: &Path, generated: &str) -> TsflowResult<Reconciliation> {
        match self.mode {
            ReconcileMode::Write => write(target, generated).await,
            ReconcileMode::Verify => verify(target, generated).await,
        }
    }
}

async fn write(target: &Path, generated: &str) -> TsflowResult<Reconciliation> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| TsflowError::io(parent, e))?;
    }
    fs::write(target, generated)
        .await
        .map_err(|e| TsflowError::io(target, e))?;
    debug!(path = %target.display(), "wrote output");
    Ok(Reconciliation::Written)
}

async fn verify(target: &Path, generated: &str) -> TsflowResult<Reconciliation> {
    let existing = match fs::read(target).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(DriftError {
                path: target.to_path_buf(),
                reason: DriftReason::Missing,
                existing: None,
                generated: generated.to_string(),
            }
            .into());
        }
        Err(e) => return Err(TsflowError::io(target, e)),
    };

    if existing == generated.as_bytes() {
        debug!(path = %target.display(), "output is up to date");
        return Ok(Reconciliation::Verified);
    }

    Err(DriftError {
        path: target.to_path_buf(),
        reason: DriftReason::Changed,
        existing: Some(String::from_utf8_lossy(&existing).into_owned()),
        generated: generated.to_string(),
    }
    .into())
}
