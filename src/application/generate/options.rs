//! Pipeline Options
//!
//! Settings shared read-only by every package task of a run.

use std::path::PathBuf;

use crate::infrastructure::ReconcileMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Directory the projected files are written to (or compared against)
    pub out_dir: PathBuf,
    /// Log per-stage timings
    pub verbose: bool,
    /// Compare against existing output instead of writing
    pub verify: bool,
}

impl PipelineOptions {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            verbose: false,
            verify: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn reconcile_mode(&self) -> ReconcileMode {
        if self.verify {
            ReconcileMode::Verify
        } else {
            ReconcileMode::Write
        }
    }
}
