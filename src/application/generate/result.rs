//! Generate Result
//!
//! Every input package ends in exactly one [`PackageOutcome`]; the report
//! keeps them in input order.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::value_objects::{PackageName, Stage};
use crate::error::{ErrorKind, TsflowError};
use crate::infrastructure::Reconciliation;

/// A package that reached `Done`
#[derive(Debug)]
pub struct GeneratedPackage {
    pub output: PathBuf,
    pub reconciliation: Reconciliation,
    pub elapsed: Duration,
}

/// A package that ended in `Failed`
#[derive(Debug)]
pub struct PackageFailure {
    /// The stage that was running when the error occurred
    pub stage: Stage,
    pub error: TsflowError,
}

impl PackageFailure {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

#[derive(Debug)]
pub struct PackageOutcome {
    /// As given on the command line
    pub package_path: String,
    /// Unknown when resolution failed
    pub package_name: Option<PackageName>,
    pub result: Result<GeneratedPackage, PackageFailure>,
}

impl PackageOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Name for display: the package name, or the input path
    pub fn label(&self) -> &str {
        self.package_name
            .as_ref()
            .map(PackageName::as_str)
            .unwrap_or(&self.package_path)
    }
}

#[derive(Debug, Default)]
pub struct GenerateReport {
    pub outcomes: Vec<PackageOutcome>,
    pub elapsed: Duration,
}

impl GenerateReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(PackageOutcome::is_success)
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &PackageOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &PackageOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    /// Failures that are verify-mode drift
    pub fn drift_count(&self) -> usize {
        self.failed()
            .filter(|o| {
                matches!(&o.result, Err(failure) if failure.kind() == ErrorKind::Drift)
            })
            .count()
    }
}
