use serde::Serialize;

use tsflow::application::{GenerateReport, PackageOutcome};
use tsflow::error::TsflowError;

/// Emitted once before any package runs
#[derive(Debug, Clone, Serialize)]
pub struct StartEvent<'a> {
    pub event: &'static str,
    pub command: &'a str,
    pub version: &'static str,
    pub packages: usize,
}

impl<'a> StartEvent<'a> {
    pub fn new(command: &'a str, packages: usize) -> Self {
        Self {
            event: "start",
            command,
            version: env!("CARGO_PKG_VERSION"),
            packages,
        }
    }
}

/// Terminal state of one input package
#[derive(Debug, Clone, Serialize)]
pub struct PackageEvent<'a> {
    pub event: &'static str,
    pub package_path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<&'a str>,
    /// `written`, `verified` or `failed`
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl<'a> PackageEvent<'a> {
    pub fn from_outcome(outcome: &'a PackageOutcome) -> Self {
        let base = Self {
            event: "package",
            package_path: &outcome.package_path,
            package: outcome.package_name.as_ref().map(|name| name.as_str()),
            status: "failed",
            output: None,
            stage: None,
            kind: None,
            message: None,
            duration_ms: None,
        };
        match &outcome.result {
            Ok(generated) => Self {
                status: generated.reconciliation.as_str(),
                output: Some(generated.output.display().to_string()),
                duration_ms: Some(generated.elapsed.as_millis() as u64),
                ..base
            },
            Err(failure) => Self {
                stage: Some(failure.stage.as_str()),
                kind: Some(failure.kind().as_str()),
                message: Some(failure.error.to_string()),
                ..base
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompleteEvent<'a> {
    pub event: &'static str,
    pub command: &'a str,
    pub success: bool,
    pub succeeded: usize,
    pub failed: usize,
    pub drifted: usize,
    pub duration_ms: u64,
}

impl<'a> CompleteEvent<'a> {
    pub fn from_report(command: &'a str, report: &GenerateReport) -> Self {
        Self {
            event: "complete",
            command,
            success: report.is_success(),
            succeeded: report.succeeded().count(),
            failed: report.failed().count(),
            drifted: report.drift_count(),
            duration_ms: report.elapsed.as_millis() as u64,
        }
    }
}

/// The run was rejected before any package ran
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEvent<'a> {
    pub event: &'static str,
    pub command: &'a str,
    pub kind: &'static str,
    pub message: String,
}

impl<'a> ErrorEvent<'a> {
    pub fn new(command: &'a str, error: &TsflowError) -> Self {
        Self {
            event: "error",
            command,
            kind: error.kind().as_str(),
            message: error.to_string(),
        }
    }
}
