//! Generate Module
//!
//! Runs every input package through the pipeline:
//! resolve, emit, bundle, project, reconcile.
//!
//! ## Structure
//!
//! - `options` - Run-wide settings (`PipelineOptions`)
//! - `result` - Per-package outcomes and the run report (`GenerateReport`)
//! - `use_case` - The concurrent orchestration (`GenerateUseCase`)
//!
//! ## Usage
//!
//! ```ignore
//! use tsflow::application::generate::{GenerateUseCase, PipelineOptions};
//!
//! let use_case = Arc::new(GenerateUseCase::new(resolver, emitter, bundler, projector));
//! let report = use_case.execute(paths, &workspace, PipelineOptions::new("flow-typed")).await?;
//! ```

mod options;
mod result;
mod use_case;

pub use options::PipelineOptions;
pub use result::{GenerateReport, GeneratedPackage, PackageFailure, PackageOutcome};
pub use use_case::GenerateUseCase;

#[cfg(test)]
mod tests;
