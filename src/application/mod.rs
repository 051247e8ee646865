//! Application Layer
//!
//! Use cases that orchestrate the pipeline. Depends on the domain ports and
//! wires in the infrastructure that has no port of its own (resolution,
//! reconciliation, the workspace).
//!
//! ## Use Cases
//!
//! - `GenerateUseCase` - resolve, emit, bundle, project and reconcile every
//!   package concurrently

pub mod generate;

pub use generate::{
    GenerateReport, GenerateUseCase, GeneratedPackage, PackageFailure, PackageOutcome,
    PipelineOptions,
};
