//! tsflow - Flow type definitions from TypeScript packages
//!
//! Each input package is resolved to its `.ts` entry, compiled to declaration
//! files by `tsc`, bundled into a single declaration file, projected to Flow
//! and then either written to the output directory or compared against it.
//!
//! Packages run concurrently on one thread and fail in isolation: the
//! [`GenerateReport`] holds one outcome per input, in input order.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod syntax;

// Re-exports for convenience
pub use application::{GenerateReport, GenerateUseCase, PackageOutcome, PipelineOptions};
pub use config::Config;
pub use domain::value_objects::{PackageName, Stage};
pub use error::{ErrorKind, TsflowError, TsflowResult};
pub use infrastructure::{
    DtsBundler, EntryResolver, FlowProjector, ReconcileMode, TscEmitter, Workspace,
};
