//! Domain Entities
//!
//! - `PackageTask` - one input package moving through the pipeline

mod package_task;

pub use package_task::PackageTask;
