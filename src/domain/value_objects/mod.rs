//! Value Objects
//!
//! Immutable types without identity.

mod package_name;
mod stage;

pub use package_name::{PackageName, PackageNameError};
pub use stage::Stage;
