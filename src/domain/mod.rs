//! Domain Layer
//!
//! The vocabulary of a generation run, free of process and file I/O.
//!
//! ## Structure
//!
//! - `entities/` - `PackageTask`, the per-package record threaded through the stages
//! - `value_objects/` - Immutable value types (`PackageName`, `Stage`)
//! - `ports/` - Interfaces for the external tools (emitter, bundler, projector)

pub mod entities;
pub mod ports;
pub mod value_objects;
