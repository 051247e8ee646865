//! Infrastructure Layer
//!
//! Concrete implementations of domain ports and everything that touches the
//! filesystem or spawns processes.
//!
//! ## Structure
//!
//! - `resolver` - package path to entry file
//! - `emitter` - `tsc` subprocess (`DeclarationEmitter`)
//! - `bundler` - declaration graph to one file (`DeclarationBundler`)
//! - `projector/` - declarations to Flow (`TypeProjector`)
//! - `reconciler` - write or verify the output file
//! - `workspace` - run-scoped temporary directory

pub mod bundler;
pub mod emitter;
pub mod projector;
pub mod reconciler;
pub mod resolver;
pub mod workspace;

pub use bundler::DtsBundler;
pub use emitter::TscEmitter;
pub use projector::FlowProjector;
pub use reconciler::{OutputReconciler, ReconcileMode, Reconciliation};
pub use resolver::{EntryResolver, ResolvedEntry};
pub use workspace::Workspace;
