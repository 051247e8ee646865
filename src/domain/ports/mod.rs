//! Domain Ports (Interfaces)
//!
//! The three pipeline stages that can be swapped out. Entry resolution and
//! output reconciliation are plain filesystem work and have no port.
//!
//! Emission and bundling suspend on I/O, so they return futures; the
//! futures must be `Send` because every package runs as its own task.

pub mod declaration_bundler;
pub mod declaration_emitter;
pub mod type_projector;

pub use declaration_bundler::{bundle_path, DeclarationBundler};
pub use declaration_emitter::{declaration_path, DeclarationEmitter, Emission};
pub use type_projector::TypeProjector;
