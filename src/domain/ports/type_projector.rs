//! TypeProjector port - declaration text in, target type syntax out

use std::path::Path;

use crate::error::ProjectionError;

/// Pure text-to-text transformation; callers decide whether the result is
/// written or compared.
///
/// Implementations:
/// - `FlowProjector` - TypeScript declarations to Flow
pub trait TypeProjector: Send + Sync {
    /// Project `source`, read from `origin` (used for diagnostics and the
    /// output header)
    fn project(&self, source: &str, origin: &Path) -> Result<String, ProjectionError>;

    /// Extension of produced files, without the leading dot
    fn extension(&self) -> &str;
}
