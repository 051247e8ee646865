//! DeclarationBundler port - collapses a declaration graph into one file

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::PackageName;
use crate::error::BundleError;

/// Implementations:
/// - `DtsBundler` - follows relative specifiers and wraps each file in a
///   `declare module` block
pub trait DeclarationBundler: Send + Sync {
    /// Bundle everything reachable from `declaration`
    ///
    /// Writes the bundle to [`bundle_path`], removes the intermediate
    /// declaration files it consumed, and returns the bundle's path.
    fn bundle(
        &self,
        package: &PackageName,
        declaration: &Path,
    ) -> impl Future<Output = Result<PathBuf, BundleError>> + Send;
}

/// `<workspace root>/<package file stem>.d.ts`: a sibling of the package's
/// own workspace directory, which holds `declaration`
pub fn bundle_path(package: &PackageName, declaration: &Path) -> PathBuf {
    let package_dir = declaration.parent().unwrap_or_else(|| Path::new(""));
    let root = package_dir.parent().unwrap_or(package_dir);
    root.join(format!("{}.d.ts", package.file_stem()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_lands_next_to_package_directory() {
        let package = PackageName::new("@acme/widgets").unwrap();
        assert_eq!(
            bundle_path(&package, Path::new("/tmp/ws/acme-widgets/index.d.ts")),
            PathBuf::from("/tmp/ws/acme-widgets.d.ts")
        );
    }
}
