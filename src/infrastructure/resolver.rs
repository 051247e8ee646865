//! Entry point resolution
//!
//! Turns a package path from the command line into the package's public
//! name and its `.ts` entry file, following Node-style resolution:
//!
//! 1. The path itself, as a file
//! 2. The path plus each configured extension
//! 3. For directories, each manifest field (`main`, `types`, ...) in order,
//!    tried as a file, with extensions, then as a directory index
//! 4. `<dir>/index` plus each extension
//!
//! Inputs that are not paths are treated as bare module specifiers and
//! looked up in `node_modules`, walking up from the base directory.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tracing::debug;

use crate::domain::value_objects::PackageName;
use crate::error::{TsflowError, TsflowResult};

const MANIFEST_FILE: &str = "package.json";

/// The result of a successful resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEntry {
    pub package_name: PackageName,
    pub entry: PathBuf,
}

#[derive(Debug, Clone)]
pub struct EntryResolver {
    base_dir: PathBuf,
    extensions: Vec<String>,
    main_fields: Vec<String>,
}

impl EntryResolver {
    /// Resolve relative package paths against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            extensions: vec![".ts".to_string(), ".tsx".to_string()],
            main_fields: vec!["main".to_string(), "types".to_string()],
        }
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_main_fields(mut self, main_fields: Vec<String>) -> Self {
        self.main_fields = main_fields;
        self
    }

    /// Resolve one package path
    ///
    /// Fails with `Resolution` when nothing matches, `InvalidEntry` when the
    /// match is not a `.ts` source file and `MissingFile` when it does not
    /// exist (a dangling symlink).
    pub async fn resolve(&self, package_path: &str) -> TsflowResult<ResolvedEntry> {
        let unresolved = || TsflowError::Resolution {
            package_path: package_path.to_string(),
        };

        let root = self.locate(package_path).await.ok_or_else(unresolved)?;
        let root_is_dir = is_dir(&root).await;
        let entry = self.resolve_entry(&root, root_is_dir).await?.ok_or_else(unresolved)?;
        debug!(package_path, entry = %entry.display(), "resolved entry");

        validate_entry(&entry).await?;

        let package_dir = if root_is_dir {
            root.clone()
        } else {
            entry.parent().map(Path::to_path_buf).unwrap_or_default()
        };
        let package_name = derive_package_name(&package_dir).await?;

        Ok(ResolvedEntry {
            package_name,
            entry,
        })
    }

    async fn locate(&self, package_path: &str) -> Option<PathBuf> {
        let candidate = self.base_dir.join(package_path);
        if is_path_like(package_path)
            || exists(&candidate).await
            || self.resolve_file(&candidate).await.is_some()
        {
            return Some(candidate);
        }

        for dir in self.base_dir.ancestors() {
            let module_dir = dir.join("node_modules").join(package_path);
            if exists(&module_dir).await {
                debug!(package_path, found = %module_dir.display(), "resolved module specifier");
                return Some(module_dir);
            }
        }
        None
    }

    async fn resolve_entry(&self, root: &Path, root_is_dir: bool) -> TsflowResult<Option<PathBuf>> {
        if let Some(file) = self.resolve_file(root).await {
            return Ok(Some(file));
        }
        if !root_is_dir {
            return Ok(None);
        }

        if let Some(manifest) = read_manifest(root).await? {
            for field in &self.main_fields {
                let Some(target) = manifest.get(field).and_then(Value::as_str) else {
                    continue;
                };
                let target = root.join(target);
                if let Some(file) = self.resolve_file(&target).await {
                    return Ok(Some(file));
                }
                if let Some(file) = self.resolve_index(&target).await {
                    return Ok(Some(file));
                }
            }
        }

        Ok(self.resolve_index(root).await)
    }

    /// The path itself, then the path with each extension appended
    async fn resolve_file(&self, path: &Path) -> Option<PathBuf> {
        if is_file(path).await {
            return Some(path.to_path_buf());
        }
        for extension in &self.extensions {
            let candidate = with_suffix(path, extension);
            if is_file(&candidate).await {
                return Some(candidate);
            }
        }
        None
    }

    async fn resolve_index(&self, dir: &Path) -> Option<PathBuf> {
        for extension in &self.extensions {
            let candidate = dir.join(format!("index{}", extension));
            if is_file(&candidate).await {
                return Some(candidate);
            }
        }
        None
    }
}

/// The resolved entry must be a `.ts` source file that exists
async fn validate_entry(entry: &Path) -> TsflowResult<()> {
    let name = entry
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    if !name.ends_with(".ts") || name.ends_with(".d.ts") {
        return Err(TsflowError::InvalidEntry {
            path: entry.to_path_buf(),
        });
    }
    if fs::metadata(entry).await.is_err() {
        return Err(TsflowError::MissingFile {
            path: entry.to_path_buf(),
        });
    }
    Ok(())
}

/// Manifest `name`, else the directory's own name
async fn derive_package_name(package_dir: &Path) -> TsflowResult<PackageName> {
    if let Some(manifest) = read_manifest(package_dir).await? {
        if let Some(name) = manifest.get("name").and_then(Value::as_str) {
            return PackageName::new(name).map_err(|e| TsflowError::Manifest {
                path: package_dir.join(MANIFEST_FILE),
                message: e.to_string(),
            });
        }
    }

    let dir = fs::canonicalize(package_dir)
        .await
        .unwrap_or_else(|_| package_dir.to_path_buf());
    let dir_name = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    PackageName::new(dir_name.as_str()).map_err(|e| TsflowError::Manifest {
        path: dir.clone(),
        message: format!("cannot derive a package name from '{}': {}", dir_name, e),
    })
}

async fn read_manifest(dir: &Path) -> TsflowResult<Option<serde_json::Map<String, Value>>> {
    let path = dir.join(MANIFEST_FILE);
    let content = match fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(TsflowError::io(path, e)),
    };
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(_) => Err(TsflowError::Manifest {
            path,
            message: "expected a JSON object".to_string(),
        }),
        Err(e) => Err(TsflowError::Manifest {
            path,
            message: e.to_string(),
        }),
    }
}

fn is_path_like(package_path: &str) -> bool {
    package_path.starts_with('.')
        || Path::new(package_path).is_absolute()
        || package_path.contains('\\')
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(suffix);
    PathBuf::from(raw)
}

async fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).await.is_ok()
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.map(|m| m.is_dir()).unwrap_or(false)
}

/// Regular files, and symlinks that do not point at a directory (including
/// dangling ones, so they surface as `MissingFile` rather than vanish)
async fn is_file(path: &Path) -> bool {
    match fs::symlink_metadata(path).await {
        Ok(meta) if meta.file_type().is_symlink() => match fs::metadata(path).await {
            Ok(target) => target.is_file(),
            Err(_) => true,
        },
        Ok(meta) => meta.is_file(),
        Err(_) => false,
    }
}
