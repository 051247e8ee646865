//! Package Name Value Object
//!
//! The public module name of a package (`widgets`, `@acme/widgets`) and the
//! filesystem-safe stem derived from it. Stems partition the shared
//! workspace and output directory, so two packages may never share one.

use std::fmt;

/// Error when a package name fails validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageNameError {
    /// Name is empty or whitespace
    Empty,
    /// Name contains characters that cannot appear in a file name
    InvalidCharacter(char),
    /// Name contains `.` or `..` path segments
    DotSegment,
    /// Name has a `/` without being a well-formed `@scope/name`
    MalformedScope,
}

impl fmt::Display for PackageNameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageNameError::Empty => write!(f, "package name is empty"),
            PackageNameError::InvalidCharacter(c) => {
                write!(f, "package name contains invalid character '{}'", c)
            }
            PackageNameError::DotSegment => {
                write!(f, "package name must not be '.' or '..'")
            }
            PackageNameError::MalformedScope => {
                write!(f, "scoped package names must look like '@scope/name'")
            }
        }
    }
}

impl std::error::Error for PackageNameError {}

/// A validated package name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageName(String);

impl PackageName {
    /// Create a new PackageName after validation
    pub fn new(name: impl Into<String>) -> Result<Self, PackageNameError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(PackageNameError::Empty);
        }

        if let Some(c) = trimmed
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || matches!(c, '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        {
            return Err(PackageNameError::InvalidCharacter(c));
        }

        let segments: Vec<&str> = trimmed.split('/').collect();
        match segments.as_slice() {
            [single] => {
                if single.starts_with('@') && single.len() > 1 {
                    return Err(PackageNameError::MalformedScope);
                }
            }
            [scope, rest] => {
                let scope_ok = scope.len() > 1 && scope.starts_with('@');
                if !scope_ok || rest.is_empty() || rest.starts_with('@') {
                    return Err(PackageNameError::MalformedScope);
                }
            }
            _ => return Err(PackageNameError::MalformedScope),
        }

        if segments
            .iter()
            .any(|s| *s == "." || *s == ".." || s.trim_start_matches('@').is_empty())
        {
            return Err(PackageNameError::DotSegment);
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The declared module name, as consumers import it
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File-name-safe stem: `@acme/widgets` becomes `acme-widgets`
    pub fn file_stem(&self) -> String {
        self.0.trim_start_matches('@').replace('/', "-")
    }

    pub fn is_scoped(&self) -> bool {
        self.0.starts_with('@')
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
