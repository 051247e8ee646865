//! Configuration type definitions

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::TsflowResult;

use super::loader::{self, ConfigWarning};

/// External declaration compiler
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmitterConfig {
    #[serde(default = "default_program")]
    pub program: String,

    /// Placed before the generated arguments (`npx tsc ...`)
    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Appended after the generated arguments
    #[serde(default)]
    pub extra_args: Vec<String>,

    /// No timeout when absent
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl EmitterConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            extra_args: Vec::new(),
            timeout_secs: None,
        }
    }
}

fn default_program() -> String {
    if cfg!(windows) {
        "npx.cmd".to_string()
    } else {
        "npx".to_string()
    }
}

fn default_args() -> Vec<String> {
    vec!["tsc".to_string()]
}

/// Entry point resolution
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResolveConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default = "default_main_fields")]
    pub main_fields: Vec<String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            main_fields: default_main_fields(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec![".ts".to_string(), ".tsx".to_string()]
}

fn default_main_fields() -> Vec<String> {
    vec!["main".to_string(), "types".to_string()]
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputConfig {
    /// Extension of generated files, without the leading dot
    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default)]
    pub color: ColorMode,

    #[serde(default = "default_true")]
    pub unicode: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            color: ColorMode::default(),
            unicode: true,
        }
    }
}

fn default_extension() -> String {
    "js.flow".to_string()
}

fn default_true() -> bool {
    true
}

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "auto" => Some(ColorMode::Auto),
            "always" => Some(ColorMode::Always),
            "never" => Some(ColorMode::Never),
            _ => None,
        }
    }
}

/// Run-scoped temporary workspace
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct WorkspaceConfig {
    /// Parent of the run's temporary root; the system temp dir when absent
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Leave intermediate files on disk after the run
    #[serde(default)]
    pub keep: bool,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub emitter: EmitterConfig,

    #[serde(default)]
    pub resolve: ResolveConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> TsflowResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> TsflowResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Explicit file, project file, user file or defaults; then env overrides
    pub fn discover(
        explicit: Option<&Path>,
        project_root: &Path,
    ) -> TsflowResult<(Self, Vec<ConfigWarning>)> {
        loader::discover(explicit, project_root)
    }

    /// Apply environment variable overrides (TSFLOW_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }
}
