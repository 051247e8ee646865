//! Configuration loading

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{TsflowError, TsflowResult};

use super::env_validator::{closest, EnvVarValidator};
use super::types::{ColorMode, Config};

/// Project configuration file, looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = "tsflow.toml";

const KNOWN_KEYS: &[&str] = &[
    "emitter",
    "program",
    "args",
    "extra_args",
    "timeout_secs",
    "resolve",
    "extensions",
    "main_fields",
    "output",
    "extension",
    "color",
    "unicode",
    "workspace",
    "root",
    "keep",
];

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown config key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{}", line)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, " (did you mean '{}'?)", suggestion)?;
        }
        Ok(())
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> TsflowResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path).map_err(|e| TsflowError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| TsflowError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                line: find_line_number(&content, &key),
                suggestion: closest(&key, KNOWN_KEYS).map(str::to_string),
                file: path.to_path_buf(),
                key,
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Explicit file, project file, user file or defaults; then env overrides
///
/// An explicit path that cannot be loaded is an error. The project and user
/// files are only consulted when they exist, but once found they must parse.
pub fn discover(
    explicit: Option<&Path>,
    project_root: &Path,
) -> TsflowResult<(Config, Vec<ConfigWarning>)> {
    let (config, warnings) = match find_config_file(explicit, project_root) {
        Some(path) => load_with_warnings(&path)?,
        None => (Config::default(), Vec::new()),
    };
    Ok((with_env_overrides(config), warnings))
}

fn find_config_file(explicit: Option<&Path>, project_root: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let project_config = project_root.join(PROJECT_CONFIG_FILE);
    if project_config.is_file() {
        return Some(project_config);
    }

    user_config_path().filter(|path| path.is_file())
}

/// `$XDG_CONFIG_HOME/tsflow/config.toml`, falling back to the platform config dir
pub fn user_config_path() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::config_dir)
        .map(|dir| dir.join("tsflow").join("config.toml"))
}

/// Apply environment variable overrides (TSFLOW_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    with_env_overrides_from(config, |key| std::env::var(key).ok(), &mut std::io::stderr())
}

/// Apply overrides read through `get`, writing warnings for invalid values to `writer`
pub fn with_env_overrides_from<G, W>(mut config: Config, get: G, writer: &mut W) -> Config
where
    G: Fn(&str) -> Option<String>,
    W: Write,
{
    if let Some(program) = get("TSFLOW_EMITTER_PROGRAM").filter(|v| !v.trim().is_empty()) {
        config.emitter.program = program;
    }

    if let Some(value) = get("TSFLOW_EMIT_TIMEOUT_SECS") {
        let validator = EnvVarValidator::new("TSFLOW_EMIT_TIMEOUT_SECS", &[]);
        if let Some(secs) =
            validator.parse_with_writer(&value, |v| v.trim().parse::<u64>().ok(), writer)
        {
            config.emitter.timeout_secs = Some(secs);
        }
    }

    if let Some(value) = get("TSFLOW_KEEP_TEMP") {
        let validator = EnvVarValidator::new("TSFLOW_KEEP_TEMP", &["true", "false", "1", "0"]);
        if let Some(keep) = validator.parse_with_writer(&value, parse_bool, writer) {
            config.workspace.keep = keep;
        }
    }

    if let Some(value) = get("TSFLOW_OUTPUT_EXTENSION") {
        let extension = value.trim().trim_start_matches('.');
        if !extension.is_empty() {
            config.output.extension = extension.to_string();
        }
    }

    if let Some(value) = get("TSFLOW_COLOR") {
        let validator = EnvVarValidator::new("TSFLOW_COLOR", &["auto", "always", "never"]);
        if let Some(mode) = validator.parse_with_writer(&value, ColorMode::parse, writer) {
            config.output.color = mode;
        }
    }

    config
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}
