//! Configuration
//!
//! Sources, highest priority first:
//! 1. CLI flags
//! 2. Environment variables (TSFLOW_*)
//! 3. `--config <file>`, or `./tsflow.toml`
//! 4. User config (`~/.config/tsflow/config.toml`)
//! 5. Built-in defaults

mod env_validator;
mod loader;
mod types;

pub use env_validator::{closest, levenshtein, EnvVarValidator};
pub use loader::{
    user_config_path, with_env_overrides_from, ConfigWarning, PROJECT_CONFIG_FILE,
};
pub use types::{ColorMode, Config, EmitterConfig, OutputConfig, ResolveConfig, WorkspaceConfig};
