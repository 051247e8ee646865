use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tsflow::config::ColorMode;

/// Generate Flow type definitions from the public types of TypeScript packages
#[derive(Parser, Debug)]
#[command(name = "tsflow")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "Exit status: 0 when every package succeeds, 1 when any package fails \
(including drift in --verify mode), 2 when the run is rejected.")]
pub struct Cli {
    /// Package directories, entry files or module specifiers
    #[arg(required = true, value_name = "PACKAGE")]
    pub packages: Vec<String>,

    /// Directory the .js.flow files are written to (or compared against)
    #[arg(long, value_name = "DIR")]
    pub outdir: PathBuf,

    /// Compare against the files in --outdir instead of writing them
    #[arg(long)]
    pub verify: bool,

    /// Per-stage logs, timings and drift diffs
    #[arg(short, long)]
    pub verbose: bool,

    /// Print NDJSON events instead of human-readable output
    #[arg(long)]
    pub json: bool,

    /// Config file (default: ./tsflow.toml, then the user config)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// When to use colors
    #[arg(long, value_enum, value_name = "WHEN")]
    pub color: Option<ColorWhen>,

    /// Keep the temporary workspace for inspection
    #[arg(long)]
    pub keep_temp: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorWhen {
    Auto,
    Always,
    Never,
}

impl From<ColorWhen> for ColorMode {
    fn from(value: ColorWhen) -> Self {
        match value {
            ColorWhen::Auto => ColorMode::Auto,
            ColorWhen::Always => ColorMode::Always,
            ColorWhen::Never => ColorMode::Never,
        }
    }
}
