//! tsflow CLI - generate Flow type definitions from TypeScript packages
//!
//! Usage: tsflow <PACKAGE>... --outdir <DIR> [--verify] [--verbose] [--json]

mod cli;
mod ui;

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tsflow::application::{GenerateReport, GenerateUseCase, PipelineOptions};
use tsflow::config::Config;
use tsflow::error::TsflowError;
use tsflow::infrastructure::{DtsBundler, EntryResolver, FlowProjector, TscEmitter, Workspace};

use crate::cli::Cli;
use crate::ui::context::UiContext;
use crate::ui::primitives::icon::Icon;
use crate::ui::json::emit_event;
use crate::ui::json::events::{CompleteEvent, ErrorEvent, PackageEvent, StartEvent};
use crate::ui::output::print_config_warnings;
use crate::ui::views::generate as view;

/// Every package succeeded
const EXIT_SUCCESS: u8 = 0;
/// At least one package failed, drift included
const EXIT_FAILURE: u8 = 1;
/// The run was rejected before any package ran
const EXIT_REJECTED: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(EXIT_REJECTED)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "tsflow=debug" } else { "tsflow=warn" };
    let filter =
        EnvFilter::try_from_env("TSFLOW_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<u8> {
    let command = if cli.verify { "verify" } else { "generate" };
    let cwd = std::env::current_dir().context("read current directory")?;

    let (config, warnings) = match Config::discover(cli.config.as_deref(), &cwd) {
        Ok(loaded) => loaded,
        Err(e) => {
            let defaults = Config::default();
            let ui = UiContext::new(cli.json, cli.verbose, cli.color.map(Into::into), &defaults);
            return reject(&ui, command, &e);
        }
    };
    let ui = UiContext::new(cli.json, cli.verbose, cli.color.map(Into::into), &config);
    print_config_warnings(&ui, &warnings);

    let workspace = match Workspace::create(
        config.workspace.root.as_deref(),
        cli.keep_temp || config.workspace.keep,
    ) {
        Ok(workspace) => workspace,
        Err(e) => return reject(&ui, command, &e),
    };

    let options = PipelineOptions::new(cli.outdir.clone())
        .with_verbose(cli.verbose)
        .with_verify(cli.verify);

    let use_case = Arc::new(GenerateUseCase::new(
        EntryResolver::new(&cwd)
            .with_extensions(config.resolve.extensions.clone())
            .with_main_fields(config.resolve.main_fields.clone()),
        TscEmitter::from_config(&config.emitter),
        DtsBundler::new().with_keep_intermediates(workspace.keeps_files()),
        FlowProjector::new().with_extension(config.output.extension.clone()),
    ));

    if ui.json {
        emit_event(&StartEvent::new(command, cli.packages.len()))?;
    } else {
        print!("{}", view::render_header(&ui, cli.verify, &cli.outdir, cli.packages.len()));
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    let result = runtime.block_on(use_case.execute(cli.packages, &workspace, options));

    if let Some(kept) = workspace.finish() {
        if ui.verbose && !ui.json {
            eprintln!("Workspace kept at {}", kept.display());
        }
    }

    match result {
        Ok(report) => {
            render_report(&ui, command, &report, cli.verify)?;
            Ok(if report.is_success() {
                EXIT_SUCCESS
            } else {
                EXIT_FAILURE
            })
        }
        Err(e) => reject(&ui, command, &e),
    }
}

fn render_report(
    ui: &UiContext,
    command: &str,
    report: &GenerateReport,
    verify: bool,
) -> anyhow::Result<()> {
    if ui.json {
        for outcome in &report.outcomes {
            emit_event(&PackageEvent::from_outcome(outcome))?;
        }
        emit_event(&CompleteEvent::from_report(command, report))?;
        return Ok(());
    }

    let mut out = std::io::stdout().lock();
    for outcome in &report.outcomes {
        write!(out, "{}", view::render_outcome(ui, outcome))?;
        if ui.annotate() {
            if let Some(annotation) = view::annotation(outcome) {
                writeln!(out, "{}", annotation)?;
            }
        }
    }
    writeln!(out)?;
    write!(out, "{}", view::render_summary(ui, report, verify))?;
    Ok(())
}

/// Report an invocation-level error; no package ran
fn reject(ui: &UiContext, command: &str, error: &TsflowError) -> anyhow::Result<u8> {
    if ui.json {
        emit_event(&ErrorEvent::new(command, error))?;
    } else {
        eprintln!("{} {}", Icon::Error.colored(ui.color, ui.unicode), error);
    }
    Ok(EXIT_REJECTED)
}
