use std::path::Path;

use tsflow::application::{GenerateReport, PackageOutcome};
use tsflow::error::TsflowError;

use crate::ui::blocks::header::RunHeader;
use crate::ui::blocks::summary::ResultSummary;
use crate::ui::ci::{github_actions_annotation, AnnotationLevel};
use crate::ui::components::diff::render_drift_diff;
use crate::ui::context::UiContext;
use crate::ui::primitives::icon::Icon;
use crate::ui::primitives::text::ColoredText;

pub fn render_header(ui: &UiContext, verify: bool, out_dir: &Path, packages: usize) -> String {
    RunHeader::new(verify, out_dir, packages).render(ui.color, ui.unicode)
}

/// One line per package, followed by the drift diff in verbose mode
pub fn render_outcome(ui: &UiContext, outcome: &PackageOutcome) -> String {
    match &outcome.result {
        Ok(generated) => {
            let mut line = format!(
                "{} {} {} {}",
                Icon::Success.colored(ui.color, ui.unicode),
                outcome.label(),
                Icon::Arrow.colored(ui.color, ui.unicode),
                generated.output.display()
            );
            if ui.verbose {
                line.push_str(
                    &ColoredText::dim(format!(
                        " ({}, {}ms)",
                        generated.reconciliation.as_str(),
                        generated.elapsed.as_millis()
                    ))
                    .render(ui.color),
                );
            }
            line.push('\n');
            line
        }
        Err(failure) => {
            let mut out = format!(
                "{} {} {} {}\n",
                Icon::Error.colored(ui.color, ui.unicode),
                outcome.label(),
                ColoredText::dim(format!("[{}]", failure.stage)).render(ui.color),
                ColoredText::error(failure.error.to_string()).render(ui.color)
            );
            if ui.verbose {
                if let TsflowError::Drift(drift) = &failure.error {
                    out.push_str(&render_drift_diff(
                        &drift.path.display().to_string(),
                        drift.existing.as_deref().unwrap_or_default(),
                        &drift.generated,
                        ui.color,
                    ));
                }
            }
            out
        }
    }
}

pub fn render_summary(ui: &UiContext, report: &GenerateReport, verify: bool) -> String {
    let total = report.outcomes.len();
    let failed = report.failed().count();
    let drifted = report.drift_count();
    let succeeded = total - failed;

    let mut summary = if failed == 0 {
        let verb = if verify { "Verified" } else { "Generated" };
        ResultSummary::success(format!("{} {} {}", verb, total, plural(total)))
    } else {
        ResultSummary::failure(format!("{} of {} {} failed", failed, total, plural(total)))
    };
    summary.add_stat(if verify { "up to date" } else { "written" }, succeeded);
    summary.add_stat("drifted", drifted);
    summary.add_stat("failed", failed - drifted);

    if drifted > 0 {
        summary.with_next_step("run without --verify to regenerate, then commit the result");
    } else if failed > 0 && !ui.verbose {
        summary.with_next_step("rerun with --verbose for per-stage logs");
    }
    summary.render(ui.color, ui.unicode)
}

/// `::error` workflow command for a failed package
pub fn annotation(outcome: &PackageOutcome) -> Option<String> {
    let failure = outcome.result.as_ref().err()?;
    let (file, line) = match &failure.error {
        TsflowError::Drift(drift) => (Some(drift.path.display().to_string()), None),
        TsflowError::Projection(err) => (Some(err.path.display().to_string()), Some(err.line)),
        TsflowError::InvalidEntry { path } | TsflowError::MissingFile { path } => {
            (Some(path.display().to_string()), None)
        }
        _ => (None, None),
    };
    let title = format!("{} ({})", failure.kind().as_str(), outcome.label());
    Some(github_actions_annotation(
        AnnotationLevel::Error,
        &failure.error.to_string(),
        file.as_deref(),
        line,
        Some(&title),
    ))
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "package"
    } else {
        "packages"
    }
}
