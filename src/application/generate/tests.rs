//! Generate Use Case Tests

use super::*;
use crate::domain::ports::{declaration_path, DeclarationEmitter, Emission};
use crate::domain::value_objects::{PackageName, Stage};
use crate::error::{EmissionError, ErrorKind, TsflowError};
use crate::infrastructure::{DtsBundler, EntryResolver, FlowProjector, Reconciliation, Workspace};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::{tempdir, TempDir};

const SOURCE: &str = "export declare const value: number;\n";
const MODULE: &str = "declare module \"alpha\" {\n  declare export const value: number;\n}";

/// Stands in for `tsc`: copies the entry to where the declaration belongs
#[derive(Default)]
struct CopyEmitter {
    calls: Arc<AtomicUsize>,
    delay: Option<Duration>,
    fail: HashSet<String>,
    panic_on: HashSet<String>,
}

impl CopyEmitter {
    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn failing(mut self, name: &str) -> Self {
        self.fail.insert(name.to_string());
        self
    }

    fn panicking(mut self, name: &str) -> Self {
        self.panic_on.insert(name.to_string());
        self
    }
}

impl DeclarationEmitter for CopyEmitter {
    async fn emit(
        &self,
        package: &PackageName,
        entry: &Path,
        out_dir: &Path,
    ) -> Result<Emission, EmissionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.panic_on.contains(package.as_str()) {
            panic!("emitter blew up for {}", package);
        }

        let artifact = declaration_path(entry, out_dir);
        if self.fail.contains(package.as_str()) {
            return Err(EmissionError::MissingArtifact {
                artifact,
                exit_code: Some(2),
                diagnostics: "error TS2307: Cannot find module".to_string(),
            });
        }

        fs::create_dir_all(out_dir).unwrap();
        fs::copy(entry, &artifact).unwrap();
        Ok(Emission {
            exit_code: Some(0),
            artifact,
            diagnostics: String::new(),
        })
    }
}

struct Fixture {
    root: TempDir,
    workspace: Workspace,
}

impl Fixture {
    fn new() -> Self {
        let root = tempdir().unwrap();
        let workspace = Workspace::create(Some(root.path()), false).unwrap();
        Self { root, workspace }
    }

    fn package(&self, dir: &str, file: &str, content: &str) {
        let path = self.root.path().join(dir).join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn out_dir(&self) -> PathBuf {
        self.root.path().join("flow-typed")
    }

    fn options(&self) -> PipelineOptions {
        PipelineOptions::new(self.out_dir())
    }

    fn use_case(
        &self,
        emitter: CopyEmitter,
    ) -> Arc<GenerateUseCase<CopyEmitter, DtsBundler, FlowProjector>> {
        Arc::new(GenerateUseCase::new(
            EntryResolver::new(self.root.path()),
            emitter,
            DtsBundler::new(),
            FlowProjector::new(),
        ))
    }

    async fn run(
        &self,
        emitter: CopyEmitter,
        paths: &[&str],
        options: PipelineOptions,
    ) -> GenerateReport {
        self.use_case(emitter)
            .execute(
                paths.iter().map(|p| p.to_string()).collect(),
                &self.workspace,
                options,
            )
            .await
            .unwrap()
    }
}

fn failure(outcome: &PackageOutcome) -> &PackageFailure {
    match &outcome.result {
        Err(failure) => failure,
        Ok(generated) => panic!("{} unexpectedly succeeded: {:?}", outcome.package_path, generated),
    }
}

#[tokio::test]
async fn writes_flow_file_for_a_package() {
    let fixture = Fixture::new();
    fixture.package("pkgs/alpha", "index.ts", SOURCE);

    let report = fixture
        .run(CopyEmitter::default(), &["pkgs/alpha"], fixture.options())
        .await;

    assert!(report.is_success());
    let outcome = &report.outcomes[0];
    assert_eq!(outcome.label(), "alpha");
    let generated = outcome.result.as_ref().unwrap();
    assert_eq!(generated.reconciliation, Reconciliation::Written);
    assert_eq!(generated.output, fixture.out_dir().join("alpha.js.flow"));

    let content = fs::read_to_string(&generated.output).unwrap();
    assert!(content.starts_with("/**\n * Flow type definitions for alpha\n"));
    assert!(content.contains(MODULE), "{}", content);
}

#[tokio::test]
async fn verify_after_write_succeeds_without_touching_output() {
    let fixture = Fixture::new();
    fixture.package("pkgs/alpha", "index.ts", SOURCE);
    fixture
        .run(CopyEmitter::default(), &["pkgs/alpha"], fixture.options())
        .await;

    let output = fixture.out_dir().join("alpha.js.flow");
    let before = fs::metadata(&output).unwrap().modified().unwrap();

    let report = fixture
        .run(
            CopyEmitter::default(),
            &["pkgs/alpha"],
            fixture.options().with_verify(true),
        )
        .await;

    assert!(report.is_success());
    let generated = report.outcomes[0].result.as_ref().unwrap();
    assert_eq!(generated.reconciliation, Reconciliation::Verified);
    assert_eq!(fs::metadata(&output).unwrap().modified().unwrap(), before);
}

#[tokio::test]
async fn verify_reports_drift_and_leaves_file_alone() {
    let fixture = Fixture::new();
    fixture.package("pkgs/alpha", "index.ts", SOURCE);
    let output = fixture.out_dir().join("alpha.js.flow");
    fs::create_dir_all(fixture.out_dir()).unwrap();
    fs::write(&output, "// stale\n").unwrap();

    let report = fixture
        .run(
            CopyEmitter::default(),
            &["pkgs/alpha"],
            fixture.options().with_verify(true),
        )
        .await;

    assert!(!report.is_success());
    assert_eq!(report.drift_count(), 1);
    let failure = failure(&report.outcomes[0]);
    assert_eq!(failure.stage, Stage::Reconciling);
    assert_eq!(failure.kind(), ErrorKind::Drift);
    assert_eq!(fs::read_to_string(&output).unwrap(), "// stale\n");
}

#[tokio::test]
async fn verify_reports_missing_output_as_drift() {
    let fixture = Fixture::new();
    fixture.package("pkgs/alpha", "index.ts", SOURCE);

    let report = fixture
        .run(
            CopyEmitter::default(),
            &["pkgs/alpha"],
            fixture.options().with_verify(true),
        )
        .await;

    assert_eq!(report.drift_count(), 1);
    assert!(!fixture.out_dir().join("alpha.js.flow").exists());
}

#[tokio::test]
async fn one_failing_package_does_not_stop_the_others() {
    let fixture = Fixture::new();
    fixture.package("pkgs/alpha", "index.ts", SOURCE);
    fixture.package("pkgs/gamma", "index.ts", SOURCE);

    let report = fixture
        .run(
            CopyEmitter::default(),
            &["pkgs/alpha", "pkgs/missing", "pkgs/gamma"],
            fixture.options(),
        )
        .await;

    assert!(!report.is_success());
    let paths: Vec<&str> = report
        .outcomes
        .iter()
        .map(|o| o.package_path.as_str())
        .collect();
    assert_eq!(paths, ["pkgs/alpha", "pkgs/missing", "pkgs/gamma"]);

    assert!(report.outcomes[0].is_success());
    assert!(report.outcomes[2].is_success());
    let failure = failure(&report.outcomes[1]);
    assert_eq!(failure.stage, Stage::Resolving);
    assert_eq!(failure.kind(), ErrorKind::Resolution);
    assert!(report.outcomes[1].package_name.is_none());

    assert!(fixture.out_dir().join("alpha.js.flow").exists());
    assert!(fixture.out_dir().join("gamma.js.flow").exists());
}

#[tokio::test]
async fn non_source_entries_never_reach_the_emitter() {
    let fixture = Fixture::new();
    fixture.package("pkgs/js", "index.js", "module.exports = 1;\n");
    fixture.package("pkgs/dts", "index.d.ts", SOURCE);
    let emitter = CopyEmitter::default();
    let calls = Arc::clone(&emitter.calls);

    let report = fixture
        .run(
            emitter,
            &["pkgs/js/index.js", "pkgs/dts/index.d.ts"],
            fixture.options(),
        )
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    for outcome in &report.outcomes {
        let failure = failure(outcome);
        assert_eq!(failure.stage, Stage::Resolving);
        assert_eq!(failure.kind(), ErrorKind::InvalidEntry);
    }
}

#[tokio::test]
async fn duplicate_package_names_reject_the_run() {
    let fixture = Fixture::new();
    fixture.package("pkgs/alpha", "index.ts", SOURCE);
    fixture.package("vendor/alpha", "index.ts", SOURCE);
    let emitter = CopyEmitter::default();
    let calls = Arc::clone(&emitter.calls);

    let err = fixture
        .use_case(emitter)
        .execute(
            vec!["pkgs/alpha".to_string(), "vendor/alpha".to_string()],
            &fixture.workspace,
            fixture.options(),
        )
        .await
        .unwrap_err();

    match err {
        TsflowError::DuplicatePackage { name, first, second } => {
            assert_eq!(name, "alpha");
            assert_eq!(first, "pkgs/alpha");
            assert_eq!(second, "vendor/alpha");
        }
        other => panic!("expected duplicate package, got {:?}", other),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(!fixture.out_dir().exists());
}

#[tokio::test]
async fn packages_run_concurrently() {
    let fixture = Fixture::new();
    let names = ["a1", "a2", "a3", "a4", "a5"];
    for name in names {
        fixture.package(&format!("pkgs/{}", name), "index.ts", SOURCE);
    }
    let paths: Vec<String> = names.iter().map(|n| format!("pkgs/{}", n)).collect();
    let paths: Vec<&str> = paths.iter().map(String::as_str).collect();

    let started = Instant::now();
    let report = fixture
        .run(
            CopyEmitter::default().with_delay(Duration::from_millis(200)),
            &paths,
            fixture.options(),
        )
        .await;

    assert!(report.is_success());
    assert!(
        started.elapsed() < Duration::from_millis(900),
        "took {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn emitter_failure_is_attributed_to_emit_stage() {
    let fixture = Fixture::new();
    fixture.package("pkgs/alpha", "index.ts", SOURCE);
    fixture.package("pkgs/beta", "index.ts", SOURCE);

    let report = fixture
        .run(
            CopyEmitter::default().failing("beta"),
            &["pkgs/alpha", "pkgs/beta"],
            fixture.options(),
        )
        .await;

    assert!(report.outcomes[0].is_success());
    let failure = failure(&report.outcomes[1]);
    assert_eq!(failure.stage, Stage::Emitting);
    assert_eq!(failure.kind(), ErrorKind::Emission);
    assert!(failure.error.to_string().contains("TS2307"));
    assert!(!fixture.out_dir().join("beta.js.flow").exists());
}

#[tokio::test]
async fn panicking_task_is_isolated() {
    let fixture = Fixture::new();
    fixture.package("pkgs/alpha", "index.ts", SOURCE);
    fixture.package("pkgs/boom", "index.ts", SOURCE);

    let report = fixture
        .run(
            CopyEmitter::default().panicking("boom"),
            &["pkgs/boom", "pkgs/alpha"],
            fixture.options(),
        )
        .await;

    assert_eq!(report.outcomes.len(), 2);
    let failure = failure(&report.outcomes[0]);
    assert_eq!(failure.kind(), ErrorKind::TaskPanicked);
    assert!(failure.error.to_string().contains("emitter blew up for boom"));
    assert!(report.outcomes[1].is_success());
}

#[tokio::test]
async fn empty_input_is_a_successful_run() {
    let fixture = Fixture::new();
    let report = fixture
        .run(CopyEmitter::default(), &[], fixture.options())
        .await;
    assert!(report.outcomes.is_empty());
    assert!(report.is_success());
}
