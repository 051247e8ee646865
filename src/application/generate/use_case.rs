//! Generate Use Case
//!
//! 1. Resolve every input concurrently
//! 2. Reject the run if two inputs share a package file stem
//! 3. Spawn one task per resolved package: emit, bundle, project, reconcile
//! 4. Collect outcomes in input order
//!
//! A failing or panicking task never affects its siblings; the run only
//! decides success once every task has reached a terminal state.

use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info};

use crate::domain::entities::PackageTask;
use crate::domain::ports::{DeclarationBundler, DeclarationEmitter, TypeProjector};
use crate::domain::value_objects::{PackageName, Stage};
use crate::error::{TsflowError, TsflowResult};
use crate::infrastructure::{EntryResolver, OutputReconciler, Reconciliation, ResolvedEntry, Workspace};

use super::options::PipelineOptions;
use super::result::{GenerateReport, GeneratedPackage, PackageFailure, PackageOutcome};

/// Pipeline orchestration, parameterized by its ports
pub struct GenerateUseCase<E, B, P>
where
    E: DeclarationEmitter,
    B: DeclarationBundler,
    P: TypeProjector,
{
    resolver: EntryResolver,
    emitter: E,
    bundler: B,
    projector: P,
}

impl<E, B, P> GenerateUseCase<E, B, P>
where
    E: DeclarationEmitter + 'static,
    B: DeclarationBundler + 'static,
    P: TypeProjector + 'static,
{
    pub fn new(resolver: EntryResolver, emitter: E, bundler: B, projector: P) -> Self {
        Self {
            resolver,
            emitter,
            bundler,
            projector,
        }
    }

    /// Run every package to a terminal state
    ///
    /// Only invocation-level problems (duplicate package names) are returned
    /// as `Err`; package failures are outcomes in the report.
    pub async fn execute(
        self: Arc<Self>,
        package_paths: Vec<String>,
        workspace: &Workspace,
        options: PipelineOptions,
    ) -> TsflowResult<GenerateReport> {
        let started = Instant::now();
        let options = Arc::new(options);

        let resolutions = self.resolve_all(&package_paths).await;
        check_duplicates(&resolutions)?;

        let mut pending: Vec<Pending> = Vec::with_capacity(resolutions.len());
        for (package_path, resolution) in resolutions {
            match resolution {
                Ok(resolved) => {
                    let task = PackageTask::resolved(
                        package_path.clone(),
                        resolved.package_name.clone(),
                        resolved.entry,
                    );
                    let package_dir = workspace.package_dir(task.package_name());
                    let this = Arc::clone(&self);
                    let options = Arc::clone(&options);
                    let handle =
                        tokio::spawn(async move { this.run(task, package_dir, &options).await });
                    pending.push(Pending::Running {
                        package_path,
                        handle,
                        package_name: resolved.package_name,
                    });
                }
                Err(error) => pending.push(Pending::Done(PackageOutcome {
                    package_path,
                    package_name: None,
                    result: Err(PackageFailure {
                        stage: Stage::Resolving,
                        error,
                    }),
                })),
            }
        }

        let mut outcomes = Vec::with_capacity(pending.len());
        for entry in pending {
            let outcome = match entry {
                Pending::Done(outcome) => outcome,
                Pending::Running {
                    package_path,
                    package_name,
                    handle,
                } => match handle.await {
                    Ok(outcome) => outcome,
                    Err(join_error) => PackageOutcome {
                        result: Err(PackageFailure {
                            stage: Stage::Emitting,
                            error: TsflowError::TaskPanicked {
                                package_path: package_path.clone(),
                                message: panic_message(join_error),
                            },
                        }),
                        package_path,
                        package_name: Some(package_name),
                    },
                },
            };
            outcomes.push(outcome);
        }

        Ok(GenerateReport {
            outcomes,
            elapsed: started.elapsed(),
        })
    }

    async fn resolve_all(
        self: &Arc<Self>,
        package_paths: &[String],
    ) -> Vec<(String, TsflowResult<ResolvedEntry>)> {
        let handles: Vec<(String, JoinHandle<TsflowResult<ResolvedEntry>>)> = package_paths
            .iter()
            .map(|package_path| {
                let this = Arc::clone(self);
                let path = package_path.clone();
                (
                    package_path.clone(),
                    tokio::spawn(async move { this.resolver.resolve(&path).await }),
                )
            })
            .collect();

        let mut resolutions = Vec::with_capacity(handles.len());
        for (package_path, handle) in handles {
            let resolution = handle.await.unwrap_or_else(|join_error| {
                Err(TsflowError::TaskPanicked {
                    package_path: package_path.clone(),
                    message: panic_message(join_error),
                })
            });
            resolutions.push((package_path, resolution));
        }
        resolutions
    }

    async fn run(
        &self,
        mut task: PackageTask,
        package_dir: PathBuf,
        options: &PipelineOptions,
    ) -> PackageOutcome {
        let started = Instant::now();
        let result = self.generate(&mut task, &package_dir, options).await;

        let result = match result {
            Ok(reconciliation) => {
                let elapsed = started.elapsed();
                if options.verbose {
                    info!(
                        package = %task.package_name(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "{}",
                        reconciliation.as_str()
                    );
                }
                Ok(GeneratedPackage {
                    output: task
                        .output_filepath()
                        .map(Path::to_path_buf)
                        .unwrap_or_default(),
                    reconciliation,
                    elapsed,
                })
            }
            Err(error) => {
                debug!(
                    package = %task.package_name(),
                    stage = %task.stage(),
                    error = %error,
                    "package failed"
                );
                Err(PackageFailure {
                    stage: task.stage(),
                    error,
                })
            }
        };

        PackageOutcome {
            package_path: task.package_path().to_string(),
            package_name: Some(task.package_name().clone()),
            result,
        }
    }

    async fn generate(
        &self,
        task: &mut PackageTask,
        package_dir: &Path,
        options: &PipelineOptions,
    ) -> TsflowResult<Reconciliation> {
        let package = task.package_name().clone();

        debug!(package = %package, stage = "emit", entry = %task.entry_filepath().display());
        let emission = self
            .emitter
            .emit(&package, task.entry_filepath(), package_dir)
            .await?;
        task.record_declaration(emission.artifact);

        let declaration = task.decl_filepath().map(Path::to_path_buf).unwrap_or_default();
        debug!(package = %package, stage = "bundle", declaration = %declaration.display());
        let bundle = self.bundler.bundle(&package, &declaration).await?;
        task.record_bundle(bundle.clone());

        debug!(package = %package, stage = "project", bundle = %bundle.display());
        let source = tokio::fs::read_to_string(&bundle)
            .await
            .map_err(|e| TsflowError::io(&bundle, e))?;
        let projected = self.projector.project(&source, &bundle)?;
        let output = options.out_dir.join(format!(
            "{}.{}",
            package.file_stem(),
            self.projector.extension()
        ));
        task.record_output(output.clone());

        debug!(package = %package, stage = "reconcile", output = %output.display());
        let reconciliation = OutputReconciler::new(options.reconcile_mode())
            .reconcile(&output, &projected)
            .await?;
        task.finish();

        Ok(reconciliation)
    }
}

enum Pending {
    Done(PackageOutcome),
    Running {
        package_path: String,
        package_name: PackageName,
        handle: JoinHandle<PackageOutcome>,
    },
}

/// Two inputs that would share `<workspace>/<stem>` and `<out>/<stem>.<ext>`
fn check_duplicates(resolutions: &[(String, TsflowResult<ResolvedEntry>)]) -> TsflowResult<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for (package_path, resolution) in resolutions {
        let Ok(resolved) = resolution else { continue };
        let stem = resolved.package_name.file_stem();
        if let Some(first) = seen.insert(stem.clone(), package_path) {
            return Err(TsflowError::DuplicatePackage {
                name: resolved.package_name.to_string(),
                first: first.to_string(),
                second: package_path.clone(),
            });
        }
    }
    Ok(())
}

fn panic_message(error: JoinError) -> String {
    if error.is_cancelled() {
        return "task was cancelled".to_string();
    }
    let payload: Box<dyn Any + Send> = match error.try_into_panic() {
        Ok(payload) => payload,
        Err(_) => return "task failed".to_string(),
    };
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
