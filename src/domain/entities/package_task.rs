//! PackageTask entity - one input package on its way through the pipeline
//!
//! A task is created once its entry point is resolved and then records the
//! artifact each later stage produces. Every field is written exactly once,
//! and only by the stage that owns it.

use std::path::{Path, PathBuf};

use crate::domain::value_objects::{PackageName, Stage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageTask {
    /// Path (or module specifier) exactly as given on the command line
    package_path: String,
    package_name: PackageName,
    entry_filepath: PathBuf,
    decl_filepath: Option<PathBuf>,
    bundled_decl_filepath: Option<PathBuf>,
    output_filepath: Option<PathBuf>,
    stage: Stage,
}

impl PackageTask {
    /// Create a task whose resolution has completed
    pub fn resolved(
        package_path: impl Into<String>,
        package_name: PackageName,
        entry_filepath: impl Into<PathBuf>,
    ) -> Self {
        Self {
            package_path: package_path.into(),
            package_name,
            entry_filepath: entry_filepath.into(),
            decl_filepath: None,
            bundled_decl_filepath: None,
            output_filepath: None,
            stage: Stage::Emitting,
        }
    }

    pub fn package_path(&self) -> &str {
        &self.package_path
    }

    pub fn package_name(&self) -> &PackageName {
        &self.package_name
    }

    pub fn entry_filepath(&self) -> &Path {
        &self.entry_filepath
    }

    pub fn decl_filepath(&self) -> Option<&Path> {
        self.decl_filepath.as_deref()
    }

    pub fn bundled_decl_filepath(&self) -> Option<&Path> {
        self.bundled_decl_filepath.as_deref()
    }

    pub fn output_filepath(&self) -> Option<&Path> {
        self.output_filepath.as_deref()
    }

    /// The stage currently running (or `Done`)
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Emission finished: record the primary declaration file
    pub fn record_declaration(&mut self, path: PathBuf) {
        self.expect_stage(Stage::Emitting);
        self.decl_filepath = Some(path);
        self.advance();
    }

    /// Bundling finished: record the single bundled declaration file
    pub fn record_bundle(&mut self, path: PathBuf) {
        self.expect_stage(Stage::Bundling);
        self.bundled_decl_filepath = Some(path);
        self.advance();
    }

    /// Projection finished: record where the output belongs
    pub fn record_output(&mut self, path: PathBuf) {
        self.expect_stage(Stage::Projecting);
        self.output_filepath = Some(path);
        self.advance();
    }

    /// Reconciliation finished
    pub fn finish(&mut self) {
        self.expect_stage(Stage::Reconciling);
        self.advance();
    }

    fn expect_stage(&self, expected: Stage) {
        debug_assert_eq!(
            self.stage, expected,
            "{} recorded out of order",
            self.package_name
        );
    }

    fn advance(&mut self) {
        if let Some(next) = self.stage.next() {
            self.stage = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task() -> PackageTask {
        PackageTask::resolved(
            "packages/widgets",
            PackageName::new("widgets").unwrap(),
            "/repo/packages/widgets/index.ts",
        )
    }

    #[test]
    fn new_task_starts_emitting() {
        let task = task();
        assert_eq!(task.stage(), Stage::Emitting);
        assert_eq!(task.package_path(), "packages/widgets");
        assert!(task.decl_filepath().is_none());
        assert!(task.output_filepath().is_none());
    }

    #[test]
    fn each_record_advances_one_stage() {
        let mut task = task();
        task.record_declaration(PathBuf::from("/tmp/ws/widgets/index.d.ts"));
        assert_eq!(task.stage(), Stage::Bundling);
        task.record_bundle(PathBuf::from("/tmp/ws/widgets.d.ts"));
        assert_eq!(task.stage(), Stage::Projecting);
        task.record_output(PathBuf::from("flow-typed/widgets.js.flow"));
        assert_eq!(task.stage(), Stage::Reconciling);
        task.finish();
        assert_eq!(task.stage(), Stage::Done);

        assert_eq!(
            task.bundled_decl_filepath(),
            Some(Path::new("/tmp/ws/widgets.d.ts"))
        );
        assert_eq!(
            task.output_filepath(),
            Some(Path::new("flow-typed/widgets.js.flow"))
        );
    }

    #[test]
    #[should_panic(expected = "recorded out of order")]
    #[cfg(debug_assertions)]
    fn recording_out_of_order_panics_in_debug() {
        let mut task = task();
        task.record_bundle(PathBuf::from("/tmp/ws/widgets.d.ts"));
    }
}
