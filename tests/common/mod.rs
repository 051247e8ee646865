//! Common test utilities for tsflow CLI tests.
//!
//! `TestEnv` is an isolated project directory with a stand-in declaration
//! compiler: a POSIX shell script that copies `<entry>.ts` to
//! `<outDir>/<entry>.d.ts` and logs every invocation.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Copies the entry verbatim, which is valid declaration syntax as long as
/// the fixture only uses `declare` statements, along with any `.d.ts` files
/// next to it. Entries whose path contains `broken` fail like a type error.
const FAKE_TSC: &str = r#"#!/bin/sh
echo "$@" >> "$(dirname "$0")/tsc.log"
case "$3" in
  *broken*)
    echo "error TS2307: Cannot find module './gone'" >&2
    exit 2
    ;;
esac
mkdir -p "$5"
cp "$3" "$5/$(basename "$3" .ts).d.ts"
for f in "$(dirname "$3")"/*.d.ts; do
  [ -e "$f" ] && cp "$f" "$5/"
done
exit 0
"#;

pub const VALUE_SOURCE: &str = "export declare const value: number;\n";

#[derive(Debug)]
pub struct TestResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }
}

pub struct TestEnv {
    pub project_root: TempDir,
    config_home: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let env = Self {
            project_root: tempfile::tempdir().unwrap(),
            config_home: tempfile::tempdir().unwrap(),
        };
        let script = env.path("tools/fake-tsc.sh");
        env.write("tools/fake-tsc.sh", FAKE_TSC);
        env.write(
            "tsflow.toml",
            &format!(
                "[emitter]\nprogram = \"sh\"\nargs = [\"{}\"]\ntimeout_secs = 30\n",
                script.display()
            ),
        );
        env
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.path(relative)).unwrap()
    }

    /// `pkgs/<name>/index.ts` exporting `value`
    pub fn package(&self, name: &str) {
        self.write(&format!("pkgs/{}/index.ts", name), VALUE_SOURCE);
    }

    /// Number of times the stand-in compiler ran
    pub fn tsc_calls(&self) -> usize {
        fs::read_to_string(self.path("tools/tsc.log"))
            .map(|log| log.lines().count())
            .unwrap_or(0)
    }

    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tsflow"));
        cmd.current_dir(self.project_root.path())
            .args(args)
            .env("XDG_CONFIG_HOME", self.config_home.path())
            .env("LC_ALL", "C")
            .env("NO_COLOR", "1")
            .env_remove("GITHUB_ACTIONS")
            .env_remove("TSFLOW_LOG")
            .env_remove("TSFLOW_EMITTER_PROGRAM")
            .env_remove("TSFLOW_EMIT_TIMEOUT_SECS")
            .env_remove("TSFLOW_KEEP_TEMP")
            .env_remove("TSFLOW_OUTPUT_EXTENSION")
            .env_remove("TSFLOW_COLOR");
        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("failed to execute tsflow");
        TestResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    pub fn exists(&self, relative: &str) -> bool {
        Path::new(&self.path(relative)).exists()
    }
}
