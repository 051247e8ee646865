#![cfg(unix)]

mod common;

use std::fs;

use common::TestEnv;

fn generated(env: &TestEnv, names: &[&str]) {
    for name in names {
        env.package(name);
    }
    let mut args: Vec<String> = names.iter().map(|n| format!("pkgs/{}", n)).collect();
    args.extend(["--outdir".to_string(), "flow-typed".to_string()]);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let result = env.run(&args);
    assert_eq!(result.exit_code, 0, "{}", result.combined_output());
}

#[test]
fn test_verify_after_write_succeeds_without_writing() {
    let env = TestEnv::new();
    generated(&env, &["alpha"]);
    let output = env.path("flow-typed/alpha.js.flow");
    let before = fs::metadata(&output).unwrap().modified().unwrap();

    let result = env.run(&["pkgs/alpha", "--outdir", "flow-typed", "--verify"]);

    assert_eq!(result.exit_code, 0, "{}", result.combined_output());
    assert!(result.stdout.contains("[VERIFY] tsflow verify"));
    assert!(result.stdout.contains("[OK] Verified 1 package"));
    assert_eq!(fs::metadata(&output).unwrap().modified().unwrap(), before);
}

#[test]
fn test_verify_detects_changed_source() {
    let env = TestEnv::new();
    generated(&env, &["alpha"]);
    let committed = env.read("flow-typed/alpha.js.flow");
    env.write("pkgs/alpha/index.ts", "export declare const value: string;\n");

    let result = env.run(&["pkgs/alpha", "--outdir", "flow-typed", "--verify"]);

    assert_eq!(result.exit_code, 1, "{}", result.combined_output());
    assert!(result
        .stdout
        .contains("[FAIL] alpha [reconcile] flow-typed/alpha.js.flow is out of date"));
    assert_eq!(env.read("flow-typed/alpha.js.flow"), committed);
}

#[test]
fn test_verify_reports_every_drifted_package() {
    let env = TestEnv::new();
    generated(&env, &["alpha", "beta", "gamma"]);
    env.write("pkgs/alpha/index.ts", "export declare const value: string;\n");
    fs::remove_file(env.path("flow-typed/gamma.js.flow")).unwrap();

    let result = env.run(&[
        "pkgs/alpha",
        "pkgs/beta",
        "pkgs/gamma",
        "--outdir",
        "flow-typed",
        "--verify",
    ]);

    assert_eq!(result.exit_code, 1);
    assert!(result.stdout.contains("[FAIL] alpha [reconcile]"));
    assert!(result.stdout.contains("[OK] beta"));
    assert!(result
        .stdout
        .contains("[FAIL] gamma [reconcile] flow-typed/gamma.js.flow is missing"));
    assert!(result.stdout.contains("2 of 3 packages failed"));
    assert!(result.stdout.contains("2 drifted"));
    assert!(!env.exists("flow-typed/gamma.js.flow"));
}

#[test]
fn test_verify_verbose_prints_diff() {
    let env = TestEnv::new();
    generated(&env, &["alpha"]);
    env.write("pkgs/alpha/index.ts", "export declare const value: string;\n");

    let result = env.run(&["pkgs/alpha", "--outdir", "flow-typed", "--verify", "--verbose"]);

    assert_eq!(result.exit_code, 1);
    assert!(result.stdout.contains("--- a/flow-typed/alpha.js.flow"), "{}", result.stdout);
    assert!(result.stdout.contains("-   declare export const value: number;"));
    assert!(result.stdout.contains("+   declare export const value: string;"));
}

#[test]
fn test_verify_annotates_drift_under_github_actions() {
    let env = TestEnv::new();
    generated(&env, &["alpha"]);
    fs::write(env.path("flow-typed/alpha.js.flow"), "// edited by hand\n").unwrap();

    let result = env.run_with_env(
        &["pkgs/alpha", "--outdir", "flow-typed", "--verify"],
        &[("GITHUB_ACTIONS", "true")],
    );

    assert_eq!(result.exit_code, 1);
    assert!(
        result
            .stdout
            .contains("::error file=flow-typed/alpha.js.flow,title=DriftError (alpha)::"),
        "{}",
        result.stdout
    );
}
