#![cfg(unix)]

mod common;

use common::TestEnv;

const HEADER: &str = "/**\n * Flow type definitions for alpha\n";
const MODULE: &str = "declare module \"alpha\" {\n  declare export const value: number;\n}\n";

#[test]
fn test_generate_writes_flow_file() {
    let env = TestEnv::new();
    env.package("alpha");

    let result = env.run(&["pkgs/alpha", "--outdir", "flow-typed"]);

    assert_eq!(result.exit_code, 0, "{}", result.combined_output());
    let content = env.read("flow-typed/alpha.js.flow");
    assert!(content.starts_with(HEADER), "{}", content);
    assert!(content.contains("@flow"));
    assert!(content.ends_with(MODULE), "{}", content);
    assert!(
        result.stdout.contains("[OK] alpha [>] flow-typed/alpha.js.flow"),
        "{}",
        result.stdout
    );
    assert!(result.stdout.contains("[OK] Generated 1 package"));
}

#[test]
fn test_generate_is_idempotent() {
    let env = TestEnv::new();
    env.package("alpha");

    assert_eq!(env.run(&["pkgs/alpha", "--outdir", "out"]).exit_code, 0);
    let first = env.read("out/alpha.js.flow");
    assert_eq!(env.run(&["pkgs/alpha", "--outdir", "out"]).exit_code, 0);
    assert_eq!(env.read("out/alpha.js.flow"), first);
}

#[test]
fn test_generate_isolates_failing_package() {
    let env = TestEnv::new();
    env.package("alpha");
    env.package("gamma");

    let result = env.run(&["pkgs/alpha", "pkgs/missing", "pkgs/gamma", "--outdir", "out"]);

    assert_eq!(result.exit_code, 1, "{}", result.combined_output());
    assert!(env.exists("out/alpha.js.flow"));
    assert!(env.exists("out/gamma.js.flow"));
    assert!(result
        .stdout
        .contains("[FAIL] pkgs/missing [resolve] can't resolve entry point from package: pkgs/missing"));
    assert!(result.stdout.contains("1 of 3 packages failed"));
    assert_eq!(env.tsc_calls(), 2);
}

#[test]
fn test_generate_rejects_non_source_entry_before_spawning() {
    let env = TestEnv::new();
    env.write("pkgs/plain/index.js", "module.exports = {};\n");

    let result = env.run(&["pkgs/plain/index.js", "--outdir", "out"]);

    assert_eq!(result.exit_code, 1);
    assert!(result.stdout.contains("entry file must be a .ts source file"));
    assert_eq!(env.tsc_calls(), 0);
}

#[test]
fn test_generate_reports_compiler_failure() {
    let env = TestEnv::new();
    env.package("alpha");
    env.write("pkgs/broken/index.ts", "export declare const x: Missing;\n");

    let result = env.run(&["pkgs/alpha", "pkgs/broken", "--outdir", "out"]);

    assert_eq!(result.exit_code, 1);
    assert!(env.exists("out/alpha.js.flow"));
    assert!(!env.exists("out/broken.js.flow"));
    assert!(result.stdout.contains("[FAIL] broken [emit]"), "{}", result.stdout);
    assert!(result.stdout.contains("exited with status 2"));
    assert!(result.stdout.contains("TS2307"));
}

#[test]
fn test_generate_rejects_duplicate_package_names() {
    let env = TestEnv::new();
    env.package("alpha");
    env.write("vendor/alpha/index.ts", common::VALUE_SOURCE);

    let result = env.run(&["pkgs/alpha", "vendor/alpha", "--outdir", "out"]);

    assert_eq!(result.exit_code, 2);
    assert!(result
        .stderr
        .contains("duplicate package name 'alpha' for pkgs/alpha and vendor/alpha"));
    assert_eq!(env.tsc_calls(), 0);
    assert!(!env.exists("out"));
}

#[test]
fn test_generate_uses_manifest_name_and_scoped_stem() {
    let env = TestEnv::new();
    env.write(
        "pkgs/widgets/package.json",
        r#"{ "name": "@acme/widgets", "main": "src/main.ts" }"#,
    );
    env.write("pkgs/widgets/src/main.ts", common::VALUE_SOURCE);

    let result = env.run(&["pkgs/widgets", "--outdir", "out"]);

    assert_eq!(result.exit_code, 0, "{}", result.combined_output());
    let content = env.read("out/acme-widgets.js.flow");
    assert!(content.contains("declare module \"@acme/widgets\" {"), "{}", content);
}

#[test]
fn test_generate_bundles_relative_imports() {
    let env = TestEnv::new();
    env.write(
        "pkgs/shapes/index.ts",
        "export * from \"./square\";\nexport declare function area(): number;\n",
    );
    env.write(
        "pkgs/shapes/square.d.ts",
        "export interface Square {\n    side: number;\n}\n",
    );

    let result = env.run(&["pkgs/shapes", "--outdir", "out"]);

    assert_eq!(result.exit_code, 0, "{}", result.combined_output());
    let content = env.read("out/shapes.js.flow");
    assert!(content.contains("declare module \"shapes\" {"), "{}", content);
    assert!(content.contains("declare module \"shapes/square\" {"), "{}", content);
    assert!(content.contains("side: number"));
}

#[test]
fn test_generate_reports_unresolved_declaration_import() {
    let env = TestEnv::new();
    env.write(
        "pkgs/shapes/index.ts",
        "export * from \"./circle\";\n",
    );

    let result = env.run(&["pkgs/shapes", "--outdir", "out"]);

    assert_eq!(result.exit_code, 1, "{}", result.combined_output());
    assert!(result.stdout.contains("[FAIL] shapes [bundle]"), "{}", result.stdout);
    assert!(result.stdout.contains("cannot resolve './circle'"));
}

#[test]
fn test_config_output_extension() {
    let env = TestEnv::new();
    env.package("alpha");

    let result = env.run_with_env(
        &["pkgs/alpha", "--outdir", "out"],
        &[("TSFLOW_OUTPUT_EXTENSION", ".flow.js")],
    );

    assert_eq!(result.exit_code, 0, "{}", result.combined_output());
    assert!(env.exists("out/alpha.flow.js"));
}

#[test]
fn test_malformed_config_is_rejected() {
    let env = TestEnv::new();
    env.package("alpha");
    env.write("tsflow.toml", "[emitter\nprogram = 1\n");

    let result = env.run(&["pkgs/alpha", "--outdir", "out"]);

    assert_eq!(result.exit_code, 2);
    assert!(result.stderr.contains("invalid config in"), "{}", result.stderr);
    assert!(!env.exists("out"));
}

#[test]
fn test_unknown_config_key_warns_but_runs() {
    let env = TestEnv::new();
    env.package("alpha");
    let config = env.read("tsflow.toml");
    env.write("tsflow.toml", &format!("{}timeout_sec = 5\n", config));

    let result = env.run(&["pkgs/alpha", "--outdir", "out"]);

    assert_eq!(result.exit_code, 0, "{}", result.combined_output());
    assert!(
        result.stderr.contains("unknown config key 'timeout_sec'"),
        "{}",
        result.stderr
    );
    assert!(result.stderr.contains("did you mean 'timeout_secs'?"));
}

#[test]
fn test_keep_temp_reports_workspace() {
    let env = TestEnv::new();
    env.package("alpha");
    env.write(
        "tsflow.toml",
        &format!(
            "{}\n[workspace]\nroot = \"{}\"\n",
            env.read("tsflow.toml"),
            env.path("tmp").display()
        ),
    );
    std::fs::create_dir_all(env.path("tmp")).unwrap();

    let result = env.run(&["pkgs/alpha", "--outdir", "out", "--keep-temp", "--verbose"]);

    assert_eq!(result.exit_code, 0, "{}", result.combined_output());
    assert!(result.stderr.contains("Workspace kept at"), "{}", result.stderr);
    let kept: Vec<_> = std::fs::read_dir(env.path("tmp")).unwrap().collect();
    assert_eq!(kept.len(), 1);
}

#[test]
fn test_verbose_reports_compiler_invocation() {
    let env = TestEnv::new();
    env.package("alpha");

    let quiet = env.run(&["pkgs/alpha", "--outdir", "out"]);
    assert_eq!(quiet.exit_code, 0, "{}", quiet.combined_output());
    assert!(!quiet.stderr.contains("--emitDeclarationOnly"), "{}", quiet.stderr);

    let verbose = env.run(&["pkgs/alpha", "--outdir", "out", "--verbose"]);
    assert_eq!(verbose.exit_code, 0, "{}", verbose.combined_output());

    // The stand-in compiler logs its arguments, so the last log line is
    // exactly what the verbose run passed after the program name.
    let log = env.read("tools/tsc.log");
    let args = log.lines().last().unwrap();
    assert!(args.contains("-d --emitDeclarationOnly "), "{}", args);
    assert!(args.contains("alpha/index.ts --outDir "), "{}", args);
    assert!(
        verbose.stderr.contains(&format!("sh {}", args)),
        "{}",
        verbose.stderr
    );
}
