use std::process::Command;

fn tsflow(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_tsflow"))
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_help_lists_flags() {
    let output = tsflow(&["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in ["--outdir", "--verify", "--verbose", "--json", "--config", "--keep-temp"] {
        assert!(stdout.contains(flag), "missing {} in:\n{}", flag, stdout);
    }
}

#[test]
fn test_version() {
    let output = tsflow(&["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_packages_is_usage_error() {
    let output = tsflow(&["--outdir", "out"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_missing_outdir_is_usage_error() {
    let output = tsflow(&["packages/a"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("--outdir"));
}
