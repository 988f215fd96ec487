use assert_cmd::Command;
use predicates::prelude::*;

fn gemt() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_gemt"));
    cmd.env("RUST_LOG", "off");
    cmd
}

// ============================================================
// Usage errors
// ============================================================

#[test]
fn test_missing_size_is_a_usage_error() {
    gemt()
        .assert()
        .code(255)
        .stderr(predicate::str::contains("[ERR] Missing size."))
        .stderr(predicate::str::contains("Usage: gemt <n>"));
}

#[test]
fn test_non_numeric_size_is_a_usage_error() {
    for arg in ["abc", "-3", "1.5"] {
        gemt().arg(arg).assert().code(255);
    }
}

#[test]
fn test_unknown_strategy_is_a_usage_error() {
    gemt().args(["2", "--strategy", "diagonal"]).assert().code(255);
}

#[test]
fn test_zero_iterations_is_a_usage_error() {
    gemt().args(["2", "-i", "0"]).assert().code(255);
}

#[cfg(target_pointer_width = "64")]
#[test]
fn test_unaddressable_exponent_is_a_usage_error() {
    gemt()
        .arg("64")
        .assert()
        .code(255)
        .stderr(predicate::str::starts_with("[ERR]"));
}

#[test]
fn test_help_and_version_succeed() {
    gemt()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SIZE_EXPONENT"));
    gemt().arg("--version").assert().success();
}

// ============================================================
// Runtime failures
// ============================================================

#[cfg(target_pointer_width = "64")]
#[test]
fn test_oversized_matrix_fails_without_aborting() {
    // 2^31 squared cells fit in usize, their byte count does not.
    gemt()
        .arg("31")
        .assert()
        .code(1)
        .stderr(predicate::str::starts_with("[ERR]"));
}

// ============================================================
// Successful runs
// ============================================================

#[test]
fn test_verified_runs_succeed() {
    let cases: [&[&str]; 6] = [
        &["0", "--verify"],
        &["2", "--verify"],
        &["2", "--verify", "-i", "2"],
        &["3", "--verify", "-i", "3", "--no-prefetch"],
        &["2", "-s", "out-of-place", "--verify"],
        &["4", "-s", "OUT-OF-PLACE", "--verify", "-i", "2"],
    ];
    for args in cases {
        gemt().args(args).assert().success();
    }
}

#[test]
fn test_print_dumps_matrix_before_and_after() {
    gemt()
        .args(["1", "--print"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Contents of the matrix:").count(2))
        .stdout(predicate::str::contains("0 1 \n0 0.5 \n\n"))
        .stdout(predicate::str::contains("0 0 \n1 0.5 \n\n"));
}
