//! Smoke tests for the thin CLI binary.

use assert_cmd::Command;
use predicates::prelude::*;
use resolvecore::test_utils::write_package;
use tempfile::TempDir;

#[test]
fn resolves_a_package_and_prints_it() {
    let dir = TempDir::new().unwrap();
    write_package(dir.path(), "foo", "1.0.0");

    let mut cmd = Command::cargo_bin("resolvecore").unwrap();
    cmd.arg("foo").arg("--path").arg(dir.path()).arg("--no-cache");
    cmd.assert().success().stdout(predicate::str::contains("foo-1.0.0"));
}

#[test]
fn reports_failure_for_an_unsatisfiable_request() {
    let dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("resolvecore").unwrap();
    cmd.arg("missing").arg("--path").arg(dir.path()).arg("--no-cache");
    cmd.assert().failure().code(1);
}
