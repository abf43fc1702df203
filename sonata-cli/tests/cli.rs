//! Integration tests for the command line solver.
use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn sonata() -> Command {
    Command::cargo_bin("sonata").unwrap()
}

fn write_temp_cnf(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn sat_instance_exits_10() {
    let file = write_temp_cnf("p cnf 3 2\n1 2 0\n-1 3 0\n");

    sonata()
        .arg(file.path())
        .assert()
        .code(10)
        .stdout(predicate::str::contains("s SATISFIABLE"))
        .stdout(predicate::str::contains("\nv "));
}

#[test]
fn unsat_instance_exits_20() {
    let file = write_temp_cnf("p cnf 2 4\n1 2 0\n-1 2 0\n1 -2 0\n-1 -2 0\n");

    sonata()
        .arg(file.path())
        .assert()
        .code(20)
        .stdout(predicate::str::contains("s UNSATISFIABLE"));
}

#[test]
fn reads_from_stdin() {
    sonata()
        .write_stdin("p cnf 1 1\n1 0\n")
        .assert()
        .code(10)
        .stdout(predicate::str::contains("s SATISFIABLE"));
}

#[test]
fn model_satisfies_unit_clauses() {
    let file = write_temp_cnf("p cnf 2 2\n-1 0\n2 0\n");

    sonata()
        .arg(file.path())
        .assert()
        .code(10)
        .stdout(predicate::str::contains("v -1 2 0"));
}

#[test]
fn parse_error_is_reported() {
    let file = write_temp_cnf("p cnf 1 1\n1 x 0\n");

    sonata().arg(file.path()).assert().code(1);
}

#[test]
fn missing_file_is_reported() {
    sonata().arg("does-not-exist.cnf").assert().code(1);
}

#[test]
fn config_file_is_applied() {
    let cnf = write_temp_cnf("p cnf 2 4\n1 2 0\n-1 2 0\n1 -2 0\n-1 -2 0\n");
    let config = write_temp_cnf("vsids_decay = 0.9\nluby_restart_interval_scale = 1\n");

    sonata()
        .arg(cnf.path())
        .arg("--config")
        .arg(config.path())
        .assert()
        .code(20);
}

#[test]
fn invalid_config_is_rejected() {
    let cnf = write_temp_cnf("p cnf 1 1\n1 0\n");
    let config = write_temp_cnf("vsids_decay = 2.5\n");

    sonata()
        .arg(cnf.path())
        .arg("--config")
        .arg(config.path())
        .assert()
        .code(1);
}
