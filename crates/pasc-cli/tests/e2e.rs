//! End-to-end CLI tests: invoke the built `pasc` binary against temp
//! source files and check exit codes / stdout / stderr.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn pasc_bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_pasc"))
}

fn pasc_bin() -> Command {
    Command::new(pasc_bin_path())
}

fn source_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    write!(file, "{contents}").expect("failed to write temp file");
    file
}

#[test]
fn runs_a_well_formed_program_and_exits_zero() {
    let file = source_file(
        "PROGRAM T; VAR r: INTEGER; BEGIN r := 1 + 2 END.",
    );
    pasc_bin().arg(file.path()).assert().success();
}

#[test]
fn show_globals_dumps_sorted_name_value_lines() {
    let file = source_file(
        "PROGRAM T; VAR b, a: INTEGER; BEGIN a := 1; b := 2 END.",
    );
    pasc_bin()
        .arg(file.path())
        .arg("--show-globals")
        .assert()
        .success()
        .stdout(predicate::str::contains("a = 1").and(predicate::str::contains("b = 2")));
}

#[test]
fn print_writes_to_stdout() {
    let file = source_file("PROGRAM T; BEGIN WRITELN(1 + 1) END.");
    pasc_bin()
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2"));
}

#[test]
fn division_by_zero_exits_nonzero_with_located_message() {
    let file = source_file("PROGRAM T; VAR r: INTEGER; BEGIN r := 1 DIV 0 END.");
    pasc_bin()
        .arg(file.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Division by zero"));
}

#[test]
fn undeclared_variable_is_rejected_before_running() {
    let file = source_file("PROGRAM T; BEGIN r := 1 END.");
    pasc_bin()
        .arg(file.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("SemanticError"));
}

#[test]
fn missing_source_file_reports_an_io_error() {
    pasc_bin()
        .arg("does-not-exist.pas")
        .assert()
        .failure()
        .code(1);
}

#[test]
fn help_flag_succeeds() {
    pasc_bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pasc"));
}
