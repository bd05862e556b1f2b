//! Runs the compiled binary inside throwaway project directories.

use std::fs::{self, File};
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn estructura(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("estructura").expect("binary is built");
    cmd.current_dir(dir);
    cmd
}

fn sample_project(root: &Path) {
    fs::create_dir_all(root.join("src/core")).unwrap();
    fs::create_dir_all(root.join("node_modules/react")).unwrap();
    fs::create_dir_all(root.join(".git/refs")).unwrap();
    File::create(root.join("src/core/tree.rs")).unwrap();
    File::create(root.join("src/main.rs")).unwrap();
    File::create(root.join("Cargo.toml")).unwrap();
    File::create(root.join(".gitignore")).unwrap();
    File::create(root.join("README.md")).unwrap();
}

#[test]
fn prints_tree_of_current_directory() {
    let tmp = tempdir().unwrap();
    sample_project(tmp.path());

    estructura(tmp.path()).assert().success().stdout(
        "\nEstructura del proyecto:\n\n\
         |-- Cargo.toml\n\
         |-- README.md\n\
         |-- src\n\
         \x20   |-- core\n\
         \x20       |-- tree.rs\n\
         \x20   |-- main.rs\n",
    );
}

#[test]
fn empty_directory_prints_header_only() {
    let tmp = tempdir().unwrap();
    estructura(tmp.path())
        .assert()
        .success()
        .stdout("\nEstructura del proyecto:\n\n");
}

#[test]
fn logging_goes_to_stderr_and_leaves_stdout_unchanged() {
    let tmp = tempdir().unwrap();
    sample_project(tmp.path());

    let plain = estructura(tmp.path()).output().unwrap();
    estructura(tmp.path())
        .args(["--log-level", "debug"])
        .assert()
        .success()
        .stdout(predicate::str::diff(String::from_utf8(plain.stdout).unwrap()))
        .stderr(predicate::str::contains("reading directory"));
}

#[test]
fn positional_path_is_rejected() {
    let tmp = tempdir().unwrap();
    estructura(tmp.path())
        .arg("src")
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

#[cfg(unix)]
#[test]
fn unreadable_subdirectory_fails_with_partial_output() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempdir().unwrap();
    let root = tmp.path();
    File::create(root.join("a.txt")).unwrap();
    fs::create_dir_all(root.join("locked")).unwrap();
    File::create(root.join("z.txt")).unwrap();
    fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can read the directory regardless of its mode.
    if fs::read_dir(root.join("locked")).is_ok() {
        fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o755)).unwrap();
        eprintln!("skipped: mode 0o000 does not block reads for this user (running as root?)");
        return;
    }

    let assert = estructura(root).assert();
    fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o755)).unwrap();
    assert
        .failure()
        .stdout("\nEstructura del proyecto:\n\n|-- a.txt\n|-- locked\n")
        .stderr(predicate::str::contains("failed to read directory"));
}
