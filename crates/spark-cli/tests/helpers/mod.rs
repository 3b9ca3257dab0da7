use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A Sunday, so weekday suggestions resolve to the following week.
pub const TODAY: &str = "2024-03-10";

/// Runs the `spark` binary against a throwaway database.
///
/// Commands run inside the temporary directory so a `config.toml` in the
/// working tree is never picked up.
pub struct CliTestHarness {
    temp_dir: TempDir,
    db_path: PathBuf,
}

impl CliTestHarness {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test.db");
        Self { temp_dir, db_path }
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("spark").expect("Failed to find spark binary");
        cmd.current_dir(self.temp_dir.path())
            .env("SPARK_DATABASE_PATH", &self.db_path)
            .env("SPARK_TODAY", TODAY)
            .env("SPARK_TIMEZONE", "UTC")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn run_success(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().success()
    }

    pub fn run_failure(&self, args: &[&str]) -> assert_cmd::assert::Assert {
        self.command().args(args).assert().failure()
    }

    /// Adds a task and returns its short ID as printed by `add`.
    pub fn add_task(&self, args: &[&str]) -> String {
        let mut full = vec!["add"];
        full.extend_from_slice(args);
        let output = self.command().args(&full).output().expect("Failed to run add");
        assert!(output.status.success(), "add failed: {:?}", output);
        let stdout = strip_ansi(&String::from_utf8_lossy(&output.stdout));
        stdout
            .lines()
            .find_map(|line| line.split("Task ID: ").nth(1))
            .map(|id| id.trim().to_string())
            .expect("add did not print a task ID")
    }
}

/// Removes terminal colour sequences.
pub fn strip_ansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\u{1b}' {
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

pub mod assertions {
    use super::*;

    pub fn has_task_table_headers() -> impl Predicate<str> {
        predicate::str::contains("ID")
            .and(predicate::str::contains("Title"))
            .and(predicate::str::contains("Due"))
    }

    pub fn task_created_successfully() -> impl Predicate<str> {
        predicate::str::contains("Created task")
    }

    pub fn empty_result() -> impl Predicate<str> {
        predicate::str::contains("No tasks found")
    }

    pub fn has_error() -> impl Predicate<str> {
        predicate::str::contains("Error").or(predicate::str::contains("error"))
    }
}
