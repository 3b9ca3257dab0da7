/// Black-box tests for the `spark` binary.
///
/// Every test gets its own database and runs with "today" pinned to
/// Sunday 2024-03-10 in UTC.
use predicates::prelude::*;

mod helpers;
use helpers::{assertions, CliTestHarness};

#[test]
fn test_cli_help_and_version() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["--help"])
        .stdout(predicate::str::contains("Spark"))
        .stdout(predicate::str::contains("calendar"));

    harness
        .run_success(&["--version"])
        .stdout(predicate::str::contains("spark"));

    harness
        .run_failure(&["invalid-command"])
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_add_command() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["add", "Basic Task"])
        .stdout(assertions::task_created_successfully())
        .stdout(predicate::str::contains("Task ID:"));

    harness
        .run_success(&[
            "add",
            "Complex Task",
            "--due",
            "fri",
            "--priority",
            "high",
            "--notes",
            "A complex test task",
        ])
        .stdout(assertions::task_created_successfully())
        .stdout(predicate::str::contains("2024-03-15"));

    harness.run_success(&["project", "add", "TestProject"]);
    harness
        .run_success(&["add", "Project Task", "--project", "testproject"])
        .stdout(assertions::task_created_successfully());
    assert!(harness.db_path().exists());
}

/// Every invocation is its own process, so each one must see what the
/// previous one wrote.
#[test]
fn test_writes_survive_across_invocations() {
    let harness = CliTestHarness::new();

    harness.run_success(&["project", "add", "Launch"]);
    let id = harness.add_task(&["Write copy", "--project", "Launch"]);
    harness
        .run_success(&["show", &id])
        .stdout(predicate::str::contains("Write copy"))
        .stdout(predicate::str::contains("Project:  Launch"));

    harness.run_success(&["do", &id]);
    harness
        .run_success(&["show", &id])
        .stdout(predicate::str::contains("completed"));

    for n in 0..10 {
        let id = harness.add_task(&[&format!("Batch {}", n)]);
        harness
            .run_success(&["show", &id])
            .stdout(predicate::str::contains(format!("Batch {}", n)));
    }
}

#[test]
fn test_add_rejects_bad_input() {
    let harness = CliTestHarness::new();

    harness
        .run_failure(&["add", "Invalid Task", "--priority", "invalid"])
        .stderr(assertions::has_error());
    harness
        .run_failure(&["add", "Invalid Date Task", "--due", "invalid-date"])
        .stderr(assertions::has_error());
    harness
        .run_failure(&["add", "   "])
        .stderr(predicate::str::contains("Invalid input"));
    harness
        .run_failure(&["add", "Orphan", "--project", "Missing"])
        .stderr(predicate::str::contains("No project named 'Missing'"));
}

#[test]
fn test_views() {
    let harness = CliTestHarness::new();
    harness.add_task(&["Due today", "--due", "today"]);
    harness.add_task(&["Later", "--when", "2024-03-15"]);
    harness.add_task(&["Learn piano", "--someday"]);

    harness
        .run_success(&["list"])
        .stdout(assertions::has_task_table_headers())
        .stdout(predicate::str::contains("Due today"))
        .stdout(predicate::str::contains("Later").not())
        .stdout(predicate::str::contains("Learn piano").not());

    harness
        .run_success(&["list", "--view", "upcoming"])
        .stdout(predicate::str::contains("Friday, March 15"))
        .stdout(predicate::str::contains("Later"))
        .stdout(predicate::str::contains("Due today").not());

    harness
        .run_success(&["list", "--view", "someday"])
        .stdout(predicate::str::contains("Learn piano"))
        .stdout(predicate::str::contains("Later").not());

    harness
        .run_success(&["list", "--view", "completed"])
        .stdout(assertions::empty_result());

    harness
        .run_failure(&["list", "--view", "nowhere"])
        .stderr(predicate::str::contains("Invalid view"));
}

#[test]
fn test_list_with_filter_query() {
    let harness = CliTestHarness::new();
    harness.add_task(&["Urgent", "--due", "today", "--priority", "high"]);
    harness.add_task(&["Relaxed", "--due", "today", "--priority", "low"]);

    harness
        .run_success(&["list", "priority:high"])
        .stdout(predicate::str::contains("Urgent"))
        .stdout(predicate::str::contains("Relaxed").not());

    harness
        .run_success(&["list", "not priority:high and due:today"])
        .stdout(predicate::str::contains("Relaxed"))
        .stdout(predicate::str::contains("Urgent").not());

    harness
        .run_failure(&["list", "colour:red"])
        .stderr(predicate::str::contains("Unknown filter key"));
}

#[test]
fn test_calendar_and_suggest() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["calendar", "--month", "2024-03"])
        .stdout(predicate::str::contains("March 2024"))
        .stdout(predicate::str::contains("Su Mo Tu We Th Fr Sa"))
        .stdout(predicate::str::contains("31"));

    harness
        .run_success(&["calendar", "--month", "2024-03", "--query", "fri"])
        .stdout(predicate::str::contains("Suggestion: Friday (2024-03-15)"));

    harness
        .run_failure(&["calendar", "--month", "2024-13"])
        .stderr(assertions::has_error());

    harness
        .run_success(&["suggest", "tom"])
        .stdout(predicate::str::contains("Tomorrow → Monday, 2024-03-11"));

    harness
        .run_success(&["suggest", "zzz"])
        .stdout(predicate::str::contains("No suggestion for 'zzz'"));
}

#[test]
fn test_do_and_undo() {
    let harness = CliTestHarness::new();
    let id = harness.add_task(&["Finish me", "--due", "today"]);

    harness
        .run_success(&["do", &id])
        .stdout(predicate::str::contains("Completed task: 'Finish me'"));
    harness
        .run_success(&["list"])
        .stdout(predicate::str::contains("Finish me").not());
    harness
        .run_success(&["list", "--view", "completed"])
        .stdout(predicate::str::contains("Finish me"));

    harness
        .run_success(&["undo", &id[..4]])
        .stdout(predicate::str::contains("Reopened task: 'Finish me'"));
    harness
        .run_success(&["list"])
        .stdout(predicate::str::contains("Finish me"));

    harness
        .run_failure(&["do", "x"])
        .stderr(predicate::str::contains("at least 2 characters"));
}

#[test]
fn test_edit_and_show() {
    let harness = CliTestHarness::new();
    let id = harness.add_task(&["Draft", "--notes", "first pass"]);

    harness
        .run_success(&[
            "edit",
            &id,
            "--title",
            "Final draft",
            "--due",
            "2024-03-12",
            "--priority",
            "medium",
        ])
        .stdout(predicate::str::contains("Updated task: 'Final draft'"));

    harness
        .run_success(&["show", &id])
        .stdout(predicate::str::contains("Final draft"))
        .stdout(predicate::str::contains("2024-03-12"))
        .stdout(predicate::str::contains("medium"))
        .stdout(predicate::str::contains("first pass"));

    harness.run_success(&["edit", &id, "--notes-clear", "--due-clear"]);
    harness
        .run_success(&["show", &id])
        .stdout(predicate::str::contains("first pass").not())
        .stdout(predicate::str::contains("Due:").not());

    harness
        .run_failure(&["edit", "ffffffff", "--title", "Nope"])
        .stderr(predicate::str::contains("No task found"));
}

#[test]
fn test_delete_with_force() {
    let harness = CliTestHarness::new();
    let id = harness.add_task(&["Throwaway", "--due", "today"]);

    harness
        .run_success(&["delete", &id, "--force"])
        .stdout(predicate::str::contains("Deleted task: 'Throwaway'"));
    harness
        .run_success(&["list"])
        .stdout(assertions::empty_result());
    harness
        .run_failure(&["show", &id])
        .stderr(predicate::str::contains("No task found"));
}

#[test]
fn test_areas_and_projects() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["area", "add", "Work"])
        .stdout(predicate::str::contains("Created area: 'Work'"));
    harness.run_success(&["area", "add", "Home"]);
    harness
        .run_success(&["area", "list"])
        .stdout(predicate::str::contains("Work"))
        .stdout(predicate::str::contains("Home"));

    harness
        .run_success(&["project", "add", "Launch", "--area", "work", "--due", "2024-04-01"])
        .stdout(predicate::str::contains("Created project: 'Launch'"));
    harness
        .run_success(&["project", "list"])
        .stdout(predicate::str::contains("Launch"))
        .stdout(predicate::str::contains("Work"))
        .stdout(predicate::str::contains("2024-04-01"));

    harness.add_task(&["Write copy", "--project", "Launch"]);
    harness
        .run_success(&["list", "--project", "Launch"])
        .stdout(predicate::str::contains("Project: Launch"))
        .stdout(predicate::str::contains("Write copy"));

    harness
        .run_success(&["project", "edit", "Launch", "--rename", "Relaunch", "--area-clear"])
        .stdout(predicate::str::contains("Updated project: 'Relaunch'"));
    harness
        .run_success(&["area", "rename", "Home", "House"])
        .stdout(predicate::str::contains("Renamed area 'Home' to 'House'"));

    harness
        .run_success(&["project", "archive", "Relaunch"])
        .stdout(predicate::str::contains("Archived project: 'Relaunch'"));
    harness
        .run_success(&["project", "list"])
        .stdout(predicate::str::contains("No projects found."));
    harness
        .run_success(&["area", "archive", "Work"])
        .stdout(predicate::str::contains("Archived area: 'Work'"));
    harness
        .run_success(&["area", "list"])
        .stdout(predicate::str::contains("Work").not());
}

#[test]
fn test_subtasks() {
    let harness = CliTestHarness::new();
    let id = harness.add_task(&["Pack for trip"]);

    harness
        .run_success(&["subtask", "add", &id, "Passport"])
        .stdout(predicate::str::contains("Added subtask: 'Passport'"));
    harness.run_success(&["subtask", "add", &id, "Charger"]);
    harness.run_success(&["subtask", "done", &id, "1"]);

    harness
        .run_success(&["subtask", "list", &id])
        .stdout(predicate::str::contains("1. [x] Passport"))
        .stdout(predicate::str::contains("2. [ ] Charger"));

    harness
        .run_success(&["subtask", "rename", &id, "2", "USB-C charger"])
        .stdout(predicate::str::contains("Renamed subtask 'Charger' to 'USB-C charger'"));
    harness.run_success(&["subtask", "undo", &id, "1"]);
    harness.run_success(&["subtask", "delete", &id, "1"]);

    harness
        .run_success(&["show", &id])
        .stdout(predicate::str::contains("1. [ ] USB-C charger"))
        .stdout(predicate::str::contains("Passport").not());

    harness
        .run_failure(&["subtask", "done", &id, "5"])
        .stderr(predicate::str::contains("No subtask at position 5"));
}

#[test]
fn test_recurrence() {
    let harness = CliTestHarness::new();
    let id = harness.add_task(&["Team sync", "--when", "2024-03-11"]);

    harness
        .run_success(&[
            "recur", "set", &id, "--every", "weekly", "--interval", "2", "--on", "mon,wed",
            "--count", "6",
        ])
        .stdout(predicate::str::contains("Every 2 weeks on Mon, Wed, 6 times"))
        .stdout(predicate::str::contains("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE;COUNT=6"));

    harness
        .run_success(&["recur", "show", &id])
        .stdout(predicate::str::contains("Every 2 weeks on Mon, Wed"));

    harness
        .run_success(&["recur", "set", &id, "--every", "custom"])
        .stdout(predicate::str::contains("Custom (every day)"))
        .stdout(predicate::str::contains("RRULE").not());

    harness
        .run_success(&["recur", "clear", &id])
        .stdout(predicate::str::contains("no longer repeats"));
    harness
        .run_success(&["recur", "show", &id])
        .stdout(predicate::str::contains("This task does not repeat."));

    harness
        .run_failure(&["recur", "set", &id, "--every", "daily", "--interval", "0"])
        .stderr(predicate::str::contains("at least 1"));
    harness
        .run_failure(&["recur", "set", &id, "--every", "weekly", "--on", "funday"])
        .stderr(predicate::str::contains("Unknown weekday"));
}

#[test]
fn test_time_blocks() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["block", "add", "Deep work", "--from", "09:00", "--to", "11:30"])
        .stdout(predicate::str::contains("Blocked 09:00-11:30 on 2024-03-10: 'Deep work'"));
    harness.run_success(&[
        "block", "add", "Gym", "--from", "18:00", "--to", "19:00", "--date", "tom",
    ]);

    harness
        .run_success(&["block", "list"])
        .stdout(predicate::str::contains("Deep work"))
        .stdout(predicate::str::contains("2h30m"))
        .stdout(predicate::str::contains("Gym").not());
    harness
        .run_success(&["block", "list", "--date", "2024-03-11"])
        .stdout(predicate::str::contains("Gym"));

    harness
        .run_failure(&["block", "add", "Backwards", "--from", "10:00", "--to", "09:00"])
        .stderr(predicate::str::contains("Invalid input"));
    harness
        .run_failure(&["block", "delete", "ffffffff"])
        .stderr(predicate::str::contains("No time block"));
}

#[test]
fn test_auth_session() {
    let harness = CliTestHarness::new();

    harness
        .run_success(&["auth", "whoami"])
        .stdout(predicate::str::contains("Not signed in."));

    harness
        .run_success(&["auth", "signup", "Ada@Example.com"])
        .stdout(predicate::str::contains("ada@example.com"));
    harness.add_task(&["Private", "--due", "today"]);

    harness
        .run_success(&["auth", "anonymous"])
        .stdout(predicate::str::contains("Signed in anonymously"));
    harness
        .run_success(&["list"])
        .stdout(predicate::str::contains("Private").not());

    harness.run_success(&["auth", "signin", "ada@example.com"]);
    harness
        .run_success(&["list"])
        .stdout(predicate::str::contains("Private"));

    harness
        .run_failure(&["auth", "signup", "ada@example.com"])
        .stderr(assertions::has_error());
    harness
        .run_failure(&["auth", "signin", "nobody@example.com"])
        .stderr(predicate::str::contains("No account"));

    harness
        .run_success(&["auth", "signout"])
        .stdout(predicate::str::contains("Signed out."));
    harness
        .run_success(&["auth", "whoami"])
        .stdout(predicate::str::contains("Not signed in."));
}

#[test]
fn test_config_file_in_working_directory() {
    let harness = CliTestHarness::new();
    let dir = harness.db_path().parent().unwrap().to_path_buf();
    std::fs::write(dir.join("config.toml"), "default_view = \"someday\"\n").unwrap();

    harness.add_task(&["Someday idea", "--someday"]);
    harness
        .run_success(&["list"])
        .stdout(predicate::str::contains("Someday idea"));
}
