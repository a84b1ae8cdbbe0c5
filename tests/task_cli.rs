mod support;

use predicates::prelude::*;
use predicates::str::contains;

use support::{parse_json, TestStore};

#[test]
fn add_persists_task_and_counter() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;

    store
        .cmd()
        .args(["add", "Buy", "milk"])
        .assert()
        .success()
        .stdout(contains("Task added successfully"))
        .stdout(contains("You have a total of 1 task!"));

    assert_eq!(
        store.key("tasks")?.as_deref(),
        Some(r#"[{"id":1,"text":"Buy milk","completed":false}]"#)
    );
    assert_eq!(store.key("taskIdCounter")?.as_deref(), Some("1"));
    assert_eq!(store.key("statusFilter")?.as_deref(), Some("all"));
    Ok(())
}

#[test]
fn add_rejects_invalid_text() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    store.cmd().args(["add", "Task"]).assert().success();

    store
        .cmd()
        .args(["add", "  task "])
        .assert()
        .code(2)
        .stderr(contains("Task already exists!"));
    store
        .cmd()
        .args(["add", ""])
        .assert()
        .code(2)
        .stderr(contains("Task cannot be empty!!"));
    store
        .cmd()
        .args(["add", "   "])
        .assert()
        .code(2)
        .stderr(contains("Task cannot contain only spaces!"));
    store
        .cmd()
        .args(["add", &"x".repeat(151)])
        .assert()
        .code(2)
        .stderr(contains("Task cannot exceed 150 characters!"));

    assert_eq!(store.tasks()?.len(), 1);
    Ok(())
}

#[test]
fn add_json_envelope() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    let output = store.cmd().args(["--json", "add", "Walk dog"]).output()?;
    assert!(output.status.success());

    let json = parse_json(&output.stdout)?;
    assert_eq!(json["schema_version"], "todohub.v1");
    assert_eq!(json["command"], "add");
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["task"]["id"], 1);
    assert_eq!(json["data"]["task"]["text"], "Walk dog");
    assert_eq!(json["data"]["changed"], true);
    Ok(())
}

#[test]
fn json_errors_carry_kind_and_code() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    let output = store.cmd().args(["add", "", "--json"]).output()?;
    assert_eq!(output.status.code(), Some(2));

    let json = parse_json(&output.stdout)?;
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["kind"], "empty_input");
    assert_eq!(json["error"]["code"], 2);
    Ok(())
}

#[test]
fn json_error_names_command_after_store_flag() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    let path = store.store_path();
    let output = store
        .cmd()
        .arg("--store")
        .arg(&path)
        .args(["--json", "add", ""])
        .output()?;
    assert_eq!(output.status.code(), Some(2));

    let json = parse_json(&output.stdout)?;
    assert_eq!(json["command"], "add");
    Ok(())
}

#[test]
fn list_filters_without_saving() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    store.cmd().args(["add", "Buy milk"]).assert().success();
    store.cmd().args(["add", "Walk dog"]).assert().success();
    store.cmd().args(["toggle", "2"]).assert().success();

    store
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("[ ] 1 Buy milk"))
        .stdout(contains("[x] 2 Walk dog"));

    store
        .cmd()
        .args(["list", "--filter", "completed"])
        .assert()
        .success()
        .stdout(contains("You have completed 1 task!"))
        .stdout(contains("Walk dog"))
        .stdout(contains("Buy milk").not());

    assert_eq!(store.key("statusFilter")?.as_deref(), Some("all"));
    Ok(())
}

#[test]
fn toggle_unknown_task_fails() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    store.cmd().args(["add", "one"]).assert().success();
    let before = store.read_store_raw()?;

    store
        .cmd()
        .args(["toggle", "9"])
        .assert()
        .code(2)
        .stderr(contains("Task not found: 9"));
    assert_eq!(store.read_store_raw()?, before);
    Ok(())
}

#[test]
fn delete_asks_and_cancel_keeps_store() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    store.cmd().args(["add", "one"]).assert().success();
    store.cmd().args(["add", "two"]).assert().success();
    let before = store.read_store_raw()?;

    store
        .cmd()
        .args(["rm", "1"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stderr(contains("Are you sure you want to delete this task?"))
        .stdout(contains("Task deletion canceled"));
    assert_eq!(store.read_store_raw()?, before);

    store
        .cmd()
        .args(["rm", "1"])
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(contains("Task deleted successfully"));

    let tasks = store.tasks()?;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["id"], 2);
    Ok(())
}

#[test]
fn delete_without_answer_cancels() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    store.cmd().args(["add", "one"]).assert().success();

    store
        .cmd()
        .args(["rm", "1"])
        .write_stdin("")
        .assert()
        .success()
        .stdout(contains("Task deletion canceled"));
    assert_eq!(store.tasks()?.len(), 1);
    Ok(())
}

#[test]
fn edit_normalizes_and_confirms() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    store.cmd().args(["add", "Buy milk"]).assert().success();
    store.cmd().args(["add", "Walk dog"]).assert().success();

    store
        .cmd()
        .args(["edit", "1", "walk", "DOG", "--yes"])
        .assert()
        .code(2)
        .stderr(contains("Task already exists!"));

    store
        .cmd()
        .args(["edit", "1", "  Buy   oat milk  "])
        .write_stdin("yes\n")
        .assert()
        .success()
        .stderr(contains("Are you sure you want to save changes to this task?"))
        .stdout(contains("Task updated successfully!"));

    let tasks = store.tasks()?;
    assert_eq!(tasks[0]["text"], "Buy oat milk");
    assert_eq!(tasks[0]["id"], 1);
    Ok(())
}

#[test]
fn edit_cancel_keeps_text() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    store.cmd().args(["add", "Buy milk"]).assert().success();
    let before = store.read_store_raw()?;

    store
        .cmd()
        .args(["edit", "1", "Buy bread"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(contains("Task saving canceled"));
    assert_eq!(store.read_store_raw()?, before);
    Ok(())
}

#[test]
fn edit_completed_task_is_blocked() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    store.cmd().args(["add", "Done"]).assert().success();
    store.cmd().args(["toggle", "1"]).assert().success();

    store
        .cmd()
        .args(["edit", "1", "Not done", "--yes"])
        .assert()
        .code(3)
        .stderr(contains("Cannot edit completed task!"));
    Ok(())
}

#[test]
fn clear_uses_saved_filter_by_default() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    store.cmd().args(["add", "one"]).assert().success();
    store.cmd().args(["add", "two"]).assert().success();
    store.cmd().args(["toggle", "1"]).assert().success();
    store.cmd().args(["filter", "completed"]).assert().success();

    store
        .cmd()
        .args(["clear", "--yes"])
        .assert()
        .success()
        .stdout(contains("Completed tasks cleared!"));

    let tasks = store.tasks()?;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["text"], "two");
    Ok(())
}

#[test]
fn clear_all_restarts_ids() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    store.cmd().args(["add", "one"]).assert().success();
    store.cmd().args(["add", "two"]).assert().success();

    store
        .cmd()
        .args(["clear", "--scope", "all"])
        .write_stdin("y\n")
        .assert()
        .success()
        .stderr(contains("Are you sure you want to clear all tasks?"))
        .stdout(contains("All tasks cleared!"));
    assert_eq!(store.key("tasks")?, None);
    assert_eq!(store.key("taskIdCounter")?, None);

    let output = store.cmd().args(["add", "fresh", "--json"]).output()?;
    let json = parse_json(&output.stdout)?;
    assert_eq!(json["data"]["task_id"], 1);
    Ok(())
}

#[test]
fn filter_shows_and_sets_mode() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    store.cmd().args(["add", "one"]).assert().success();

    store
        .cmd()
        .arg("filter")
        .assert()
        .success()
        .stdout(contains("Filter: All"));

    store
        .cmd()
        .args(["filter", "inprogress"])
        .assert()
        .success()
        .stdout(contains("Filter set to In progress"))
        .stdout(contains("You have 1 task to do!"));
    assert_eq!(store.key("statusFilter")?.as_deref(), Some("inprogress"));

    store
        .cmd()
        .args(["filter", "someday"])
        .assert()
        .code(2)
        .stderr(contains("Invalid filter"));
    Ok(())
}

#[test]
fn count_messages() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    store
        .cmd()
        .arg("count")
        .assert()
        .success()
        .stdout("You have no tasks here!\n");

    store.cmd().args(["add", "one"]).assert().success();
    store.cmd().args(["add", "two"]).assert().success();
    store
        .cmd()
        .arg("count")
        .assert()
        .success()
        .stdout("You have a total of 2 tasks!\n");
    store
        .cmd()
        .args(["count", "--filter", "completed"])
        .assert()
        .success()
        .stdout("You have not completed any tasks!\n");

    let output = store.cmd().args(["count", "--json"]).output()?;
    let json = parse_json(&output.stdout)?;
    assert_eq!(json["data"]["count"], 2);
    assert_eq!(json["data"]["filter"], "all");
    Ok(())
}

#[test]
fn corrupt_store_lists_empty_and_blocks_writes() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    store.write_store(r#"{"tasks": "not json"}"#)?;

    store
        .cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("Failed to parse tasks from storage"));

    store.cmd().args(["add", "new"]).assert().code(4);

    store
        .cmd()
        .args(["clear", "--scope", "all", "--yes"])
        .assert()
        .success();
    store.cmd().args(["add", "new"]).assert().success();
    Ok(())
}

#[test]
fn clear_all_recovers_garbage_store_file() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    store.write_store("garbage")?;

    store.cmd().args(["add", "new"]).assert().code(4);
    store
        .cmd()
        .args(["clear", "--scope", "all", "--yes"])
        .assert()
        .success();
    store.cmd().args(["add", "new"]).assert().success();
    assert_eq!(store.tasks()?.len(), 1);
    Ok(())
}

#[test]
fn quiet_suppresses_output() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    store
        .cmd()
        .args(["--quiet", "add", "silent"])
        .assert()
        .success()
        .stdout("");
    assert_eq!(store.tasks()?.len(), 1);
    Ok(())
}

#[test]
fn config_store_path_is_used() -> Result<(), Box<dyn std::error::Error>> {
    let store = TestStore::new()?;
    let custom = store.path().join("nested").join("tasks.json");
    store.write_config(&format!("[store]\npath = {:?}\n", custom.display().to_string()))?;

    support::todohub_cmd()
        .env("TODOHUB_CONFIG", store.config_path())
        .args(["add", "configured"])
        .assert()
        .success();
    assert!(custom.exists());
    Ok(())
}
