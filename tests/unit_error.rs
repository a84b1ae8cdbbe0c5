use std::path::PathBuf;

use todohub::error::{exit_codes, Error, JsonError};
use todohub::notification::Severity;

#[test]
fn exit_codes_map_correctly() {
    let user = Error::InvalidArgument("bad".to_string());
    assert_eq!(user.exit_code(), exit_codes::USER_ERROR);

    let blocked = Error::EditInProgress(3);
    assert_eq!(blocked.exit_code(), exit_codes::BLOCKED);

    let op = Error::LockFailed(PathBuf::from("todo.json.lock"));
    assert_eq!(op.exit_code(), exit_codes::OPERATION_FAILED);
}

#[test]
fn json_error_includes_code() {
    let err = Error::TaskNotFound(7);
    let json = JsonError::from(&err);
    assert_eq!(json.code, exit_codes::USER_ERROR);
    assert_eq!(json.kind, "task_not_found");
    assert!(json.error.contains("Task not found"));
    assert_eq!(json.details, Some(serde_json::json!({ "id": 7 })));
}

#[test]
fn store_failures_get_a_retry_message() {
    let err = Error::CorruptStore {
        key: "tasks".to_string(),
        reason: "expected value".to_string(),
    };
    assert!(err.is_store_failure());
    assert_eq!(err.kind(), "store_failure");
    assert_eq!(err.user_message("delete task"), "Failed to delete task. Please try again.");
}

#[test]
fn validation_errors_keep_their_text() {
    assert_eq!(Error::EmptyInput.user_message("add task"), "Task cannot be empty!!");
    assert_eq!(
        Error::TextTooLong { len: 151, max: 150 }.user_message("add task"),
        "Task cannot exceed 150 characters!"
    );
    assert_eq!(Error::EmptyInput.severity(), Severity::Error);
    assert_eq!(Error::EditOnCompletedTask(1).severity(), Severity::Info);
}
