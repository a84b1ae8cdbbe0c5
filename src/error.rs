//! Error types for todohub
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (invalid task text, unknown task, bad args)
//! - 3: Blocked by UI state (edit in progress, pending confirmation)
//! - 4: Operation failed (store read/write, lock, corrupt data)

use std::path::PathBuf;
use thiserror::Error;

use crate::notification::Severity;
use crate::task::MAX_TASK_LEN;

/// Exit codes for the todohub CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const BLOCKED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for todohub operations
#[derive(Error, Debug)]
pub enum Error {
    // Validation (exit code 2)
    #[error("Task cannot be empty!!")]
    EmptyInput,

    #[error("Task cannot contain only spaces!")]
    BlankInput,

    #[error("Task already exists!")]
    DuplicateTask(String),

    #[error("Task cannot exceed {max} characters!")]
    TextTooLong { len: usize, max: usize },

    #[error("Task not found: {0}")]
    TaskNotFound(u64),

    #[error("Invalid filter: {0} (expected all, inprogress or completed)")]
    InvalidFilter(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // Blocked by UI state (exit code 3)
    #[error("Cannot edit completed task!")]
    EditOnCompletedTask(u64),

    #[error("Task {0} is being edited; save or cancel first")]
    EditInProgress(u64),

    #[error("Task {0} is not being edited")]
    NotEditing(u64),

    #[error("A confirmation is waiting for an answer")]
    ConfirmationPending,

    // Store failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("Corrupt store value for key '{key}': {reason}")]
    CorruptStore { key: String, reason: String },
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::EmptyInput
            | Error::BlankInput
            | Error::DuplicateTask(_)
            | Error::TextTooLong { .. }
            | Error::TaskNotFound(_)
            | Error::InvalidFilter(_)
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_)
            | Error::TomlParse(_) => exit_codes::USER_ERROR,

            Error::EditOnCompletedTask(_)
            | Error::EditInProgress(_)
            | Error::NotEditing(_)
            | Error::ConfirmationPending => exit_codes::BLOCKED,

            Error::Io(_)
            | Error::Json(_)
            | Error::LockFailed(_)
            | Error::CorruptStore { .. } => exit_codes::OPERATION_FAILED,
        }
    }

    /// Short machine-readable name used in JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            Error::EmptyInput => "empty_input",
            Error::BlankInput => "blank_input",
            Error::DuplicateTask(_) => "duplicate_task",
            Error::TextTooLong { .. } => "text_too_long",
            Error::TaskNotFound(_) => "task_not_found",
            Error::InvalidFilter(_) => "invalid_filter",
            Error::InvalidArgument(_) => "invalid_argument",
            Error::InvalidConfig(_) | Error::TomlParse(_) => "invalid_config",
            Error::EditOnCompletedTask(_) => "edit_on_completed_task",
            Error::EditInProgress(_) => "edit_in_progress",
            Error::NotEditing(_) => "not_editing",
            Error::ConfirmationPending => "confirmation_pending",
            Error::Io(_)
            | Error::Json(_)
            | Error::LockFailed(_)
            | Error::CorruptStore { .. } => "store_failure",
        }
    }

    /// True when the underlying store could not be read or written.
    pub fn is_store_failure(&self) -> bool {
        self.exit_code() == exit_codes::OPERATION_FAILED
    }

    /// Severity used when this error is surfaced as a notification
    pub fn severity(&self) -> Severity {
        match self {
            Error::EditOnCompletedTask(_) => Severity::Info,
            _ => Severity::Error,
        }
    }

    /// Message shown to the user when `op` fails with this error.
    ///
    /// Store failures collapse to a generic retry message; everything
    /// else uses the error's own text.
    pub fn user_message(&self, op: &str) -> String {
        if self.is_store_failure() {
            format!("Failed to {op}. Please try again.")
        } else {
            self.to_string()
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::DuplicateTask(text) => Some(serde_json::json!({ "text": text })),
            Error::TextTooLong { len, max } => Some(serde_json::json!({ "len": len, "max": max })),
            Error::TaskNotFound(id)
            | Error::EditOnCompletedTask(id)
            | Error::EditInProgress(id)
            | Error::NotEditing(id) => Some(serde_json::json!({ "id": id })),
            Error::CorruptStore { key, reason } => {
                Some(serde_json::json!({ "key": key, "reason": reason }))
            }
            Error::LockFailed(path) => Some(serde_json::json!({ "path": path.display().to_string() })),
            _ => None,
        }
    }

    pub(crate) fn too_long(len: usize) -> Self {
        Error::TextTooLong {
            len,
            max: MAX_TASK_LEN,
        }
    }
}

/// Result type alias for todohub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            kind: err.kind(),
            details: err.details(),
        }
    }
}
