//! Task model for todohub.
//!
//! A task is the only persisted entity: an integer id handed out from a
//! monotonic counter, a normalized line of text and a completion flag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Longest task text accepted, in characters, after normalization.
pub const MAX_TASK_LEN: usize = 150;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(id: u64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }

    /// Case-insensitive text comparison used by the uniqueness rule.
    pub fn same_text(&self, text: &str) -> bool {
        self.text.to_lowercase() == text.to_lowercase()
    }
}

/// Active view selector; also the scope of a clear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    #[serde(rename = "inprogress")]
    InProgress,
    Completed,
}

impl TaskFilter {
    pub const MODES: [TaskFilter; 3] = [TaskFilter::All, TaskFilter::InProgress, TaskFilter::Completed];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::InProgress => "inprogress",
            TaskFilter::Completed => "completed",
        }
    }

    /// Human label for tabs and headers
    pub fn label(self) -> &'static str {
        match self {
            TaskFilter::All => "All",
            TaskFilter::InProgress => "In progress",
            TaskFilter::Completed => "Completed",
        }
    }

    /// Parse a stored value; anything unrecognized falls back to `All`.
    pub fn parse_or_default(value: Option<&str>) -> Self {
        value
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    pub fn matches(self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::InProgress => !task.completed,
            TaskFilter::Completed => task.completed,
        }
    }

    pub fn next(self) -> Self {
        match self {
            TaskFilter::All => TaskFilter::InProgress,
            TaskFilter::InProgress => TaskFilter::Completed,
            TaskFilter::Completed => TaskFilter::All,
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskFilter {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TaskFilter::All),
            "inprogress" | "in-progress" | "in_progress" => Ok(TaskFilter::InProgress),
            "completed" | "done" => Ok(TaskFilter::Completed),
            _ => Err(Error::InvalidFilter(value.to_string())),
        }
    }
}

/// Trim and collapse every whitespace run to a single space.
pub fn normalize_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Validate raw input and return its normalized form.
///
/// Uniqueness is not checked here since it needs the collection.
pub fn validate_text(raw: &str) -> Result<String> {
    if raw.is_empty() {
        return Err(Error::EmptyInput);
    }
    let text = normalize_text(raw);
    if text.is_empty() {
        return Err(Error::BlankInput);
    }
    let len = text.chars().count();
    if len > MAX_TASK_LEN {
        return Err(Error::too_long(len));
    }
    Ok(text)
}
