//! Filtered views, counts and the view model handed to presenters.

use serde::Serialize;

use crate::task::{Task, TaskFilter};

/// Tasks matching `filter`, in stored order.
pub fn filter_tasks(tasks: &[Task], filter: TaskFilter) -> Vec<&Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    pub total: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl TaskCounts {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            total: tasks.len(),
            in_progress: tasks.len() - completed,
            completed,
        }
    }

    pub fn for_filter(&self, filter: TaskFilter) -> usize {
        match filter {
            TaskFilter::All => self.total,
            TaskFilter::InProgress => self.in_progress,
            TaskFilter::Completed => self.completed,
        }
    }
}

/// Summary line for `filter`, picked from a fixed table by count.
pub fn count_message(tasks: &[Task], filter: TaskFilter) -> String {
    let counts = TaskCounts::from_tasks(tasks);
    let n = counts.for_filter(filter);
    match (filter, n) {
        (TaskFilter::All, 0) => "You have no tasks here!".to_string(),
        (TaskFilter::All, 1) => "You have a total of 1 task!".to_string(),
        (TaskFilter::All, n) => format!("You have a total of {n} tasks!"),
        (TaskFilter::InProgress, 0) => "You have no tasks to do!".to_string(),
        (TaskFilter::InProgress, 1) => "You have 1 task to do!".to_string(),
        (TaskFilter::InProgress, n) => format!("You have {n} tasks to do!"),
        (TaskFilter::Completed, 0) => "You have not completed any tasks!".to_string(),
        (TaskFilter::Completed, 1) => "You have completed 1 task!".to_string(),
        (TaskFilter::Completed, n) => format!("You have completed {n} tasks!"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskRow {
    pub id: u64,
    pub text: String,
    pub completed: bool,
}

impl From<&Task> for TaskRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            text: task.text.clone(),
            completed: task.completed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditingView {
    pub task_id: u64,
    pub draft: String,
}

/// Everything a presenter needs to draw the list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    pub filter: TaskFilter,
    pub count_message: String,
    pub counts: TaskCounts,
    pub tasks: Vec<TaskRow>,
    /// Driven by the unfiltered total, not by what the filter shows.
    pub empty_state: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editing: Option<EditingView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_prompt: Option<String>,
    /// Add, clear, filter and per-task controls are disabled.
    pub controls_locked: bool,
}

impl ViewModel {
    pub fn build(tasks: &[Task], filter: TaskFilter) -> Self {
        Self {
            filter,
            count_message: count_message(tasks, filter),
            counts: TaskCounts::from_tasks(tasks),
            tasks: filter_tasks(tasks, filter)
                .into_iter()
                .map(TaskRow::from)
                .collect(),
            empty_state: tasks.is_empty(),
            editing: None,
            pending_prompt: None,
            controls_locked: false,
        }
    }

    pub fn row(&self, id: u64) -> Option<&TaskRow> {
        self.tasks.iter().find(|row| row.id == id)
    }

    pub fn is_editing(&self, id: u64) -> bool {
        self.editing
            .as_ref()
            .map(|editing| editing.task_id == id)
            .unwrap_or(false)
    }
}
