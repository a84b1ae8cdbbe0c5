//! Task repository: validated mutations of the persisted collection.
//!
//! Every operation loads a fresh [`Snapshot`], validates, mutates the
//! working copy and writes it back in one batch. Validation always runs
//! before anything is written.

use crate::error::{Error, Result};
use crate::storage::{
    load_filter, load_tasks, KeyValueStore, Snapshot, COUNTER_KEY, FILTER_KEY, TASKS_KEY,
};
use crate::task::{normalize_text, validate_text, Task, TaskFilter};

/// Case-insensitive match of the normalized `text` against `tasks`,
/// skipping `exclude`.
pub fn exists_by_text(tasks: &[Task], text: &str, exclude: Option<u64>) -> bool {
    let text = normalize_text(text);
    tasks
        .iter()
        .any(|task| Some(task.id) != exclude && task.same_text(&text))
}

/// Next id to hand out.
///
/// Normally `counter + 1`; the highest stored id wins if the counter was
/// lost or edited by hand.
pub fn next_id(snapshot: &Snapshot) -> Result<u64> {
    let highest = snapshot.tasks.iter().map(|task| task.id).max().unwrap_or(0);
    snapshot
        .counter
        .max(highest)
        .checked_add(1)
        .ok_or_else(|| Error::CorruptStore {
            key: COUNTER_KEY.to_string(),
            reason: "task id space exhausted".to_string(),
        })
}

#[derive(Debug)]
pub struct TaskRepository<S> {
    store: S,
}

impl<S: KeyValueStore> TaskRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn load(&self) -> Result<Snapshot> {
        Snapshot::load(&self.store)
    }

    pub fn exists_by_text(&self, text: &str, exclude: Option<u64>) -> Result<bool> {
        Ok(exists_by_text(&self.load()?.tasks, text, exclude))
    }

    fn validate_new(snapshot: &Snapshot, raw: &str, exclude: Option<u64>) -> Result<String> {
        let text = validate_text(raw)?;
        if exists_by_text(&snapshot.tasks, &text, exclude) {
            return Err(Error::DuplicateTask(text));
        }
        Ok(text)
    }

    /// Append a new task and reset the filter to `all`.
    pub fn create(&mut self, raw: &str) -> Result<Task> {
        let mut snapshot = self.load()?;
        let text = Self::validate_new(&snapshot, raw, None)?;

        let task = Task::new(next_id(&snapshot)?, text);
        snapshot.counter = task.id;
        snapshot.filter = TaskFilter::All;
        snapshot.tasks.push(task.clone());

        self.store.commit(&[
            snapshot.tasks_change()?,
            snapshot.counter_change(),
            snapshot.filter_change(),
        ])?;
        tracing::debug!(id = task.id, "task created");
        Ok(task)
    }

    /// Check that `raw` may replace the text of task `id`.
    ///
    /// Returns the normalized text without writing anything.
    pub fn validate_update(&self, id: u64, raw: &str) -> Result<String> {
        let snapshot = self.load()?;
        if snapshot.find(id).is_none() {
            return Err(Error::TaskNotFound(id));
        }
        Self::validate_new(&snapshot, raw, Some(id))
    }

    pub fn update(&mut self, id: u64, raw: &str) -> Result<Task> {
        let mut snapshot = self.load()?;
        if snapshot.find(id).is_none() {
            return Err(Error::TaskNotFound(id));
        }
        let text = Self::validate_new(&snapshot, raw, Some(id))?;

        let task = snapshot.find_mut(id).ok_or(Error::TaskNotFound(id))?;
        task.text = text;
        let updated = task.clone();

        self.store.commit(&[snapshot.tasks_change()?])?;
        tracing::debug!(id, "task updated");
        Ok(updated)
    }

    /// Flip `completed`; an unknown id changes nothing.
    pub fn toggle_completion(&mut self, id: u64) -> Result<Option<Task>> {
        let mut snapshot = self.load()?;
        let Some(task) = snapshot.find_mut(id) else {
            tracing::debug!(id, "toggle ignored: no such task");
            return Ok(None);
        };
        task.completed = !task.completed;
        let toggled = task.clone();

        self.store.commit(&[snapshot.tasks_change()?])?;
        Ok(Some(toggled))
    }

    /// Drop the task with `id`; others keep their ids and order.
    pub fn remove(&mut self, id: u64) -> Result<Option<Task>> {
        let mut snapshot = self.load()?;
        let Some(pos) = snapshot.tasks.iter().position(|task| task.id == id) else {
            return Ok(None);
        };
        let removed = snapshot.tasks.remove(pos);

        self.store.commit(&[snapshot.tasks_change()?])?;
        tracing::debug!(id, "task removed");
        Ok(Some(removed))
    }

    /// Remove the tasks in `scope` and return how many went.
    ///
    /// `All` deletes the task and counter keys outright, so ids start
    /// again from 1. It does not need to parse the stored tasks, which
    /// makes it the way out of a corrupt store.
    pub fn clear(&mut self, scope: TaskFilter) -> Result<usize> {
        if scope == TaskFilter::All {
            let before = load_tasks(&self.store).map(|tasks| tasks.len()).unwrap_or(0);
            self.store.commit(&[(TASKS_KEY, None), (COUNTER_KEY, None)])?;
            tracing::debug!(removed = before, "all tasks cleared");
            return Ok(before);
        }

        let mut snapshot = self.load()?;
        let before = snapshot.tasks.len();
        // Clearing a scope keeps the tasks outside it.
        snapshot.tasks.retain(|task| !scope.matches(task));
        let removed = before - snapshot.tasks.len();
        self.store.commit(&[snapshot.tasks_change()?])?;
        tracing::debug!(removed, scope = %scope, "tasks cleared");
        Ok(removed)
    }

    pub fn filter(&self) -> Result<TaskFilter> {
        load_filter(&self.store)
    }

    pub fn set_filter(&mut self, filter: TaskFilter) -> Result<()> {
        self.store
            .commit(&[(FILTER_KEY, Some(filter.as_str().to_string()))])
    }
}
