//! Application service: the render coordinator and the action surface.
//!
//! [`TodoApp`] owns the repository, the confirmation gate and the edit
//! session, and talks to the outside world only through a [`Presenter`].
//! Each action is its own error boundary: a failure is reported through
//! `notify`, logged, and handed back as a value.

use crate::confirm::{ConfirmGate, Decision, PendingAction};
use crate::edit::EditSession;
use crate::error::{Error, Result};
use crate::notification::Severity;
use crate::repository::TaskRepository;
use crate::storage::KeyValueStore;
use crate::task::TaskFilter;
use crate::view::{EditingView, ViewModel};

const MSG_ADDED: &str = "Task added successfully";
const MSG_UPDATED: &str = "Task updated successfully!";
const MSG_DELETED: &str = "Task deleted successfully";
const MSG_DELETE_CANCELED: &str = "Task deletion canceled";
const MSG_SAVE_CANCELED: &str = "Task saving canceled";
const MSG_CLEAR_CANCELED: &str = "Task clearing canceled";
const MSG_PARSE_FAILED: &str = "Failed to parse tasks from storage";

/// Output side of the application: drawing, messages and prompts.
pub trait Presenter {
    fn render(&mut self, view: &ViewModel);

    fn notify(&mut self, message: &str, severity: Severity);

    /// Show a yes/no prompt. The answer comes back through
    /// [`TodoApp::resolve`].
    fn confirm(&mut self, prompt: &str);

    fn dismiss_confirm(&mut self) {}

    /// A task was added: clear the new-task input and focus it.
    fn reset_input(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub changed: bool,
    pub message: String,
    pub task_id: Option<u64>,
}

impl ActionOutcome {
    fn changed(message: impl Into<String>, task_id: Option<u64>) -> Self {
        Self {
            changed: true,
            message: message.into(),
            task_id,
        }
    }

    fn unchanged(message: impl Into<String>, task_id: Option<u64>) -> Self {
        Self {
            changed: false,
            message: message.into(),
            task_id,
        }
    }
}

/// Every user action the presentation layer can raise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Submit(String),
    RequestEdit(u64),
    SetDraft(String),
    RequestSave(u64, String),
    CancelEdit(u64),
    RequestDelete(u64),
    Toggle(u64),
    ChangeFilter(TaskFilter),
    RequestClear,
    Resolve(Decision),
    Refresh,
}

/// Label used in "<Scope> tasks cleared!"
fn scope_label(scope: TaskFilter) -> String {
    let name = scope.as_str();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub struct TodoApp<S, P> {
    repo: TaskRepository<S>,
    presenter: P,
    gate: ConfirmGate,
    edit: Option<EditSession>,
}

impl<S: KeyValueStore, P: Presenter> TodoApp<S, P> {
    pub fn new(store: S, presenter: P) -> Self {
        Self {
            repo: TaskRepository::new(store),
            presenter,
            gate: ConfirmGate::new(),
            edit: None,
        }
    }

    pub fn repository(&self) -> &TaskRepository<S> {
        &self.repo
    }

    pub fn store(&self) -> &S {
        self.repo.store()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    pub fn pending_prompt(&self) -> Option<&str> {
        self.gate.prompt()
    }

    /// True while an edit or a confirmation blocks other controls.
    pub fn is_locked(&self) -> bool {
        self.edit.is_some() || self.gate.is_pending()
    }

    /// Load, filter, count and hand the result to the presenter.
    ///
    /// A store that cannot be read renders as empty and raises an error
    /// notification instead of failing.
    pub fn render_all(&mut self) -> ViewModel {
        let view = self.view(None);
        self.presenter.render(&view);
        view
    }

    /// Build the view model without drawing it. `filter` overrides the
    /// persisted filter for this one view and is not saved.
    pub fn view(&mut self, filter: Option<TaskFilter>) -> ViewModel {
        let (tasks, persisted) = match self.repo.load() {
            Ok(snapshot) => (snapshot.tasks, snapshot.filter),
            Err(err) => {
                tracing::warn!(error = %err, "could not load tasks for render");
                self.presenter.notify(MSG_PARSE_FAILED, Severity::Error);
                (Vec::new(), self.repo.filter().unwrap_or_default())
            }
        };

        let mut view = ViewModel::build(&tasks, filter.unwrap_or(persisted));
        view.editing = self.edit.as_ref().map(|session| EditingView {
            task_id: session.task_id(),
            draft: session.draft().to_string(),
        });
        view.pending_prompt = self.gate.prompt().map(str::to_string);
        view.controls_locked = self.is_locked();
        view
    }

    pub fn dispatch(&mut self, action: Action) -> Result<ActionOutcome> {
        match action {
            Action::Submit(text) => self.submit_task(&text),
            Action::RequestEdit(id) => self.request_edit(id),
            Action::SetDraft(text) => self.set_draft(&text),
            Action::RequestSave(id, text) => self.request_save(id, &text),
            Action::CancelEdit(id) => self.cancel_edit(id),
            Action::RequestDelete(id) => self.request_delete(id),
            Action::Toggle(id) => self.toggle_completion(id),
            Action::ChangeFilter(filter) => self.change_filter(filter),
            Action::RequestClear => self.request_clear(),
            Action::Resolve(decision) => self.resolve(decision),
            Action::Refresh => {
                self.render_all();
                Ok(ActionOutcome::unchanged("refreshed", None))
            }
        }
    }

    fn fail<T>(&mut self, op: &str, err: Error) -> Result<T> {
        tracing::warn!(op, error = %err, "action failed");
        self.presenter.notify(&err.user_message(op), err.severity());
        Err(err)
    }

    fn ensure_idle(&self) -> Result<()> {
        if self.gate.is_pending() {
            return Err(Error::ConfirmationPending);
        }
        if let Some(session) = self.edit.as_ref() {
            return Err(Error::EditInProgress(session.task_id()));
        }
        Ok(())
    }

    fn ensure_editing(&self, id: u64) -> Result<()> {
        if self.gate.is_pending() {
            return Err(Error::ConfirmationPending);
        }
        match self.edit.as_ref() {
            Some(session) if session.task_id() == id => Ok(()),
            Some(session) => Err(Error::EditInProgress(session.task_id())),
            None => Err(Error::NotEditing(id)),
        }
    }

    pub fn submit_task(&mut self, raw: &str) -> Result<ActionOutcome> {
        let created = self.ensure_idle().and_then(|()| self.repo.create(raw));
        match created {
            Ok(task) => {
                self.presenter.notify(MSG_ADDED, Severity::Success);
                self.render_all();
                self.presenter.reset_input();
                Ok(ActionOutcome::changed(MSG_ADDED, Some(task.id)))
            }
            Err(err) => self.fail("add task", err),
        }
    }

    /// Enter edit mode for `id`; completed tasks cannot be edited.
    pub fn request_edit(&mut self, id: u64) -> Result<ActionOutcome> {
        let opened = self.ensure_idle().and_then(|()| {
            let snapshot = self.repo.load()?;
            let task = snapshot.find(id).ok_or(Error::TaskNotFound(id))?;
            if task.completed {
                return Err(Error::EditOnCompletedTask(id));
            }
            Ok(EditSession::begin(id, task.text.clone()))
        });
        match opened {
            Ok(session) => {
                self.edit = Some(session);
                self.render_all();
                Ok(ActionOutcome::unchanged(format!("editing task {id}"), Some(id)))
            }
            Err(err) => self.fail("edit task", err),
        }
    }

    /// Update the draft of the open edit session.
    pub fn set_draft(&mut self, text: &str) -> Result<ActionOutcome> {
        match self.edit.as_mut() {
            Some(session) => {
                session.set_draft(text);
                Ok(ActionOutcome::unchanged("draft updated", Some(session.task_id())))
            }
            None => Err(Error::InvalidArgument("no task is being edited".to_string())),
        }
    }

    /// Validate the new text and ask for confirmation before saving.
    ///
    /// A validation failure keeps the task in edit mode.
    pub fn request_save(&mut self, id: u64, raw: &str) -> Result<ActionOutcome> {
        let validated = self
            .ensure_editing(id)
            .and_then(|()| self.repo.validate_update(id, raw));
        let text = match validated {
            Ok(text) => text,
            Err(err) => return self.fail("save task", err),
        };

        if let Some(session) = self.edit.as_mut() {
            session.set_draft(&text);
        }
        let prompt = match self.gate.open(PendingAction::Save { id, text }) {
            Ok(prompt) => prompt.to_string(),
            Err(err) => return self.fail("save task", err),
        };
        self.presenter.confirm(&prompt);
        self.render_all();
        Ok(ActionOutcome::unchanged("awaiting confirmation", Some(id)))
    }

    /// Leave edit mode without saving; no confirmation needed.
    pub fn cancel_edit(&mut self, id: u64) -> Result<ActionOutcome> {
        if let Err(err) = self.ensure_editing(id) {
            return self.fail("cancel edit", err);
        }
        self.edit = None;
        self.render_all();
        Ok(ActionOutcome::unchanged("edit canceled", Some(id)))
    }

    pub fn request_delete(&mut self, id: u64) -> Result<ActionOutcome> {
        let checked = self.ensure_idle().and_then(|()| {
            let snapshot = self.repo.load()?;
            snapshot.find(id).map(|_| ()).ok_or(Error::TaskNotFound(id))
        });
        if let Err(err) = checked {
            return self.fail("delete task", err);
        }
        self.open_gate(PendingAction::Delete { id }, "delete task", Some(id))
    }

    /// Flip completion right away; an unknown id is a silent no-op.
    pub fn toggle_completion(&mut self, id: u64) -> Result<ActionOutcome> {
        let toggled = self
            .ensure_idle()
            .and_then(|()| self.repo.toggle_completion(id));
        match toggled {
            Ok(Some(task)) => {
                self.render_all();
                let state = if task.completed { "completed" } else { "in progress" };
                Ok(ActionOutcome::changed(
                    format!("task {id} marked {state}"),
                    Some(id),
                ))
            }
            Ok(None) => Ok(ActionOutcome::unchanged("no such task", Some(id))),
            Err(err) => self.fail("update task", err),
        }
    }

    pub fn change_filter(&mut self, filter: TaskFilter) -> Result<ActionOutcome> {
        let changed = self
            .ensure_idle()
            .and_then(|()| self.repo.set_filter(filter));
        match changed {
            Ok(()) => {
                self.render_all();
                Ok(ActionOutcome::changed(format!("filter: {filter}"), None))
            }
            Err(err) => self.fail("change filter", err),
        }
    }

    /// Ask to clear the tasks selected by the current filter.
    pub fn request_clear(&mut self) -> Result<ActionOutcome> {
        let scope = self.ensure_idle().and_then(|()| self.repo.filter());
        match scope {
            Ok(scope) => self.request_clear_scope(scope),
            Err(err) => self.fail("clear tasks", err),
        }
    }

    pub fn request_clear_scope(&mut self, scope: TaskFilter) -> Result<ActionOutcome> {
        if let Err(err) = self.ensure_idle() {
            return self.fail("clear tasks", err);
        }
        self.open_gate(PendingAction::Clear { scope }, "clear tasks", None)
    }

    fn open_gate(
        &mut self,
        action: PendingAction,
        op: &str,
        task_id: Option<u64>,
    ) -> Result<ActionOutcome> {
        let prompt = match self.gate.open(action) {
            Ok(prompt) => prompt.to_string(),
            Err(err) => return self.fail(op, err),
        };
        self.presenter.confirm(&prompt);
        self.render_all();
        Ok(ActionOutcome::unchanged("awaiting confirmation", task_id))
    }

    /// Answer the pending confirmation.
    ///
    /// Only the first answer counts; later ones find the gate empty.
    pub fn resolve(&mut self, decision: Decision) -> Result<ActionOutcome> {
        let Some((action, decision)) = self.gate.resolve(decision) else {
            tracing::debug!("confirmation already resolved");
            return Ok(ActionOutcome::unchanged("nothing to confirm", None));
        };
        self.presenter.dismiss_confirm();

        let result = match (action, decision) {
            (PendingAction::Delete { id }, Decision::Confirm) => self.commit_delete(id),
            (PendingAction::Delete { id }, Decision::Cancel) => {
                self.presenter.notify(MSG_DELETE_CANCELED, Severity::Canceled);
                Ok(ActionOutcome::unchanged(MSG_DELETE_CANCELED, Some(id)))
            }
            (PendingAction::Save { id, text }, Decision::Confirm) => self.commit_save(id, &text),
            (PendingAction::Save { id, .. }, Decision::Cancel) => {
                if let Some(session) = self.edit.as_mut() {
                    session.restore();
                }
                self.edit = None;
                self.presenter.notify(MSG_SAVE_CANCELED, Severity::Canceled);
                Ok(ActionOutcome::unchanged(MSG_SAVE_CANCELED, Some(id)))
            }
            (PendingAction::Clear { scope }, Decision::Confirm) => self.commit_clear(scope),
            (PendingAction::Clear { .. }, Decision::Cancel) => {
                self.presenter.notify(MSG_CLEAR_CANCELED, Severity::Canceled);
                Ok(ActionOutcome::unchanged(MSG_CLEAR_CANCELED, None))
            }
        };
        self.render_all();
        result
    }

    fn commit_delete(&mut self, id: u64) -> Result<ActionOutcome> {
        match self.repo.remove(id) {
            Ok(Some(_)) => {
                self.presenter.notify(MSG_DELETED, Severity::Success);
                Ok(ActionOutcome::changed(MSG_DELETED, Some(id)))
            }
            Ok(None) => self.fail("delete task", Error::TaskNotFound(id)),
            Err(err) => self.fail("delete task", err),
        }
    }

    fn commit_save(&mut self, id: u64, text: &str) -> Result<ActionOutcome> {
        match self.repo.update(id, text) {
            Ok(_) => {
                self.edit = None;
                self.presenter.notify(MSG_UPDATED, Severity::Success);
                Ok(ActionOutcome::changed(MSG_UPDATED, Some(id)))
            }
            // The session stays open so the user can retry or cancel.
            Err(err) => self.fail("save task", err),
        }
    }

    fn commit_clear(&mut self, scope: TaskFilter) -> Result<ActionOutcome> {
        match self.repo.clear(scope) {
            Ok(removed) => {
                let message = format!("{} tasks cleared!", scope_label(scope));
                self.presenter.notify(&message, Severity::Success);
                Ok(ActionOutcome {
                    changed: removed > 0 || scope == TaskFilter::All,
                    message,
                    task_id: None,
                })
            }
            Err(err) => self.fail("clear tasks", err),
        }
    }
}
