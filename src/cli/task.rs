//! Task commands: add, list, toggle, edit, rm, clear, filter, count.
//!
//! Every mutation goes through [`TodoApp`](crate::app::TodoApp) so the
//! shell gets the same validation, prompts and messages as the UI.

use std::path::PathBuf;

use serde::Serialize;

use crate::app::{ActionOutcome, TodoApp};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::storage::FileStore;
use crate::task::TaskFilter;
use crate::view::{TaskCounts, TaskRow, ViewModel};

use super::{ask_confirmation, CliPresenter, Context};

type CliApp = TodoApp<FileStore, CliPresenter>;

/// Flags shared by every subcommand
pub struct GlobalOptions {
    pub store: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl GlobalOptions {
    fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }

    fn app(&self) -> Result<CliApp> {
        Ok(Context::load(self.store.clone(), self.config.clone())?.into_app())
    }
}

pub struct AddOptions {
    pub text: Vec<String>,
    pub global: GlobalOptions,
}

pub struct ListOptions {
    pub filter: Option<String>,
    pub global: GlobalOptions,
}

pub struct ToggleOptions {
    pub id: u64,
    pub global: GlobalOptions,
}

pub struct EditOptions {
    pub id: u64,
    pub text: Vec<String>,
    pub yes: bool,
    pub global: GlobalOptions,
}

pub struct RmOptions {
    pub id: u64,
    pub yes: bool,
    pub global: GlobalOptions,
}

pub struct ClearOptions {
    pub scope: Option<String>,
    pub yes: bool,
    pub global: GlobalOptions,
}

pub struct FilterOptions {
    pub mode: Option<String>,
    pub global: GlobalOptions,
}

pub struct CountOptions {
    pub filter: Option<String>,
    pub global: GlobalOptions,
}

#[derive(Serialize)]
struct ActionReport<'a> {
    changed: bool,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    task_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<TaskRow>,
    count_message: &'a str,
    counts: TaskCounts,
}

#[derive(Serialize)]
struct FilterOutput<'a> {
    filter: TaskFilter,
    count_message: &'a str,
}

#[derive(Serialize)]
struct CountOutput<'a> {
    filter: TaskFilter,
    count: usize,
    message: &'a str,
    counts: TaskCounts,
}

fn parse_filter(value: Option<&str>) -> Result<Option<TaskFilter>> {
    value.map(str::parse).transpose()
}

fn join_text(words: &[String]) -> String {
    words.join(" ")
}

fn format_row(row: &TaskRow) -> String {
    let mark = if row.completed { "x" } else { " " };
    format!("[{mark}] {} {}", row.id, row.text)
}

/// Answer the pending prompt (or assume yes) and apply the decision.
fn confirm_pending(app: &mut CliApp, yes: bool) -> Result<ActionOutcome> {
    let prompt = app.pending_prompt().unwrap_or_default().to_string();
    let decision = ask_confirmation(&prompt, yes)?;
    app.resolve(decision)
}

fn emit_outcome(
    global: &GlobalOptions,
    command: &str,
    app: &mut CliApp,
    outcome: &ActionOutcome,
) -> Result<()> {
    let view = match app.presenter().last_view() {
        Some(view) => view.clone(),
        None => app.view(None),
    };
    let task = outcome.task_id.and_then(|id| view.row(id).cloned());

    let mut human = HumanOutput::new(outcome.message.clone());
    if let Some(task) = task.as_ref() {
        human.push_summary("ID", task.id.to_string());
        human.push_summary("Text", task.text.clone());
        let state = if task.completed { "completed" } else { "in progress" };
        human.push_summary("Status", state);
    }
    human.push_summary("Count", view.count_message.clone());

    let report = ActionReport {
        changed: outcome.changed,
        message: &outcome.message,
        task_id: outcome.task_id,
        task,
        count_message: &view.count_message,
        counts: view.counts,
    };
    emit_success(global.output(), command, &report, Some(&human))
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let mut app = options.global.app()?;
    let outcome = app.submit_task(&join_text(&options.text))?;
    emit_outcome(&options.global, "add", &mut app, &outcome)
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let filter = parse_filter(options.filter.as_deref())?;
    let mut app = options.global.app()?;
    let view: ViewModel = app.view(filter);

    let mut human = HumanOutput::new(view.count_message.clone());
    human.push_summary("Filter", view.filter.label());
    for row in &view.tasks {
        human.push_detail(format_row(row));
    }
    for problem in app.presenter().problems() {
        human.push_warning(problem);
    }
    if view.empty_state {
        human.push_next_step("todohub add <text>");
    }

    emit_success(options.global.output(), "list", &view, Some(&human))
}

pub fn run_toggle(options: ToggleOptions) -> Result<()> {
    let mut app = options.global.app()?;
    let outcome = app.toggle_completion(options.id)?;
    if !outcome.changed {
        return Err(Error::TaskNotFound(options.id));
    }
    emit_outcome(&options.global, "toggle", &mut app, &outcome)
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let mut app = options.global.app()?;
    app.request_edit(options.id)?;
    app.request_save(options.id, &join_text(&options.text))?;
    let outcome = confirm_pending(&mut app, options.yes)?;
    emit_outcome(&options.global, "edit", &mut app, &outcome)
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let mut app = options.global.app()?;
    app.request_delete(options.id)?;
    let outcome = confirm_pending(&mut app, options.yes)?;
    emit_outcome(&options.global, "rm", &mut app, &outcome)
}

pub fn run_clear(options: ClearOptions) -> Result<()> {
    let scope = parse_filter(options.scope.as_deref())?;
    let mut app = options.global.app()?;
    match scope {
        Some(scope) => app.request_clear_scope(scope)?,
        None => app.request_clear()?,
    };
    let outcome = confirm_pending(&mut app, options.yes)?;
    emit_outcome(&options.global, "clear", &mut app, &outcome)
}

pub fn run_filter(options: FilterOptions) -> Result<()> {
    let mode = parse_filter(options.mode.as_deref())?;
    let mut app = options.global.app()?;

    let header = match mode {
        Some(filter) => {
            app.change_filter(filter)?;
            format!("Filter set to {}", filter.label())
        }
        None => format!("Filter: {}", app.repository().filter()?.label()),
    };
    let view = app.view(None);

    let mut human = HumanOutput::new(header);
    human.push_summary("Count", view.count_message.clone());
    let output = FilterOutput {
        filter: view.filter,
        count_message: &view.count_message,
    };
    emit_success(options.global.output(), "filter", &output, Some(&human))
}

pub fn run_count(options: CountOptions) -> Result<()> {
    let filter = parse_filter(options.filter.as_deref())?;
    let mut app = options.global.app()?;
    let view = app.view(filter);

    let output = CountOutput {
        filter: view.filter,
        count: view.counts.for_filter(view.filter),
        message: &view.count_message,
        counts: view.counts,
    };
    let mut human = HumanOutput::new(view.count_message.clone());
    for problem in app.presenter().problems() {
        human.push_warning(problem);
    }
    emit_success(options.global.output(), "count", &output, Some(&human))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_show_completion_mark() {
        let open = TaskRow {
            id: 1,
            text: "Buy milk".into(),
            completed: false,
        };
        let done = TaskRow {
            id: 2,
            text: "Walk dog".into(),
            completed: true,
        };
        assert_eq!(format_row(&open), "[ ] 1 Buy milk");
        assert_eq!(format_row(&done), "[x] 2 Walk dog");
    }

    #[test]
    fn filter_argument_is_strict() {
        assert_eq!(parse_filter(None).unwrap(), None);
        assert_eq!(
            parse_filter(Some("in-progress")).unwrap(),
            Some(TaskFilter::InProgress)
        );
        assert!(matches!(
            parse_filter(Some("someday")),
            Err(Error::InvalidFilter(_))
        ));
    }
}
