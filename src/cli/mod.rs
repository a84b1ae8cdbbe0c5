//! Command-line interface for todohub
//!
//! This module defines the CLI structure using clap derive macros.
//! Task commands live in [`task`]; running without a subcommand opens
//! the terminal UI.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::{Presenter, TodoApp};
use crate::config::Config;
use crate::confirm::Decision;
use crate::error::Result;
use crate::notification::Severity;
use crate::storage::FileStore;
use crate::view::ViewModel;

mod task;

/// todohub - a small persistent to-do list
///
/// Add, edit, complete and clear tasks from the shell, or run without a
/// subcommand for the interactive list.
#[derive(Parser, Debug)]
#[command(name = "todohub")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the task store (defaults to the platform data dir)
    #[arg(long, global = true, env = "TODOHUB_STORE")]
    pub store: Option<PathBuf>,

    /// Path to the config file
    #[arg(long, global = true, env = "TODOHUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a new task
    Add {
        /// Task text (words are joined with single spaces)
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// List tasks
    #[command(alias = "ls")]
    List {
        /// Show all, inprogress or completed tasks without saving the choice
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Flip a task between in progress and completed
    Toggle {
        /// Task ID
        id: u64,
    },

    /// Replace the text of an in-progress task
    Edit {
        /// Task ID
        id: u64,

        /// New text
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        text: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete a task
    #[command(alias = "delete")]
    Rm {
        /// Task ID
        id: u64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Clear tasks (defaults to the saved filter)
    Clear {
        /// all, inprogress or completed
        #[arg(short, long)]
        scope: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show or set the saved filter
    Filter {
        /// all, inprogress or completed
        mode: Option<String>,
    },

    /// Print the count summary
    Count {
        /// all, inprogress or completed
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Open the interactive task list
    Tui,
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let global = task::GlobalOptions {
            store: self.store,
            config: self.config,
            json: self.json,
            quiet: self.quiet,
        };
        match self.command {
            None | Some(Commands::Tui) => {
                let ctx = Context::load(global.store, global.config)?;
                crate::ui::run(crate::ui::TuiOptions {
                    store: ctx.store,
                    config: ctx.config,
                })
            }
            Some(Commands::Add { text }) => task::run_add(task::AddOptions { text, global }),
            Some(Commands::List { filter }) => {
                task::run_list(task::ListOptions { filter, global })
            }
            Some(Commands::Toggle { id }) => task::run_toggle(task::ToggleOptions { id, global }),
            Some(Commands::Edit { id, text, yes }) => task::run_edit(task::EditOptions {
                id,
                text,
                yes,
                global,
            }),
            Some(Commands::Rm { id, yes }) => task::run_rm(task::RmOptions { id, yes, global }),
            Some(Commands::Clear { scope, yes }) => task::run_clear(task::ClearOptions {
                scope,
                yes,
                global,
            }),
            Some(Commands::Filter { mode }) => {
                task::run_filter(task::FilterOptions { mode, global })
            }
            Some(Commands::Count { filter }) => {
                task::run_count(task::CountOptions { filter, global })
            }
        }
    }
}

/// Resolved config and store for one invocation.
pub(crate) struct Context {
    pub store: FileStore,
    pub config: Config,
}

impl Context {
    pub(crate) fn load(store: Option<PathBuf>, config: Option<PathBuf>) -> Result<Self> {
        let config = Config::load_or_default(config.as_deref())?;
        let path = match store {
            Some(path) => path,
            None => config.store_path()?,
        };
        tracing::debug!(store = %path.display(), "resolved store");
        let store = FileStore::open(path).with_lock_timeout(config.store.lock_timeout_ms);
        Ok(Self { store, config })
    }

    pub(crate) fn into_app(self) -> TodoApp<FileStore, CliPresenter> {
        TodoApp::new(self.store, CliPresenter::default())
    }
}

/// Collects what the app reports so a command can print it once.
#[derive(Debug, Default)]
pub struct CliPresenter {
    notes: Vec<(String, Severity)>,
    last_view: Option<ViewModel>,
}

impl CliPresenter {
    pub fn last_note(&self) -> Option<(&str, Severity)> {
        self.notes
            .last()
            .map(|(message, severity)| (message.as_str(), *severity))
    }

    /// Error and info messages, for warnings in human output.
    pub fn problems(&self) -> impl Iterator<Item = &str> {
        self.notes
            .iter()
            .filter(|(_, severity)| matches!(severity, Severity::Error | Severity::Info))
            .map(|(message, _)| message.as_str())
    }

    pub fn last_view(&self) -> Option<&ViewModel> {
        self.last_view.as_ref()
    }
}

impl Presenter for CliPresenter {
    fn render(&mut self, view: &ViewModel) {
        self.last_view = Some(view.clone());
    }

    fn notify(&mut self, message: &str, severity: Severity) {
        tracing::debug!(message, ?severity, "notification");
        self.notes.push((message.to_string(), severity));
    }

    fn confirm(&mut self, prompt: &str) {
        tracing::debug!(prompt, "confirmation requested");
    }
}

/// Ask `prompt` on stderr and read the answer from stdin.
///
/// Only `y` or `yes` confirms; anything else, including EOF, cancels.
pub(crate) fn ask_confirmation(prompt: &str, assume_yes: bool) -> Result<Decision> {
    if assume_yes {
        return Ok(Decision::Confirm);
    }
    let mut stderr = io::stderr();
    write!(stderr, "{prompt} [y/N] ")?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(Decision::from(parse_answer(&answer)))
}

fn parse_answer(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_yes_confirms() {
        assert!(parse_answer("y\n"));
        assert!(parse_answer(" YES "));
        assert!(!parse_answer(""));
        assert!(!parse_answer("n"));
        assert!(!parse_answer("yep"));
    }

    #[test]
    fn cli_parses_without_subcommand() {
        let cli = Cli::try_parse_from(["todohub"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn add_joins_words() {
        let cli = Cli::try_parse_from(["todohub", "add", "Buy", "milk"]).unwrap();
        match cli.command {
            Some(Commands::Add { text }) => assert_eq!(text, vec!["Buy", "milk"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn presenter_keeps_problems() {
        let mut presenter = CliPresenter::default();
        presenter.notify("Task added successfully", Severity::Success);
        presenter.notify("Failed to parse tasks from storage", Severity::Error);
        let problems: Vec<&str> = presenter.problems().collect();
        assert_eq!(problems, vec!["Failed to parse tasks from storage"]);
        assert_eq!(
            presenter.last_note(),
            Some(("Failed to parse tasks from storage", Severity::Error))
        );
    }
}
