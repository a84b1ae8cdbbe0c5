//! todohub - persistent to-do list library
//!
//! This library provides the task engine behind the `todohub` CLI and
//! its terminal UI.
//!
//! # Core Concepts
//!
//! - **Tasks**: `{id, text, completed}` records kept in one ordered list
//! - **Store**: a flat key-value store (`tasks`, `taskIdCounter`,
//!   `statusFilter`), file-backed with locking and atomic writes
//! - **Filters**: all / in progress / completed views with count messages
//! - **Confirmations**: delete, save and clear wait for an explicit yes
//! - **Notifications**: one transient, severity-colored message at a time
//!
//! # Module Organization
//!
//! - `app`: Coordinator that runs actions and re-renders through a presenter
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `config.toml`
//! - `confirm`: Single-slot confirmation gate
//! - `edit`: Per-task edit session
//! - `error`: Error types and result aliases
//! - `lock`: File locking and atomic writes
//! - `notification`: Transient message channel
//! - `output`: Human and JSON output for CLI commands
//! - `repository`: Task CRUD over the key-value store
//! - `storage`: Key-value store trait, memory and file backends
//! - `task`: Task record, filter modes and text validation
//! - `ui`: Terminal UI
//! - `view`: Filtering, counts and the view model

pub mod app;
pub mod cli;
pub mod config;
pub mod confirm;
pub mod edit;
pub mod error;
pub mod lock;
pub mod notification;
pub mod output;
pub mod repository;
pub mod storage;
pub mod task;
pub mod ui;
pub mod view;

pub use error::{Error, Result};
