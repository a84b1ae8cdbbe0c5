use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::app::{ActionOutcome, Presenter, TodoApp};
use crate::config::Config;
use crate::confirm::Decision;
use crate::error::Result;
use crate::notification::{Notification, NotificationChannel, Severity};
use crate::storage::FileStore;
use crate::task::TaskFilter;
use crate::view::ViewModel;

use super::input::{InputAction, LineInput};
use super::view;

const EVENT_POLL_MS: u64 = 120;
const WATCH_DEBOUNCE_MS: u64 = 200;

pub struct TuiOptions {
    pub store: FileStore,
    pub config: Config,
}

enum UiMsg {
    StoreChanged,
    WatchError(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    List,
    Input,
    Edit(u64),
}

/// Presenter that keeps the latest view for the draw pass.
pub(crate) struct TuiPresenter {
    pub(crate) view: ViewModel,
    pub(crate) notifications: NotificationChannel,
    pub(crate) prompt: Option<String>,
    input_reset: bool,
}

impl TuiPresenter {
    fn new(timeout: Duration) -> Self {
        Self {
            view: ViewModel::default(),
            notifications: NotificationChannel::new(timeout),
            prompt: None,
            input_reset: false,
        }
    }

    fn take_input_reset(&mut self) -> bool {
        std::mem::take(&mut self.input_reset)
    }
}

impl Presenter for TuiPresenter {
    fn render(&mut self, view: &ViewModel) {
        self.view = view.clone();
    }

    fn notify(&mut self, message: &str, severity: Severity) {
        self.notifications.post(message, severity);
    }

    fn confirm(&mut self, prompt: &str) {
        self.prompt = Some(prompt.to_string());
    }

    fn dismiss_confirm(&mut self) {
        self.prompt = None;
    }

    fn reset_input(&mut self) {
        self.input_reset = true;
    }
}

pub struct AppState {
    app: TodoApp<FileStore, TuiPresenter>,
    pub(crate) mode: Mode,
    pub(crate) selected: usize,
    pub(crate) input: LineInput,
    pub(crate) draft: LineInput,
    pub(crate) dim_completed: bool,
    watch_error: Option<String>,
}

impl AppState {
    fn new(options: TuiOptions) -> Self {
        let timeout = Duration::from_millis(options.config.notifications.timeout_ms);
        Self {
            app: TodoApp::new(options.store, TuiPresenter::new(timeout)),
            mode: Mode::List,
            selected: 0,
            input: LineInput::new(),
            draft: LineInput::new(),
            dim_completed: options.config.ui.dim_completed,
            watch_error: None,
        }
    }

    pub(crate) fn view(&self) -> &ViewModel {
        &self.app.presenter().view
    }

    pub(crate) fn prompt(&self) -> Option<&str> {
        self.app.presenter().prompt.as_deref()
    }

    pub(crate) fn notification(&self, now: Instant) -> Option<&Notification> {
        self.app.presenter().notifications.visible(now)
    }

    pub(crate) fn watch_error(&self) -> Option<&str> {
        self.watch_error.as_deref()
    }

    pub(crate) fn footer_hint(&self) -> &'static str {
        if self.prompt().is_some() {
            return "y/enter confirm  n/esc cancel";
        }
        match self.mode {
            // Nothing to toggle, edit, delete or clear on an empty list.
            Mode::List if self.view().empty_state => "a add  1-3/tab filter  r reload  q quit",
            Mode::List => {
                "a add  space toggle  e edit  d delete  c clear  1-3/tab filter  r reload  q quit"
            }
            Mode::Input => "enter add  esc back  ctrl-u clear",
            Mode::Edit(_) => "enter save  esc cancel  ctrl-u clear",
        }
    }

    fn selected_id(&self) -> Option<u64> {
        self.view().tasks.get(self.selected).map(|row| row.id)
    }

    fn clamp_selection(&mut self) {
        let len = self.view().tasks.len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.view().tasks.len();
        if len == 0 {
            return;
        }
        let next = self.selected as isize + delta;
        self.selected = next.clamp(0, len as isize - 1) as usize;
    }

    fn refresh(&mut self) {
        self.app.render_all();
        self.clamp_selection();
    }

    fn expire_notification(&mut self, now: Instant) -> bool {
        self.app.presenter_mut().notifications.expire(now)
    }

    /// Errors were already reported through the presenter.
    fn settle(&mut self, result: Result<ActionOutcome>) -> bool {
        self.clamp_selection();
        match result {
            Ok(outcome) => {
                tracing::debug!(message = %outcome.message, changed = outcome.changed, "ui action");
                true
            }
            Err(err) => {
                tracing::debug!(error = %err, "ui action rejected");
                false
            }
        }
    }

    fn submit_input(&mut self) {
        let text = self.input.value().to_string();
        let result = self.app.submit_task(&text);
        if self.settle(result) {
            if self.app.presenter_mut().take_input_reset() {
                self.input.clear();
            }
            self.selected = self.view().tasks.len().saturating_sub(1);
        } else {
            self.input.clear();
            self.input.mark_invalid();
        }
    }

    fn begin_edit(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let result = self.app.request_edit(id);
        if self.settle(result) {
            let draft = self
                .app
                .editing()
                .map(|session| session.draft().to_string())
                .unwrap_or_default();
            self.draft.set(&draft);
            self.mode = Mode::Edit(id);
        }
    }

    fn resolve(&mut self, decision: Decision) {
        let result = self.app.resolve(decision);
        self.settle(result);
        // A failed save keeps the row in edit mode.
        self.mode = match (self.mode, self.app.editing()) {
            (Mode::Edit(_), Some(session)) => Mode::Edit(session.task_id()),
            (Mode::Edit(_), None) => Mode::List,
            (mode, _) => mode,
        };
    }

    fn change_filter(&mut self, filter: TaskFilter) {
        let result = self.app.change_filter(filter);
        if self.settle(result) {
            self.selected = 0;
        }
    }
}

pub fn run(options: TuiOptions) -> Result<()> {
    let (ui_tx, ui_rx) = mpsc::channel();
    spawn_watch(options.store.path().to_path_buf(), ui_tx);

    let mut app = AppState::new(options);
    app.refresh();
    run_terminal(&mut app, ui_rx)
}

fn run_terminal(app: &mut AppState, ui_rx: Receiver<UiMsg>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app, ui_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    ui_rx: Receiver<UiMsg>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        while let Ok(msg) = ui_rx.try_recv() {
            handle_ui_msg(app, msg);
            dirty = true;
        }

        if app.expire_notification(Instant::now()) {
            dirty = true;
        }

        if dirty {
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_ui_msg(app: &mut AppState, msg: UiMsg) {
    match msg {
        UiMsg::StoreChanged => {
            tracing::debug!("store changed on disk");
            app.refresh();
        }
        UiMsg::WatchError(err) => {
            app.watch_error = Some(format!("watch error: {err}"));
        }
    }
}

/// Returns true when the UI should exit.
fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if app.prompt().is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => app.resolve(Decision::Confirm),
            KeyCode::Char('n') | KeyCode::Esc => app.resolve(Decision::Cancel),
            _ => {}
        }
        return false;
    }

    match app.mode {
        Mode::Input => handle_input_key(app, key),
        Mode::Edit(id) => handle_edit_key(app, id, key),
        Mode::List => return handle_list_key(app, key),
    }
    false
}

fn handle_input_key(app: &mut AppState, key: KeyEvent) {
    match app.input.handle_key(key) {
        InputAction::Submit => app.submit_input(),
        InputAction::Leave => app.mode = Mode::List,
        InputAction::None => {}
    }
}

fn handle_edit_key(app: &mut AppState, id: u64, key: KeyEvent) {
    match app.draft.handle_key(key) {
        InputAction::Submit => {
            let text = app.draft.value().to_string();
            let result = app.app.request_save(id, &text);
            if !app.settle(result) {
                app.draft.mark_invalid();
            }
        }
        InputAction::Leave => {
            let result = app.app.cancel_edit(id);
            app.settle(result);
            app.mode = Mode::List;
        }
        InputAction::None => {
            let text = app.draft.value().to_string();
            let result = app.app.set_draft(&text);
            app.settle(result);
        }
    }
}

fn handle_list_key(app: &mut AppState, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('a') | KeyCode::Char('i') => app.mode = Mode::Input,
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1),
        KeyCode::Char(' ') | KeyCode::Char('x') => {
            if let Some(id) = app.selected_id() {
                let result = app.app.toggle_completion(id);
                app.settle(result);
            }
        }
        KeyCode::Char('e') | KeyCode::Enter => app.begin_edit(),
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(id) = app.selected_id() {
                let result = app.app.request_delete(id);
                app.settle(result);
            }
        }
        KeyCode::Char('c') if !app.view().empty_state => {
            let result = app.app.request_clear();
            app.settle(result);
        }
        KeyCode::Char(ch @ '1'..='3') => {
            let idx = ch as usize - '1' as usize;
            app.change_filter(TaskFilter::MODES[idx]);
        }
        KeyCode::Tab => {
            let next = app.view().filter.next();
            app.change_filter(next);
        }
        KeyCode::Char('r') => app.refresh(),
        _ => {}
    }
    false
}

fn is_store_event(event: &notify::Event, store: &Path) -> bool {
    let name = store.file_name();
    event
        .paths
        .iter()
        .any(|path| path == store || (name.is_some() && path.file_name() == name))
}

fn spawn_watch(store: PathBuf, ui_tx: Sender<UiMsg>) {
    let dir = match store.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !dir.exists() {
        return;
    }

    thread::spawn(move || {
        let (event_tx, event_rx) = mpsc::channel();
        let watcher: notify::Result<RecommendedWatcher> = notify::recommended_watcher(move |res| {
            let _ = event_tx.send(res);
        });

        let mut watcher = match watcher {
            Ok(watcher) => watcher,
            Err(err) => {
                let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
                return;
            }
        };

        // Writes replace the file by rename, so watch the directory.
        if let Err(err) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
            let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
            return;
        }

        let debounce = Duration::from_millis(WATCH_DEBOUNCE_MS);
        let mut pending: Option<Instant> = None;

        loop {
            let timeout = pending
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(Duration::from_secs(3600));
            match event_rx.recv_timeout(timeout) {
                Ok(Ok(event)) => {
                    if is_store_event(&event, &store) {
                        pending = Some(Instant::now() + debounce);
                    }
                }
                Ok(Err(err)) => {
                    let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if pending.take().is_some() && ui_tx.send(UiMsg::StoreChanged).is_err() {
                        break;
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
    });
}
