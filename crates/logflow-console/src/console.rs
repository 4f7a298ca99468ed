//! Interactive dashboard for the LogFlow backend.
//!
//! A TUI that shows the live (or window-pinned) log list, the system
//! health badge, metrics panels, the time-travel comparison form, and an
//! AI assistant chat with slash commands.
//!
//! Launch with `logflow run`.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use logflow_client::ApiClient;
use logflow_core::{citation, report, LogId, ViewCoordinator};

use crate::app::{AppEvent, ChatMessage, ChatRole, DashboardState, Focus, Tab, TimeTravelForm};
use crate::config::ConsoleConfig;
use crate::sources::Sources;
use crate::views;

const TICK_RATE: Duration = Duration::from_millis(100);

/// The dashboard's interactive state: everything the key handler and the
/// renderer share beyond [`DashboardState`].
pub struct Console {
    pub client: ApiClient,
    pub config: ConsoleConfig,
    pub coordinator: Arc<ViewCoordinator>,
    pub state: DashboardState,
    pub tab: Tab,
    pub focus: Focus,
    pub form: TimeTravelForm,
    /// Current text in the assistant input field.
    pub input: String,
    /// Cursor position within the input field.
    pub cursor_pos: usize,
    /// Input history for up/down arrow navigation.
    pub history: Vec<String>,
    pub history_pos: Option<usize>,
    /// Round-robin position when cycling citations with `g`.
    citation_cursor: usize,
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl Console {
    fn new(
        client: ApiClient,
        config: ConsoleConfig,
        coordinator: Arc<ViewCoordinator>,
        tx: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            client,
            config,
            coordinator,
            state: DashboardState::new(),
            tab: Tab::TimeTravel,
            focus: Focus::Main,
            form: TimeTravelForm::default(),
            input: String::new(),
            cursor_pos: 0,
            history: Vec::new(),
            history_pos: None,
            citation_cursor: 0,
            tx,
        }
    }

    fn handle_event(&mut self, event: AppEvent) {
        if matches!(event, AppEvent::Comparison { .. }) {
            self.form.in_flight = false;
        }
        self.state.apply(event, &self.coordinator);
    }

    /// Handle a key press. Returns `true` when the console should exit.
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        match code {
            KeyCode::F(1) => self.tab = Tab::TimeTravel,
            KeyCode::F(2) => self.tab = Tab::Assistant,
            KeyCode::F(3) => self.tab = Tab::Metrics,
            KeyCode::F(4) => self.tab = Tab::Advanced,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Sidebar => Focus::Main,
                    Focus::Main => Focus::Sidebar,
                };
            }
            KeyCode::Esc => {
                self.coordinator.clear_window();
                self.state.window_cleared();
            }
            _ => {
                return match self.focus {
                    Focus::Sidebar => self.handle_sidebar_key(code),
                    Focus::Main => self.handle_main_key(code, modifiers),
                };
            }
        }
        false
    }

    fn handle_sidebar_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => {
                if let Some(i) = self.state.selected_log {
                    self.state.selected_log = Some(i.saturating_sub(1));
                } else if !self.state.logs.is_empty() {
                    self.state.selected_log = Some(0);
                }
            }
            KeyCode::Down => {
                if self.state.logs.is_empty() {
                    self.state.selected_log = None;
                } else {
                    let last = self.state.logs.len() - 1;
                    self.state.selected_log = Some(match self.state.selected_log {
                        Some(i) => (i + 1).min(last),
                        None => 0,
                    });
                }
            }
            KeyCode::Enter => {
                // Direct selection: the log-list path into the shared
                // highlight.
                if let Some(id) = self
                    .state
                    .selected_log
                    .and_then(|i| self.state.logs.get(i))
                    .and_then(|log| log.id.clone())
                {
                    self.coordinator.set_highlight(id);
                }
            }
            _ => {}
        }
        false
    }

    fn handle_main_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match self.tab {
            Tab::TimeTravel => self.handle_form_key(code),
            Tab::Assistant => self.handle_chat_key(code, modifiers),
            Tab::Metrics | Tab::Advanced => {}
        }
        false
    }

    fn handle_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Up => self.form.focus_prev(),
            KeyCode::Down => self.form.focus_next(),
            KeyCode::Backspace => self.form.backspace(),
            KeyCode::Enter => self.submit_compare(),
            KeyCode::Char(' ') => {
                self.form.toggle_meridiem();
            }
            KeyCode::Char('g') => self.cite_from_comparison(),
            KeyCode::Char('e') => self.export_comparison(),
            KeyCode::Char(c) => {
                // Typing on a meridiem field flips it instead.
                if !self.form.insert(c) {
                    self.form.toggle_meridiem();
                }
            }
            _ => {}
        }
    }

    fn handle_chat_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        if code == KeyCode::Char('g') && modifiers.contains(KeyModifiers::CONTROL) {
            self.cite_from_chat();
            return;
        }
        match code {
            KeyCode::Char(c) => {
                self.input.insert(
                    self.input
                        .char_indices()
                        .map(|(i, _)| i)
                        .nth(self.cursor_pos)
                        .unwrap_or(self.input.len()),
                    c,
                );
                self.cursor_pos += 1;
            }
            KeyCode::Backspace => {
                if self.cursor_pos > 0 {
                    let idx = self
                        .input
                        .char_indices()
                        .map(|(i, _)| i)
                        .nth(self.cursor_pos - 1)
                        .unwrap_or(0);
                    self.input.remove(idx);
                    self.cursor_pos -= 1;
                }
            }
            KeyCode::Left => {
                self.cursor_pos = self.cursor_pos.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.cursor_pos < self.input.chars().count() {
                    self.cursor_pos += 1;
                }
            }
            KeyCode::Home => self.cursor_pos = 0,
            KeyCode::End => self.cursor_pos = self.input.chars().count(),
            KeyCode::Up => {
                if !self.history.is_empty() {
                    let pos = match self.history_pos {
                        Some(p) if p > 0 => p - 1,
                        Some(p) => p,
                        None => self.history.len() - 1,
                    };
                    self.history_pos = Some(pos);
                    self.input = self.history[pos].clone();
                    self.cursor_pos = self.input.chars().count();
                }
            }
            KeyCode::Down => {
                if let Some(pos) = self.history_pos {
                    if pos + 1 < self.history.len() {
                        self.history_pos = Some(pos + 1);
                        self.input = self.history[pos + 1].clone();
                    } else {
                        self.history_pos = None;
                        self.input.clear();
                    }
                    self.cursor_pos = self.input.chars().count();
                }
            }
            KeyCode::Enter => self.process_input(),
            _ => {}
        }
    }

    /// Submit the assistant input: a slash command or a question.
    fn process_input(&mut self) {
        let input = self.input.trim().to_string();
        if input.is_empty() {
            return;
        }
        self.history.push(input.clone());
        self.history_pos = None;
        self.input.clear();
        self.cursor_pos = 0;

        if let Some(command) = input.strip_prefix('/') {
            self.process_command(command);
        } else {
            self.ask(input);
        }
    }

    fn process_command(&mut self, command: &str) {
        let (name, args) = command.split_once(' ').unwrap_or((command, ""));
        match name {
            "help" => {
                self.state.chat.push(ChatMessage {
                    role: ChatRole::Assistant,
                    text: "Commands:\n  <text>            ask the AI about your logs\n  \
                           /summary          fetch the fleet-wide AI summary\n  \
                           /export [title]   export the last answer as an HTML report\n  \
                           /help             this message\n  \
                           /quit             exit (or Ctrl+C anywhere)"
                        .to_string(),
                });
            }
            "summary" => {
                if !self.state.ai_busy {
                    self.state.ai_busy = true;
                    let client = self.client.clone();
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let _ = tx.send(AppEvent::Summary(client.fetch_summary().await));
                    });
                }
            }
            "export" => {
                let title = if args.trim().is_empty() {
                    "AI Analysis"
                } else {
                    args.trim()
                };
                let content = self
                    .state
                    .chat
                    .iter()
                    .rev()
                    .find(|m| m.role == ChatRole::Assistant)
                    .map(|m| m.text.clone());
                match content {
                    Some(content) => self.export_report(title, &content),
                    None => self.state.status_line = Some("nothing to export yet".to_string()),
                }
            }
            "quit" | "exit" | "q" => {
                // Handled in the event loop before dispatch.
            }
            other => {
                self.state.status_line = Some(format!("unknown command: /{other}"));
            }
        }
    }

    fn ask(&mut self, question: String) {
        if self.state.ai_busy {
            return;
        }
        self.state.chat.push(ChatMessage {
            role: ChatRole::Operator,
            text: question.clone(),
        });
        self.state.ai_busy = true;
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::Answer(client.ask(&question, None).await));
        });
    }

    /// Validate the comparison form and fire the one-shot request. The
    /// crash window is pinned only once the comparison comes back.
    fn submit_compare(&mut self) {
        if self.form.in_flight {
            return;
        }
        let zone = self.config.input_zone();
        match self.form.instants(zone) {
            Err(err) => {
                self.form.error = Some(err.to_string());
            }
            Ok((healthy, crash)) => {
                self.form.error = None;
                self.form.in_flight = true;
                let client = self.client.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let outcome = client.compare(healthy, crash, None).await;
                    let _ = tx.send(AppEvent::Comparison {
                        crash_start: crash,
                        outcome,
                    });
                });
            }
        }
    }

    /// Activate the next citation in the comparison analysis.
    fn cite_from_comparison(&mut self) {
        let citations = self
            .state
            .comparison
            .as_ref()
            .map(|c| citation::extract_citations(&c.analysis))
            .unwrap_or_default();
        self.cite(citations);
    }

    /// Activate the next citation in the latest assistant message.
    fn cite_from_chat(&mut self) {
        let citations = self
            .state
            .chat
            .iter()
            .rev()
            .find(|m| m.role == ChatRole::Assistant)
            .map(|m| citation::extract_citations(&m.text))
            .unwrap_or_default();
        self.cite(citations);
    }

    fn cite(&mut self, citations: Vec<LogId>) {
        if citations.is_empty() {
            self.state.status_line = Some("no citations in the analysis".to_string());
            return;
        }
        let id = citations[self.citation_cursor % citations.len()].clone();
        self.citation_cursor += 1;
        self.coordinator.set_highlight(id);
    }

    fn export_comparison(&mut self) {
        match self.state.comparison.as_ref() {
            Some(result) if !result.analysis.is_empty() => {
                let content = result.analysis.clone();
                self.export_report("Crash Period", &content);
            }
            _ => self.state.status_line = Some("no comparison to export".to_string()),
        }
    }

    fn export_report(&mut self, title: &str, content: &str) {
        let dir = self.config.reports_dir();
        match report::write_report(&dir, title, content, chrono::Utc::now()) {
            Ok(path) => {
                self.state.status_line = Some(format!("report written to {}", path.display()));
            }
            Err(err) => {
                self.state.status_line = Some(format!("report export failed: {err}"));
            }
        }
    }
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

/// Restore the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the dashboard event loop until the operator quits.
pub async fn run(client: ApiClient, config: ConsoleConfig) -> Result<(), anyhow::Error> {
    use std::io::IsTerminal;
    if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        return Err(anyhow::anyhow!("the dashboard requires a terminal (TTY)"));
    }

    // Restore the terminal even when rendering panics.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let coordinator = Arc::new(ViewCoordinator::new());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let sources = Sources::spawn(client.clone(), coordinator.clone(), &config, tx.clone());
    let mut highlight_rx = coordinator.watch_highlight();

    let mut terminal = setup_terminal()?;
    let mut console = Console::new(client, config, coordinator, tx);
    let mut ticker = tokio::time::interval(TICK_RATE);
    let mut events = EventStream::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                terminal.draw(|frame| views::render(frame, &console))?;
            }
            Some(event) = rx.recv() => {
                console.handle_event(event);
            }
            changed = highlight_rx.changed() => {
                if changed.is_ok() {
                    let highlight = highlight_rx.borrow_and_update().clone();
                    console.state.apply_highlight(&highlight);
                }
            }
            Some(Ok(event)) = events.next() => {
                if let Event::Key(key) = event {
                    if key.kind == KeyEventKind::Press {
                        if key.code == KeyCode::Enter
                            && console.tab == Tab::Assistant
                            && console.focus == Focus::Main
                        {
                            let trimmed = console.input.trim();
                            if trimmed == "/quit" || trimmed == "/exit" || trimmed == "/q" {
                                break;
                            }
                        }
                        if console.handle_key(key.code, key.modifiers) {
                            break;
                        }
                    }
                }
            }
        }
    }

    // Stop pollers before the coordinator subscriptions unwind so late
    // results are discarded rather than applied.
    sources.shutdown();
    restore_terminal(&mut terminal)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_console() -> (Console, mpsc::UnboundedReceiver<AppEvent>) {
        let client = ApiClient::new("http://localhost:1", Duration::from_secs(1)).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let console = Console::new(
            client,
            ConsoleConfig::default(),
            Arc::new(ViewCoordinator::new()),
            tx,
        );
        (console, rx)
    }

    #[tokio::test]
    async fn sidebar_enter_raises_highlight_for_selected_log() {
        let (mut console, _rx) = test_console();
        console.handle_event(AppEvent::Logs(Ok(logflow_core::synthetic_logs(
            chrono::Utc::now(),
        ))));
        console.focus = Focus::Sidebar;
        console.handle_sidebar_key(KeyCode::Down);
        console.handle_sidebar_key(KeyCode::Down);
        console.handle_sidebar_key(KeyCode::Enter);

        let highlight = console.coordinator.highlight();
        assert_eq!(highlight.log_id, Some(LogId::Number(2)));
        assert_eq!(highlight.triggered_at, 1);
    }

    #[tokio::test]
    async fn invalid_form_blocks_submission() {
        let (mut console, mut rx) = test_console();
        console.form.healthy.time = "13:00".to_string();
        console.submit_compare();
        assert!(console.form.error.is_some());
        assert!(!console.form.in_flight);
        assert!(rx.try_recv().is_err(), "no request may be issued");
    }

    #[tokio::test]
    async fn citation_key_cycles_through_analysis_citations() {
        let (mut console, _rx) = test_console();
        console.handle_event(AppEvent::Comparison {
            crash_start: chrono::Utc::now(),
            outcome: Ok(logflow_core::ComparisonResult {
                healthy_count: 1,
                crash_count: 2,
                analysis: "start [Log #11] middle [Log #22] end".to_string(),
            }),
        });

        console.cite_from_comparison();
        assert_eq!(
            console.coordinator.highlight().log_id,
            Some(LogId::Number(11))
        );
        console.cite_from_comparison();
        assert_eq!(
            console.coordinator.highlight().log_id,
            Some(LogId::Number(22))
        );
        console.cite_from_comparison();
        assert_eq!(
            console.coordinator.highlight().log_id,
            Some(LogId::Number(11))
        );
        assert_eq!(console.coordinator.highlight().triggered_at, 3);
    }

    #[tokio::test]
    async fn slash_quit_is_left_to_the_event_loop() {
        let (mut console, _rx) = test_console();
        console.tab = Tab::Assistant;
        for c in "/quit".chars() {
            console.handle_chat_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
        assert_eq!(console.input, "/quit");
    }
}
