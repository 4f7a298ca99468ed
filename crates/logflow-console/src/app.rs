//! Dashboard state and the events that mutate it.
//!
//! Background sources push [`AppEvent`]s over a channel; the UI loop is
//! the only writer of [`DashboardState`]. Cross-view effects (window
//! pinning, highlights) go through the shared coordinator instead of
//! touching other views' data.

use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};

use logflow_core::{
    classify_data_failure, derive_window, synthetic_logs, synthetic_metrics, timeconv,
    to_absolute_instant, AdvancedMetricsSnapshot, AiAnswer, ApiError, ComparisonResult,
    HealthStatus, Highlight, InvalidInput, LogEntry, LogWindow, Meridiem, MetricsSnapshot,
    SummaryReport, ViewCoordinator,
};

/// How long the highlight pulse stays lit after a trigger.
pub const PULSE_DURATION_MS: u128 = 2_000;

/// Main-pane tabs, mirroring the dashboard's workflow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    TimeTravel,
    Assistant,
    Metrics,
    Advanced,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::TimeTravel, Tab::Assistant, Tab::Metrics, Tab::Advanced];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::TimeTravel => "Time-Travel Debugger",
            Tab::Assistant => "AI Assistant",
            Tab::Metrics => "System Metrics",
            Tab::Advanced => "Advanced Metrics",
        }
    }
}

/// Which pane keystrokes go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Main,
}

/// Events produced by background sources and one-shot operations.
#[derive(Debug)]
pub enum AppEvent {
    Health(HealthStatus),
    Logs(Result<Vec<LogEntry>, ApiError>),
    Metrics(Result<MetricsSnapshot, ApiError>),
    Advanced(Result<AdvancedMetricsSnapshot, ApiError>),
    Comparison {
        crash_start: DateTime<Utc>,
        outcome: Result<ComparisonResult, ApiError>,
    },
    Answer(Result<AiAnswer, ApiError>),
    Summary(Result<SummaryReport, ApiError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    Operator,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

/// One period's civil-time inputs on the comparison form.
#[derive(Debug, Clone)]
pub struct PeriodForm {
    pub date: String,
    pub time: String,
    pub meridiem: Meridiem,
}

impl PeriodForm {
    pub fn new(date: &str, time: &str, meridiem: Meridiem) -> Self {
        Self {
            date: date.to_string(),
            time: time.to_string(),
            meridiem,
        }
    }

    /// All-fields-required validation, then civil-to-UTC conversion.
    pub fn instant(
        &self,
        zone: chrono::FixedOffset,
        label: &str,
    ) -> Result<DateTime<Utc>, InvalidInput> {
        if self.date.trim().is_empty() || self.time.trim().is_empty() {
            return Err(InvalidInput(format!("{label}: all fields are required")));
        }
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| InvalidInput(format!("{label}: date '{}' is not YYYY-MM-DD", self.date)))?;
        to_absolute_instant(zone, date, self.time.trim(), self.meridiem)
            .map_err(|e| InvalidInput(format!("{label}: {e}")))
    }
}

/// Fields of the time-travel form in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    HealthyDate,
    HealthyTime,
    HealthyMeridiem,
    CrashDate,
    CrashTime,
    CrashMeridiem,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        FormField::HealthyDate,
        FormField::HealthyTime,
        FormField::HealthyMeridiem,
        FormField::CrashDate,
        FormField::CrashTime,
        FormField::CrashMeridiem,
    ];
}

#[derive(Debug, Clone)]
pub struct TimeTravelForm {
    pub healthy: PeriodForm,
    pub crash: PeriodForm,
    pub focus: usize,
    pub error: Option<String>,
    pub in_flight: bool,
}

impl Default for TimeTravelForm {
    fn default() -> Self {
        Self {
            healthy: PeriodForm::new("2026-02-01", "09:12", Meridiem::Pm),
            crash: PeriodForm::new("2026-02-01", "09:22", Meridiem::Pm),
            focus: 0,
            error: None,
            in_flight: false,
        }
    }
}

impl TimeTravelForm {
    pub fn focused(&self) -> FormField {
        FormField::ALL[self.focus % FormField::ALL.len()]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % FormField::ALL.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + FormField::ALL.len() - 1) % FormField::ALL.len();
    }

    fn field_mut(&mut self) -> Option<&mut String> {
        match self.focused() {
            FormField::HealthyDate => Some(&mut self.healthy.date),
            FormField::HealthyTime => Some(&mut self.healthy.time),
            FormField::CrashDate => Some(&mut self.crash.date),
            FormField::CrashTime => Some(&mut self.crash.time),
            FormField::HealthyMeridiem | FormField::CrashMeridiem => None,
        }
    }

    /// Insert a character into the focused text field. Only characters
    /// that can occur in a date or clock value are accepted.
    pub fn insert(&mut self, c: char) -> bool {
        if !(c.is_ascii_digit() || c == '-' || c == ':') {
            return false;
        }
        if let Some(field) = self.field_mut() {
            field.push(c);
            self.error = None;
            return true;
        }
        false
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.field_mut() {
            field.pop();
            self.error = None;
        }
    }

    /// Toggle AM/PM when a meridiem field is focused.
    pub fn toggle_meridiem(&mut self) -> bool {
        match self.focused() {
            FormField::HealthyMeridiem => {
                self.healthy.meridiem = self.healthy.meridiem.toggle();
                true
            }
            FormField::CrashMeridiem => {
                self.crash.meridiem = self.crash.meridiem.toggle();
                true
            }
            _ => false,
        }
    }

    /// Validate both periods and return their absolute instants.
    pub fn instants(
        &self,
        zone: chrono::FixedOffset,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), InvalidInput> {
        let healthy = self.healthy.instant(zone, "healthy period")?;
        let crash = self.crash.instant(zone, "crash period")?;
        Ok((healthy, crash))
    }
}

/// Transient scroll/pulse bookkeeping for the highlighted log row.
#[derive(Debug, Clone)]
pub struct Pulse {
    pub trigger: u64,
    pub started: Instant,
}

/// Everything the views render from. Mutated only by the UI loop.
pub struct DashboardState {
    pub heartbeat: HealthStatus,
    pub data_health: HealthStatus,
    /// True while panels show fallback data instead of backend data.
    pub synthetic: bool,
    pub logs: Vec<LogEntry>,
    pub metrics: MetricsSnapshot,
    pub advanced: AdvancedMetricsSnapshot,
    pub comparison: Option<ComparisonResult>,
    pub chat: Vec<ChatMessage>,
    pub ai_busy: bool,
    pub window_label: Option<String>,
    pub selected_log: Option<usize>,
    pub pulse: Option<Pulse>,
    pub status_line: Option<String>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            heartbeat: HealthStatus::Healthy,
            data_health: HealthStatus::Healthy,
            synthetic: false,
            logs: Vec::new(),
            metrics: MetricsSnapshot::default(),
            advanced: AdvancedMetricsSnapshot::default(),
            comparison: None,
            chat: vec![ChatMessage {
                role: ChatRole::Assistant,
                text: "Hey! I'm LogFlow, your AI-powered SRE assistant. Ask me anything \
                       about your logs, metrics, or system health."
                    .to_string(),
            }],
            ai_busy: false,
            window_label: None,
            selected_log: None,
            pulse: None,
            status_line: None,
        }
    }

    /// Worst of the heartbeat classification and the latest data-fetch
    /// classification; drives the header badge.
    pub fn effective_health(&self) -> HealthStatus {
        match (self.heartbeat, self.data_health) {
            (HealthStatus::Offline, _) | (_, HealthStatus::Offline) => HealthStatus::Offline,
            (HealthStatus::Degraded, _) | (_, HealthStatus::Degraded) => HealthStatus::Degraded,
            _ => HealthStatus::Healthy,
        }
    }

    /// Apply one event. Cross-view effects go through `coordinator`.
    pub fn apply(&mut self, event: AppEvent, coordinator: &ViewCoordinator) {
        match event {
            AppEvent::Health(status) => {
                self.heartbeat = status;
            }
            AppEvent::Logs(Ok(logs)) => {
                self.logs = logs;
                self.synthetic = false;
                self.data_health = HealthStatus::Healthy;
                if let Some(i) = self.selected_log {
                    if i >= self.logs.len() {
                        self.selected_log = None;
                    }
                }
            }
            AppEvent::Logs(Err(err)) => {
                self.note_data_failure(&err, "logs");
                self.logs = synthetic_logs(Utc::now());
                self.selected_log = None;
            }
            AppEvent::Metrics(Ok(snapshot)) => {
                self.metrics = snapshot;
                self.synthetic = false;
                self.data_health = HealthStatus::Healthy;
            }
            AppEvent::Metrics(Err(err)) => {
                self.note_data_failure(&err, "metrics");
                self.metrics = synthetic_metrics();
            }
            AppEvent::Advanced(Ok(snapshot)) => {
                self.advanced = snapshot;
            }
            AppEvent::Advanced(Err(err)) => {
                // Keep the previous snapshot; just surface the failure.
                self.status_line = Some(format!("advanced metrics: {err}"));
            }
            AppEvent::Comparison {
                crash_start,
                outcome: Ok(result),
            } => {
                self.comparison = Some(result);
                self.status_line = Some("comparison ready".to_string());
                match derive_window(
                    crash_start,
                    timeconv::CRASH_WINDOW_MINUTES,
                    Some("Crash Period".to_string()),
                ) {
                    Ok(window) => self.pin_window(coordinator, window),
                    Err(err) => self.status_line = Some(err.to_string()),
                }
            }
            AppEvent::Comparison {
                outcome: Err(err), ..
            } => {
                self.status_line = Some(format!("comparison failed: {err}"));
            }
            AppEvent::Answer(Ok(answer)) => {
                self.ai_busy = false;
                if let (Some(from), Some(to)) = (answer.from_time, answer.to_time) {
                    if from <= to {
                        let label = answer
                            .time_range
                            .clone()
                            .unwrap_or_else(|| "AI Window".to_string());
                        self.pin_window(
                            coordinator,
                            LogWindow {
                                from,
                                to,
                                label: Some(label),
                            },
                        );
                    }
                }
                self.chat.push(ChatMessage {
                    role: ChatRole::Assistant,
                    text: if answer.answer.is_empty() {
                        "I could not process that request.".to_string()
                    } else {
                        answer.answer
                    },
                });
            }
            AppEvent::Answer(Err(err)) => {
                self.ai_busy = false;
                tracing::debug!(error = %err, "ai query failed");
                self.chat.push(ChatMessage {
                    role: ChatRole::Assistant,
                    text: "Sorry, I encountered an error processing your query.".to_string(),
                });
            }
            AppEvent::Summary(Ok(report)) => {
                self.ai_busy = false;
                let text = if report.total_logs > 0 {
                    format!(
                        "{}\n\nSUMMARY: {} logs | {} errors | {} warnings",
                        report.summary, report.total_logs, report.error_count, report.warning_count
                    )
                } else {
                    report.summary
                };
                self.chat.push(ChatMessage {
                    role: ChatRole::Assistant,
                    text,
                });
            }
            AppEvent::Summary(Err(err)) => {
                self.ai_busy = false;
                self.status_line = Some(format!("summary failed: {err}"));
            }
        }
    }

    fn note_data_failure(&mut self, err: &ApiError, what: &str) {
        self.data_health = classify_data_failure(err);
        self.synthetic = true;
        self.status_line = Some(format!("{what} fetch failed: {err}"));
        tracing::debug!(error = %err, what, "data fetch failed, using synthetic data");
    }

    fn pin_window(&mut self, coordinator: &ViewCoordinator, window: LogWindow) {
        self.window_label = window.label.clone();
        coordinator.set_window(window);
    }

    /// React to a highlight change: locate the entry, select it, and arm
    /// the pulse keyed by `triggered_at` so repeats re-fire.
    pub fn apply_highlight(&mut self, highlight: &Highlight) {
        let Some(id) = &highlight.log_id else {
            return;
        };
        let index = self.logs.iter().position(|log| log.id.as_ref() == Some(id));
        if let Some(index) = index {
            self.selected_log = Some(index);
        } else {
            self.status_line = Some(format!("log #{id} is not in the current window"));
        }
        self.pulse = Some(Pulse {
            trigger: highlight.triggered_at,
            started: Instant::now(),
        });
    }

    pub fn pulsing(&self) -> bool {
        self.pulse
            .as_ref()
            .map(|p| p.started.elapsed().as_millis() < PULSE_DURATION_MS)
            .unwrap_or(false)
    }

    pub fn sidebar_title(&self) -> String {
        match &self.window_label {
            Some(label) => format!("Time Window Logs - {label}"),
            None => "Live Logs".to_string(),
        }
    }

    /// Called when the coordinator returns to the rolling live window.
    pub fn window_cleared(&mut self) {
        self.window_label = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logflow_core::{LogId, LogLevel};

    fn utc_zone() -> chrono::FixedOffset {
        chrono::FixedOffset::east_opt(0).unwrap()
    }

    fn entry(id: i64) -> LogEntry {
        LogEntry {
            id: Some(LogId::Number(id)),
            level: LogLevel::Info,
            service: "svc".to_string(),
            message: "m".to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn failed_logs_fetch_substitutes_synthetic_data() {
        let coordinator = ViewCoordinator::new();
        let mut state = DashboardState::new();
        state.apply(
            AppEvent::Logs(Err(ApiError::Network("refused".to_string()))),
            &coordinator,
        );
        assert!(state.synthetic);
        assert_eq!(state.data_health, HealthStatus::Offline);
        assert_eq!(state.logs.len(), 5);
        assert_eq!(state.effective_health(), HealthStatus::Offline);
    }

    #[test]
    fn backend_failure_reads_degraded_while_heartbeat_is_healthy() {
        let coordinator = ViewCoordinator::new();
        let mut state = DashboardState::new();
        state.apply(AppEvent::Health(HealthStatus::Healthy), &coordinator);
        state.apply(
            AppEvent::Metrics(Err(ApiError::backend(500, "boom"))),
            &coordinator,
        );
        assert_eq!(state.effective_health(), HealthStatus::Degraded);
        assert!(state.synthetic);
        assert_eq!(state.metrics.total, 1072);
    }

    #[test]
    fn successful_fetch_clears_synthetic_mode() {
        let coordinator = ViewCoordinator::new();
        let mut state = DashboardState::new();
        state.apply(
            AppEvent::Logs(Err(ApiError::Network("down".to_string()))),
            &coordinator,
        );
        state.apply(AppEvent::Logs(Ok(vec![entry(1)])), &coordinator);
        assert!(!state.synthetic);
        assert_eq!(state.effective_health(), HealthStatus::Healthy);
        assert_eq!(state.logs.len(), 1);
    }

    #[test]
    fn comparison_success_pins_the_crash_window() {
        let coordinator = ViewCoordinator::new();
        let mut state = DashboardState::new();
        let crash_start = Utc::now();
        state.apply(
            AppEvent::Comparison {
                crash_start,
                outcome: Ok(ComparisonResult {
                    healthy_count: 10,
                    crash_count: 90,
                    analysis: "ROOT CAUSE".to_string(),
                }),
            },
            &coordinator,
        );
        let window = coordinator.window().expect("window pinned");
        assert_eq!(window.from, crash_start);
        assert_eq!(window.to - window.from, chrono::Duration::minutes(7));
        assert_eq!(window.label.as_deref(), Some("Crash Period"));
        assert_eq!(state.sidebar_title(), "Time Window Logs - Crash Period");
    }

    #[test]
    fn answer_with_time_range_pins_a_window() {
        let coordinator = ViewCoordinator::new();
        let mut state = DashboardState::new();
        let from = Utc::now();
        let to = from + chrono::Duration::hours(1);
        state.apply(
            AppEvent::Answer(Ok(AiAnswer {
                answer: "errors spiked".to_string(),
                from_time: Some(from),
                to_time: Some(to),
                time_range: Some("last 1 hour".to_string()),
            })),
            &coordinator,
        );
        let window = coordinator.window().expect("window pinned");
        assert_eq!(window.label.as_deref(), Some("last 1 hour"));
        assert_eq!(state.chat.last().unwrap().text, "errors spiked");
    }

    #[test]
    fn answer_without_range_leaves_window_untouched() {
        let coordinator = ViewCoordinator::new();
        let mut state = DashboardState::new();
        state.apply(
            AppEvent::Answer(Ok(AiAnswer {
                answer: "all quiet".to_string(),
                ..Default::default()
            })),
            &coordinator,
        );
        assert_eq!(coordinator.window(), None);
    }

    #[test]
    fn highlight_selects_and_arms_pulse() {
        let coordinator = ViewCoordinator::new();
        let mut state = DashboardState::new();
        state.apply(
            AppEvent::Logs(Ok(vec![entry(1), entry(2), entry(3)])),
            &coordinator,
        );

        coordinator.set_highlight(LogId::Number(2));
        let highlight = coordinator.highlight();
        state.apply_highlight(&highlight);
        assert_eq!(state.selected_log, Some(1));
        assert!(state.pulsing());

        // Re-citing the same log re-arms the pulse with a fresh trigger.
        coordinator.set_highlight(LogId::Number(2));
        let again = coordinator.highlight();
        state.apply_highlight(&again);
        assert!(again.triggered_at > highlight.triggered_at);
        assert_eq!(state.pulse.as_ref().unwrap().trigger, again.triggered_at);
    }

    #[test]
    fn form_rejects_missing_and_malformed_fields() {
        let mut form = TimeTravelForm::default();
        form.healthy.date.clear();
        assert!(form.instants(utc_zone()).is_err());

        let mut form = TimeTravelForm::default();
        form.crash.time = "25:00".to_string();
        assert!(form.instants(utc_zone()).is_err());

        let form = TimeTravelForm::default();
        let (healthy, crash) = form.instants(utc_zone()).unwrap();
        assert!(healthy < crash);
    }

    #[test]
    fn form_focus_cycles_and_edits_target_the_focused_field() {
        let mut form = TimeTravelForm::default();
        assert_eq!(form.focused(), FormField::HealthyDate);
        form.focus_prev();
        assert_eq!(form.focused(), FormField::CrashMeridiem);
        assert!(form.toggle_meridiem());
        assert_eq!(form.crash.meridiem, Meridiem::Am);

        form.focus_next();
        assert_eq!(form.focused(), FormField::HealthyDate);
        form.backspace();
        assert!(form.insert('2'));
        assert!(!form.insert('x'));
        assert!(form.healthy.date.ends_with('2'));
    }
}
