//! Cross-view shared state: the active query window and the highlighted
//! log.
//!
//! Views never hold references to each other. They write through the two
//! mutator groups here and observe changes through cloned watch receivers,
//! so an AI answer landing mid-edit cannot race a manual form submission
//! into a lost update — the last `set_window` wins wholesale.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

use crate::types::{Highlight, LogId, LogWindow};

/// Single writer for the window and highlight state shared by all views.
#[derive(Debug)]
pub struct ViewCoordinator {
    window_tx: watch::Sender<Option<LogWindow>>,
    highlight_tx: watch::Sender<Highlight>,
    highlight_seq: AtomicU64,
}

impl Default for ViewCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewCoordinator {
    pub fn new() -> Self {
        let (window_tx, _) = watch::channel(None);
        let (highlight_tx, _) = watch::channel(Highlight::default());
        Self {
            window_tx,
            highlight_tx,
            highlight_seq: AtomicU64::new(0),
        }
    }

    /// Replace the active query window wholesale.
    pub fn set_window(&self, window: LogWindow) {
        tracing::debug!(from = %window.from, to = %window.to, label = ?window.label, "window pinned");
        self.window_tx.send_replace(Some(window));
    }

    /// Return to the rolling live window.
    pub fn clear_window(&self) {
        tracing::debug!("window cleared, back to rolling live view");
        self.window_tx.send_replace(None);
    }

    /// Current window, `None` meaning the rolling live window.
    pub fn window(&self) -> Option<LogWindow> {
        self.window_tx.borrow().clone()
    }

    /// Raise the shared highlight. `triggered_at` strictly increases even
    /// when the same id is cited twice in a row, so the pulse re-fires.
    pub fn set_highlight(&self, log_id: LogId) {
        let seq = self.highlight_seq.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(log_id = %log_id, seq, "highlight raised");
        self.highlight_tx.send_replace(Highlight {
            log_id: Some(log_id),
            triggered_at: seq,
        });
    }

    /// Current highlight value.
    pub fn highlight(&self) -> Highlight {
        self.highlight_tx.borrow().clone()
    }

    pub fn watch_window(&self) -> watch::Receiver<Option<LogWindow>> {
        self.window_tx.subscribe()
    }

    pub fn watch_highlight(&self) -> watch::Receiver<Highlight> {
        self.highlight_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn repeated_highlight_still_advances_the_trigger() {
        let coordinator = ViewCoordinator::new();
        coordinator.set_highlight(LogId::Number(5));
        let first = coordinator.highlight();
        coordinator.set_highlight(LogId::Number(5));
        let second = coordinator.highlight();

        assert_eq!(first.log_id, second.log_id);
        assert!(second.triggered_at > first.triggered_at);
    }

    #[test]
    fn window_replaces_and_clears() {
        let coordinator = ViewCoordinator::new();
        assert_eq!(coordinator.window(), None);

        let now = Utc::now();
        let w = LogWindow {
            from: now,
            to: now,
            label: Some("Crash Period".into()),
        };
        coordinator.set_window(w.clone());
        assert_eq!(coordinator.window(), Some(w));

        coordinator.clear_window();
        assert_eq!(coordinator.window(), None);
    }

    #[tokio::test]
    async fn subscribers_observe_changes() {
        let coordinator = ViewCoordinator::new();
        let mut window_rx = coordinator.watch_window();
        let mut highlight_rx = coordinator.watch_highlight();

        let now = Utc::now();
        coordinator.set_window(LogWindow {
            from: now,
            to: now,
            label: None,
        });
        coordinator.set_highlight(LogId::Number(9));

        window_rx.changed().await.unwrap();
        assert!(window_rx.borrow_and_update().is_some());

        highlight_rx.changed().await.unwrap();
        let seen = highlight_rx.borrow_and_update().clone();
        assert_eq!(seen.log_id, Some(LogId::Number(9)));
        assert_eq!(seen.triggered_at, 1);
    }
}
