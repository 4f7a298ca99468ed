//! Background data sources feeding the dashboard.
//!
//! Each source owns a [`Poller`] and funnels outcomes into the UI loop
//! over an unbounded channel; no source touches dashboard state directly.
//! The log source additionally tracks the coordinator's window: live mode
//! polls a rolling last-hour window, a pinned window is fetched once per
//! change.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use logflow_client::{ApiClient, Poller};
use logflow_core::{classify_health, LogWindow, ViewCoordinator};

use crate::app::AppEvent;
use crate::config::ConsoleConfig;

/// Handles for every background source. Shut down before dropping the
/// coordinator subscriptions so in-flight results are discarded, not
/// applied to a torn-down view.
pub struct Sources {
    pollers: Vec<Poller>,
    log_task: JoinHandle<()>,
}

impl Sources {
    pub fn spawn(
        client: ApiClient,
        coordinator: Arc<ViewCoordinator>,
        config: &ConsoleConfig,
        tx: UnboundedSender<AppEvent>,
    ) -> Self {
        let heartbeat = {
            let client = client.clone();
            let ok_tx = tx.clone();
            let err_tx = tx.clone();
            Poller::start(
                config.heartbeat_interval(),
                move || {
                    let client = client.clone();
                    async move { client.check_health().await }
                },
                move |report| {
                    let _ = ok_tx.send(AppEvent::Health(classify_health(&Ok(report))));
                },
                move |err| {
                    let _ = err_tx.send(AppEvent::Health(classify_health(&Err(err))));
                },
            )
        };

        let metrics = {
            let client = client.clone();
            let ok_tx = tx.clone();
            let err_tx = tx.clone();
            Poller::start(
                config.metrics_interval(),
                move || {
                    let client = client.clone();
                    async move { client.fetch_metrics().await }
                },
                move |snapshot| {
                    let _ = ok_tx.send(AppEvent::Metrics(Ok(snapshot)));
                },
                move |err| {
                    let _ = err_tx.send(AppEvent::Metrics(Err(err)));
                },
            )
        };

        let advanced = {
            let client = client.clone();
            let ok_tx = tx.clone();
            let err_tx = tx.clone();
            Poller::start(
                config.metrics_interval(),
                move || {
                    let client = client.clone();
                    async move { client.fetch_advanced_metrics().await }
                },
                move |snapshot| {
                    let _ = ok_tx.send(AppEvent::Advanced(Ok(snapshot)));
                },
                move |err| {
                    let _ = err_tx.send(AppEvent::Advanced(Err(err)));
                },
            )
        };

        let log_task = spawn_log_source(client, coordinator, config, tx);

        Self {
            pollers: vec![heartbeat, metrics, advanced],
            log_task,
        }
    }

    pub fn shutdown(self) {
        for poller in &self.pollers {
            poller.stop();
        }
        self.log_task.abort();
    }
}

fn live_log_poller(
    client: ApiClient,
    config: &ConsoleConfig,
    tx: UnboundedSender<AppEvent>,
) -> Poller {
    let limit = config.log_limit;
    let ok_tx = tx.clone();
    let err_tx = tx;
    Poller::start(
        config.logs_interval(),
        move || {
            let client = client.clone();
            async move {
                let window = LogWindow::last_hour(Utc::now());
                client.fetch_logs(&window, limit).await
            }
        },
        move |logs| {
            let _ = ok_tx.send(AppEvent::Logs(Ok(logs)));
        },
        move |err| {
            let _ = err_tx.send(AppEvent::Logs(Err(err)));
        },
    )
}

/// Own the log poller and re-query on every coordinator window change.
fn spawn_log_source(
    client: ApiClient,
    coordinator: Arc<ViewCoordinator>,
    config: &ConsoleConfig,
    tx: UnboundedSender<AppEvent>,
) -> JoinHandle<()> {
    let config = config.clone();
    tokio::spawn(async move {
        let mut window_rx = coordinator.watch_window();
        let mut live = Some(live_log_poller(client.clone(), &config, tx.clone()));

        while window_rx.changed().await.is_ok() {
            let window = window_rx.borrow_and_update().clone();
            // Always stop the previous poller before the mode switch so
            // a stale in-flight result cannot land after the change.
            drop(live.take());
            match window {
                None => {
                    live = Some(live_log_poller(client.clone(), &config, tx.clone()));
                }
                Some(window) => {
                    let outcome = client.fetch_logs(&window, config.log_limit).await;
                    if tx.send(AppEvent::Logs(outcome)).is_err() {
                        break;
                    }
                }
            }
        }
        drop(live);
    })
}
