//! Helper functions for UI operations.
//!
//! Background task plumbing, browser opening and clipboard copy.
//! The connectivity monitor also lives here.

use crate::app::{App, AppEvent};
use crate::notifications::NotificationKind;
use crate::util::validate_url_for_open;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use crossterm::{execute, style::Print};
use futures::FutureExt;
use std::future::Future;
use std::io;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// Time between two reachability checks.
pub(super) const CONNECTIVITY_INTERVAL: Duration = Duration::from_secs(30);

/// A check that takes longer than this counts as offline.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Host every download and issue link ultimately goes through.
const REACHABILITY_ADDR: (&str, u16) = ("github.com", 443);

/// Wraps a future to catch panics and convert them to errors.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Run `future` on its own task, reporting a panic as `TaskPanicked`.
fn spawn_guarded<F>(task: &'static str, tx: &mpsc::Sender<AppEvent>, future: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let tx_panic = tx.clone();
    tokio::spawn(async move {
        if let Err(panic_msg) = catch_task_panic(future).await {
            tracing::error!(task, error = %panic_msg, "Background task panicked");
            let _ = tx_panic
                .send(AppEvent::TaskPanicked {
                    task,
                    error: panic_msg,
                })
                .await;
        }
    });
}

/// Send `event` after `delay` from a background task.
///
/// Used for the welcome toast and the delayed issue page. The task holds
/// no state, so a closed channel simply drops the event.
pub(super) fn spawn_delayed(
    task: &'static str,
    delay: Duration,
    event: AppEvent,
    tx: &mpsc::Sender<AppEvent>,
) {
    let sender = tx.clone();
    spawn_guarded(task, tx, async move {
        tokio::time::sleep(delay).await;
        if let Err(e) = sender.send(event).await {
            tracing::warn!(error = %e, task, "Channel send failed (receiver dropped)");
        }
    });
}

/// Start the background connectivity monitor.
///
/// Sends `AppEvent::Connectivity` whenever reachability flips. The session
/// starts out assumed online, so a first failed check reports offline.
pub(super) fn spawn_connectivity_monitor(tx: &mpsc::Sender<AppEvent>) {
    let sender = tx.clone();
    spawn_guarded(
        "connectivity",
        tx,
        watch_connectivity(sender, CONNECTIVITY_INTERVAL, host_reachable),
    );
}

async fn host_reachable() -> bool {
    matches!(
        tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(REACHABILITY_ADDR)).await,
        Ok(Ok(_))
    )
}

/// Run `check` every `every` and report transitions until the receiver goes away.
async fn watch_connectivity<C, Fut>(tx: mpsc::Sender<AppEvent>, every: Duration, mut check: C)
where
    C: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let mut online = true;
    let mut ticker = tokio::time::interval(every);
    while !tx.is_closed() {
        ticker.tick().await;
        let reachable = check().await;
        if reachable == online {
            continue;
        }
        online = reachable;
        tracing::debug!(online, "Reachability changed");
        if tx.send(AppEvent::Connectivity { online }).await.is_err() {
            break;
        }
    }
}

/// Open a URL in the system browser after validating its scheme.
///
/// Failures surface as an error toast.
pub(super) fn open_url(app: &mut App, url: &str) {
    // Only http(s) URLs are handed to the OS opener
    if let Err(e) = validate_url_for_open(url) {
        app.toast(NotificationKind::Error, e.to_string());
        return;
    }
    match open::that(url) {
        Ok(()) => tracing::debug!(url = %url, "Opened in browser"),
        Err(e) => {
            tracing::warn!(url = %url, error = %e, "Failed to open browser");
            app.toast(NotificationKind::Error, format!("Failed to open browser: {}", e));
        }
    }
}

/// Copy text to the terminal clipboard with an OSC 52 escape sequence.
pub(super) fn copy_to_clipboard(text: &str) -> io::Result<()> {
    execute!(io::stdout(), Print(osc52_sequence(text)))
}

fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc52_sequence_encodes_payload() {
        assert_eq!(
            osc52_sequence("https://mega.nz/x"),
            "\x1b]52;c;aHR0cHM6Ly9tZWdhLm56L3g=\x07"
        );
    }

    #[tokio::test]
    async fn test_catch_task_panic_reports_message() {
        let result: Result<(), String> = catch_task_panic(async { panic!("boom") }).await;
        assert_eq!(result.unwrap_err(), "boom");
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_delayed_sends_after_delay() {
        let (tx, mut rx) = mpsc::channel(4);
        spawn_delayed("welcome", Duration::from_secs(1), AppEvent::ShowWelcome, &tx);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(matches!(rx.try_recv(), Ok(AppEvent::ShowWelcome)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_connectivity_reports_transitions_only() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut script = std::collections::VecDeque::from([true, false, false, true, true]);
        tokio::spawn(watch_connectivity(tx, Duration::from_secs(30), move || {
            let reachable = script.pop_front().unwrap_or(true);
            async move { reachable }
        }));

        assert!(matches!(
            rx.recv().await,
            Some(AppEvent::Connectivity { online: false })
        ));
        assert!(matches!(
            rx.recv().await,
            Some(AppEvent::Connectivity { online: true })
        ));

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_connectivity_stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        watch_connectivity(tx, Duration::from_secs(30), || async { false }).await;
    }
}
